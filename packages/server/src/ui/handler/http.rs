//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    domain::{ClientId, DecodeError, DeliveryOutcome, PageSize, RelayMessage, ValueObjectError},
    infrastructure::dto::{
        http::{
            ChannelHistoryQuery, ConnectedClientDto, DeliveryReportDto, LeaveRequest,
            NewChannelRequest, NewChannelResponse, NewThreadRequest, NewThreadResponse,
            SendToClientRequest, SendToClientsRequest, ThreadHistoryQuery,
        },
        websocket::{ChannelMessageDto, ThreadMessageDto},
    },
    ui::state::AppState,
    usecase::{CreateThreadError, PersistenceError},
};

const CLIENT_NOT_ONLINE: &str = "Client not online.";

/// HTTP API のエラーレスポンス
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid client id: {0}")]
    InvalidClientId(#[from] ValueObjectError),

    #[error("invalid page size: {0}")]
    InvalidPageSize(ValueObjectError),

    #[error("invalid message: {0}")]
    InvalidMessage(#[from] DecodeError),

    #[error("{0}")]
    NotFound(String),

    #[error("failed to persist message: {0}")]
    Persistence(#[from] PersistenceError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidClientId(_) | Self::InvalidPageSize(_) | Self::InvalidMessage(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("{}", self);
        }
        (status, self.to_string()).into_response()
    }
}

fn page_size(limit: Option<usize>) -> Result<PageSize, ApiError> {
    match limit {
        Some(value) => PageSize::new(value).map_err(ApiError::InvalidPageSize),
        None => Ok(PageSize::default()),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

/// Debug endpoint to list connected clients (for testing purposes)
pub async fn debug_clients(State(state): State<Arc<AppState>>) -> Json<Vec<ConnectedClientDto>> {
    let clients = state.registry.connected_clients().await;

    // Domain Model から DTO への変換
    Json(clients.into_iter().map(Into::into).collect())
}

/// 永続化してから 1 クライアントへ送る
///
/// 宛先が接続していなくても永続化は行われる。
pub async fn send_to_client(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SendToClientRequest>,
) -> Result<(StatusCode, &'static str), ApiError> {
    let client_id = ClientId::new(request.client_id)?;
    let message = RelayMessage::try_from(request.message)?;

    let outcome = state
        .relay_message_usecase
        .execute_to(&message, &client_id)
        .await?;

    Ok(match outcome {
        DeliveryOutcome::Delivered => (StatusCode::OK, "OK"),
        DeliveryOutcome::Offline => (StatusCode::ACCEPTED, CLIENT_NOT_ONLINE),
        DeliveryOutcome::Failed => (StatusCode::BAD_GATEWAY, "Failed to write to client."),
    })
}

/// 永続化してから複数のクライアントへ送る
pub async fn send_to_clients(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SendToClientsRequest>,
) -> Result<Json<DeliveryReportDto>, ApiError> {
    let client_ids = request
        .client_ids
        .into_iter()
        .map(ClientId::new)
        .collect::<Result<Vec<_>, _>>()?;
    let message = RelayMessage::try_from(request.message)?;

    let report = state
        .relay_message_usecase
        .execute_for(&message, &client_ids)
        .await?;

    Ok(Json(report.into()))
}

/// クライアントの接続を閉じる
pub async fn leave(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LeaveRequest>,
) -> Result<&'static str, ApiError> {
    let client_id = ClientId::new(request.client_id)?;

    if state.disconnect_client_usecase.leave(&client_id).await {
        Ok("OK")
    } else {
        Err(ApiError::NotFound(CLIENT_NOT_ONLINE.to_string()))
    }
}

/// チャンネルの履歴（新しい順）
pub async fn channel_messages(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChannelHistoryQuery>,
) -> Result<Json<Vec<ChannelMessageDto>>, ApiError> {
    let page_size = page_size(query.limit)?;

    let messages = state
        .get_message_history_usecase
        .channel_messages(&query.channel_id, query.before, page_size)
        .await?;

    Ok(Json(messages.into_iter().map(Into::into).collect()))
}

/// スレッドの履歴（新しい順）
pub async fn thread_messages(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ThreadHistoryQuery>,
) -> Result<Json<Vec<ThreadMessageDto>>, ApiError> {
    let page_size = page_size(query.limit)?;

    let messages = state
        .get_message_history_usecase
        .thread_messages(&query.thread_id, query.before, page_size)
        .await?;

    Ok(Json(messages.into_iter().map(Into::into).collect()))
}

pub async fn new_channel(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewChannelRequest>,
) -> Result<(StatusCode, Json<NewChannelResponse>), ApiError> {
    let members = request
        .channel_clients
        .into_iter()
        .map(ClientId::new)
        .collect::<Result<Vec<_>, _>>()?;

    let channel_id = state.create_channel_usecase.execute(members).await?;

    Ok((StatusCode::CREATED, Json(NewChannelResponse { channel_id })))
}

pub async fn new_thread(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewThreadRequest>,
) -> Result<(StatusCode, Json<NewThreadResponse>), ApiError> {
    let thread_id = state
        .create_thread_usecase
        .execute(request.channel_id, request.root_message_id)
        .await
        .map_err(|e| match e {
            CreateThreadError::ChannelNotFound(_) => ApiError::NotFound(e.to_string()),
            CreateThreadError::Persistence(e) => ApiError::Persistence(e),
        })?;

    Ok((StatusCode::CREATED, Json(NewThreadResponse { thread_id })))
}
