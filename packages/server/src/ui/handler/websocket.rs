//! WebSocket connection handlers.
//!
//! ## 読み込みループ
//!
//! 1. フレームを読み込む（エラー、ピアの切断、leave / shutdown で終了）
//! 2. envelope をデコードする。失敗した場合はログに記録して次のフレームへ
//! 3. 永続化してから宛先へ配送する
//!
//! 1 つの接続のフレームは到着順に 1 つずつ処理されます。

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    domain::{
        ClientId, Connection, DecodeError, FrameReader, FrameWriter, InboundFrame, TransportError,
    },
    infrastructure::{dto::conversion::decode_frame, transport::websocket},
    ui::state::AppState,
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    #[serde(default)]
    pub client_id: String,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    // Convert String -> ClientId (Domain Model)
    let client_id = match ClientId::try_from(query.client_id) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("Rejected connection: {}", e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, client_id)))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, client_id: ClientId) {
    let (reader, writer) = websocket::split(socket);
    serve_connection(state, client_id, Box::new(reader), Box::new(writer)).await;
}

/// 接続を登録し、読み込みループが終わるまで処理してから後始末する
pub async fn serve_connection(
    state: Arc<AppState>,
    client_id: ClientId,
    reader: Box<dyn FrameReader>,
    writer: Box<dyn FrameWriter>,
) {
    let connection = state
        .connect_client_usecase
        .execute(client_id, reader, writer)
        .await;
    tracing::info!(
        "Client '{}' connected ({})",
        connection.client_id(),
        connection.id()
    );

    read_loop(&state, &connection).await;

    state.disconnect_client_usecase.teardown(&connection).await;
    tracing::info!(
        "Client '{}' disconnected ({})",
        connection.client_id(),
        connection.id()
    );
}

async fn read_loop(state: &AppState, connection: &Connection) {
    let client_id = connection.client_id();

    loop {
        let frame = match connection.read_frame().await {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                tracing::debug!("Client '{}' closed the stream", client_id);
                break;
            }
            Err(TransportError::Closed) => {
                tracing::debug!("Connection for client '{}' was closed", client_id);
                break;
            }
            Err(e) => {
                tracing::warn!("Read error from client '{}': {}", client_id, e);
                break;
            }
        };

        let text = match frame {
            InboundFrame::Text(text) => text,
            InboundFrame::Binary(bytes) => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(_) => {
                    tracing::warn!(
                        "Dropped frame from client '{}': {}",
                        client_id,
                        DecodeError::NotUtf8
                    );
                    continue;
                }
            },
        };

        let message = match decode_frame(&text) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("Dropped frame from client '{}': {}", client_id, e);
                continue;
            }
        };
        tracing::debug!("Received {} from client '{}'", message.kind(), client_id);

        match state.relay_message_usecase.execute(&message).await {
            Ok(Some(outcome)) => tracing::debug!(
                "{} from '{}' relayed: {:?}",
                message.kind(),
                client_id,
                outcome
            ),
            Ok(None) => tracing::debug!("{} from '{}' persisted", message.kind(), client_id),
            // Already logged by the use case
            Err(_) => {}
        }
    }
}
