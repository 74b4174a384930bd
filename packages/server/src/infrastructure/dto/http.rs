//! HTTP API のリクエスト / レスポンス

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::websocket::EnvelopeDto;
use crate::domain::{ChannelId, MessageId, ThreadId};

/// `POST /client/send`
#[derive(Debug, Deserialize)]
pub struct SendToClientRequest {
    pub client_id: String,
    pub message: EnvelopeDto,
}

/// `POST /clients/send`
#[derive(Debug, Deserialize)]
pub struct SendToClientsRequest {
    pub client_ids: Vec<String>,
    pub message: EnvelopeDto,
}

/// 複数宛先への配送結果
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeliveryReportDto {
    pub delivered: Vec<String>,
    pub offline: Vec<String>,
    pub failed: Vec<String>,
}

/// `POST /client/leave`
#[derive(Debug, Deserialize)]
pub struct LeaveRequest {
    pub client_id: String,
}

/// `GET /messages/channel`
#[derive(Debug, Deserialize)]
pub struct ChannelHistoryQuery {
    pub channel_id: ChannelId,
    #[serde(default, alias = "datetime_anchor")]
    pub before: Option<DateTime<Utc>>,
    #[serde(default, alias = "pagination")]
    pub limit: Option<usize>,
}

/// `GET /messages/thread`
#[derive(Debug, Deserialize)]
pub struct ThreadHistoryQuery {
    pub thread_id: ThreadId,
    #[serde(default, alias = "datetime_anchor")]
    pub before: Option<DateTime<Utc>>,
    #[serde(default, alias = "pagination")]
    pub limit: Option<usize>,
}

/// `POST /channel/new`
#[derive(Debug, Deserialize)]
pub struct NewChannelRequest {
    #[serde(default)]
    pub channel_clients: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewChannelResponse {
    pub channel_id: ChannelId,
}

/// `POST /thread/new`
#[derive(Debug, Deserialize)]
pub struct NewThreadRequest {
    pub channel_id: ChannelId,
    pub root_message_id: MessageId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewThreadResponse {
    pub thread_id: ThreadId,
}

/// `GET /debug/clients`
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectedClientDto {
    pub client_id: String,
    /// RFC 3339（ミリ秒精度）
    pub connected_at: String,
}
