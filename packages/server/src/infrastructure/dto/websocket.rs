//! WebSocket でやり取りする JSON の形
//!
//! envelope は `{ "type": ..., "send_to": ..., "payload": {...} }`。
//! `payload` の形は `type` ごとに異なり、ここで定義する `*Payload` 構造体に
//! デコードされます。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AccountId, ChannelId, MessageId, ThreadId};

/// ワイヤ上の envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeDto {
    pub r#type: String,
    /// 宛先の client_id。空文字列または省略時は配送しない
    #[serde(default)]
    pub send_to: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionDto {
    pub reactor_account_id: AccountId,
    pub emoji_unified_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDto {
    pub file_name: String,
    pub file_type: String,
}

/// チャンネルメッセージ
///
/// `date_created` はサーバーが付与する。受信時に含まれていても無視される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMessageDto {
    pub message_id: MessageId,
    pub author_account_id: AccountId,
    pub channel_id: ChannelId,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub reactions: Vec<ReactionDto>,
    #[serde(default)]
    pub files: Vec<FileDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attached_thread_id: Option<ThreadId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_created: Option<DateTime<Utc>>,
}

/// スレッドメッセージ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadMessageDto {
    pub message_id: MessageId,
    pub root_message_id: MessageId,
    pub author_account_id: AccountId,
    pub thread_id: ThreadId,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub reactions: Vec<ReactionDto>,
    #[serde(default)]
    pub files: Vec<FileDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_created: Option<DateTime<Utc>>,
}

// ========================================
// type ごとの payload
// ========================================

#[derive(Debug, Deserialize)]
pub struct NewChannelMessagePayload {
    #[serde(alias = "catache_channel_message")]
    pub channel_message: ChannelMessageDto,
}

#[derive(Debug, Deserialize)]
pub struct NewThreadMessagePayload {
    #[serde(alias = "catache_thread_message")]
    pub thread_message: ThreadMessageDto,
}

#[derive(Debug, Deserialize)]
pub struct UpdateChannelMessagePayload {
    #[serde(alias = "new_catache_channel_message")]
    pub new_channel_message: ChannelMessageDto,
}

#[derive(Debug, Deserialize)]
pub struct UpdateThreadMessagePayload {
    #[serde(alias = "new_catache_thread_message")]
    pub new_thread_message: ThreadMessageDto,
}

#[derive(Debug, Deserialize)]
pub struct DeleteChannelMessagePayload {
    pub message_id: MessageId,
    pub author_account_id: AccountId,
    pub channel_id: ChannelId,
}

#[derive(Debug, Deserialize)]
pub struct DeleteThreadMessagePayload {
    pub message_id: MessageId,
    pub author_account_id: AccountId,
    pub thread_id: ThreadId,
}

#[derive(Debug, Deserialize)]
pub struct NewChannelReactionPayload {
    pub message_id: MessageId,
    pub channel_id: ChannelId,
    pub reaction: ReactionDto,
}

#[derive(Debug, Deserialize)]
pub struct NewThreadReactionPayload {
    pub message_id: MessageId,
    pub thread_id: ThreadId,
    pub reaction: ReactionDto,
}

#[derive(Debug, Deserialize)]
pub struct DeleteChannelReactionPayload {
    pub message_id: MessageId,
    pub reactor_account_id: AccountId,
    pub channel_id: ChannelId,
    pub emoji_unified_code: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteThreadReactionPayload {
    pub message_id: MessageId,
    pub reactor_account_id: AccountId,
    pub thread_id: ThreadId,
    pub emoji_unified_code: String,
}
