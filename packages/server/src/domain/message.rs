//! リレーされるメッセージのドメインモデル
//!
//! ワイヤ上の envelope `{ type, send_to, payload }` は、`type` ごとに型付けされた
//! `RelayCommand` に変換されます。未知の `type` は `Passthrough` として扱われ、
//! 永続化はされませんが配送はされます（前方互換）。

use std::fmt;

use super::{
    entity::{ChannelMessageDraft, Reaction, ThreadMessageDraft},
    value_object::{AccountId, ChannelId, ClientId, EmojiCode, MessageId, ThreadId},
};

/// envelope の `type` 判別子
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageKind {
    NewChannelMessage,
    NewThreadMessage,
    UpdateChannelMessage,
    UpdateThreadMessage,
    DeleteChannelMessage,
    DeleteThreadMessage,
    NewChannelMessageReaction,
    NewThreadMessageReaction,
    DeleteChannelMessageReaction,
    DeleteThreadMessageReaction,
    Unknown(String),
}

impl MessageKind {
    pub fn parse(value: &str) -> Self {
        match value {
            "NEW_CHANNEL_MESSAGE" => Self::NewChannelMessage,
            "NEW_THREAD_MESSAGE" => Self::NewThreadMessage,
            "UPDATE_CHANNEL_MESSAGE" => Self::UpdateChannelMessage,
            "UPDATE_THREAD_MESSAGE" => Self::UpdateThreadMessage,
            "DELETE_CHANNEL_MESSAGE" => Self::DeleteChannelMessage,
            "DELETE_THREAD_MESSAGE" => Self::DeleteThreadMessage,
            "NEW_CHANNEL_MESSAGE_REACTION" => Self::NewChannelMessageReaction,
            "NEW_THREAD_MESSAGE_REACTION" => Self::NewThreadMessageReaction,
            "DELETE_CHANNEL_MESSAGE_REACTION" => Self::DeleteChannelMessageReaction,
            "DELETE_THREAD_MESSAGE_REACTION" => Self::DeleteThreadMessageReaction,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::NewChannelMessage => "NEW_CHANNEL_MESSAGE",
            Self::NewThreadMessage => "NEW_THREAD_MESSAGE",
            Self::UpdateChannelMessage => "UPDATE_CHANNEL_MESSAGE",
            Self::UpdateThreadMessage => "UPDATE_THREAD_MESSAGE",
            Self::DeleteChannelMessage => "DELETE_CHANNEL_MESSAGE",
            Self::DeleteThreadMessage => "DELETE_THREAD_MESSAGE",
            Self::NewChannelMessageReaction => "NEW_CHANNEL_MESSAGE_REACTION",
            Self::NewThreadMessageReaction => "NEW_THREAD_MESSAGE_REACTION",
            Self::DeleteChannelMessageReaction => "DELETE_CHANNEL_MESSAGE_REACTION",
            Self::DeleteThreadMessageReaction => "DELETE_THREAD_MESSAGE_REACTION",
            Self::Unknown(value) => value,
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `type` ごとに型付けされたペイロード
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayCommand {
    NewChannelMessage(ChannelMessageDraft),
    NewThreadMessage(ThreadMessageDraft),
    UpdateChannelMessage(ChannelMessageDraft),
    UpdateThreadMessage(ThreadMessageDraft),
    DeleteChannelMessage {
        channel_id: ChannelId,
        message_id: MessageId,
        author_id: AccountId,
    },
    DeleteThreadMessage {
        thread_id: ThreadId,
        message_id: MessageId,
        author_id: AccountId,
    },
    AddChannelReaction {
        channel_id: ChannelId,
        message_id: MessageId,
        reaction: Reaction,
    },
    AddThreadReaction {
        thread_id: ThreadId,
        message_id: MessageId,
        reaction: Reaction,
    },
    RemoveChannelReaction {
        channel_id: ChannelId,
        message_id: MessageId,
        reactor_id: AccountId,
        emoji: EmojiCode,
    },
    RemoveThreadReaction {
        thread_id: ThreadId,
        message_id: MessageId,
        reactor_id: AccountId,
        emoji: EmojiCode,
    },
    /// 未知の種別。永続化せずにそのまま配送する
    Passthrough { kind: String },
}

impl RelayCommand {
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::NewChannelMessage(_) => MessageKind::NewChannelMessage,
            Self::NewThreadMessage(_) => MessageKind::NewThreadMessage,
            Self::UpdateChannelMessage(_) => MessageKind::UpdateChannelMessage,
            Self::UpdateThreadMessage(_) => MessageKind::UpdateThreadMessage,
            Self::DeleteChannelMessage { .. } => MessageKind::DeleteChannelMessage,
            Self::DeleteThreadMessage { .. } => MessageKind::DeleteThreadMessage,
            Self::AddChannelReaction { .. } => MessageKind::NewChannelMessageReaction,
            Self::AddThreadReaction { .. } => MessageKind::NewThreadMessageReaction,
            Self::RemoveChannelReaction { .. } => MessageKind::DeleteChannelMessageReaction,
            Self::RemoveThreadReaction { .. } => MessageKind::DeleteThreadMessageReaction,
            Self::Passthrough { kind } => MessageKind::Unknown(kind.clone()),
        }
    }
}

/// デコード済みのリレーメッセージ
///
/// `frame` は配送時にそのまま宛先へ書き込まれるテキスト。
/// ピアから受信したメッセージでは受信したフレームそのものを保持する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayMessage {
    pub command: RelayCommand,
    pub send_to: Option<ClientId>,
    pub frame: String,
}

impl RelayMessage {
    pub fn kind(&self) -> MessageKind {
        self.command.kind()
    }
}
