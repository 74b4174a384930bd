//! エンティティ
//!
//! Persistence Gateway が所有する永続化エンティティ（ChannelMessage / ThreadMessage）と
//! メタデータエンティティ（Channel / Thread）を定義します。
//!
//! 作成時刻はサーバー側で付与されるため、クライアントから受け取る形は
//! `*Draft`（作成時刻なし）として別の型で表現します。

use chrono::{DateTime, Utc};

use super::value_object::{AccountId, ChannelId, ClientId, EmojiCode, MessageId, ThreadId};

/// メッセージへのリアクション
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub reactor_id: AccountId,
    pub emoji: EmojiCode,
}

impl Reaction {
    pub fn new(reactor_id: AccountId, emoji: EmojiCode) -> Self {
        Self { reactor_id, emoji }
    }

    fn matches(&self, reactor_id: &AccountId, emoji: &EmojiCode) -> bool {
        &self.reactor_id == reactor_id && &self.emoji == emoji
    }
}

/// リアクションの集合
///
/// 追加順を保持しつつ、同じ (reactor, emoji) の組は 1 つしか持たない。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReactionSet(Vec<Reaction>);

impl ReactionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// リアクションを追加する。既に同じ組が存在する場合は何もせず `false` を返す
    pub fn add(&mut self, reaction: Reaction) -> bool {
        if self
            .0
            .iter()
            .any(|r| r.matches(&reaction.reactor_id, &reaction.emoji))
        {
            return false;
        }
        self.0.push(reaction);
        true
    }

    /// 一致するリアクションを取り除く。取り除いた場合に `true` を返す
    pub fn remove(&mut self, reactor_id: &AccountId, emoji: &EmojiCode) -> bool {
        let before = self.0.len();
        self.0.retain(|r| !r.matches(reactor_id, emoji));
        self.0.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reaction> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Reaction> for ReactionSet {
    fn from_iter<I: IntoIterator<Item = Reaction>>(iter: I) -> Self {
        let mut set = Self::new();
        for reaction in iter {
            set.add(reaction);
        }
        set
    }
}

/// 添付ファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttachment {
    pub file_name: String,
    pub file_type: String,
}

/// 作成時刻が付与される前のチャンネルメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMessageDraft {
    pub message_id: MessageId,
    pub author_id: AccountId,
    pub channel_id: ChannelId,
    pub content: String,
    pub reactions: ReactionSet,
    pub files: Vec<FileAttachment>,
    pub attached_thread_id: Option<ThreadId>,
}

impl ChannelMessageDraft {
    /// サーバー側の作成時刻を付与して ChannelMessage にする
    pub fn stamp(self, created_at: DateTime<Utc>) -> ChannelMessage {
        ChannelMessage {
            message_id: self.message_id,
            author_id: self.author_id,
            channel_id: self.channel_id,
            created_at,
            content: self.content,
            reactions: self.reactions,
            files: self.files,
            attached_thread_id: self.attached_thread_id,
        }
    }
}

/// チャンネルに投稿されたメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMessage {
    pub message_id: MessageId,
    pub author_id: AccountId,
    pub channel_id: ChannelId,
    pub created_at: DateTime<Utc>,
    pub content: String,
    pub reactions: ReactionSet,
    pub files: Vec<FileAttachment>,
    pub attached_thread_id: Option<ThreadId>,
}

/// 作成時刻が付与される前のスレッドメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadMessageDraft {
    pub message_id: MessageId,
    pub root_message_id: MessageId,
    pub author_id: AccountId,
    pub thread_id: ThreadId,
    pub content: String,
    pub reactions: ReactionSet,
    pub files: Vec<FileAttachment>,
}

impl ThreadMessageDraft {
    /// サーバー側の作成時刻を付与して ThreadMessage にする
    pub fn stamp(self, created_at: DateTime<Utc>) -> ThreadMessage {
        ThreadMessage {
            message_id: self.message_id,
            root_message_id: self.root_message_id,
            author_id: self.author_id,
            thread_id: self.thread_id,
            created_at,
            content: self.content,
            reactions: self.reactions,
            files: self.files,
        }
    }
}

/// スレッドに投稿されたメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadMessage {
    pub message_id: MessageId,
    pub root_message_id: MessageId,
    pub author_id: AccountId,
    pub thread_id: ThreadId,
    pub created_at: DateTime<Utc>,
    pub content: String,
    pub reactions: ReactionSet,
    pub files: Vec<FileAttachment>,
}

/// 永続化されたメッセージに共通する操作
///
/// Persistence Gateway の実装がチャンネル / スレッドのコレクションを
/// 同じロジックで扱うために使う。
pub trait StoredMessage: Clone + Send + Sync {
    fn message_id(&self) -> MessageId;
    fn author_id(&self) -> AccountId;
    fn created_at(&self) -> DateTime<Utc>;
    fn reactions_mut(&mut self) -> &mut ReactionSet;
}

impl StoredMessage for ChannelMessage {
    fn message_id(&self) -> MessageId {
        self.message_id
    }

    fn author_id(&self) -> AccountId {
        self.author_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn reactions_mut(&mut self) -> &mut ReactionSet {
        &mut self.reactions
    }
}

impl StoredMessage for ThreadMessage {
    fn message_id(&self) -> MessageId {
        self.message_id
    }

    fn author_id(&self) -> AccountId {
        self.author_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn reactions_mut(&mut self) -> &mut ReactionSet {
        &mut self.reactions
    }
}

/// チャンネル（メンバーのクライアント ID を保持）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: ChannelId,
    pub members: Vec<ClientId>,
}

/// スレッド（チャンネル内のルートメッセージから派生）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thread {
    pub id: ThreadId,
    pub channel_id: ChannelId,
    pub root_message_id: MessageId,
}
