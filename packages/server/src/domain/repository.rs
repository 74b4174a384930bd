//! Repository trait 定義（Persistence Gateway）
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! メッセージのコレクションは所有者（channel / thread）ごとに分割されており、
//! 各操作は所有者 ID でコレクションを特定してから行われます。

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{
    AccountId, Channel, ChannelId, ChannelMessage, EmojiCode, MessageId, PageSize, Reaction,
    RepositoryError, Thread, ThreadId, ThreadMessage,
};

/// メッセージ履歴とリアクションを永続化する Repository
///
/// ## 依存性の逆転（DIP）
///
/// - UseCase 層はこの trait に依存し、ストレージの実装には依存しない
/// - ドキュメントストアなどのバックエンドはこの trait を実装して差し替える
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// チャンネルメッセージを追加
    async fn insert_channel_message(&self, message: ChannelMessage) -> Result<(), RepositoryError>;

    /// スレッドメッセージを追加
    async fn insert_thread_message(&self, message: ThreadMessage) -> Result<(), RepositoryError>;

    /// チャンネルメッセージを置き換える（作成者のチェックは行わない）
    ///
    /// 一致するメッセージが存在しない場合は何もしない。
    async fn update_channel_message(
        &self,
        channel_id: &ChannelId,
        message_id: &MessageId,
        message: ChannelMessage,
    ) -> Result<(), RepositoryError>;

    /// スレッドメッセージを置き換える（作成者のチェックは行わない）
    async fn update_thread_message(
        &self,
        thread_id: &ThreadId,
        message_id: &MessageId,
        message: ThreadMessage,
    ) -> Result<(), RepositoryError>;

    /// チャンネルメッセージを削除
    ///
    /// メッセージ ID と作成者 ID の両方が一致する場合のみ削除する。
    /// 一致しない場合はエラーではなく何もしない。
    async fn delete_channel_message(
        &self,
        channel_id: &ChannelId,
        message_id: &MessageId,
        author_id: &AccountId,
    ) -> Result<(), RepositoryError>;

    /// スレッドメッセージを削除（作成者が一致する場合のみ）
    async fn delete_thread_message(
        &self,
        thread_id: &ThreadId,
        message_id: &MessageId,
        author_id: &AccountId,
    ) -> Result<(), RepositoryError>;

    /// チャンネルメッセージにリアクションを追加
    async fn add_channel_reaction(
        &self,
        channel_id: &ChannelId,
        message_id: &MessageId,
        reaction: Reaction,
    ) -> Result<(), RepositoryError>;

    /// スレッドメッセージにリアクションを追加
    async fn add_thread_reaction(
        &self,
        thread_id: &ThreadId,
        message_id: &MessageId,
        reaction: Reaction,
    ) -> Result<(), RepositoryError>;

    /// チャンネルメッセージから一致するリアクションを取り除く
    async fn remove_channel_reaction(
        &self,
        channel_id: &ChannelId,
        message_id: &MessageId,
        reactor_id: &AccountId,
        emoji: &EmojiCode,
    ) -> Result<(), RepositoryError>;

    /// スレッドメッセージから一致するリアクションを取り除く
    async fn remove_thread_reaction(
        &self,
        thread_id: &ThreadId,
        message_id: &MessageId,
        reactor_id: &AccountId,
        emoji: &EmojiCode,
    ) -> Result<(), RepositoryError>;

    /// `before` より厳密に古いチャンネルメッセージを新しい順に最大 `page_size` 件取得
    async fn find_channel_messages(
        &self,
        channel_id: &ChannelId,
        before: DateTime<Utc>,
        page_size: PageSize,
    ) -> Result<Vec<ChannelMessage>, RepositoryError>;

    /// `before` より厳密に古いスレッドメッセージを新しい順に最大 `page_size` 件取得
    async fn find_thread_messages(
        &self,
        thread_id: &ThreadId,
        before: DateTime<Utc>,
        page_size: PageSize,
    ) -> Result<Vec<ThreadMessage>, RepositoryError>;
}

/// チャンネル / スレッドのメタデータを永続化する Repository
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChannelRepository: Send + Sync {
    /// チャンネルを作成
    async fn create_channel(&self, channel: Channel) -> Result<(), RepositoryError>;

    /// スレッドを作成
    async fn create_thread(&self, thread: Thread) -> Result<(), RepositoryError>;

    /// チャンネルを取得
    async fn find_channel(&self, channel_id: &ChannelId) -> Result<Option<Channel>, RepositoryError>;

    /// スレッドを取得
    async fn find_thread(&self, thread_id: &ThreadId) -> Result<Option<Thread>, RepositoryError>;
}
