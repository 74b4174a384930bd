//! UseCase: メッセージの永続化（Dispatcher）
//!
//! ## 責務
//!
//! デコード済みのコマンドに応じて、Persistence Gateway の操作を 1 つだけ呼び出します。
//!
//! - 新規メッセージにはサーバー側の作成時刻を付与する
//! - 全ての永続化呼び出しは設定されたタイムアウトで打ち切られる
//! - 未知の種別（Passthrough）は何もせず成功とする
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - コマンドの種別ごとに正しい Repository 操作が 1 回だけ呼ばれること
//! - 作成時刻が Clock から付与されること
//! - Repository のエラーが PersistenceError として返ること
//! - 応答しない Repository は設定したタイムアウトで打ち切られること

use std::sync::Arc;
use std::time::Duration;

use tsunagi_shared::time::Clock;

use crate::domain::{MessageRepository, RelayCommand};

use super::error::PersistenceError;

/// 永続化処理のユースケース
pub struct DispatchMessageUseCase {
    /// Repository（Persistence Gateway の抽象化）
    repository: Arc<dyn MessageRepository>,
    /// 作成時刻の付与に使う Clock
    clock: Arc<dyn Clock>,
    /// 永続化 1 回あたりのタイムアウト
    timeout: Duration,
}

impl DispatchMessageUseCase {
    pub fn new(
        repository: Arc<dyn MessageRepository>,
        clock: Arc<dyn Clock>,
        timeout: Duration,
    ) -> Self {
        Self {
            repository,
            clock,
            timeout,
        }
    }

    /// コマンドに対応する永続化を実行
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 永続化に成功した（または永続化不要な種別だった）
    /// * `Err(PersistenceError)` - 永続化に失敗した。配送してはならない
    pub async fn execute(&self, command: &RelayCommand) -> Result<(), PersistenceError> {
        let repository = &self.repository;

        match command {
            RelayCommand::NewChannelMessage(draft) => {
                let message = draft.clone().stamp(self.clock.now());
                self.persist(repository.insert_channel_message(message))
                    .await
            }
            RelayCommand::NewThreadMessage(draft) => {
                let message = draft.clone().stamp(self.clock.now());
                self.persist(repository.insert_thread_message(message))
                    .await
            }
            RelayCommand::UpdateChannelMessage(draft) => {
                let message = draft.clone().stamp(self.clock.now());
                self.persist(repository.update_channel_message(
                    &draft.channel_id,
                    &draft.message_id,
                    message,
                ))
                .await
            }
            RelayCommand::UpdateThreadMessage(draft) => {
                let message = draft.clone().stamp(self.clock.now());
                self.persist(repository.update_thread_message(
                    &draft.thread_id,
                    &draft.message_id,
                    message,
                ))
                .await
            }
            RelayCommand::DeleteChannelMessage {
                channel_id,
                message_id,
                author_id,
            } => {
                self.persist(repository.delete_channel_message(channel_id, message_id, author_id))
                    .await
            }
            RelayCommand::DeleteThreadMessage {
                thread_id,
                message_id,
                author_id,
            } => {
                self.persist(repository.delete_thread_message(thread_id, message_id, author_id))
                    .await
            }
            RelayCommand::AddChannelReaction {
                channel_id,
                message_id,
                reaction,
            } => {
                self.persist(repository.add_channel_reaction(
                    channel_id,
                    message_id,
                    reaction.clone(),
                ))
                .await
            }
            RelayCommand::AddThreadReaction {
                thread_id,
                message_id,
                reaction,
            } => {
                self.persist(repository.add_thread_reaction(
                    thread_id,
                    message_id,
                    reaction.clone(),
                ))
                .await
            }
            RelayCommand::RemoveChannelReaction {
                channel_id,
                message_id,
                reactor_id,
                emoji,
            } => {
                self.persist(repository.remove_channel_reaction(
                    channel_id, message_id, reactor_id, emoji,
                ))
                .await
            }
            RelayCommand::RemoveThreadReaction {
                thread_id,
                message_id,
                reactor_id,
                emoji,
            } => {
                self.persist(repository.remove_thread_reaction(
                    thread_id, message_id, reactor_id, emoji,
                ))
                .await
            }
            RelayCommand::Passthrough { kind } => {
                tracing::debug!("No persistence for message type '{}'", kind);
                Ok(())
            }
        }
    }

    async fn persist<F>(&self, operation: F) -> Result<(), PersistenceError>
    where
        F: Future<Output = Result<(), crate::domain::RepositoryError>>,
    {
        PersistenceError::deadline(self.timeout, operation).await
    }
}
