//! UseCase: メッセージ履歴の取得
//!
//! カーソル（`before`）より厳密に古いメッセージを新しい順に最大 `page_size` 件返します。
//! `before` が指定されない場合は現在時刻をカーソルにします。

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tsunagi_shared::time::Clock;

use crate::domain::{ChannelId, ChannelMessage, MessageRepository, PageSize, ThreadId, ThreadMessage};

use super::error::PersistenceError;

/// 履歴取得のユースケース
pub struct GetMessageHistoryUseCase {
    repository: Arc<dyn MessageRepository>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl GetMessageHistoryUseCase {
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

    /// チャンネルの履歴を取得
    pub async fn channel_messages(
        &self,
        channel_id: &ChannelId,
        before: Option<DateTime<Utc>>,
        page_size: PageSize,
    ) -> Result<Vec<ChannelMessage>, PersistenceError> {
        let before = before.unwrap_or_else(|| self.clock.now());
        PersistenceError::deadline(
            self.timeout,
            self.repository
                .find_channel_messages(channel_id, before, page_size),
        )
        .await
    }

    /// スレッドの履歴を取得
    pub async fn thread_messages(
        &self,
        thread_id: &ThreadId,
        before: Option<DateTime<Utc>>,
        page_size: PageSize,
    ) -> Result<Vec<ThreadMessage>, PersistenceError> {
        let before = before.unwrap_or_else(|| self.clock.now());
        PersistenceError::deadline(
            self.timeout,
            self.repository
                .find_thread_messages(thread_id, before, page_size),
        )
        .await
    }
}
