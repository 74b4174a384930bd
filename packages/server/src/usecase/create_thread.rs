//! UseCase: スレッド作成
//!
//! チャンネル内のルートメッセージからスレッドを作成します。
//! チャンネルが存在しない場合は `CreateThreadError::ChannelNotFound` を返します。

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{ChannelId, ChannelRepository, MessageId, RepositoryError, Thread, ThreadId};

use super::error::{CreateThreadError, PersistenceError};

/// スレッド作成のユースケース
pub struct CreateThreadUseCase {
    repository: Arc<dyn ChannelRepository>,
    timeout: Duration,
}

impl CreateThreadUseCase {
    pub fn new(repository: Arc<dyn ChannelRepository>, timeout: Duration) -> Self {
        Self {
            repository,
            timeout,
        }
    }

    pub async fn execute(
        &self,
        channel_id: ChannelId,
        root_message_id: MessageId,
    ) -> Result<ThreadId, CreateThreadError> {
        let channel =
            PersistenceError::deadline(self.timeout, self.repository.find_channel(&channel_id))
                .await?;
        if channel.is_none() {
            return Err(CreateThreadError::ChannelNotFound(channel_id.to_string()));
        }

        let thread = Thread {
            id: ThreadId::generate(),
            channel_id,
            root_message_id,
        };
        let thread_id = thread.id;

        match PersistenceError::deadline(self.timeout, self.repository.create_thread(thread)).await
        {
            Ok(()) => {}
            // 確認後にチャンネルが消えた場合
            Err(PersistenceError::Repository(RepositoryError::ChannelNotFound(id))) => {
                return Err(CreateThreadError::ChannelNotFound(id));
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!("Thread {} created in channel {}", thread_id, channel_id);
        Ok(thread_id)
    }
}
