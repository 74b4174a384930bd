//! UseCase: チャンネル作成

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{Channel, ChannelId, ChannelRepository, ClientId};

use super::error::PersistenceError;

/// チャンネル作成のユースケース
pub struct CreateChannelUseCase {
    repository: Arc<dyn ChannelRepository>,
    timeout: Duration,
}

impl CreateChannelUseCase {
    pub fn new(repository: Arc<dyn ChannelRepository>, timeout: Duration) -> Self {
        Self {
            repository,
            timeout,
        }
    }

    /// 新しい ID でチャンネルを作成し、その ID を返す
    pub async fn execute(&self, members: Vec<ClientId>) -> Result<ChannelId, PersistenceError> {
        let channel = Channel {
            id: ChannelId::generate(),
            members,
        };
        let channel_id = channel.id;

        PersistenceError::deadline(self.timeout, self.repository.create_channel(channel)).await?;

        tracing::info!("Channel {} created", channel_id);
        Ok(channel_id)
    }
}
