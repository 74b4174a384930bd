//! InMemory Channel Repository 実装
//!
//! チャンネルとスレッドのメタデータを HashMap で保持します。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{Channel, ChannelId, ChannelRepository, RepositoryError, Thread, ThreadId};

/// インメモリ Channel Repository 実装
#[derive(Default)]
pub struct InMemoryChannelRepository {
    channels: RwLock<HashMap<ChannelId, Channel>>,
    threads: RwLock<HashMap<ThreadId, Thread>>,
}

impl InMemoryChannelRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChannelRepository for InMemoryChannelRepository {
    async fn create_channel(&self, channel: Channel) -> Result<(), RepositoryError> {
        let mut channels = self.channels.write().await;
        if channels.contains_key(&channel.id) {
            return Err(RepositoryError::AlreadyExists(channel.id.to_string()));
        }
        channels.insert(channel.id, channel);
        Ok(())
    }

    async fn create_thread(&self, thread: Thread) -> Result<(), RepositoryError> {
        if !self.channels.read().await.contains_key(&thread.channel_id) {
            return Err(RepositoryError::ChannelNotFound(
                thread.channel_id.to_string(),
            ));
        }

        let mut threads = self.threads.write().await;
        if threads.contains_key(&thread.id) {
            return Err(RepositoryError::AlreadyExists(thread.id.to_string()));
        }
        threads.insert(thread.id, thread);
        Ok(())
    }

    async fn find_channel(&self, channel_id: &ChannelId) -> Result<Option<Channel>, RepositoryError> {
        Ok(self.channels.read().await.get(channel_id).cloned())
    }

    async fn find_thread(&self, thread_id: &ThreadId) -> Result<Option<Thread>, RepositoryError> {
        Ok(self.threads.read().await.get(thread_id).cloned())
    }
}
