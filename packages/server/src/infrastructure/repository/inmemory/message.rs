//! InMemory Message Repository 実装
//!
//! ドメイン層が定義する MessageRepository trait の具体的な実装。
//! 所有者（channel / thread）ごとに分割された `HashMap<owner, Vec<message>>` を
//! インメモリ DB として使用します。
//!
//! チャンネルとスレッドのコレクションは同じ `Partitions` で扱い、
//! `StoredMessage` trait を通して共通の操作を行います。

use std::collections::HashMap;
use std::hash::Hash;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::{
    AccountId, ChannelId, ChannelMessage, EmojiCode, MessageId, MessageRepository, PageSize,
    Reaction, RepositoryError, StoredMessage, ThreadId, ThreadMessage,
};

/// 所有者ごとに分割されたメッセージのコレクション
struct Partitions<K, M> {
    inner: RwLock<HashMap<K, Vec<M>>>,
}

impl<K, M> Partitions<K, M>
where
    K: Eq + Hash + Clone + std::fmt::Display,
    M: StoredMessage,
{
    fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    async fn insert(&self, owner: K, message: M) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        let collection = inner.entry(owner.clone()).or_default();
        if collection
            .iter()
            .any(|m| m.message_id() == message.message_id())
        {
            return Err(RepositoryError::AlreadyExists(format!(
                "{}/{}",
                owner,
                message.message_id()
            )));
        }
        collection.push(message);
        Ok(())
    }

    /// 一致するメッセージに `f` を適用する。見つかった場合に `true` を返す
    async fn modify<F>(&self, owner: &K, message_id: &MessageId, f: F) -> bool
    where
        F: FnOnce(&mut M),
    {
        let mut inner = self.inner.write().await;
        let Some(message) = inner
            .get_mut(owner)
            .and_then(|collection| collection.iter_mut().find(|m| &m.message_id() == message_id))
        else {
            return false;
        };
        f(message);
        true
    }

    /// メッセージ ID と作成者 ID が両方一致するメッセージを削除する
    async fn remove(&self, owner: &K, message_id: &MessageId, author_id: &AccountId) -> bool {
        let mut inner = self.inner.write().await;
        let Some(collection) = inner.get_mut(owner) else {
            return false;
        };
        let before = collection.len();
        collection.retain(|m| !(&m.message_id() == message_id && &m.author_id() == author_id));
        collection.len() != before
    }

    async fn find_before(&self, owner: &K, before: DateTime<Utc>, page_size: PageSize) -> Vec<M> {
        let inner = self.inner.read().await;
        let Some(collection) = inner.get(owner) else {
            return Vec::new();
        };

        let mut older: Vec<&M> = collection
            .iter()
            .filter(|m| m.created_at() < before)
            .collect();
        older.sort_by_key(|m| std::cmp::Reverse(m.created_at()));
        older
            .into_iter()
            .take(page_size.value())
            .cloned()
            .collect()
    }
}

/// インメモリ Message Repository 実装
pub struct InMemoryMessageRepository {
    channel_messages: Partitions<ChannelId, ChannelMessage>,
    thread_messages: Partitions<ThreadId, ThreadMessage>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self {
            channel_messages: Partitions::new(),
            thread_messages: Partitions::new(),
        }
    }
}

impl Default for InMemoryMessageRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn insert_channel_message(&self, message: ChannelMessage) -> Result<(), RepositoryError> {
        self.channel_messages
            .insert(message.channel_id, message)
            .await
    }

    async fn insert_thread_message(&self, message: ThreadMessage) -> Result<(), RepositoryError> {
        self.thread_messages.insert(message.thread_id, message).await
    }

    async fn update_channel_message(
        &self,
        channel_id: &ChannelId,
        message_id: &MessageId,
        message: ChannelMessage,
    ) -> Result<(), RepositoryError> {
        let updated = self
            .channel_messages
            .modify(channel_id, message_id, |stored| {
                let created_at = stored.created_at;
                *stored = message;
                stored.created_at = created_at;
            })
            .await;
        if !updated {
            tracing::debug!(
                "Channel message {} not found in {}, update ignored",
                message_id,
                channel_id
            );
        }
        Ok(())
    }

    async fn update_thread_message(
        &self,
        thread_id: &ThreadId,
        message_id: &MessageId,
        message: ThreadMessage,
    ) -> Result<(), RepositoryError> {
        let updated = self
            .thread_messages
            .modify(thread_id, message_id, |stored| {
                let created_at = stored.created_at;
                *stored = message;
                stored.created_at = created_at;
            })
            .await;
        if !updated {
            tracing::debug!(
                "Thread message {} not found in {}, update ignored",
                message_id,
                thread_id
            );
        }
        Ok(())
    }

    async fn delete_channel_message(
        &self,
        channel_id: &ChannelId,
        message_id: &MessageId,
        author_id: &AccountId,
    ) -> Result<(), RepositoryError> {
        if !self
            .channel_messages
            .remove(channel_id, message_id, author_id)
            .await
        {
            tracing::debug!(
                "No channel message {} by {} in {}, delete ignored",
                message_id,
                author_id,
                channel_id
            );
        }
        Ok(())
    }

    async fn delete_thread_message(
        &self,
        thread_id: &ThreadId,
        message_id: &MessageId,
        author_id: &AccountId,
    ) -> Result<(), RepositoryError> {
        if !self
            .thread_messages
            .remove(thread_id, message_id, author_id)
            .await
        {
            tracing::debug!(
                "No thread message {} by {} in {}, delete ignored",
                message_id,
                author_id,
                thread_id
            );
        }
        Ok(())
    }

    async fn add_channel_reaction(
        &self,
        channel_id: &ChannelId,
        message_id: &MessageId,
        reaction: Reaction,
    ) -> Result<(), RepositoryError> {
        self.channel_messages
            .modify(channel_id, message_id, |m| {
                m.reactions_mut().add(reaction);
            })
            .await;
        Ok(())
    }

    async fn add_thread_reaction(
        &self,
        thread_id: &ThreadId,
        message_id: &MessageId,
        reaction: Reaction,
    ) -> Result<(), RepositoryError> {
        self.thread_messages
            .modify(thread_id, message_id, |m| {
                m.reactions_mut().add(reaction);
            })
            .await;
        Ok(())
    }

    async fn remove_channel_reaction(
        &self,
        channel_id: &ChannelId,
        message_id: &MessageId,
        reactor_id: &AccountId,
        emoji: &EmojiCode,
    ) -> Result<(), RepositoryError> {
        self.channel_messages
            .modify(channel_id, message_id, |m| {
                m.reactions_mut().remove(reactor_id, emoji);
            })
            .await;
        Ok(())
    }

    async fn remove_thread_reaction(
        &self,
        thread_id: &ThreadId,
        message_id: &MessageId,
        reactor_id: &AccountId,
        emoji: &EmojiCode,
    ) -> Result<(), RepositoryError> {
        self.thread_messages
            .modify(thread_id, message_id, |m| {
                m.reactions_mut().remove(reactor_id, emoji);
            })
            .await;
        Ok(())
    }

    async fn find_channel_messages(
        &self,
        channel_id: &ChannelId,
        before: DateTime<Utc>,
        page_size: PageSize,
    ) -> Result<Vec<ChannelMessage>, RepositoryError> {
        Ok(self
            .channel_messages
            .find_before(channel_id, before, page_size)
            .await)
    }

    async fn find_thread_messages(
        &self,
        thread_id: &ThreadId,
        before: DateTime<Utc>,
        page_size: PageSize,
    ) -> Result<Vec<ThreadMessage>, RepositoryError> {
        Ok(self
            .thread_messages
            .find_before(thread_id, before, page_size)
            .await)
    }
}
