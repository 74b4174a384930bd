//! UseCase 層のエラー定義

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::domain::RepositoryError;

/// 永続化の失敗（Repository のエラーまたはタイムアウト）
///
/// 配送は行われない。HTTP 経由の呼び出しでは呼び出し元に返される。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("persistence did not complete within {0:?}")]
    Timeout(Duration),
}

impl PersistenceError {
    /// `operation` を `limit` 以内に完了させる。超過した場合は `Timeout`
    pub(crate) async fn deadline<T, F>(limit: Duration, operation: F) -> Result<T, Self>
    where
        F: Future<Output = Result<T, RepositoryError>>,
    {
        match tokio::time::timeout(limit, operation).await {
            Ok(result) => result.map_err(Self::from),
            Err(_) => Err(Self::Timeout(limit)),
        }
    }
}

/// スレッド作成のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateThreadError {
    #[error("channel '{0}' not found")]
    ChannelNotFound(String),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
