//! 接続中のクライアントを管理する Registry の抽象化

use std::sync::Arc;

use async_trait::async_trait;

use super::{ClientId, Connection};

/// client_id → Connection の対応を管理する
///
/// 具体的な実装（ロックの取り方や shutdown の扱い）は Infrastructure 層が提供します。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClientRegistry: Send + Sync {
    /// Connection を登録する。同じ client_id の既存の Connection は閉じられる
    async fn register(&self, connection: Arc<Connection>);

    /// client_id の登録を解除してストリームを閉じる。解除した場合に `true`
    async fn unregister(&self, client_id: &ClientId) -> bool;

    /// 特定の Connection の登録を解除してストリームを閉じる
    ///
    /// 同じ client_id で新しい Connection が登録されている場合はそちらを残す。
    async fn unregister_connection(&self, connection: &Arc<Connection>);
}
