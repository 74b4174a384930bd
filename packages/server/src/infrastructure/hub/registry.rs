//! 接続中のクライアントを管理する Registry
//!
//! ## 責務
//!
//! - client_id → Connection のマッピングを保持する（プロセスで 1 つ）
//! - 登録 / 登録解除 / 検索の排他制御
//! - 宛先を解決してフレームを書き込む（`MessagePusher` の実装）
//!
//! ## ロックの方針
//!
//! - 登録と登録解除は write lock、検索と配送は read lock を取る
//! - 配送時は `Arc<Connection>` を clone した時点で read lock を手放し、
//!   書き込み自体は Registry のロックの外で行う
//! - ストリームのクローズも Registry のロックの外で行う

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use tokio::sync::RwLock;

use crate::domain::{
    ClientId, ClientRegistry, Connection, DeliveryOutcome, DeliveryReport, MessagePusher,
};

/// 登録中のクライアントのスナップショット
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedClient {
    pub client_id: ClientId,
    pub connected_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<ClientId, Arc<Connection>>>,
    shutting_down: AtomicBool,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connection を登録する
    ///
    /// 同じ client_id の Connection が既に登録されている場合は置き換え、
    /// 置き換えられた Connection を閉じる。shutdown 後に登録された
    /// Connection はその場で閉じられる。
    pub async fn register(&self, connection: Arc<Connection>) {
        connection.activate();

        // shutdown の drain と競合しないよう、フラグは write lock の内側で確認する
        let inserted = {
            let mut connections = self.connections.write().await;
            if self.shutting_down.load(Ordering::Acquire) {
                None
            } else {
                Some(connections.insert(connection.client_id().clone(), connection.clone()))
            }
        };

        let Some(superseded) = inserted else {
            tracing::info!(
                "Registry is shutting down, closing new connection for client '{}'",
                connection.client_id()
            );
            Self::close(&connection).await;
            return;
        };

        tracing::info!(
            "Client '{}' registered ({})",
            connection.client_id(),
            connection.id()
        );

        if let Some(previous) = superseded
            && !Arc::ptr_eq(&previous, &connection)
        {
            tracing::info!(
                "Client '{}' reconnected, closing superseded connection ({})",
                previous.client_id(),
                previous.id()
            );
            Self::close(&previous).await;
        }
    }

    /// client_id の登録を解除し、ストリームを閉じる
    ///
    /// 登録されていなければ何もしない。登録を解除した場合に `true` を返す。
    pub async fn unregister(&self, client_id: &ClientId) -> bool {
        let removed = {
            let mut connections = self.connections.write().await;
            connections.remove(client_id)
        };

        match removed {
            Some(connection) => {
                tracing::info!("Client '{}' unregistered", client_id);
                Self::close(&connection).await;
                true
            }
            None => false,
        }
    }

    /// 特定の Connection の登録を解除し、ストリームを閉じる
    ///
    /// 同じ client_id で新しい Connection が登録されている場合、
    /// そちらの登録はそのまま残る。
    pub async fn unregister_connection(&self, connection: &Arc<Connection>) {
        let closing = connection.begin_close();

        let removed = {
            let mut connections = self.connections.write().await;
            match connections.get(connection.client_id()) {
                Some(current) if Arc::ptr_eq(current, connection) => {
                    connections.remove(connection.client_id());
                    true
                }
                _ => false,
            }
        };

        if removed {
            tracing::info!(
                "Client '{}' unregistered ({})",
                connection.client_id(),
                connection.id()
            );
        }

        if closing {
            connection.release().await;
        }
    }

    /// client_id に対応する開いている Connection を返す
    pub async fn lookup(&self, client_id: &ClientId) -> Option<Arc<Connection>> {
        let connections = self.connections.read().await;
        connections
            .get(client_id)
            .filter(|connection| connection.is_open())
            .cloned()
    }

    /// 1 クライアントへフレームを 1 回だけ書き込む
    ///
    /// 書き込みに失敗しても登録は解除しない（読み込み側が切断を検知する）。
    pub async fn deliver(&self, client_id: &ClientId, frame: &str) -> DeliveryOutcome {
        let Some(connection) = self.lookup(client_id).await else {
            tracing::debug!("Client '{}' is not online, message dropped", client_id);
            return DeliveryOutcome::Offline;
        };

        match connection.write_frame(frame).await {
            Ok(()) => {
                tracing::debug!("Delivered frame to client '{}'", client_id);
                DeliveryOutcome::Delivered
            }
            Err(e) => {
                tracing::warn!("Failed to deliver frame to client '{}': {}", client_id, e);
                DeliveryOutcome::Failed
            }
        }
    }

    /// 複数のクライアントへ並行して配送し、全ての試行が終わるまで待つ
    pub async fn deliver_all(&self, client_ids: &[ClientId], frame: &str) -> DeliveryReport {
        let outcomes = join_all(
            client_ids
                .iter()
                .map(|client_id| async move { (client_id, self.deliver(client_id, frame).await) }),
        )
        .await;

        let mut report = DeliveryReport::default();
        for (client_id, outcome) in outcomes {
            report.record(client_id.clone(), outcome);
        }
        report
    }

    /// 全ての Connection の登録を解除して閉じる
    pub async fn shutdown(&self) {
        let drained: Vec<Arc<Connection>> = {
            let mut connections = self.connections.write().await;
            self.shutting_down.store(true, Ordering::Release);
            connections.drain().map(|(_, connection)| connection).collect()
        };

        tracing::info!("Closing {} connection(s)", drained.len());
        join_all(drained.iter().map(|connection| Self::close(connection))).await;
    }

    /// 登録中のクライアント数
    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }

    /// 登録中のクライアント一覧（client_id 順）
    pub async fn connected_clients(&self) -> Vec<ConnectedClient> {
        let mut clients: Vec<ConnectedClient> = {
            let connections = self.connections.read().await;
            connections
                .values()
                .map(|connection| ConnectedClient {
                    client_id: connection.client_id().clone(),
                    connected_at: connection.connected_at(),
                })
                .collect()
        };
        clients.sort_by(|a, b| a.client_id.cmp(&b.client_id));
        clients
    }

    async fn close(connection: &Connection) {
        if connection.begin_close() {
            connection.release().await;
        }
    }
}

#[async_trait]
impl ClientRegistry for ConnectionRegistry {
    async fn register(&self, connection: Arc<Connection>) {
        ConnectionRegistry::register(self, connection).await
    }

    async fn unregister(&self, client_id: &ClientId) -> bool {
        ConnectionRegistry::unregister(self, client_id).await
    }

    async fn unregister_connection(&self, connection: &Arc<Connection>) {
        ConnectionRegistry::unregister_connection(self, connection).await
    }
}

#[async_trait]
impl MessagePusher for ConnectionRegistry {
    async fn push_to(&self, client_id: &ClientId, frame: &str) -> DeliveryOutcome {
        self.deliver(client_id, frame).await
    }

    async fn push_to_many(&self, client_ids: &[ClientId], frame: &str) -> DeliveryReport {
        self.deliver_all(client_ids, frame).await
    }
}
