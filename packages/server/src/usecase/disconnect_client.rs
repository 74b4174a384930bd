//! UseCase: クライアント切断処理
//!
//! ## 切断の経路
//!
//! - `teardown`: 読み込みループの終了時（読み込みエラー、ピアの切断）
//! - `leave`: HTTP API からの明示的な退出
//!
//! どちらの経路でも、登録解除とストリームのクローズがこの順で 1 回だけ行われます。

use std::sync::Arc;

use crate::domain::{ClientId, ClientRegistry, Connection};

/// クライアント切断のユースケース
pub struct DisconnectClientUseCase {
    /// Registry（接続管理の抽象化）
    registry: Arc<dyn ClientRegistry>,
}

impl DisconnectClientUseCase {
    pub fn new(registry: Arc<dyn ClientRegistry>) -> Self {
        Self { registry }
    }

    /// 読み込みループが終了した Connection を後始末する
    ///
    /// 同じ client_id で新しい Connection が登録されている場合は、そちらを残す。
    pub async fn teardown(&self, connection: &Arc<Connection>) {
        self.registry.unregister_connection(connection).await;
    }

    /// client_id の接続を閉じる
    ///
    /// 待機中の読み込みはキャンセルされ、読み込みループが終了する。
    /// 接続が存在した場合に `true` を返す。
    pub async fn leave(&self, client_id: &ClientId) -> bool {
        self.registry.unregister(client_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MockClientRegistry, TransportError};
    use crate::infrastructure::hub::ConnectionRegistry;
    use crate::infrastructure::transport::memory;
    use std::time::Duration;
    use tsunagi_shared::time::{Clock, FixedClock};

    fn create_connection(id: &str) -> (Arc<Connection>, memory::PeerHandle) {
        let (reader, writer, peer) = memory::pair();
        let connection = Arc::new(Connection::new(
            ClientId::new(id.to_string()).unwrap(),
            Box::new(reader),
            Box::new(writer),
            FixedClock::from_millis(0).now(),
        ));
        (connection, peer)
    }

    #[tokio::test]
    async fn test_leave_cancels_blocked_read_and_closes_once() {
        // テスト項目: leave で待機中の読み込みがキャンセルされ、後始末を含めてもクローズは 1 回だけ
        // given (前提条件):
        let registry = Arc::new(ConnectionRegistry::new());
        let usecase = DisconnectClientUseCase::new(registry.clone());
        let (connection, peer) = create_connection("alice");
        registry.register(connection.clone()).await;
        let reading = {
            let connection = connection.clone();
            tokio::spawn(async move { connection.read_frame().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        // when (操作):
        let left = usecase
            .leave(&ClientId::new("alice".to_string()).unwrap())
            .await;
        let read_result = tokio::time::timeout(Duration::from_secs(1), reading)
            .await
            .expect("read should be cancelled")
            .unwrap();
        usecase.teardown(&connection).await;

        // then (期待する結果):
        assert!(left);
        assert_eq!(read_result, Err(TransportError::Closed));
        assert_eq!(peer.close_count(), 1);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_teardown_delegates_to_connection_specific_unregister() {
        // テスト項目: 後始末は client_id ではなく Connection を指定して登録解除する
        // given (前提条件):
        let (connection, _peer) = create_connection("alice");
        let expected = connection.clone();
        let mut registry = MockClientRegistry::new();
        registry
            .expect_unregister_connection()
            .withf(move |c| Arc::ptr_eq(c, &expected))
            .times(1)
            .returning(|_| ());
        registry.expect_unregister().never();
        let usecase = DisconnectClientUseCase::new(Arc::new(registry));

        // when (操作):
        usecase.teardown(&connection).await;

        // then (期待する結果):
        // mock の expectation で検証
    }

    #[tokio::test]
    async fn test_leave_unknown_client_returns_false() {
        // テスト項目: 接続していないクライアントの leave は false を返す
        // given (前提条件):
        let registry = Arc::new(ConnectionRegistry::new());
        let usecase = DisconnectClientUseCase::new(registry);

        // when (操作):
        let left = usecase
            .leave(&ClientId::new("ghost".to_string()).unwrap())
            .await;

        // then (期待する結果):
        assert!(!left);
    }

    #[tokio::test]
    async fn test_teardown_unregisters_connection() {
        // テスト項目: 読み込みループ終了後の後始末で登録が解除され、ストリームが閉じられる
        // given (前提条件):
        let registry = Arc::new(ConnectionRegistry::new());
        let usecase = DisconnectClientUseCase::new(registry.clone());
        let (connection, peer) = create_connection("alice");
        registry.register(connection.clone()).await;

        // when (操作):
        usecase.teardown(&connection).await;

        // then (期待する結果):
        assert!(registry.is_empty().await);
        assert_eq!(peer.close_count(), 1);
    }
}
