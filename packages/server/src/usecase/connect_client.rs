//! UseCase: クライアント接続処理
//!
//! upgrade 済みのストリームから Connection を作り、Registry に登録します。
//! 同じ client_id で既に接続している Connection は閉じられます（後勝ち）。

use std::sync::Arc;

use tsunagi_shared::time::Clock;

use crate::domain::{ClientId, ClientRegistry, Connection, FrameReader, FrameWriter};

/// クライアント接続のユースケース
pub struct ConnectClientUseCase {
    /// Registry（接続管理の抽象化）
    registry: Arc<dyn ClientRegistry>,
    clock: Arc<dyn Clock>,
}

impl ConnectClientUseCase {
    pub fn new(registry: Arc<dyn ClientRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }

    /// Connection を作成して登録する
    ///
    /// # Returns
    ///
    /// 登録された Connection。読み込みループはこの Connection から読み込む。
    pub async fn execute(
        &self,
        client_id: ClientId,
        reader: Box<dyn FrameReader>,
        writer: Box<dyn FrameWriter>,
    ) -> Arc<Connection> {
        let connection = Arc::new(Connection::new(
            client_id,
            reader,
            writer,
            self.clock.now(),
        ));
        self.registry.register(connection.clone()).await;
        connection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConnectionState, MockClientRegistry};
    use crate::infrastructure::hub::ConnectionRegistry;
    use crate::infrastructure::transport::memory;
    use tsunagi_shared::time::FixedClock;

    #[tokio::test]
    async fn test_connect_registers_once_through_registry() {
        // テスト項目: 接続時に Registry へ 1 回だけ登録される
        // given (前提条件):
        let mut registry = MockClientRegistry::new();
        registry
            .expect_register()
            .withf(|connection| connection.client_id().as_str() == "alice")
            .times(1)
            .returning(|_| ());
        let usecase =
            ConnectClientUseCase::new(Arc::new(registry), Arc::new(FixedClock::from_millis(0)));
        let (reader, writer, _peer) = memory::pair();

        // when (操作):
        let connection = usecase
            .execute(
                ClientId::new("alice".to_string()).unwrap(),
                Box::new(reader),
                Box::new(writer),
            )
            .await;

        // then (期待する結果):
        assert_eq!(connection.client_id().as_str(), "alice");
    }

    #[tokio::test]
    async fn test_connect_registers_active_connection() {
        // テスト項目: 接続すると Active な Connection が登録され、接続時刻が Clock から付与される
        // given (前提条件):
        let registry = Arc::new(ConnectionRegistry::new());
        let usecase =
            ConnectClientUseCase::new(registry.clone(), Arc::new(FixedClock::from_millis(5_000)));
        let (reader, writer, _peer) = memory::pair();
        let alice = ClientId::new("alice".to_string()).unwrap();

        // when (操作):
        let connection = usecase
            .execute(alice.clone(), Box::new(reader), Box::new(writer))
            .await;

        // then (期待する結果):
        assert_eq!(connection.state(), ConnectionState::Active);
        assert_eq!(connection.connected_at().timestamp_millis(), 5_000);
        let found = registry.lookup(&alice).await.unwrap();
        assert!(Arc::ptr_eq(&found, &connection));
    }

    #[tokio::test]
    async fn test_reconnect_replaces_previous_connection() {
        // テスト項目: 同じ client_id で再接続すると以前の Connection が閉じられる
        // given (前提条件):
        let registry = Arc::new(ConnectionRegistry::new());
        let usecase =
            ConnectClientUseCase::new(registry.clone(), Arc::new(FixedClock::from_millis(0)));
        let alice = ClientId::new("alice".to_string()).unwrap();
        let (reader, writer, first_peer) = memory::pair();
        let first = usecase
            .execute(alice.clone(), Box::new(reader), Box::new(writer))
            .await;

        // when (操作):
        let (reader, writer, _second_peer) = memory::pair();
        let second = usecase
            .execute(alice.clone(), Box::new(reader), Box::new(writer))
            .await;

        // then (期待する結果):
        assert_eq!(first.state(), ConnectionState::Closed);
        assert_eq!(first_peer.close_count(), 1);
        let found = registry.lookup(&alice).await.unwrap();
        assert!(Arc::ptr_eq(&found, &second));
    }
}
