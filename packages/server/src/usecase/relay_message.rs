//! UseCase: メッセージのリレー（永続化 → 配送）
//!
//! ## 責務
//!
//! 1. Dispatcher で永続化する
//! 2. 永続化に成功した場合のみ、宛先へフレームを配送する
//!
//! 永続化に失敗したメッセージは配送されません。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - 永続化が配送より先に行われること（mockall の Sequence で順序を検証）
//! - 永続化失敗時に配送されないこと
//! - 宛先がない場合は配送しないこと
//! - 複数宛先への配送結果の集約

use std::sync::Arc;

use crate::domain::{ClientId, DeliveryOutcome, DeliveryReport, MessagePusher, RelayMessage};

use super::dispatch_message::DispatchMessageUseCase;
use super::error::PersistenceError;

/// リレーのユースケース
pub struct RelayMessageUseCase {
    dispatcher: Arc<DispatchMessageUseCase>,
    /// MessagePusher（配送の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl RelayMessageUseCase {
    pub fn new(
        dispatcher: Arc<DispatchMessageUseCase>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            dispatcher,
            message_pusher,
        }
    }

    /// 永続化してから `send_to` へ配送する
    ///
    /// # Returns
    ///
    /// * `Ok(Some(outcome))` - 配送を試みた結果
    /// * `Ok(None)` - 宛先がないため配送しなかった
    /// * `Err(PersistenceError)` - 永続化に失敗したため配送しなかった
    pub async fn execute(
        &self,
        message: &RelayMessage,
    ) -> Result<Option<DeliveryOutcome>, PersistenceError> {
        match &message.send_to {
            Some(recipient) => self.execute_to(message, recipient).await.map(Some),
            None => self.dispatch(message).await.map(|()| None),
        }
    }

    /// 永続化してから指定された 1 宛先へ配送する（`send_to` は使わない）
    pub async fn execute_to(
        &self,
        message: &RelayMessage,
        recipient: &ClientId,
    ) -> Result<DeliveryOutcome, PersistenceError> {
        self.dispatch(message).await?;

        Ok(self
            .message_pusher
            .push_to(recipient, &message.frame)
            .await)
    }

    /// 永続化してから指定された宛先へ配送する（`send_to` は使わない）
    pub async fn execute_for(
        &self,
        message: &RelayMessage,
        recipients: &[ClientId],
    ) -> Result<DeliveryReport, PersistenceError> {
        self.dispatch(message).await?;

        Ok(self
            .message_pusher
            .push_to_many(recipients, &message.frame)
            .await)
    }

    async fn dispatch(&self, message: &RelayMessage) -> Result<(), PersistenceError> {
        self.dispatcher
            .execute(&message.command)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    "Failed to persist {} message, not delivering: {}",
                    message.kind(),
                    e
                );
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use mockall::Sequence;
    use tsunagi_shared::time::FixedClock;
    use uuid::Uuid;

    use crate::domain::{
        AccountId, ChannelId, ChannelMessageDraft, MessageId, MockMessagePusher,
        MockMessageRepository, ReactionSet, RelayCommand, RepositoryError,
    };

    fn client_id(value: &str) -> ClientId {
        ClientId::new(value.to_string()).unwrap()
    }

    fn create_usecase(
        repository: MockMessageRepository,
        pusher: MockMessagePusher,
    ) -> RelayMessageUseCase {
        let dispatcher = DispatchMessageUseCase::new(
            Arc::new(repository),
            Arc::new(FixedClock::from_millis(0)),
            Duration::from_secs(10),
        );
        RelayMessageUseCase::new(Arc::new(dispatcher), Arc::new(pusher))
    }

    fn new_channel_message(send_to: Option<&str>) -> RelayMessage {
        RelayMessage {
            command: RelayCommand::NewChannelMessage(ChannelMessageDraft {
                message_id: MessageId::new(Uuid::from_u128(10)),
                author_id: AccountId::new(Uuid::from_u128(20)),
                channel_id: ChannelId::new(Uuid::from_u128(30)),
                content: "hello".to_string(),
                reactions: ReactionSet::new(),
                files: vec![],
                attached_thread_id: None,
            }),
            send_to: send_to.map(client_id),
            frame: r#"{"type":"NEW_CHANNEL_MESSAGE"}"#.to_string(),
        }
    }

    #[tokio::test]
    async fn test_persists_before_delivering() {
        // テスト項目: 永続化が完了してから配送される
        // given (前提条件):
        let mut seq = Sequence::new();
        let mut repository = MockMessageRepository::new();
        repository
            .expect_insert_channel_message()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_push_to()
            .withf(|client_id, frame| {
                client_id.as_str() == "bob" && frame == r#"{"type":"NEW_CHANNEL_MESSAGE"}"#
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| DeliveryOutcome::Delivered);
        let usecase = create_usecase(repository, pusher);

        // when (操作):
        let result = usecase.execute(&new_channel_message(Some("bob"))).await;

        // then (期待する結果):
        assert_eq!(result, Ok(Some(DeliveryOutcome::Delivered)));
    }

    #[tokio::test]
    async fn test_persistence_failure_suppresses_delivery() {
        // テスト項目: 永続化に失敗した場合は配送されない
        // given (前提条件):
        let mut repository = MockMessageRepository::new();
        repository
            .expect_insert_channel_message()
            .times(1)
            .returning(|_| Err(RepositoryError::Backend("unavailable".to_string())));
        let mut pusher = MockMessagePusher::new();
        pusher.expect_push_to().never();
        let usecase = create_usecase(repository, pusher);

        // when (操作):
        let result = usecase.execute(&new_channel_message(Some("bob"))).await;

        // then (期待する結果):
        assert!(matches!(result, Err(PersistenceError::Repository(_))));
    }

    #[tokio::test]
    async fn test_no_recipient_persists_without_delivery() {
        // テスト項目: 宛先がない場合は永続化のみ行い、配送しない
        // given (前提条件):
        let mut repository = MockMessageRepository::new();
        repository
            .expect_insert_channel_message()
            .times(1)
            .returning(|_| Ok(()));
        let mut pusher = MockMessagePusher::new();
        pusher.expect_push_to().never();
        let usecase = create_usecase(repository, pusher);

        // when (操作):
        let result = usecase.execute(&new_channel_message(None)).await;

        // then (期待する結果):
        assert_eq!(result, Ok(None));
    }

    #[tokio::test]
    async fn test_passthrough_is_delivered_verbatim() {
        // テスト項目: 未知の種別は永続化されずに、受信したフレームのまま配送される
        // given (前提条件):
        let repository = MockMessageRepository::new();
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_push_to()
            .withf(|client_id, frame| {
                client_id.as_str() == "bob" && frame == r#"{"type":"ANYTHING","send_to":"bob"}"#
            })
            .times(1)
            .returning(|_, _| DeliveryOutcome::Offline);
        let usecase = create_usecase(repository, pusher);
        let message = RelayMessage {
            command: RelayCommand::Passthrough {
                kind: "ANYTHING".to_string(),
            },
            send_to: Some(client_id("bob")),
            frame: r#"{"type":"ANYTHING","send_to":"bob"}"#.to_string(),
        };

        // when (操作):
        let result = usecase.execute(&message).await;

        // then (期待する結果):
        assert_eq!(result, Ok(Some(DeliveryOutcome::Offline)));
    }

    #[tokio::test]
    async fn test_execute_for_fans_out_after_persisting() {
        // テスト項目: 複数宛先への配送は永続化の後に 1 回だけ行われ、結果がそのまま返る
        // given (前提条件):
        let mut seq = Sequence::new();
        let mut repository = MockMessageRepository::new();
        repository
            .expect_insert_channel_message()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_push_to_many()
            .withf(|client_ids, _| client_ids.len() == 2)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|client_ids, _| {
                let mut report = DeliveryReport::default();
                report.record(client_ids[0].clone(), DeliveryOutcome::Delivered);
                report.record(client_ids[1].clone(), DeliveryOutcome::Offline);
                report
            });
        let usecase = create_usecase(repository, pusher);

        // when (操作):
        let report = usecase
            .execute_for(
                &new_channel_message(None),
                &[client_id("alice"), client_id("carol")],
            )
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(report.delivered, vec![client_id("alice")]);
        assert_eq!(report.offline, vec![client_id("carol")]);
    }
}
