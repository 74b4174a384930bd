//! 依存関係の組み立て
//!
//! Repository → Registry（MessagePusher）→ UseCase → AppState → Server の順に組み立てます。

use std::sync::Arc;

use tsunagi_shared::time::{Clock, SystemClock};

use crate::{
    config::ServerConfig,
    domain::{ChannelRepository, MessagePusher, MessageRepository},
    infrastructure::{
        hub::ConnectionRegistry,
        repository::{InMemoryChannelRepository, InMemoryMessageRepository},
    },
    ui::{AppState, Server},
    usecase::{
        ConnectClientUseCase, CreateChannelUseCase, CreateThreadUseCase, DisconnectClientUseCase,
        DispatchMessageUseCase, GetMessageHistoryUseCase, RelayMessageUseCase,
    },
};

/// AppState を組み立てる
pub fn build_state(config: &ServerConfig, clock: Arc<dyn Clock>) -> Arc<AppState> {
    let timeout = config.persistence_timeout;

    // 1. Repository の作成
    let message_repository: Arc<dyn MessageRepository> =
        Arc::new(InMemoryMessageRepository::new());
    let channel_repository: Arc<dyn ChannelRepository> =
        Arc::new(InMemoryChannelRepository::new());

    // 2. Registry の作成（MessagePusher を兼ねる）
    let registry = Arc::new(ConnectionRegistry::new());
    let message_pusher: Arc<dyn MessagePusher> = registry.clone();

    // 3. UseCase の作成
    let dispatcher = Arc::new(DispatchMessageUseCase::new(
        message_repository.clone(),
        clock.clone(),
        timeout,
    ));
    let connect_client_usecase = Arc::new(ConnectClientUseCase::new(
        registry.clone(),
        clock.clone(),
    ));
    let disconnect_client_usecase = Arc::new(DisconnectClientUseCase::new(registry.clone()));
    let relay_message_usecase = Arc::new(RelayMessageUseCase::new(dispatcher, message_pusher));
    let get_message_history_usecase = Arc::new(GetMessageHistoryUseCase::new(
        message_repository,
        clock,
        timeout,
    ));
    let create_channel_usecase = Arc::new(CreateChannelUseCase::new(
        channel_repository.clone(),
        timeout,
    ));
    let create_thread_usecase = Arc::new(CreateThreadUseCase::new(channel_repository, timeout));

    // 4. AppState の作成
    Arc::new(AppState {
        connect_client_usecase,
        disconnect_client_usecase,
        relay_message_usecase,
        get_message_history_usecase,
        create_channel_usecase,
        create_thread_usecase,
        registry,
    })
}

/// 設定からサーバーを組み立てる
pub fn build(config: &ServerConfig) -> Server {
    let state = build_state(config, Arc::new(SystemClock));

    // 5. Server の作成
    Server::new(state, config.allowed_origins.clone())
}
