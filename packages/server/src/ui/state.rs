//! Shared application state.

use std::sync::Arc;

use crate::infrastructure::hub::ConnectionRegistry;
use crate::usecase::{
    ConnectClientUseCase, CreateChannelUseCase, CreateThreadUseCase, DisconnectClientUseCase,
    GetMessageHistoryUseCase, RelayMessageUseCase,
};

/// ハンドラから参照される共有状態
pub struct AppState {
    /// ConnectClientUseCase（クライアント接続のユースケース）
    pub connect_client_usecase: Arc<ConnectClientUseCase>,
    /// DisconnectClientUseCase（クライアント切断のユースケース）
    pub disconnect_client_usecase: Arc<DisconnectClientUseCase>,
    /// RelayMessageUseCase（永続化 → 配送のユースケース）
    pub relay_message_usecase: Arc<RelayMessageUseCase>,
    /// GetMessageHistoryUseCase（履歴取得のユースケース）
    pub get_message_history_usecase: Arc<GetMessageHistoryUseCase>,
    /// CreateChannelUseCase（チャンネル作成のユースケース）
    pub create_channel_usecase: Arc<CreateChannelUseCase>,
    /// CreateThreadUseCase（スレッド作成のユースケース）
    pub create_thread_usecase: Arc<CreateThreadUseCase>,
    /// Registry（接続一覧の参照と shutdown に使う）
    pub registry: Arc<ConnectionRegistry>,
}
