//! UseCase 層
//!
//! ドメイン層の trait（Repository / MessagePusher）と Registry を組み合わせて、
//! 接続、切断、メッセージのリレー、履歴取得などのアプリケーション処理を提供します。

pub mod connect_client;
pub mod create_channel;
pub mod create_thread;
pub mod disconnect_client;
pub mod dispatch_message;
pub mod error;
pub mod get_message_history;
pub mod relay_message;

pub use connect_client::ConnectClientUseCase;
pub use create_channel::CreateChannelUseCase;
pub use create_thread::CreateThreadUseCase;
pub use disconnect_client::DisconnectClientUseCase;
pub use dispatch_message::DispatchMessageUseCase;
pub use error::{CreateThreadError, PersistenceError};
pub use get_message_history::GetMessageHistoryUseCase;
pub use relay_message::RelayMessageUseCase;
