//! Connection hub
//!
//! 接続中のクライアント（Connection）を管理する Registry の実装。

mod registry;

pub use registry::{ConnectedClient, ConnectionRegistry};
