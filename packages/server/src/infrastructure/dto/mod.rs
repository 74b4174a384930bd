//! Data Transfer Objects
//!
//! ワイヤフォーマット（WebSocket の envelope、HTTP API の JSON）と
//! ドメインモデルの変換を担当します。

pub mod conversion;
pub mod http;
pub mod websocket;
