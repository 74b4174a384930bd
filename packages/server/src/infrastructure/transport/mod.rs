//! フレームストリームの実装
//!
//! - `websocket`: axum の WebSocket を使った実装
//! - `memory`: チャンネルを使ったテスト用の実装

pub mod websocket;

#[cfg(test)]
pub mod memory;

pub use websocket::{WebSocketFrameReader, WebSocketFrameWriter};
