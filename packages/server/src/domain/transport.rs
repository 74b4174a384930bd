//! 双方向フレームストリームの抽象化
//!
//! Transport upgrade（WebSocket など）によって得られるストリームを、
//! 読み込み側 `FrameReader` と書き込み側 `FrameWriter` に分けて扱います。
//! Connection はそれぞれを別々のロックで保護します。

use async_trait::async_trait;

use super::TransportError;

/// ピアから受信したフレーム
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    Text(String),
    Binary(Vec<u8>),
}

/// フレームの読み込み側
#[async_trait]
pub trait FrameReader: Send {
    /// 次のフレームを待つ
    ///
    /// ピアがストリームを閉じた場合は `Ok(None)` を返す。
    async fn read_frame(&mut self) -> Result<Option<InboundFrame>, TransportError>;
}

/// フレームの書き込み側
#[async_trait]
pub trait FrameWriter: Send {
    /// テキストフレームを書き込み、フラッシュする
    async fn write_frame(&mut self, text: &str) -> Result<(), TransportError>;

    /// ストリームを閉じる
    async fn close(&mut self) -> Result<(), TransportError>;
}
