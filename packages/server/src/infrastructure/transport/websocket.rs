//! WebSocket を使ったフレームストリーム実装
//!
//! ## 責務
//!
//! - axum の `WebSocket` を読み込み側と書き込み側に分割する
//! - Ping / Pong などの制御フレームを読み飛ばし、データフレームだけを返す
//!
//! ## 設計ノート
//!
//! WebSocket の upgrade は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は upgrade 済みのソケットを受け取り、ドメイン層の
//! `FrameReader` / `FrameWriter` trait として提供します。

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};

use crate::domain::{FrameReader, FrameWriter, InboundFrame, TransportError};

/// WebSocket の読み込み側
pub struct WebSocketFrameReader {
    stream: SplitStream<WebSocket>,
}

/// WebSocket の書き込み側
pub struct WebSocketFrameWriter {
    sink: SplitSink<WebSocket, Message>,
}

/// upgrade 済みのソケットを読み込み側と書き込み側に分割
pub fn split(socket: WebSocket) -> (WebSocketFrameReader, WebSocketFrameWriter) {
    let (sink, stream) = socket.split();
    (WebSocketFrameReader { stream }, WebSocketFrameWriter { sink })
}

#[async_trait]
impl FrameReader for WebSocketFrameReader {
    async fn read_frame(&mut self) -> Result<Option<InboundFrame>, TransportError> {
        loop {
            let message = match self.stream.next().await {
                Some(Ok(message)) => message,
                Some(Err(e)) => return Err(TransportError::Receive(e.to_string())),
                None => return Ok(None),
            };

            match message {
                Message::Text(text) => return Ok(Some(InboundFrame::Text(text.to_string()))),
                Message::Binary(bytes) => return Ok(Some(InboundFrame::Binary(bytes.to_vec()))),
                Message::Close(frame) => {
                    tracing::debug!("Received close frame: {:?}", frame);
                    return Ok(None);
                }
                // Ping/pong is handled automatically by the WebSocket protocol
                Message::Ping(_) | Message::Pong(_) => continue,
            }
        }
    }
}

#[async_trait]
impl FrameWriter for WebSocketFrameWriter {
    async fn write_frame(&mut self, text: &str) -> Result<(), TransportError> {
        self.sink
            .send(Message::Text(text.to_string().into()))
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.sink
            .close()
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }
}
