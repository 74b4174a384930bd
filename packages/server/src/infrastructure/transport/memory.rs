//! チャンネルを使ったインメモリのフレームストリーム（テスト用）
//!
//! `pair()` で Connection に渡す reader / writer と、ピア側を操作する
//! `PeerHandle` を作ります。

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{FrameReader, FrameWriter, InboundFrame, TransportError};

pub struct MemoryReader {
    inbound: mpsc::UnboundedReceiver<Result<InboundFrame, TransportError>>,
}

pub struct MemoryWriter {
    outbound: mpsc::UnboundedSender<String>,
    close_count: Arc<AtomicUsize>,
    fail_writes: Arc<AtomicBool>,
}

/// ピア（クライアント）側のハンドル
pub struct PeerHandle {
    inbound: Option<mpsc::UnboundedSender<Result<InboundFrame, TransportError>>>,
    outbound: mpsc::UnboundedReceiver<String>,
    close_count: Arc<AtomicUsize>,
    fail_writes: Arc<AtomicBool>,
}

pub fn pair() -> (MemoryReader, MemoryWriter, PeerHandle) {
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let close_count = Arc::new(AtomicUsize::new(0));
    let fail_writes = Arc::new(AtomicBool::new(false));

    (
        MemoryReader {
            inbound: inbound_rx,
        },
        MemoryWriter {
            outbound: outbound_tx,
            close_count: close_count.clone(),
            fail_writes: fail_writes.clone(),
        },
        PeerHandle {
            inbound: Some(inbound_tx),
            outbound: outbound_rx,
            close_count,
            fail_writes,
        },
    )
}

#[async_trait]
impl FrameReader for MemoryReader {
    async fn read_frame(&mut self) -> Result<Option<InboundFrame>, TransportError> {
        match self.inbound.recv().await {
            Some(Ok(frame)) => Ok(Some(frame)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl FrameWriter for MemoryWriter {
    async fn write_frame(&mut self, text: &str) -> Result<(), TransportError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(TransportError::Send("injected write failure".to_string()));
        }
        self.outbound
            .send(text.to_string())
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.close_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl PeerHandle {
    /// ピアからテキストフレームを送る
    pub fn send_text(&self, text: &str) {
        if let Some(inbound) = &self.inbound {
            let _ = inbound.send(Ok(InboundFrame::Text(text.to_string())));
        }
    }

    /// ピアからバイナリフレームを送る
    pub fn send_binary(&self, bytes: &[u8]) {
        if let Some(inbound) = &self.inbound {
            let _ = inbound.send(Ok(InboundFrame::Binary(bytes.to_vec())));
        }
    }

    /// 読み込みエラーを発生させる
    pub fn send_error(&self, error: TransportError) {
        if let Some(inbound) = &self.inbound {
            let _ = inbound.send(Err(error));
        }
    }

    /// ピア側からストリームを閉じる
    pub fn hang_up(&mut self) {
        self.inbound = None;
    }

    /// サーバーから書き込まれたフレームを待つ（1 秒でタイムアウト）
    pub async fn recv(&mut self) -> Option<String> {
        tokio::time::timeout(Duration::from_secs(1), self.outbound.recv())
            .await
            .ok()
            .flatten()
    }

    /// 既に書き込まれているフレームがあれば取り出す
    pub fn try_recv(&mut self) -> Option<String> {
        self.outbound.try_recv().ok()
    }

    pub fn close_count(&self) -> usize {
        self.close_count.load(Ordering::SeqCst)
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}
