//! 1 クライアント分の双方向ストリームとその同期状態
//!
//! ## 状態遷移
//!
//! ```text
//! Pending ──register──▶ Active ──read error / leave / shutdown──▶ Closing ──release──▶ Closed
//! ```
//!
//! - 読み込みと書き込みはそれぞれ別の Mutex で保護される。
//!   読み込みと書き込みは並行して進められるが、2 つの読み込み（書き込み）が
//!   同時に走ることはない。
//! - `Closing` への遷移は 1 回だけ成功する。遷移に成功した呼び出し元だけが
//!   `release` でストリームを閉じるため、ストリームのクローズは必ず 1 回になる。
//! - `Closing` に入った時点で待機中の読み込みはキャンセルされ、
//!   以降の書き込みは `TransportError::Closed` で即座に失敗する。

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{ClientId, FrameReader, FrameWriter, InboundFrame, TransportError};

/// Connection のライフサイクル状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    /// 生成済み、未登録
    Pending = 0,
    /// 登録済み、読み込みループ実行中
    Active = 1,
    /// 登録解除が始まった
    Closing = 2,
    /// ストリームが閉じられた
    Closed = 3,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Pending,
            1 => Self::Active,
            2 => Self::Closing,
            _ => Self::Closed,
        }
    }
}

/// 接続中のクライアント 1 つ分
pub struct Connection {
    /// 同じ client_id を持つ Connection 同士を区別するための ID
    id: Uuid,
    client_id: ClientId,
    connected_at: DateTime<Utc>,
    state: AtomicU8,
    stream_released: AtomicBool,
    shutdown: CancellationToken,
    reader: Mutex<Box<dyn FrameReader>>,
    writer: Mutex<Box<dyn FrameWriter>>,
}

impl Connection {
    pub fn new(
        client_id: ClientId,
        reader: Box<dyn FrameReader>,
        writer: Box<dyn FrameWriter>,
        connected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id,
            connected_at,
            state: AtomicU8::new(ConnectionState::Pending as u8),
            stream_released: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// 登録解除が始まっていなければ `true`
    pub fn is_open(&self) -> bool {
        matches!(
            self.state(),
            ConnectionState::Pending | ConnectionState::Active
        )
    }

    /// 次のフレームを読み込む
    ///
    /// 読み込み用の Mutex を保持したまま待機する。`Closing` への遷移で
    /// 待機はキャンセルされ `TransportError::Closed` が返る。
    pub async fn read_frame(&self) -> Result<Option<InboundFrame>, TransportError> {
        if !self.is_open() {
            return Err(TransportError::Closed);
        }

        let mut reader = self.reader.lock().await;
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Err(TransportError::Closed),
            frame = reader.read_frame() => frame,
        }
    }

    /// テキストフレームを書き込む
    ///
    /// 書き込みの失敗は呼び出し元に返すだけで、接続は閉じない。
    pub async fn write_frame(&self, text: &str) -> Result<(), TransportError> {
        if !self.is_open() {
            return Err(TransportError::Closed);
        }

        let mut writer = self.writer.lock().await;
        writer.write_frame(text).await
    }

    /// `Pending` → `Active`
    pub(crate) fn activate(&self) -> bool {
        self.state
            .compare_exchange(
                ConnectionState::Pending as u8,
                ConnectionState::Active as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// `Pending` / `Active` → `Closing`
    ///
    /// 遷移に成功した呼び出し元だけが `true` を受け取り、
    /// その呼び出し元が `release` を呼ぶ責任を持つ。
    pub(crate) fn begin_close(&self) -> bool {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            match ConnectionState::from_u8(current) {
                ConnectionState::Pending | ConnectionState::Active => {}
                ConnectionState::Closing | ConnectionState::Closed => return false,
            }
            match self.state.compare_exchange(
                current,
                ConnectionState::Closing as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }

        self.shutdown.cancel();
        true
    }

    /// ストリームを閉じて `Closed` にする。2 回目以降の呼び出しは何もしない
    pub(crate) async fn release(&self) {
        if self.stream_released.swap(true, Ordering::AcqRel) {
            return;
        }

        {
            let mut writer = self.writer.lock().await;
            if let Err(e) = writer.close().await {
                tracing::debug!(
                    "Failed to close stream for client '{}' ({}): {}",
                    self.client_id,
                    self.id,
                    e
                );
            }
        }

        self.state
            .store(ConnectionState::Closed as u8, Ordering::Release);
        tracing::debug!("Stream for client '{}' ({}) closed", self.client_id, self.id);
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("client_id", &self.client_id)
            .field("connected_at", &self.connected_at)
            .field("state", &self.state())
            .finish()
    }
}
