//! ドメイン層のエラー定義

use thiserror::Error;

/// 値オブジェクト生成時の検証エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("client_id must not be empty")]
    EmptyClientId,

    #[error("client_id '{0}' must not have leading or trailing whitespace")]
    ClientIdHasSurroundingWhitespace(String),

    #[error("client_id is {length} characters long (max {max})")]
    ClientIdTooLong { length: usize, max: usize },

    #[error("emoji code must not be empty")]
    EmptyEmojiCode,

    #[error("page size {value} is out of range (1..={max})")]
    PageSizeOutOfRange { value: usize, max: usize },
}

/// 双方向ストリームの読み書きに失敗した場合のエラー
///
/// 読み込み側で発生した場合のみ接続の切断につながる。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("failed to receive frame: {0}")]
    Receive(String),

    #[error("failed to send frame: {0}")]
    Send(String),

    #[error("connection is closed")]
    Closed,
}

/// フレームまたはペイロードのデコードエラー
///
/// ログに記録してメッセージを破棄する。接続は維持される。
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("frame is not valid UTF-8")]
    NotUtf8,

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(#[source] serde_json::Error),

    #[error("invalid payload for {kind}: {source}")]
    InvalidPayload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid field in {kind} payload: {source}")]
    InvalidField {
        kind: String,
        #[source]
        source: ValueObjectError,
    },
}

/// Persistence Gateway 操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("channel '{0}' not found")]
    ChannelNotFound(String),

    #[error("'{0}' already exists")]
    AlreadyExists(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}
