//! 値オブジェクト
//!
//! 識別子やページサイズなど、生成時に検証されるドメインの値を定義します。
//! 一度生成された値オブジェクトは常に妥当であることが保証されます。

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValueObjectError;

/// クライアント ID の最大長（文字数）
pub const CLIENT_ID_MAX_LENGTH: usize = 128;

/// 1 ページあたりのメッセージ件数の上限
pub const PAGE_SIZE_MAX: usize = 100;

/// 1 ページあたりのメッセージ件数のデフォルト値
pub const PAGE_SIZE_DEFAULT: usize = 50;

/// クライアント ID
///
/// 接続時に `client_id` クエリパラメータで指定される任意の文字列。
/// Registry のキーとして使われる。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    /// 新しい ClientId を作成
    ///
    /// 空文字列、前後の空白、最大長超過はエラーになる。
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::EmptyClientId);
        }
        if value.trim() != value {
            return Err(ValueObjectError::ClientIdHasSurroundingWhitespace(value));
        }
        let length = value.chars().count();
        if length > CLIENT_ID_MAX_LENGTH {
            return Err(ValueObjectError::ClientIdTooLong {
                length,
                max: CLIENT_ID_MAX_LENGTH,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ClientId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ClientId {
    type Error = ValueObjectError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// メッセージ ID（所属する channel / thread のコレクション内で一意）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

/// アカウント ID（メッセージの作成者、リアクションの送信者）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

/// チャンネル ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(Uuid);

/// スレッド ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(Uuid);

impl MessageId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AccountId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl ChannelId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    /// 新しいチャンネル ID をランダムに生成
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl ThreadId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    /// 新しいスレッド ID をランダムに生成
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 絵文字コード（例: `1f600`）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EmojiCode(String);

impl EmojiCode {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::EmptyEmojiCode);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EmojiCode {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// 履歴取得時の 1 ページあたりの件数（1 以上 `PAGE_SIZE_MAX` 以下）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSize(usize);

impl PageSize {
    pub fn new(value: usize) -> Result<Self, ValueObjectError> {
        if value == 0 || value > PAGE_SIZE_MAX {
            return Err(ValueObjectError::PageSizeOutOfRange {
                value,
                max: PAGE_SIZE_MAX,
            });
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> usize {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(PAGE_SIZE_DEFAULT)
    }
}
