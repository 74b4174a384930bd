//! サーバー設定
//!
//! CLI 引数 / 環境変数（`bin/server.rs` の clap 定義）から組み立てられ、
//! 起動前に検証されます。

use std::time::Duration;

use axum::http::HeaderValue;
use thiserror::Error;
use uuid::Uuid;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_PERSISTENCE_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOG_LEVEL: &str = "debug";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("host must not be empty")]
    EmptyHost,

    #[error("persistence timeout must be greater than zero")]
    ZeroPersistenceTimeout,

    #[error("invalid allowed origin '{0}'")]
    InvalidOrigin(String),

    #[error("invalid log level '{0}' (expected trace, debug, info, warn or error)")]
    InvalidLogLevel(String),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// CORS で許可する Origin。空の場合は全て許可する
    pub allowed_origins: Vec<String>,
    /// 永続化 1 回あたりのタイムアウト
    pub persistence_timeout: Duration,
    pub log_level: String,
    /// このプロセスの ID（起動時にログに出力される）
    pub instance_id: Uuid,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            allowed_origins: Vec::new(),
            persistence_timeout: Duration::from_secs(DEFAULT_PERSISTENCE_TIMEOUT_SECS),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            instance_id: Uuid::new_v4(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.persistence_timeout.is_zero() {
            return Err(ConfigError::ZeroPersistenceTimeout);
        }
        if let Some(origin) = self
            .allowed_origins
            .iter()
            .find(|origin| HeaderValue::from_str(origin).is_err())
        {
            return Err(ConfigError::InvalidOrigin(origin.clone()));
        }
        if !matches!(
            self.log_level.to_ascii_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            return Err(ConfigError::InvalidLogLevel(self.log_level.clone()));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// カンマ区切りの Origin 一覧を分解する（空要素は無視）
pub fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        // テスト項目: デフォルト設定は検証を通過する
        // given (前提条件):
        let config = ServerConfig::default();

        // when (操作):
        let result = config.validate();

        // then (期待する結果):
        assert_eq!(result, Ok(()));
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.persistence_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        // テスト項目: タイムアウト 0 は設定エラーになる
        // given (前提条件):
        let config = ServerConfig {
            persistence_timeout: Duration::ZERO,
            ..ServerConfig::default()
        };

        // when (操作):
        let result = config.validate();

        // then (期待する結果):
        assert_eq!(result, Err(ConfigError::ZeroPersistenceTimeout));
    }

    #[test]
    fn test_invalid_origin_is_rejected() {
        // テスト項目: ヘッダ値として不正な Origin は設定エラーになる
        // given (前提条件):
        let config = ServerConfig {
            allowed_origins: vec!["http://ok.example".to_string(), "bad\norigin".to_string()],
            ..ServerConfig::default()
        };

        // when (操作):
        let result = config.validate();

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ConfigError::InvalidOrigin("bad\norigin".to_string()))
        );
    }

    #[test]
    fn test_unknown_log_level_is_rejected() {
        // テスト項目: 未知のログレベルは設定エラーになる
        // given (前提条件):
        let config = ServerConfig {
            log_level: "verbose".to_string(),
            ..ServerConfig::default()
        };

        // when (操作):
        let result = config.validate();

        // then (期待する結果):
        assert!(matches!(result, Err(ConfigError::InvalidLogLevel(_))));
    }

    #[test]
    fn test_parse_origins_skips_blank_entries() {
        // テスト項目: カンマ区切りの Origin 一覧から空要素を除いて分解する
        // given (前提条件):
        let value = " http://a.example, ,http://b.example,";

        // when (操作):
        let origins = parse_origins(value);

        // then (期待する結果):
        assert_eq!(origins, vec!["http://a.example", "http://b.example"]);
    }
}
