use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// DOMAIN は設定されているが、DNS 管理に必要な他の変数が欠けている
    #[error("必須環境変数が設定されていません: {0}")]
    MissingConfiguration(String),

    #[error("IO エラー ({path}): {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON パースエラー ({path}): {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
