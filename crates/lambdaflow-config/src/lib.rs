//! lambdaflow の設定
//!
//! - [`EnvSource`]: 環境変数・`.env`・上書き値を重ねた参照元
//! - [`DnsConfig`]: Cloudflare DNS レコード管理の設定（`DOMAIN` が無ければ存在しない）
//! - [`DeploymentConfig`]: CDK スタック名・リージョン・アカウント
//! - [`env_file`]: `.env` の読み込みと `RECORD_VALUE=` 行の書き換え

pub mod deployment;
pub mod dns;
pub mod env_file;
pub mod error;
pub mod source;

pub use deployment::{DEFAULT_ENVIRONMENT, DEFAULT_REGION, DeploymentConfig, UNKNOWN_PROJECT};
pub use dns::{DEFAULT_TTL, DnsConfig};
pub use env_file::{EnvUpdate, RECORD_VALUE_KEY, upsert_record_value, write_record_value};
pub use error::*;
pub use source::EnvSource;

use std::path::{Path, PathBuf};

/// プロジェクトの `.env` ファイルのパス
pub fn env_file_path(project_root: &Path) -> PathBuf {
    project_root.join(".env")
}
