use crate::env_file;
use crate::error::Result;
use std::collections::HashMap;
use std::path::Path;

/// 設定値の参照元
///
/// 優先順位（高い順）:
/// 1. 明示的な上書き（デプロイ直後の `RECORD_VALUE` など）
/// 2. プロセスの環境変数
/// 3. プロジェクトの `.env` ファイル
///
/// 起動時に一度だけ構築し、各コンポーネントへ参照で渡す。
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    overrides: HashMap<String, String>,
    process: HashMap<String, String>,
    file: HashMap<String, String>,
}

impl EnvSource {
    /// 空の参照元
    pub fn new() -> Self {
        Self::default()
    }

    /// 現在のプロセス環境変数から構築
    pub fn from_process() -> Self {
        Self {
            process: std::env::vars().collect(),
            ..Self::default()
        }
    }

    /// プロセス環境変数として扱う値を追加
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.process.insert(key.into(), value.into());
        self
    }

    /// `.env` ファイルの値を読み込む（ファイルが無ければ何もしない）
    pub fn with_env_file(mut self, path: &Path) -> Result<Self> {
        for (key, value) in env_file::read_env_file(path)? {
            self.file.insert(key, value);
        }
        Ok(self)
    }

    /// 他のすべての値より優先される上書きを追加
    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    /// 値を取得する。空文字列は未設定として扱う
    ///
    /// 空の値は下位の層を隠さない。
    pub fn get(&self, key: &str) -> Option<&str> {
        [&self.overrides, &self.process, &self.file]
            .into_iter()
            .filter_map(|layer| layer.get(key))
            .map(String::as_str)
            .find(|value| !value.is_empty())
    }
}
