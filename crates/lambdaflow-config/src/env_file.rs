//! `.env` ファイルの読み込みと `RECORD_VALUE=` 行の書き換え

use crate::error::{ConfigError, Result};
use std::path::Path;
use tracing::debug;

/// デプロイ後に書き換える `.env` のキー
pub const RECORD_VALUE_KEY: &str = "RECORD_VALUE";

const RECORD_VALUE_PREFIX: &str = "RECORD_VALUE=";

/// `.env` の内容を `KEY=VALUE` のペアに分解する
///
/// 空行と `#` で始まるコメント行は無視し、値を囲むクォートは除去する。
pub fn parse_env_content(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .filter_map(|line| {
            let line = line.trim();

            // 空行とコメント行をスキップ
            if line.is_empty() || line.starts_with('#') {
                return None;
            }

            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }

            Some((key.to_string(), strip_quotes(value.trim()).to_string()))
        })
        .collect()
}

/// クォートを除去（"value" や 'value' の場合）
fn strip_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && ((bytes[0] == b'"' && bytes[bytes.len() - 1] == b'"')
            || (bytes[0] == b'\'' && bytes[bytes.len() - 1] == b'\''))
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// `.env` ファイルを読み込む。ファイルが無ければ空を返す
pub fn read_env_file(path: &Path) -> Result<Vec<(String, String)>> {
    if !path.exists() {
        debug!(path = %path.display(), ".env file not found");
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let vars = parse_env_content(&content);
    debug!(path = %path.display(), count = vars.len(), "Loaded .env file");
    Ok(vars)
}

/// `RECORD_VALUE=` 行の書き換え結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvUpdate {
    pub content: String,
    /// 既存の行を置き換えた場合は true、末尾に追加した場合は false
    pub replaced: bool,
}

/// `RECORD_VALUE=` 行を新しい値に置き換える（無ければ追加する）
///
/// 他の行は順序も内容もそのまま残す。`RECORD_VALUE=` 行が複数ある場合は
/// 最初の行の位置に新しい値を書き、残りは削除する。
pub fn upsert_record_value(content: &str, value: &str) -> EnvUpdate {
    let mut lines: Vec<String> = Vec::new();
    let mut replaced = false;

    for line in content.split('\n') {
        if !line.starts_with(RECORD_VALUE_PREFIX) {
            lines.push(line.to_string());
            continue;
        }
        if replaced {
            continue;
        }
        // CRLF の行末は維持する
        let eol = if line.ends_with('\r') { "\r" } else { "" };
        lines.push(format!("{}{}{}", RECORD_VALUE_PREFIX, value, eol));
        replaced = true;
    }

    if !replaced {
        let new_line = format!("{}{}", RECORD_VALUE_PREFIX, value);
        if lines.len() == 1 && lines[0].is_empty() {
            lines[0] = new_line;
        } else if lines.last().is_some_and(|last| last.is_empty()) {
            // 末尾の改行の後ろではなく、最後の行の次に追加する
            let at = lines.len() - 1;
            lines.insert(at, new_line);
        } else {
            lines.push(new_line);
        }
    }

    EnvUpdate {
        content: lines.join("\n"),
        replaced,
    }
}

/// `.env` ファイルの `RECORD_VALUE` を更新して書き戻す
///
/// ファイルが存在しない場合は `RECORD_VALUE=` 行だけのファイルを作成する。
pub fn write_record_value(path: &Path, value: &str) -> Result<EnvUpdate> {
    let content = if path.exists() {
        std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        String::new()
    };

    let update = upsert_record_value(&content, value);
    std::fs::write(path, &update.content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), replaced = update.replaced, "Updated RECORD_VALUE");
    Ok(update)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_content() {
        let vars = parse_env_content(
            "# comment\n\nDOMAIN=example.com\nexport TTL=120\nRECORD_VALUE=\"abc.lambda-url.aws\"\nQUOTED='x y'\nbroken-line\n",
        );

        assert_eq!(
            vars,
            vec![
                ("DOMAIN".to_string(), "example.com".to_string()),
                ("TTL".to_string(), "120".to_string()),
                ("RECORD_VALUE".to_string(), "abc.lambda-url.aws".to_string()),
                ("QUOTED".to_string(), "x y".to_string()),
            ]
        );
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let update = upsert_record_value("DOMAIN=example.com\nRECORD_VALUE=old\nTTL=300\n", "new");

        assert!(update.replaced);
        assert_eq!(update.content, "DOMAIN=example.com\nRECORD_VALUE=new\nTTL=300\n");
        assert_eq!(update.content.matches("RECORD_VALUE=").count(), 1);
    }

    #[test]
    fn test_upsert_appends_once() {
        let update = upsert_record_value("DOMAIN=example.com\nTTL=300\n", "new");

        assert!(!update.replaced);
        assert_eq!(update.content, "DOMAIN=example.com\nTTL=300\nRECORD_VALUE=new\n");

        // 末尾改行なし
        let update = upsert_record_value("DOMAIN=example.com", "new");
        assert_eq!(update.content, "DOMAIN=example.com\nRECORD_VALUE=new");

        // 空ファイル
        let update = upsert_record_value("", "new");
        assert_eq!(update.content, "RECORD_VALUE=new");
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let first = upsert_record_value("A=1\n", "host.example");
        let second = upsert_record_value(&first.content, "host.example");

        assert_eq!(first.content, second.content);
        assert!(second.replaced);
    }

    #[test]
    fn test_upsert_collapses_duplicates_and_keeps_crlf() {
        let update = upsert_record_value("RECORD_VALUE=a\r\nA=1\r\nRECORD_VALUE=b\r\n", "new");

        assert_eq!(update.content, "RECORD_VALUE=new\r\nA=1\r\n");
    }

    #[test]
    fn test_commented_record_value_is_not_replaced() {
        let update = upsert_record_value("# RECORD_VALUE=old\n", "new");

        assert!(!update.replaced);
        assert_eq!(update.content, "# RECORD_VALUE=old\nRECORD_VALUE=new\n");
    }

    #[test]
    fn test_write_record_value() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(".env");
        std::fs::write(&path, "DOMAIN=example.com\nRECORD_VALUE=old\n").unwrap();

        let update = write_record_value(&path, "new").unwrap();
        assert!(update.replaced);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "DOMAIN=example.com\nRECORD_VALUE=new\n"
        );

        let vars = read_env_file(&path).unwrap();
        assert!(vars.contains(&("RECORD_VALUE".to_string(), "new".to_string())));
    }

    #[test]
    fn test_write_record_value_creates_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(".env");

        let update = write_record_value(&path, "new").unwrap();
        assert!(!update.replaced);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "RECORD_VALUE=new");
    }

    #[test]
    fn test_read_missing_env_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let vars = read_env_file(&temp_dir.path().join(".env")).unwrap();
        assert!(vars.is_empty());
    }
}
