use crate::error::{ConfigError, Result};
use crate::source::EnvSource;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// リージョン未指定時のデフォルト
pub const DEFAULT_REGION: &str = "ap-northeast-2";

/// NODE_ENV 未指定時のデフォルト
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// package.json が読めない場合のプロジェクト名
pub const UNKNOWN_PROJECT: &str = "unknown-project";

/// CDK スタックのデプロイ設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentConfig {
    pub project_name: String,
    pub branch: String,
    pub environment: String,
    pub account: Option<String>,
    pub region: String,
}

#[derive(Deserialize)]
struct PackageJson {
    name: Option<String>,
}

impl DeploymentConfig {
    /// 参照元・プロジェクトルート・git ブランチからデプロイ設定を構成する
    pub fn resolve(source: &EnvSource, project_root: &Path, branch: impl Into<String>) -> Self {
        let project_name = match read_project_name(project_root) {
            Ok(Some(name)) => name,
            Ok(None) => UNKNOWN_PROJECT.to_string(),
            Err(e) => {
                warn!(error = %e, "package.json could not be read, using {}", UNKNOWN_PROJECT);
                UNKNOWN_PROJECT.to_string()
            }
        };

        let account = source
            .get("CDK_DEFAULT_ACCOUNT")
            .or_else(|| source.get("AWS_ACCOUNT_ID"))
            .map(str::to_string);
        let region = source
            .get("CDK_DEFAULT_REGION")
            .or_else(|| source.get("AWS_DEFAULT_REGION"))
            .unwrap_or(DEFAULT_REGION)
            .to_string();
        let environment = source
            .get("NODE_ENV")
            .unwrap_or(DEFAULT_ENVIRONMENT)
            .to_string();

        Self {
            project_name,
            branch: branch.into(),
            environment,
            account,
            region,
        }
    }

    /// スタック名: `{project}-{branch}`
    ///
    /// CloudFormation のスタック名に使えない文字（`/`, `@`, `_` など）は `-` に置き換える。
    pub fn stack_name(&self) -> String {
        let raw = format!("{}-{}", self.project_name, self.branch);
        let mut name = String::with_capacity(raw.len());
        for c in raw.chars() {
            let c = if c.is_ascii_alphanumeric() { c } else { '-' };
            // 連続する '-' はまとめる
            if c == '-' && (name.is_empty() || name.ends_with('-')) {
                continue;
            }
            name.push(c);
        }
        name.trim_end_matches('-').to_string()
    }

    /// スタックに付与するタグ
    pub fn tags(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Environment", self.environment.clone()),
            ("Project", self.project_name.clone()),
        ]
    }
}

/// プロジェクトルートの package.json から `name` を読み取る
pub fn read_project_name(project_root: &Path) -> Result<Option<String>> {
    let path = project_root.join("package.json");
    if !path.exists() {
        debug!(path = %path.display(), "package.json not found");
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let package: PackageJson =
        serde_json::from_str(&content).map_err(|source| ConfigError::Json { path, source })?;

    Ok(package.name.filter(|name| !name.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = DeploymentConfig::resolve(&EnvSource::new(), temp_dir.path(), "main");

        assert_eq!(config.project_name, UNKNOWN_PROJECT);
        assert_eq!(config.environment, DEFAULT_ENVIRONMENT);
        assert_eq!(config.region, DEFAULT_REGION);
        assert_eq!(config.account, None);
        assert_eq!(config.stack_name(), "unknown-project-main");
    }

    #[test]
    fn test_env_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = EnvSource::new()
            .with_var("AWS_ACCOUNT_ID", "111111111111")
            .with_var("CDK_DEFAULT_ACCOUNT", "222222222222")
            .with_var("AWS_DEFAULT_REGION", "us-east-1")
            .with_var("NODE_ENV", "production");

        let config = DeploymentConfig::resolve(&source, temp_dir.path(), "main");
        assert_eq!(config.account.as_deref(), Some("222222222222"));
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.environment, "production");

        let source = source.with_var("CDK_DEFAULT_REGION", "eu-west-1");
        let config = DeploymentConfig::resolve(&source, temp_dir.path(), "main");
        assert_eq!(config.region, "eu-west-1");
    }

    #[test]
    fn test_project_name_from_package_json() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(
            temp_dir.path().join("package.json"),
            r#"{ "name": "my-app", "private": true }"#,
        )
        .unwrap();

        let config = DeploymentConfig::resolve(&EnvSource::new(), temp_dir.path(), "feature/login");
        assert_eq!(config.project_name, "my-app");
        assert_eq!(config.stack_name(), "my-app-feature-login");
        assert_eq!(
            config.tags(),
            vec![
                ("Environment", "development".to_string()),
                ("Project", "my-app".to_string())
            ]
        );
    }

    #[test]
    fn test_package_json_without_name() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("package.json"), "{}").unwrap();

        assert_eq!(read_project_name(temp_dir.path()).unwrap(), None);
    }

    #[test]
    fn test_broken_package_json_falls_back() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("package.json"), "{ not json").unwrap();

        assert!(matches!(
            read_project_name(temp_dir.path()),
            Err(ConfigError::Json { .. })
        ));
        let config = DeploymentConfig::resolve(&EnvSource::new(), temp_dir.path(), "main");
        assert_eq!(config.project_name, UNKNOWN_PROJECT);
    }

    #[test]
    fn test_stack_name_sanitizing() {
        let config = DeploymentConfig {
            project_name: "@scope/web".to_string(),
            branch: "fix__dns/".to_string(),
            environment: DEFAULT_ENVIRONMENT.to_string(),
            account: None,
            region: DEFAULT_REGION.to_string(),
        };

        assert_eq!(config.stack_name(), "scope-web-fix-dns");
    }
}
