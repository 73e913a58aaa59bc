use colored::Colorize;
use lambdaflow_cloud::{CommandRunner, CommandSpec};
use lambdaflow_config::{DeploymentConfig, DnsConfig, EnvSource, env_file_path};
use std::path::{Path, PathBuf};

/// スタック指定（deploy / destroy 共通）
#[derive(Debug, Clone)]
pub struct StackTarget {
    /// CDK アプリのディレクトリ（プロジェクトルートからの相対パス可）
    pub cdk_dir: PathBuf,
    /// スタック名の上書き
    pub stack: Option<String>,
    /// git ブランチ名の上書き
    pub branch: Option<String>,
}

/// プロセス環境変数 + プロジェクトの `.env` を読み込む
pub fn load_env(project_root: &Path) -> anyhow::Result<EnvSource> {
    Ok(EnvSource::from_process().with_env_file(&env_file_path(project_root))?)
}

/// `.env` を読み込む。読めなければ警告してプロセス環境変数だけで続行する
///
/// deploy / destroy 用。`.env` が壊れていてもスタック操作は止めない。
pub fn load_env_or_process(project_root: &Path) -> EnvSource {
    match load_env(project_root) {
        Ok(source) => source,
        Err(e) => {
            tracing::warn!(error = %e, "falling back to process environment");
            println!(
                "{}",
                format!("⚠ .env を読み込めないため環境変数のみで続行します: {}", e).yellow()
            );
            EnvSource::from_process()
        }
    }
}

/// 現在の git ブランチ名（`git rev-parse --abbrev-ref HEAD`）
pub async fn current_branch(
    runner: &dyn CommandRunner,
    project_root: &Path,
) -> anyhow::Result<String> {
    let spec = CommandSpec::new("git")
        .args(["rev-parse", "--abbrev-ref", "HEAD"])
        .current_dir(project_root);

    let branch = runner.run_checked(&spec).await.map_err(|e| {
        anyhow::anyhow!("git ブランチを取得できません（--branch で指定してください）: {}", e)
    })?;
    let branch = branch.trim();
    if branch.is_empty() {
        anyhow::bail!("git ブランチ名が空です（--branch で指定してください）");
    }
    Ok(branch.to_string())
}

/// デプロイ設定とスタック名を決定する
pub async fn resolve_stack(
    runner: &dyn CommandRunner,
    source: &EnvSource,
    project_root: &Path,
    target: &StackTarget,
) -> anyhow::Result<(DeploymentConfig, String)> {
    let branch = match &target.branch {
        Some(branch) => branch.clone(),
        None => current_branch(runner, project_root).await?,
    };
    let deployment = DeploymentConfig::resolve(source, project_root, branch);
    let stack = target
        .stack
        .clone()
        .unwrap_or_else(|| deployment.stack_name());
    Ok((deployment, stack))
}

/// CDK アプリのディレクトリ
pub fn cdk_dir(project_root: &Path, target: &StackTarget) -> PathBuf {
    if target.cdk_dir.is_absolute() {
        target.cdk_dir.clone()
    } else {
        project_root.join(&target.cdk_dir)
    }
}

/// デプロイ設定を表示
pub fn print_deployment(deployment: &DeploymentConfig, stack: &str) {
    println!("スタック: {}", stack.cyan());
    println!("  リージョン: {}", deployment.region);
    if let Some(account) = &deployment.account {
        println!("  アカウント: {}", account);
    }
    let tags = deployment
        .tags()
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join(", ");
    println!("  タグ: {}", tags);
}

/// DNS 設定を表示（API トークンは表示しない）
pub fn print_dns_config(config: &DnsConfig) {
    println!("{}", "🔧 DNS 設定:".bold());
    println!("  ドメイン: {}", config.full_domain().cyan());
    println!("  レコードタイプ: {}", config.record_type);
    println!("  対象: {}", config.record_value);
    println!("  TTL: {}秒", config.ttl);
}

/// DNS 操作が失敗したときの手動実行の案内
pub fn print_dns_remediation(command: &str) {
    println!();
    println!(
        "{}",
        "💡 DNS レコードの操作に失敗しました。手動で実行してください:".yellow()
    );
    println!("   {}", command.cyan());
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambdaflow_cloud::testing::{Reply, ScriptedRunner};
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_load_env_or_process_falls_back() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join(".env"), b"DOMAIN=example.com\n\xff\xfe\n").unwrap();

        assert!(load_env(temp_dir.path()).is_err());
        let vars = [("LAMBDAFLOW_UTILS_TEST", Some("value")), ("DOMAIN", None)];
        temp_env::with_vars(vars, || {
            let source = load_env_or_process(temp_dir.path());
            assert_eq!(source.get("LAMBDAFLOW_UTILS_TEST"), Some("value"));
            assert_eq!(source.get("DOMAIN"), None);
        });
    }

    #[tokio::test]
    async fn test_current_branch() {
        let runner = ScriptedRunner::new().on("git rev-parse", Reply::stdout("feature/login\n"));
        let branch = current_branch(&runner, Path::new("/work")).await.unwrap();

        assert_eq!(branch, "feature/login");
        assert_eq!(
            runner.calls()[0].current_dir.as_deref(),
            Some(Path::new("/work"))
        );
    }

    #[tokio::test]
    async fn test_current_branch_failure() {
        let runner =
            ScriptedRunner::new().on("git rev-parse", Reply::fail(128, "not a git repository"));
        let err = current_branch(&runner, Path::new("/work")).await.unwrap_err();

        assert!(err.to_string().contains("--branch"));
    }

    #[tokio::test]
    async fn test_resolve_stack_overrides() {
        let runner = ScriptedRunner::new();
        let temp_dir = tempfile::tempdir().unwrap();
        let target = StackTarget {
            cdk_dir: PathBuf::from("packages/infra"),
            stack: None,
            branch: Some("main".to_string()),
        };

        let (deployment, stack) =
            resolve_stack(&runner, &EnvSource::new(), temp_dir.path(), &target)
                .await
                .unwrap();
        assert_eq!(deployment.branch, "main");
        assert_eq!(stack, "unknown-project-main");
        // --branch 指定時は git を呼ばない
        assert!(runner.calls().is_empty());

        let target = StackTarget {
            stack: Some("custom-stack".to_string()),
            ..target
        };
        let (_, stack) = resolve_stack(&runner, &EnvSource::new(), temp_dir.path(), &target)
            .await
            .unwrap();
        assert_eq!(stack, "custom-stack");
    }

    #[test]
    fn test_cdk_dir() {
        let target = StackTarget {
            cdk_dir: PathBuf::from("packages/infra"),
            stack: None,
            branch: None,
        };
        assert_eq!(
            cdk_dir(Path::new("/work"), &target),
            PathBuf::from("/work/packages/infra")
        );

        let target = StackTarget {
            cdk_dir: PathBuf::from("/opt/infra"),
            ..target
        };
        assert_eq!(cdk_dir(Path::new("/work"), &target), PathBuf::from("/opt/infra"));
    }
}
