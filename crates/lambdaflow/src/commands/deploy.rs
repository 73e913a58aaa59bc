use crate::commands::dns::{self, DnsStep};
use crate::utils::{self, StackTarget};
use colored::Colorize;
use lambdaflow_cloud::CommandRunner;
use lambdaflow_cloud_aws::{Cdk, read_function_url};
use lambdaflow_config::{EnvSource, RECORD_VALUE_KEY, env_file_path, write_record_value};
use std::path::{Path, PathBuf};

/// `lflow deploy` のオプション
#[derive(Debug, Clone)]
pub struct DeployOptions {
    pub target: StackTarget,
    /// Lambda 関数 URL が入っているスタック出力のキー
    pub url_output: String,
    /// `--outputs-file`（CDK アプリのディレクトリからの相対パス可）
    pub outputs_file: PathBuf,
}

/// デプロイ結果
#[derive(Debug)]
pub struct DeployReport {
    pub stack: String,
    /// 正規化済みの Lambda 関数 URL ホスト
    pub function_host: Option<String>,
    pub dns: DnsStep,
}

pub async fn handle(
    runner: &dyn CommandRunner,
    project_root: &Path,
    options: &DeployOptions,
) -> anyhow::Result<DeployReport> {
    println!("{}", "🚀 CDK スタックをデプロイ中...".yellow());

    let source = utils::load_env_or_process(project_root);
    let (deployment, stack) =
        utils::resolve_stack(runner, &source, project_root, &options.target).await?;
    utils::print_deployment(&deployment, &stack);

    let cdk_dir = utils::cdk_dir(project_root, &options.target);
    let outputs_file = if options.outputs_file.is_absolute() {
        options.outputs_file.clone()
    } else {
        cdk_dir.join(&options.outputs_file)
    };

    println!();
    Cdk::new(runner, &cdk_dir)
        .deploy(&stack, &deployment, &outputs_file)
        .await?;
    println!();
    println!("{}", "✓ スタックのデプロイが完了しました".green().bold());

    let function_host = match read_function_url(&outputs_file, &stack, &options.url_output) {
        Ok(host) => {
            println!("Lambda URL: {}", host.cyan());
            host
        }
        Err(e) => {
            tracing::warn!(error = %e, "function URL not found in stack outputs");
            println!(
                "{}",
                format!("⚠ Lambda URL が見つからないため DNS 更新をスキップします: {}", e)
                    .yellow()
            );
            return Ok(DeployReport {
                stack,
                function_host: None,
                dns: DnsStep::Skipped,
            });
        }
    };

    let dns = on_deployed(runner, project_root, &source, &function_host).await;

    Ok(DeployReport {
        stack,
        function_host: Some(function_host),
        dns,
    })
}

/// デプロイ成功後: `.env` の RECORD_VALUE を書き換えて DNS を同期する
///
/// DNS 設定は起動時の `source` に新しい RECORD_VALUE を重ねて解決する。
pub async fn on_deployed(
    runner: &dyn CommandRunner,
    project_root: &Path,
    source: &EnvSource,
    host: &str,
) -> DnsStep {
    let env_path = env_file_path(project_root);
    match write_record_value(&env_path, host) {
        Ok(update) if update.replaced => {
            println!("✓ {} の {} を更新しました", env_path.display(), RECORD_VALUE_KEY);
        }
        Ok(_) => {
            println!("✓ {} に {} を追加しました", env_path.display(), RECORD_VALUE_KEY);
        }
        Err(e) => {
            println!("{}", format!("⚠ .env の更新に失敗しました: {}", e).yellow());
            utils::print_dns_remediation("lflow dns update");
            return DnsStep::Failed(e.to_string());
        }
    }

    let source = source.clone().with_override(RECORD_VALUE_KEY, host);
    dns::upsert_step(runner, &source).await
}
