use crate::commands::dns::{self, DnsStep};
use crate::utils::{self, StackTarget};
use colored::Colorize;
use lambdaflow_cloud::CommandRunner;
use lambdaflow_cloud_aws::Cdk;
use std::path::Path;

/// DNS レコードを削除してから CDK スタックを削除する
///
/// DNS 削除の失敗は表示のみで続行し、スタック削除の失敗だけを返す。
pub async fn handle(
    runner: &dyn CommandRunner,
    project_root: &Path,
    target: &StackTarget,
) -> anyhow::Result<DnsStep> {
    println!(
        "{}",
        "🗑️ スタック削除を開始: DNS レコードと AWS リソースを削除します...".yellow()
    );

    let source = utils::load_env_or_process(project_root);
    let (deployment, stack) = utils::resolve_stack(runner, &source, project_root, target).await?;
    utils::print_deployment(&deployment, &stack);

    // 1. DNS レコード
    let dns = dns::delete_step(runner, &source).await;
    if let DnsStep::Failed(_) = &dns {
        println!(
            "{}",
            "⚠ DNS 削除中にエラーが発生しましたが、スタック削除を続行します".yellow()
        );
    }

    // 2. CDK スタック
    println!();
    println!("{}", "🔥 AWS CDK スタックを削除中...".red());
    if let Err(e) = Cdk::new(runner, utils::cdk_dir(project_root, target))
        .destroy(&stack)
        .await
    {
        println!("{}", format!("✗ CDK スタックの削除に失敗しました: {}", e).red());
        return Err(e.into());
    }

    println!();
    println!("{}", "✓ スタックの削除が完了しました".green().bold());
    Ok(dns)
}
