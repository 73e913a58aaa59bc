use crate::utils;
use colored::Colorize;
use lambdaflow_cloud::{ActionType, CommandRunner};
use lambdaflow_cloud_cloudflare::{
    DnsReconciler, DnsRecord, ReconcileOutcome, RecordLookup, delete_dns, update_dns,
};
use lambdaflow_config::{DnsConfig, EnvSource};
use serde::Serialize;
use std::path::Path;

/// deploy / destroy に付随する DNS 処理の結果
///
/// 失敗はここで止め、スタック操作の成否には影響させない。
#[derive(Debug)]
pub enum DnsStep {
    /// DOMAIN 未設定
    Skipped,
    Done(ReconcileOutcome),
    Failed(String),
}

fn print_outcome(outcome: &ReconcileOutcome) {
    let record = &outcome.record;
    match outcome.action {
        ActionType::Create => println!(
            "{}",
            format!("✓ DNS レコードを作成しました: {} → {}", record.name, record.content)
                .green()
                .bold()
        ),
        ActionType::Update => println!(
            "{}",
            format!("✓ DNS レコードを更新しました: {} → {}", record.name, record.content)
                .green()
                .bold()
        ),
        ActionType::Delete => println!(
            "{}",
            format!("✓ DNS レコードを削除しました: {}", record.name)
                .green()
                .bold()
        ),
        ActionType::NoOp => println!(
            "{}",
            format!("ℹ 削除する DNS レコードはありません: {}", record.name).dimmed()
        ),
    }
}

fn print_skip(what: &str) {
    println!(
        "{}",
        format!("ℹ DOMAIN が設定されていないため DNS {}をスキップします", what).dimmed()
    );
}

/// デプロイ後の DNS 更新（失敗しても Err にしない）
pub async fn upsert_step(runner: &dyn CommandRunner, source: &EnvSource) -> DnsStep {
    println!();
    println!("{}", "🌐 Cloudflare DNS レコードを更新中...".blue());

    let result = async {
        let Some(config) = DnsConfig::resolve(source)? else {
            return Ok(None);
        };
        utils::print_dns_config(&config);
        anyhow::Ok(Some(update_dns(Some(config), runner).await?))
    }
    .await;

    match result {
        Ok(Some(outcome)) => {
            print_outcome(&outcome);
            DnsStep::Done(outcome)
        }
        Ok(None) => {
            print_skip("更新");
            DnsStep::Skipped
        }
        Err(e) => {
            println!("{}", format!("⚠ DNS 更新に失敗しました: {:#}", e).yellow());
            utils::print_dns_remediation("lflow dns update");
            DnsStep::Failed(format!("{:#}", e))
        }
    }
}

/// スタック削除前の DNS 削除（失敗しても Err にしない）
pub async fn delete_step(runner: &dyn CommandRunner, source: &EnvSource) -> DnsStep {
    println!();
    println!("{}", "🗑️ Cloudflare DNS レコードを削除中...".blue());

    let result = async {
        let config = DnsConfig::resolve(source)?;
        anyhow::Ok(delete_dns(config, runner).await?)
    }
    .await;

    match result {
        Ok(Some(outcome)) => {
            print_outcome(&outcome);
            DnsStep::Done(outcome)
        }
        Ok(None) => {
            print_skip("削除");
            DnsStep::Skipped
        }
        Err(e) => {
            println!("{}", format!("⚠ DNS 削除に失敗しました: {:#}", e).yellow());
            utils::print_dns_remediation("lflow dns delete");
            DnsStep::Failed(format!("{:#}", e))
        }
    }
}

/// `lflow dns update`
pub async fn handle_update(runner: &dyn CommandRunner, project_root: &Path) -> anyhow::Result<()> {
    let source = utils::load_env(project_root)?;
    let Some(config) = DnsConfig::resolve(&source)? else {
        print_skip("更新");
        return Ok(());
    };

    utils::print_dns_config(&config);
    println!();
    println!("{}", "🌐 wrangler で DNS レコードを更新中...".blue());

    let outcome = update_dns(Some(config), runner).await?;
    print_outcome(&outcome);
    println!("{}", "🎉 DNS 更新が完了しました！".green());
    Ok(())
}

/// `lflow dns delete`
pub async fn handle_delete(runner: &dyn CommandRunner, project_root: &Path) -> anyhow::Result<()> {
    let source = utils::load_env(project_root)?;
    let config = DnsConfig::resolve(&source)?;
    if let Some(config) = &config {
        utils::print_dns_config(config);
    }

    match delete_dns(config, runner).await? {
        Some(outcome) => print_outcome(&outcome),
        None => print_skip("削除"),
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct StatusReport {
    enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    desired: Option<DnsRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    existing: Option<DnsRecord>,
}

/// `lflow dns status`
pub async fn handle_status(
    runner: &dyn CommandRunner,
    project_root: &Path,
    json: bool,
) -> anyhow::Result<()> {
    let source = utils::load_env(project_root)?;
    let report = match DnsConfig::resolve(&source)? {
        None => StatusReport {
            enabled: false,
            desired: None,
            existing: None,
        },
        Some(config) => {
            let reconciler = DnsReconciler::new(Some(config), runner)?;
            let desired = DnsRecord::desired(reconciler.config());
            let existing = match reconciler.lookup().await? {
                RecordLookup::Found(record) => Some(record),
                RecordLookup::Absent => None,
            };
            StatusReport {
                enabled: true,
                desired: Some(desired),
                existing,
            }
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let Some(desired) = &report.desired else {
        println!("{}", "ℹ DOMAIN が設定されていないため DNS 管理は無効です".dimmed());
        return Ok(());
    };
    println!("{}", "DNS レコード:".bold());
    println!("  名前: {}", desired.name.cyan());
    println!("  タイプ: {}", desired.record_type);
    println!("  対象: {}", desired.content);
    match &report.existing {
        Some(existing) => println!(
            "  状態: {} (id: {})",
            "登録済み".green(),
            existing.id.as_deref().unwrap_or("-")
        ),
        None => println!("  状態: {}", "未登録".yellow()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambdaflow_cloud::testing::{Reply, ScriptedRunner};

    const LISTING: &str = "abc123  CNAME  300  api.example.com\n";

    fn dns_source() -> EnvSource {
        EnvSource::new()
            .with_var("DOMAIN", "example.com")
            .with_var("SUBDOMAIN", "api")
            .with_var("CLOUDFLARE_API_TOKEN", "token")
            .with_var("CLOUDFLARE_ACCOUNT_ID", "account")
            .with_var("RECORD_TYPE", "CNAME")
            .with_var("RECORD_VALUE", "abc.lambda-url.ap-northeast-2.on.aws")
    }

    #[tokio::test]
    async fn test_upsert_step_skips_without_domain() {
        let runner = ScriptedRunner::new();
        let step = upsert_step(&runner, &EnvSource::new()).await;

        assert!(matches!(step, DnsStep::Skipped));
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_step_swallows_missing_configuration() {
        let runner = ScriptedRunner::new();
        let source = EnvSource::new().with_var("DOMAIN", "example.com");

        match upsert_step(&runner, &source).await {
            DnsStep::Failed(msg) => assert!(msg.contains("CLOUDFLARE_API_TOKEN")),
            other => panic!("Expected Failed, got {:?}", other),
        }
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_step_updates() {
        let runner = ScriptedRunner::new().on("wrangler dns list", Reply::stdout(LISTING));

        match upsert_step(&runner, &dns_source()).await {
            DnsStep::Done(outcome) => assert_eq!(outcome.action, ActionType::Update),
            other => panic!("Expected Done, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_step_swallows_failure() {
        let runner = ScriptedRunner::new()
            .on("wrangler dns list", Reply::stdout(LISTING))
            .on("wrangler dns delete", Reply::fail(1, "permission denied"));

        match delete_step(&runner, &dns_source()).await {
            DnsStep::Failed(msg) => assert!(msg.contains("permission denied")),
            other => panic!("Expected Failed, got {:?}", other),
        }
    }
}
