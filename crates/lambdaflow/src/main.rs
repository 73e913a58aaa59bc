mod commands;
mod utils;

use clap::{Args, Parser, Subcommand};
use commands::deploy::DeployOptions;
use commands::dns::DnsStep;
use lambdaflow_cloud::ProcessRunner;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use utils::StackTarget;

#[derive(Parser)]
#[command(name = "lflow")]
#[command(about = "CDK で Lambda をデプロイし、Cloudflare DNS を追従させる", long_about = None)]
struct Cli {
    /// プロジェクトルート（package.json と .env がある場所）
    #[arg(long, global = true, env = "LFLOW_PROJECT_ROOT", default_value = ".")]
    project_root: PathBuf,
    /// 外部コマンド1回あたりのタイムアウト（秒）
    #[arg(long, global = true, env = "LFLOW_TIMEOUT", default_value_t = 900)]
    timeout: u64,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct StackArgs {
    /// CDK アプリのディレクトリ
    #[arg(long, default_value = "packages/infra")]
    cdk_dir: PathBuf,
    /// スタック名（省略時は {package.json の name}-{git ブランチ}）
    #[arg(long)]
    stack: Option<String>,
    /// git ブランチ名（省略時は現在のブランチ）
    #[arg(long)]
    branch: Option<String>,
}

impl From<StackArgs> for StackTarget {
    fn from(args: StackArgs) -> Self {
        StackTarget {
            cdk_dir: args.cdk_dir,
            stack: args.stack,
            branch: args.branch,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// スタックをデプロイし、Lambda URL で DNS レコードを更新
    Deploy {
        #[command(flatten)]
        stack: StackArgs,
        /// Lambda 関数 URL のスタック出力キー
        #[arg(long, default_value = lambdaflow_cloud_aws::DEFAULT_URL_OUTPUT_KEY)]
        url_output: String,
        /// cdk deploy --outputs-file の出力先（CDK ディレクトリからの相対パス可）
        #[arg(long, default_value = "cdk-outputs.json")]
        outputs_file: PathBuf,
    },
    /// DNS レコードを削除してからスタックを削除
    Destroy {
        #[command(flatten)]
        stack: StackArgs,
    },
    /// Cloudflare DNS レコードの操作
    #[command(subcommand)]
    Dns(DnsCommands),
    /// バージョン情報を表示
    Version,
}

#[derive(Subcommand)]
enum DnsCommands {
    /// .env の設定で DNS レコードを作成・更新
    Update,
    /// DNS レコードを削除
    Delete,
    /// DNS レコードの状態を表示
    Status {
        /// JSON で出力
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ログは stderr（RUST_LOG、未指定時は warn）
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    if matches!(cli.command, Commands::Version) {
        println!("lflow {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let runner = ProcessRunner::new().with_timeout(Duration::from_secs(cli.timeout));
    let project_root = cli.project_root;

    match cli.command {
        Commands::Deploy {
            stack,
            url_output,
            outputs_file,
        } => {
            let options = DeployOptions {
                target: stack.into(),
                url_output,
                outputs_file,
            };
            let report = commands::deploy::handle(&runner, &project_root, &options).await?;
            if let DnsStep::Failed(reason) = &report.dns {
                tracing::warn!(
                    stack = %report.stack,
                    host = ?report.function_host,
                    reason = %reason,
                    "deployed without DNS sync"
                );
            }
        }
        Commands::Destroy { stack } => {
            let dns = commands::destroy::handle(&runner, &project_root, &stack.into()).await?;
            if let DnsStep::Failed(reason) = &dns {
                tracing::warn!(reason = %reason, "stack destroyed but DNS record may remain");
            }
        }
        Commands::Dns(DnsCommands::Update) => {
            commands::dns::handle_update(&runner, &project_root).await?;
        }
        Commands::Dns(DnsCommands::Delete) => {
            commands::dns::handle_delete(&runner, &project_root).await?;
        }
        Commands::Dns(DnsCommands::Status { json }) => {
            commands::dns::handle_status(&runner, &project_root, json).await?;
        }
        Commands::Version => {
            unreachable!("Version is handled before runner setup");
        }
    }

    Ok(())
}
