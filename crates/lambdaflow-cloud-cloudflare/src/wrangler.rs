//! wrangler CLI wrapper
//!
//! Builds `wrangler dns ...` invocations and runs them through a
//! [`CommandRunner`] with the Cloudflare credentials in the environment.

use crate::error::{CloudflareError, Result};
use lambdaflow_cloud::{CloudError, CommandRunner, CommandSpec};
use lambdaflow_config::DnsConfig;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const WRANGLER: &str = "wrangler";

/// Record type used by `list` when no record hint is given
pub const DEFAULT_RECORD_TYPE: &str = "A";

/// DNS record information
///
/// `id` is only known for records discovered through `wrangler dns list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    pub ttl: u32,
}

impl DnsRecord {
    /// The record the configuration asks for
    pub fn desired(config: &DnsConfig) -> Self {
        Self {
            id: None,
            record_type: config.record_type.clone(),
            name: config.full_domain(),
            content: config.record_value.clone(),
            ttl: config.ttl,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// `wrangler dns` subcommands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DnsAction {
    List,
    Create,
    Update,
    Delete,
}

impl FromStr for DnsAction {
    type Err = CloudflareError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "list" => Ok(DnsAction::List),
            "create" => Ok(DnsAction::Create),
            "update" => Ok(DnsAction::Update),
            "delete" => Ok(DnsAction::Delete),
            other => Err(CloudflareError::UnsupportedAction(other.to_string())),
        }
    }
}

impl std::fmt::Display for DnsAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DnsAction::List => write!(f, "list"),
            DnsAction::Create => write!(f, "create"),
            DnsAction::Update => write!(f, "update"),
            DnsAction::Delete => write!(f, "delete"),
        }
    }
}

/// One `wrangler` invocation. Built once, run at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WranglerCommand {
    action: DnsAction,
    args: Vec<String>,
}

impl WranglerCommand {
    pub fn action(&self) -> DnsAction {
        self.action
    }

    /// Arguments after `wrangler`
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The process invocation, credentials attached
    pub fn to_spec(&self, config: &DnsConfig) -> CommandSpec {
        CommandSpec::new(WRANGLER)
            .args(self.args.iter().cloned())
            .env("CLOUDFLARE_API_TOKEN", config.api_token.clone())
            .env("CLOUDFLARE_ACCOUNT_ID", config.account_id.clone())
    }
}

/// Shell-quoted form, e.g. for "run this manually" hints
impl std::fmt::Display for WranglerCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let spec = CommandSpec::new(WRANGLER).args(self.args.iter().cloned());
        write!(f, "{}", spec.command_line())
    }
}

/// Build the `wrangler dns` command for `action`
///
/// - `list` uses the record (if any) only as a type hint, default `A`
/// - `create` needs `record`
/// - `update` needs `record` and `record_id`
/// - `delete` needs `record_id`
pub fn build(
    action: DnsAction,
    domain: &str,
    record: Option<&DnsRecord>,
    record_id: Option<&str>,
) -> Result<WranglerCommand> {
    let args: Vec<String> = match action {
        DnsAction::List => {
            let record_type = record
                .map(|r| r.record_type.as_str())
                .unwrap_or(DEFAULT_RECORD_TYPE);
            vec![
                "dns".into(),
                "list".into(),
                "--zone".into(),
                domain.into(),
                "--type".into(),
                record_type.into(),
            ]
        }
        DnsAction::Create => {
            let record = record.ok_or_else(|| {
                CloudflareError::InvalidCommandArgs("create requires a record".to_string())
            })?;
            vec![
                "dns".into(),
                "create".into(),
                domain.into(),
                record.name.clone(),
                record.record_type.clone(),
                record.content.clone(),
                "--ttl".into(),
                record.ttl.to_string(),
            ]
        }
        DnsAction::Update => {
            let (record, record_id) = record.zip(record_id).ok_or_else(|| {
                CloudflareError::InvalidCommandArgs(
                    "update requires a record and a record id".to_string(),
                )
            })?;
            vec![
                "dns".into(),
                "update".into(),
                domain.into(),
                record_id.into(),
                "--type".into(),
                record.record_type.clone(),
                "--content".into(),
                record.content.clone(),
                "--ttl".into(),
                record.ttl.to_string(),
            ]
        }
        DnsAction::Delete => {
            let record_id = record_id.ok_or_else(|| {
                CloudflareError::InvalidCommandArgs("delete requires a record id".to_string())
            })?;
            vec!["dns".into(), "delete".into(), domain.into(), record_id.into()]
        }
    };

    Ok(WranglerCommand { action, args })
}

/// wrangler CLI wrapper
pub struct Wrangler<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> Wrangler<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Check that wrangler is installed (`wrangler --version`)
    pub async fn check_installed(&self) -> Result<String> {
        let spec = CommandSpec::new(WRANGLER).arg("--version");
        match self.runner.run(&spec).await {
            Ok(output) if output.is_success() => {
                let version = output.stdout.trim().to_string();
                tracing::debug!(version = %version, "wrangler found");
                Ok(version)
            }
            Ok(_) | Err(CloudError::ToolNotFound(_)) => Err(CloudflareError::WranglerNotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// Run a built command and return its stdout
    pub async fn execute(&self, command: &WranglerCommand, config: &DnsConfig) -> Result<String> {
        let spec = command.to_spec(config);
        tracing::debug!(command = %command, "Running wrangler");

        self.runner.run_checked(&spec).await.map_err(|e| match e {
            CloudError::CommandFailed(msg) => CloudflareError::CommandFailed(msg),
            CloudError::ToolNotFound(_) => CloudflareError::WranglerNotFound,
            other => other.into(),
        })
    }
}
