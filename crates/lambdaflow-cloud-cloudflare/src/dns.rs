//! Cloudflare DNS record reconciliation
//!
//! Compares the record described by [`DnsConfig`] against what
//! `wrangler dns list` reports and issues the single command needed to
//! converge: create, update, delete, or nothing.

use crate::error::{CloudflareError, Result};
use crate::parser::{RecordLookup, parse_list_output};
use crate::wrangler::{DnsAction, DnsRecord, Wrangler, build};
use lambdaflow_cloud::{ActionType, CommandRunner};
use lambdaflow_config::DnsConfig;
use serde::Serialize;
use tracing::{debug, info, warn};

/// What a reconcile call did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    pub action: ActionType,
    pub record: DnsRecord,
    /// Shell-quoted command that was run, `None` for [`ActionType::NoOp`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

/// DNS reconciler for one configured record
pub struct DnsReconciler<'a> {
    config: DnsConfig,
    wrangler: Wrangler<'a>,
}

impl<'a> DnsReconciler<'a> {
    /// `None` config means DNS management is not wanted:
    /// [`CloudflareError::ConfigurationMissing`].
    pub fn new(config: Option<DnsConfig>, runner: &'a dyn CommandRunner) -> Result<Self> {
        let config = config.ok_or(CloudflareError::ConfigurationMissing)?;

        info!(
            domain = %config.full_domain(),
            record_type = %config.record_type,
            target = %config.record_value,
            ttl = config.ttl,
            "DNS configuration"
        );

        Ok(Self {
            config,
            wrangler: Wrangler::new(runner),
        })
    }

    pub fn config(&self) -> &DnsConfig {
        &self.config
    }

    /// Look up the configured record in the zone
    ///
    /// A failed `list` is logged and reported as [`RecordLookup::Absent`].
    pub async fn lookup(&self) -> Result<RecordLookup> {
        self.wrangler.check_installed().await?;
        self.list().await
    }

    /// Create the record, or update it in place when it already exists
    pub async fn reconcile_upsert(&self) -> Result<ReconcileOutcome> {
        self.upsert()
            .await
            .map_err(|e| e.into_operation_failed("update"))
    }

    /// Delete the record if it exists
    pub async fn reconcile_delete(&self) -> Result<ReconcileOutcome> {
        self.delete()
            .await
            .map_err(|e| e.into_operation_failed("delete"))
    }

    async fn upsert(&self) -> Result<ReconcileOutcome> {
        info!("Updating DNS record with wrangler");
        let lookup = self.lookup().await?;
        let desired = DnsRecord::desired(&self.config);
        let domain = &self.config.domain;

        let (action, command, record) = match lookup {
            RecordLookup::Found(existing) => {
                let id = existing.id.clone().unwrap_or_default();
                info!(id = %id, "Existing DNS record found, updating");
                let command = build(DnsAction::Update, domain, Some(&desired), Some(&id))?;
                (ActionType::Update, command, desired.with_id(id))
            }
            RecordLookup::Absent => {
                info!("No existing DNS record, creating");
                let command = build(DnsAction::Create, domain, Some(&desired), None)?;
                (ActionType::Create, command, desired)
            }
        };

        self.wrangler.execute(&command, &self.config).await?;
        info!(action = %action, name = %record.name, "DNS record updated");

        Ok(ReconcileOutcome {
            action,
            record,
            command: Some(command.to_string()),
        })
    }

    async fn delete(&self) -> Result<ReconcileOutcome> {
        info!("Deleting DNS record with wrangler");
        let lookup = self.lookup().await?;

        let RecordLookup::Found(existing) = lookup else {
            info!(name = %self.config.full_domain(), "No DNS record to delete");
            return Ok(ReconcileOutcome {
                action: ActionType::NoOp,
                record: DnsRecord::desired(&self.config),
                command: None,
            });
        };

        let command = build(
            DnsAction::Delete,
            &self.config.domain,
            None,
            existing.id.as_deref(),
        )?;
        self.wrangler.execute(&command, &self.config).await?;
        info!(name = %existing.name, "DNS record deleted");

        Ok(ReconcileOutcome {
            action: ActionType::Delete,
            record: existing,
            command: Some(command.to_string()),
        })
    }

    async fn list(&self) -> Result<RecordLookup> {
        let desired = DnsRecord::desired(&self.config);
        let command = build(DnsAction::List, &self.config.domain, Some(&desired), None)?;

        match self.wrangler.execute(&command, &self.config).await {
            Ok(output) => {
                debug!(lines = output.lines().count(), "wrangler dns list output");
                Ok(parse_list_output(
                    &output,
                    &desired.name,
                    &desired.record_type,
                    &self.config,
                ))
            }
            Err(e) => {
                warn!(error = %e, "Failed to list DNS records, treating as absent");
                Ok(RecordLookup::Absent)
            }
        }
    }
}

/// Create or update the configured record
pub async fn update_dns(
    config: Option<DnsConfig>,
    runner: &dyn CommandRunner,
) -> Result<ReconcileOutcome> {
    DnsReconciler::new(config, runner)?.reconcile_upsert().await
}

/// Delete the configured record; no config is a logged skip (`Ok(None)`)
pub async fn delete_dns(
    config: Option<DnsConfig>,
    runner: &dyn CommandRunner,
) -> Result<Option<ReconcileOutcome>> {
    match DnsReconciler::new(config, runner) {
        Ok(reconciler) => reconciler.reconcile_delete().await.map(Some),
        Err(e) if e.is_configuration_missing() => {
            info!("{}", e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
