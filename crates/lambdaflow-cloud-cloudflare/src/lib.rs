//! Cloudflare DNS management for lambdaflow
//!
//! Keeps one DNS record pointed at a deployment's endpoint by driving the
//! `wrangler` CLI.
//!
//! # Requirements
//!
//! - `wrangler` CLI installed (`npm install -g wrangler`)
//! - `DOMAIN`, `CLOUDFLARE_API_TOKEN`, `CLOUDFLARE_ACCOUNT_ID`, `RECORD_TYPE`,
//!   `RECORD_VALUE` (optional `SUBDOMAIN`, `TTL`)
//!
//! # Example
//!
//! ```ignore
//! use lambdaflow_cloud::ProcessRunner;
//! use lambdaflow_cloud_cloudflare::DnsReconciler;
//! use lambdaflow_config::DnsConfig;
//!
//! let runner = ProcessRunner::new();
//! let reconciler = DnsReconciler::new(DnsConfig::from_env()?, &runner)?;
//!
//! // Create the record, or update it if it already exists
//! let outcome = reconciler.reconcile_upsert().await?;
//! println!("{} {}", outcome.action, outcome.record.name);
//! ```

pub mod dns;
pub mod error;
pub mod parser;
pub mod wrangler;

pub use dns::{DnsReconciler, ReconcileOutcome, delete_dns, update_dns};
pub use error::{CloudflareError, Result};
pub use parser::{RecordLookup, parse_list_output};
pub use wrangler::{DnsAction, DnsRecord, Wrangler, WranglerCommand, build};
