//! lambdaflow cloud plumbing
//!
//! Shared pieces used by the provider crates:
//!
//! - [`CommandRunner`]: the seam through which every external CLI
//!   (`wrangler`, `npx cdk`, `git`) is invoked
//! - [`ProcessRunner`]: the real implementation, bounded by a timeout
//! - [`ActionType`]: what a reconciliation step did
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  lflow CLI                        │
//! │            (deploy / destroy / dns)               │
//! └──────────┬──────────────────────┬─────────────────┘
//!            │                      │
//! ┌──────────▼───────┐   ┌──────────▼───────┐
//! │ cloudflare (DNS) │   │   aws (CDK)      │
//! │  wrangler CLI    │   │   npx cdk        │
//! └──────────┬───────┘   └──────────┬───────┘
//!            │                      │
//! ┌──────────▼──────────────────────▼───────┐
//! │            lambdaflow-cloud              │
//! │     trait CommandRunner { ... }          │
//! └──────────────────────────────────────────┘
//! ```

pub mod action;
pub mod error;
pub mod process;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;

// Re-exports
pub use action::ActionType;
pub use error::{CloudError, Result};
pub use process::{
    CommandOutput, CommandRunner, CommandSpec, DEFAULT_TIMEOUT, OutputMode, ProcessRunner,
    shell_quote,
};
