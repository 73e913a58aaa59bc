//! Cloudflare DNS error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CloudflareError {
    /// No DNS configuration (DOMAIN unset); callers treat this as "skip"
    #[error("DOMAIN is not set, skipping DNS management")]
    ConfigurationMissing,

    #[error("wrangler not found. Please install: npm install -g wrangler")]
    WranglerNotFound,

    #[error("Invalid command arguments: {0}")]
    InvalidCommandArgs(String),

    #[error("Unsupported action: {0}")]
    UnsupportedAction(String),

    #[error("wrangler command failed: {0}")]
    CommandFailed(String),

    #[error("DNS {operation} failed: {source}")]
    DnsOperationFailed {
        operation: &'static str,
        #[source]
        source: Box<CloudflareError>,
    },

    #[error("Cloud error: {0}")]
    CloudError(#[from] lambdaflow_cloud::CloudError),
}

impl CloudflareError {
    pub fn is_configuration_missing(&self) -> bool {
        matches!(self, CloudflareError::ConfigurationMissing)
    }

    /// Wrap into [`CloudflareError::DnsOperationFailed`] unless already wrapped
    pub(crate) fn into_operation_failed(self, operation: &'static str) -> Self {
        match self {
            CloudflareError::DnsOperationFailed { .. } => self,
            other => CloudflareError::DnsOperationFailed {
                operation,
                source: Box::new(other),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudflareError>;
