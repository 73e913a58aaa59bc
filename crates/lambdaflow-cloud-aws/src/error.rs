//! AWS CDK error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwsError {
    /// `npx` (Node.js) missing on PATH
    #[error("npx not found. Please install Node.js to run the AWS CDK CLI")]
    NpxNotFound,

    #[error("cdk command failed: {0}")]
    CdkFailed(String),

    #[error("Stack output not found: {0}")]
    OutputsNotFound(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cloud error: {0}")]
    Cloud(#[from] lambdaflow_cloud::CloudError),
}

pub type Result<T> = std::result::Result<T, AwsError>;
