//! Process boundary error types

use thiserror::Error;

/// Errors raised while invoking an external CLI
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("{0} not found in PATH")]
    ToolNotFound(String),

    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CloudError>;
