//! AWS CDK deployment for lambdaflow
//!
//! Drives `npx cdk deploy|destroy` in the project's CDK app directory and
//! reads the Lambda function URL back from the `--outputs-file` JSON.
//!
//! # Requirements
//!
//! - Node.js (`npx`) and a CDK app whose stack id is `{project}-{branch}`
//! - AWS credentials usable by the CDK CLI

pub mod cdk;
pub mod error;
pub mod outputs;

pub use cdk::Cdk;
pub use error::{AwsError, Result};
pub use outputs::{
    DEFAULT_URL_OUTPUT_KEY, StackOutputs, find_function_url, normalize_host, read_function_url,
    read_outputs,
};
