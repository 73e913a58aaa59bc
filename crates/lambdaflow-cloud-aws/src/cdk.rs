//! AWS CDK CLI wrapper

use crate::error::{AwsError, Result};
use lambdaflow_cloud::{CloudError, CommandRunner, CommandSpec};
use lambdaflow_config::DeploymentConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const NPX: &str = "npx";

/// `npx cdk` runner for one CDK app directory
///
/// Deploy and destroy stream their output to the terminal.
pub struct Cdk<'a> {
    runner: &'a dyn CommandRunner,
    app_dir: PathBuf,
}

impl<'a> Cdk<'a> {
    pub fn new(runner: &'a dyn CommandRunner, app_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            app_dir: app_dir.into(),
        }
    }

    pub fn app_dir(&self) -> &Path {
        &self.app_dir
    }

    /// `npx cdk deploy <stack> --require-approval never --outputs-file <file>`
    pub fn deploy_command(
        &self,
        stack: &str,
        config: &DeploymentConfig,
        outputs_file: &Path,
    ) -> CommandSpec {
        let mut spec = self
            .cdk()
            .arg("deploy")
            .arg(stack)
            .args(["--require-approval", "never", "--outputs-file"])
            .arg(outputs_file.to_string_lossy())
            .env("CDK_DEFAULT_REGION", config.region.clone())
            .env("NODE_ENV", config.environment.clone());
        if let Some(account) = &config.account {
            spec = spec.env("CDK_DEFAULT_ACCOUNT", account.clone());
        }
        spec
    }

    /// `npx cdk destroy <stack> --force`
    pub fn destroy_command(&self, stack: &str) -> CommandSpec {
        self.cdk().arg("destroy").arg(stack).arg("--force")
    }

    /// Deploy the stack, writing stack outputs to `outputs_file`
    pub async fn deploy(
        &self,
        stack: &str,
        config: &DeploymentConfig,
        outputs_file: &Path,
    ) -> Result<()> {
        let spec = self.deploy_command(stack, config, outputs_file);
        info!(
            stack = %stack,
            region = %config.region,
            environment = %config.environment,
            "Deploying CDK stack"
        );
        self.run(&spec).await
    }

    /// Destroy the stack without confirmation
    pub async fn destroy(&self, stack: &str) -> Result<()> {
        let spec = self.destroy_command(stack);
        info!(stack = %stack, "Destroying CDK stack");
        self.run(&spec).await
    }

    fn cdk(&self) -> CommandSpec {
        CommandSpec::new(NPX)
            .arg("cdk")
            .current_dir(&self.app_dir)
            .inherit_output()
    }

    async fn run(&self, spec: &CommandSpec) -> Result<()> {
        debug!(command = %spec, dir = %self.app_dir.display(), "Running cdk");
        match self.runner.run_checked(spec).await {
            Ok(_) => Ok(()),
            Err(CloudError::ToolNotFound(_)) => Err(AwsError::NpxNotFound),
            Err(CloudError::CommandFailed(msg)) => Err(AwsError::CdkFailed(msg)),
            Err(e) => Err(e.into()),
        }
    }
}
