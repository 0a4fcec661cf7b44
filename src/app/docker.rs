use std::path::Path;
use std::sync::Arc;

use crate::domain::model::{CommandOutput, CommandSpec, RegistryCredentials};
use crate::domain::ports::CommandRunner;
use crate::utils::error::{DeployError, Result};

/// docker CLI 封裝，映像的 build/tag/push 與 registry 登入
#[derive(Clone)]
pub struct DockerCli {
    runner: Arc<dyn CommandRunner>,
}

impl DockerCli {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    async fn run_ok(&self, spec: CommandSpec) -> Result<CommandOutput> {
        let output = self.runner.run(&spec).await?;
        if !output.success() {
            return Err(DeployError::CommandFailedError {
                command: spec.display_line(),
                status: output.status.unwrap_or(-1),
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output)
    }

    pub async fn login(&self, server: &str, credentials: &RegistryCredentials) -> Result<()> {
        let spec = CommandSpec::new("docker")
            .arg("login")
            .arg(server)
            .arg("--username")
            .arg(&credentials.username)
            .arg("--password")
            .secret_arg(&credentials.password);
        self.run_ok(spec).await?;
        Ok(())
    }

    /// 在 context 目錄內 build，Dockerfile 用預設位置
    pub async fn build(&self, context_dir: &Path, tag: &str) -> Result<()> {
        let spec = CommandSpec::new("docker")
            .args(["build", "--tag"])
            .arg(tag)
            .arg(".")
            .current_dir(context_dir);
        self.run_ok(spec).await?;
        Ok(())
    }

    pub async fn tag(&self, source: &str, target: &str) -> Result<()> {
        let spec = CommandSpec::new("docker")
            .arg("tag")
            .arg(source)
            .arg(target);
        self.run_ok(spec).await?;
        Ok(())
    }

    pub async fn push(&self, image: &str) -> Result<()> {
        let spec = CommandSpec::new("docker").arg("push").arg(image);
        self.run_ok(spec).await?;
        Ok(())
    }
}
