use crate::domain::model::{CommandOutput, CommandSpec};
use crate::domain::ports::CommandRunner;
use crate::utils::error::{DeployError, Result};
use async_trait::async_trait;

/// 真實的子行程執行器，等待結束並收集完整輸出
#[derive(Debug, Default, Clone)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        tracing::debug!("🔧 Running: {}", spec.display_line());

        let mut command = tokio::process::Command::new(&spec.program);
        command.args(&spec.args);
        for (key, value) in &spec.env {
            command.env(key, value);
        }
        if let Some(dir) = &spec.current_dir {
            command.current_dir(dir);
        }

        let output = command
            .output()
            .await
            .map_err(|e| DeployError::CommandSpawnError {
                program: spec.program.clone(),
                details: e.to_string(),
            })?;

        let result = CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !result.success() {
            tracing::debug!(
                "Command exited with {:?}: {}",
                result.status,
                result.stderr.trim()
            );
        }

        Ok(result)
    }
}
