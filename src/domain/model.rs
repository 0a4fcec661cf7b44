use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::utils::error::{DeployError, Result};

/// 部署目標，決定要建立哪一組雲端資源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeployTarget {
    AppserviceCode,
    AppserviceContainer,
    ContainerInstance,
}

impl DeployTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeployTarget::AppserviceCode => "appservice-code",
            DeployTarget::AppserviceContainer => "appservice-container",
            DeployTarget::ContainerInstance => "container-instance",
        }
    }

    /// 容器目標需要 registry 與 docker 相關步驟
    pub fn uses_containers(&self) -> bool {
        !matches!(self, DeployTarget::AppserviceCode)
    }
}

impl fmt::Display for DeployTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DeployTarget {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "appservice-code" => Ok(DeployTarget::AppserviceCode),
            "appservice-container" => Ok(DeployTarget::AppserviceContainer),
            "container-instance" => Ok(DeployTarget::ContainerInstance),
            other => Err(DeployError::InvalidConfigValueError {
                field: "target".to_string(),
                value: other.to_string(),
                reason: "expected appservice-code, appservice-container or container-instance"
                    .to_string(),
            }),
        }
    }
}

/// 單一步驟結束後的狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Created,
    AlreadyExists,
    Skipped,
    Done,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StepStatus::Created => "created",
            StepStatus::AlreadyExists => "already exists",
            StepStatus::Skipped => "skipped",
            StepStatus::Done => "done",
        };
        write!(f, "{}", text)
    }
}

#[derive(Debug, Clone)]
pub struct StepResult {
    pub step_name: String,
    pub status: StepStatus,
    pub detail: Option<String>,
    pub duration: Duration,
}

impl StepResult {
    pub fn new(step_name: impl Into<String>, status: StepStatus, duration: Duration) -> Self {
        Self {
            step_name: step_name.into(),
            status,
            detail: None,
            duration,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// 要執行的外部命令。secret 參數只記索引，日誌輸出時遮罩
#[derive(Debug, Clone, Default)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub current_dir: Option<PathBuf>,
    secret_indices: Vec<usize>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            current_dir: None,
            secret_indices: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// 密碼之類的參數走這裡，值照常傳給子行程但不會進日誌
    pub fn secret_arg(mut self, arg: impl Into<String>) -> Self {
        self.secret_indices.push(self.args.len());
        self.args.push(arg.into());
        self
    }

    pub fn is_secret(&self, index: usize) -> bool {
        self.secret_indices.contains(&index)
    }

    /// 給日誌用的一行指令，secret 參數顯示為 ***
    pub fn display_line(&self) -> String {
        let mut parts = vec![self.program.clone()];
        for (i, arg) in self.args.iter().enumerate() {
            if self.is_secret(i) {
                parts.push("***".to_string());
            } else {
                parts.push(arg.clone());
            }
        }
        parts.join(" ")
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_line())
    }
}

/// 子行程的完整輸出，status 為 None 表示被 signal 終止
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    pub fn stdout_trimmed(&self) -> &str {
        self.stdout.trim()
    }

    /// 解析 stdout 為 JSON，az 的預設輸出格式
    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(self.stdout_trimmed())?)
    }
}

/// Container registry 的管理帳號，Debug 輸出不顯示密碼
#[derive(Clone)]
pub struct RegistryCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for RegistryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deploy_target_parsing() {
        assert_eq!(
            "appservice-code".parse::<DeployTarget>().unwrap(),
            DeployTarget::AppserviceCode
        );
        assert_eq!(
            "container-instance".parse::<DeployTarget>().unwrap(),
            DeployTarget::ContainerInstance
        );
        assert!("virtual-machine".parse::<DeployTarget>().is_err());
    }

    #[test]
    fn test_display_line_masks_secrets() {
        let spec = CommandSpec::new("docker")
            .args(["login", "myreg.azurecr.io", "--username", "admin"])
            .arg("--password")
            .secret_arg("s3cr3t");

        let line = spec.display_line();
        assert!(line.contains("--password ***"));
        assert!(!line.contains("s3cr3t"));
        // 傳給子行程的參數不受遮罩影響
        assert_eq!(spec.args.last().unwrap(), "s3cr3t");
    }

    #[test]
    fn test_command_output_json() {
        let output = CommandOutput {
            status: Some(0),
            stdout: "  {\"username\": \"admin\"}\n".to_string(),
            stderr: String::new(),
        };
        assert!(output.success());
        let value = output.json().unwrap();
        assert_eq!(value["username"], "admin");
    }
}
