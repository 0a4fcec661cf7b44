use std::path::Path;
use std::sync::Arc;

use crate::domain::model::{CommandOutput, CommandSpec, RegistryCredentials};
use crate::domain::ports::CommandRunner;
use crate::utils::error::{DeployError, Result};

/// `az acr credential show` 的回應格式
#[derive(Debug, serde::Deserialize)]
struct CredentialShow {
    username: String,
    passwords: Vec<PasswordEntry>,
}

#[derive(Debug, serde::Deserialize)]
struct PasswordEntry {
    value: String,
}

/// Container Instance 建立參數，欄位太多所以收成一個結構
pub struct ContainerParams<'a> {
    pub group: &'a str,
    pub name: &'a str,
    pub image: &'a str,
    pub registry_server: &'a str,
    pub credentials: &'a RegistryCredentials,
    pub dns_label: &'a str,
    pub port: u16,
    pub cpu: f64,
    pub memory_gb: f64,
    pub env: &'a [(String, String)],
}

/// az CLI 的薄封裝，集中參數組裝與輸出解讀
#[derive(Clone)]
pub struct AzCli {
    runner: Arc<dyn CommandRunner>,
}

impl AzCli {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    fn az() -> CommandSpec {
        CommandSpec::new("az")
    }

    /// 執行並要求成功，非零退出碼視為命令失敗
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

    /// show 類探測，退出碼非零一律視為資源不存在
    async fn probe(&self, spec: CommandSpec) -> Result<bool> {
        let output = self.runner.run(&spec).await?;
        Ok(output.success())
    }

    /// 查詢單一值，空輸出視為 az 行為異常
    async fn query_tsv(&self, spec: CommandSpec) -> Result<String> {
        let command = spec.display_line();
        let output = self.run_ok(spec).await?;
        let value = output.stdout_trimmed().to_string();
        if value.is_empty() {
            return Err(DeployError::UnexpectedOutputError {
                command,
                message: "query returned no value".to_string(),
            });
        }
        Ok(value)
    }

    /// `az group exists` 在 stdout 印出字面的 true/false
    pub async fn group_exists(&self, name: &str) -> Result<bool> {
        let spec = Self::az().args(["group", "exists", "--name"]).arg(name);
        let output = self.run_ok(spec).await?;
        Ok(output.stdout_trimmed() == "true")
    }

    pub async fn create_group(&self, name: &str, location: &str) -> Result<()> {
        let spec = Self::az()
            .args(["group", "create", "--name"])
            .arg(name)
            .arg("--location")
            .arg(location);
        self.run_ok(spec).await?;
        Ok(())
    }

    pub async fn delete_group(&self, name: &str) -> Result<()> {
        let spec = Self::az()
            .args(["group", "delete", "--name"])
            .arg(name)
            .arg("--yes");
        self.run_ok(spec).await?;
        Ok(())
    }

    pub async fn plan_exists(&self, group: &str, name: &str) -> Result<bool> {
        let spec = Self::az()
            .args(["appservice", "plan", "show", "--resource-group"])
            .arg(group)
            .arg("--name")
            .arg(name);
        self.probe(spec).await
    }

    pub async fn create_plan(
        &self,
        group: &str,
        name: &str,
        sku: &str,
        is_linux: bool,
    ) -> Result<()> {
        let mut spec = Self::az()
            .args(["appservice", "plan", "create", "--resource-group"])
            .arg(group)
            .arg("--name")
            .arg(name)
            .arg("--sku")
            .arg(sku);
        if is_linux {
            spec = spec.arg("--is-linux");
        }
        self.run_ok(spec).await?;
        Ok(())
    }

    pub async fn registry_exists(&self, group: &str, name: &str) -> Result<bool> {
        let spec = Self::az()
            .args(["acr", "show", "--resource-group"])
            .arg(group)
            .arg("--name")
            .arg(name);
        self.probe(spec).await
    }

    pub async fn create_registry(&self, group: &str, name: &str, sku: &str) -> Result<()> {
        let spec = Self::az()
            .args(["acr", "create", "--resource-group"])
            .arg(group)
            .arg("--name")
            .arg(name)
            .arg("--sku")
            .arg(sku)
            .args(["--admin-enabled", "true"]);
        self.run_ok(spec).await?;
        Ok(())
    }

    /// 管理帳號有兩組密碼，取第一組
    pub async fn registry_credentials(&self, name: &str) -> Result<RegistryCredentials> {
        let spec = Self::az()
            .args(["acr", "credential", "show", "--name"])
            .arg(name);
        let command = spec.display_line();
        let output = self.run_ok(spec).await?;

        let parsed: CredentialShow = serde_json::from_str(output.stdout_trimmed())?;
        let password = parsed
            .passwords
            .into_iter()
            .next()
            .map(|p| p.value)
            .ok_or_else(|| DeployError::UnexpectedOutputError {
                command,
                message: "credential listing contained no passwords".to_string(),
            })?;

        Ok(RegistryCredentials {
            username: parsed.username,
            password,
        })
    }

    pub async fn registry_login_server(&self, name: &str) -> Result<String> {
        let spec = Self::az()
            .args(["acr", "show", "--name"])
            .arg(name)
            .args(["--query", "loginServer", "--output", "tsv"]);
        self.query_tsv(spec).await
    }

    pub async fn webapp_exists(&self, group: &str, name: &str) -> Result<bool> {
        let spec = Self::az()
            .args(["webapp", "show", "--resource-group"])
            .arg(group)
            .arg("--name")
            .arg(name);
        self.probe(spec).await
    }

    pub async fn create_webapp_code(
        &self,
        group: &str,
        plan: &str,
        name: &str,
        runtime: &str,
    ) -> Result<()> {
        let spec = Self::az()
            .args(["webapp", "create", "--resource-group"])
            .arg(group)
            .arg("--plan")
            .arg(plan)
            .arg("--name")
            .arg(name)
            .arg("--runtime")
            .arg(runtime);
        self.run_ok(spec).await?;
        Ok(())
    }

    pub async fn create_webapp_container(
        &self,
        group: &str,
        plan: &str,
        name: &str,
        image: &str,
    ) -> Result<()> {
        let spec = Self::az()
            .args(["webapp", "create", "--resource-group"])
            .arg(group)
            .arg("--plan")
            .arg(plan)
            .arg("--name")
            .arg(name)
            .arg("--deployment-container-image-name")
            .arg(image);
        self.run_ok(spec).await?;
        Ok(())
    }

    /// 把 Web App 指向私有 registry 的映像
    pub async fn configure_container(
        &self,
        group: &str,
        name: &str,
        image: &str,
        registry_server: &str,
        credentials: &RegistryCredentials,
    ) -> Result<()> {
        let spec = Self::az()
            .args(["webapp", "config", "container", "set", "--resource-group"])
            .arg(group)
            .arg("--name")
            .arg(name)
            .arg("--docker-custom-image-name")
            .arg(image)
            .arg("--docker-registry-server-url")
            .arg(format!("https://{}", registry_server))
            .arg("--docker-registry-server-user")
            .arg(&credentials.username)
            .arg("--docker-registry-server-password")
            .secret_arg(&credentials.password);
        self.run_ok(spec).await?;
        Ok(())
    }

    pub async fn configure_appsettings(
        &self,
        group: &str,
        name: &str,
        settings: &[(String, String)],
    ) -> Result<()> {
        let mut spec = Self::az()
            .args(["webapp", "config", "appsettings", "set", "--resource-group"])
            .arg(group)
            .arg("--name")
            .arg(name)
            .arg("--settings");
        for (key, value) in settings {
            spec = spec.arg(format!("{}={}", key, value));
        }
        self.run_ok(spec).await?;
        Ok(())
    }

    pub async fn set_startup_file(&self, group: &str, name: &str, command: &str) -> Result<()> {
        let spec = Self::az()
            .args(["webapp", "config", "set", "--resource-group"])
            .arg(group)
            .arg("--name")
            .arg(name)
            .arg("--startup-file")
            .arg(command);
        self.run_ok(spec).await?;
        Ok(())
    }

    pub async fn zip_deploy(&self, group: &str, name: &str, zip_path: &Path) -> Result<()> {
        let spec = Self::az()
            .args(["webapp", "deploy", "--resource-group"])
            .arg(group)
            .arg("--name")
            .arg(name)
            .arg("--src-path")
            .arg(zip_path.display().to_string())
            .args(["--type", "zip"]);
        self.run_ok(spec).await?;
        Ok(())
    }

    pub async fn restart_webapp(&self, group: &str, name: &str) -> Result<()> {
        let spec = Self::az()
            .args(["webapp", "restart", "--resource-group"])
            .arg(group)
            .arg("--name")
            .arg(name);
        self.run_ok(spec).await?;
        Ok(())
    }

    pub async fn webapp_hostname(&self, group: &str, name: &str) -> Result<String> {
        let spec = Self::az()
            .args(["webapp", "show", "--resource-group"])
            .arg(group)
            .arg("--name")
            .arg(name)
            .args(["--query", "defaultHostName", "--output", "tsv"]);
        self.query_tsv(spec).await
    }

    pub async fn container_exists(&self, group: &str, name: &str) -> Result<bool> {
        let spec = Self::az()
            .args(["container", "show", "--resource-group"])
            .arg(group)
            .arg("--name")
            .arg(name);
        self.probe(spec).await
    }

    pub async fn create_container(&self, params: &ContainerParams<'_>) -> Result<()> {
        let mut spec = Self::az()
            .args(["container", "create", "--resource-group"])
            .arg(params.group)
            .arg("--name")
            .arg(params.name)
            .arg("--image")
            .arg(params.image)
            .arg("--registry-login-server")
            .arg(params.registry_server)
            .arg("--registry-username")
            .arg(&params.credentials.username)
            .arg("--registry-password")
            .secret_arg(&params.credentials.password)
            .arg("--dns-name-label")
            .arg(params.dns_label)
            .arg("--ports")
            .arg(params.port.to_string())
            .arg("--cpu")
            .arg(params.cpu.to_string())
            .arg("--memory")
            .arg(params.memory_gb.to_string())
            .args(["--os-type", "Linux"]);
        if !params.env.is_empty() {
            spec = spec.arg("--environment-variables");
            for (key, value) in params.env {
                spec = spec.arg(format!("{}={}", key, value));
            }
        }
        self.run_ok(spec).await?;
        Ok(())
    }

    pub async fn restart_container(&self, group: &str, name: &str) -> Result<()> {
        let spec = Self::az()
            .args(["container", "restart", "--resource-group"])
            .arg(group)
            .arg("--name")
            .arg(name);
        self.run_ok(spec).await?;
        Ok(())
    }

    pub async fn container_fqdn(&self, group: &str, name: &str) -> Result<String> {
        let spec = Self::az()
            .args(["container", "show", "--resource-group"])
            .arg(group)
            .arg("--name")
            .arg(name)
            .args(["--query", "ipAddress.fqdn", "--output", "tsv"]);
        self.query_tsv(spec).await
    }
}
