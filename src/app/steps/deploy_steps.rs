use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app::azure::{AzCli, ContainerParams};
use crate::app::steps::{BASE_URL_KEY, ZIP_PATH_KEY};
use crate::core::step_sequence::{ProvisionStep, StepContext};
use crate::domain::model::{StepResult, StepStatus};
use crate::package;
use crate::utils::error::{DeployError, Result};

use super::resource_steps::{require_credentials, require_registry_server};

/// 打包應用程式原始碼成 zip，路徑寫進上下文
pub struct PackageStep {
    source_dir: PathBuf,
    excludes: Vec<String>,
    output_path: PathBuf,
}

impl PackageStep {
    pub fn new(
        source_dir: impl Into<PathBuf>,
        excludes: Vec<String>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            excludes,
            output_path: output_path.into(),
        }
    }
}

#[async_trait::async_trait]
impl ProvisionStep for PackageStep {
    fn name(&self) -> &str {
        "package"
    }

    async fn execute(&self, context: &mut StepContext) -> Result<StepResult> {
        let size = package::write_package(&self.source_dir, &self.excludes, &self.output_path)?;

        context.set_value(ZIP_PATH_KEY, self.output_path.display().to_string());

        Ok(
            StepResult::new(self.name(), StepStatus::Done, Duration::ZERO).with_detail(format!(
                "{} ({} bytes)",
                self.output_path.display(),
                size
            )),
        )
    }
}

pub struct ZipDeployStep {
    az: AzCli,
    group: String,
    webapp: String,
}

impl ZipDeployStep {
    pub fn new(az: AzCli, group: impl Into<String>, webapp: impl Into<String>) -> Self {
        Self {
            az,
            group: group.into(),
            webapp: webapp.into(),
        }
    }
}

#[async_trait::async_trait]
impl ProvisionStep for ZipDeployStep {
    fn name(&self) -> &str {
        "zip_deploy"
    }

    async fn execute(&self, context: &mut StepContext) -> Result<StepResult> {
        let zip_path = context
            .get_value(ZIP_PATH_KEY)
            .map(str::to_string)
            .ok_or_else(|| DeployError::StepFailedError {
                step: self.name().to_string(),
                details: "zip path missing from context (package step must run first)".to_string(),
            })?;

        self.az
            .zip_deploy(&self.group, &self.webapp, Path::new(&zip_path))
            .await?;

        Ok(StepResult::new(self.name(), StepStatus::Done, Duration::ZERO).with_detail(zip_path))
    }
}

pub struct ContainerInstanceStep {
    az: AzCli,
    group: String,
    name: String,
    dns_label: String,
    cpu: f64,
    memory_gb: f64,
    image_name: String,
    image_tag: String,
    port: u16,
    env: Vec<(String, String)>,
}

impl ContainerInstanceStep {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        az: AzCli,
        group: impl Into<String>,
        name: impl Into<String>,
        dns_label: impl Into<String>,
        cpu: f64,
        memory_gb: f64,
        image_name: impl Into<String>,
        image_tag: impl Into<String>,
        port: u16,
        env: Vec<(String, String)>,
    ) -> Self {
        Self {
            az,
            group: group.into(),
            name: name.into(),
            dns_label: dns_label.into(),
            cpu,
            memory_gb,
            image_name: image_name.into(),
            image_tag: image_tag.into(),
            port,
            env,
        }
    }
}

#[async_trait::async_trait]
impl ProvisionStep for ContainerInstanceStep {
    fn name(&self) -> &str {
        "container_instance"
    }

    async fn check_exists(&self, _context: &StepContext) -> Result<bool> {
        self.az.container_exists(&self.group, &self.name).await
    }

    async fn execute(&self, context: &mut StepContext) -> Result<StepResult> {
        let server = require_registry_server(self.name(), context)?;
        let credentials = require_credentials(self.name(), context)?;
        let image = super::image_ref(&server, &self.image_name, &self.image_tag);

        let params = ContainerParams {
            group: &self.group,
            name: &self.name,
            image: &image,
            registry_server: &server,
            credentials: &credentials,
            dns_label: &self.dns_label,
            port: self.port,
            cpu: self.cpu,
            memory_gb: self.memory_gb,
            env: &self.env,
        };
        self.az.create_container(&params).await?;

        Ok(StepResult::new(self.name(), StepStatus::Created, Duration::ZERO).with_detail(image))
    }
}

pub struct RestartWebAppStep {
    az: AzCli,
    group: String,
    webapp: String,
}

impl RestartWebAppStep {
    pub fn new(az: AzCli, group: impl Into<String>, webapp: impl Into<String>) -> Self {
        Self {
            az,
            group: group.into(),
            webapp: webapp.into(),
        }
    }
}

#[async_trait::async_trait]
impl ProvisionStep for RestartWebAppStep {
    fn name(&self) -> &str {
        "restart"
    }

    async fn execute(&self, _context: &mut StepContext) -> Result<StepResult> {
        self.az.restart_webapp(&self.group, &self.webapp).await?;
        Ok(
            StepResult::new(self.name(), StepStatus::Done, Duration::ZERO)
                .with_detail(self.webapp.clone()),
        )
    }
}

pub struct RestartContainerStep {
    az: AzCli,
    group: String,
    name: String,
}

impl RestartContainerStep {
    pub fn new(az: AzCli, group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            az,
            group: group.into(),
            name: name.into(),
        }
    }
}

#[async_trait::async_trait]
impl ProvisionStep for RestartContainerStep {
    fn name(&self) -> &str {
        "restart"
    }

    async fn execute(&self, _context: &mut StepContext) -> Result<StepResult> {
        self.az.restart_container(&self.group, &self.name).await?;
        Ok(
            StepResult::new(self.name(), StepStatus::Done, Duration::ZERO)
                .with_detail(self.name.clone()),
        )
    }
}

/// 查出 Web App 的對外網址，驗證健康檢查要用
pub struct WebAppHostnameStep {
    az: AzCli,
    group: String,
    webapp: String,
}

impl WebAppHostnameStep {
    pub fn new(az: AzCli, group: impl Into<String>, webapp: impl Into<String>) -> Self {
        Self {
            az,
            group: group.into(),
            webapp: webapp.into(),
        }
    }
}

#[async_trait::async_trait]
impl ProvisionStep for WebAppHostnameStep {
    fn name(&self) -> &str {
        "endpoint"
    }

    async fn execute(&self, context: &mut StepContext) -> Result<StepResult> {
        let hostname = self.az.webapp_hostname(&self.group, &self.webapp).await?;
        let base_url = format!("https://{}", hostname);

        tracing::info!("🌐 Service URL: {}", base_url);
        context.set_value(BASE_URL_KEY, &base_url);

        Ok(StepResult::new(self.name(), StepStatus::Done, Duration::ZERO).with_detail(base_url))
    }
}

/// Container Instance 的對外 FQDN
pub struct ContainerFqdnStep {
    az: AzCli,
    group: String,
    name: String,
    port: u16,
}

impl ContainerFqdnStep {
    pub fn new(az: AzCli, group: impl Into<String>, name: impl Into<String>, port: u16) -> Self {
        Self {
            az,
            group: group.into(),
            name: name.into(),
            port,
        }
    }
}

#[async_trait::async_trait]
impl ProvisionStep for ContainerFqdnStep {
    fn name(&self) -> &str {
        "endpoint"
    }

    async fn execute(&self, context: &mut StepContext) -> Result<StepResult> {
        let fqdn = self.az.container_fqdn(&self.group, &self.name).await?;
        let base_url = format!("http://{}:{}", fqdn, self.port);

        tracing::info!("🌐 Service URL: {}", base_url);
        context.set_value(BASE_URL_KEY, &base_url);

        Ok(StepResult::new(self.name(), StepStatus::Done, Duration::ZERO).with_detail(base_url))
    }
}
