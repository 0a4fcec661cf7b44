use std::path::PathBuf;
use std::time::Duration;

use crate::app::azure::AzCli;
use crate::app::docker::DockerCli;
use crate::app::steps::REGISTRY_SERVER_KEY;
use crate::core::step_sequence::{ProvisionStep, StepContext};
use crate::domain::model::{StepResult, StepStatus};
use crate::utils::error::Result;

use super::resource_steps::{require_credentials, require_registry_server};

pub struct RegistryStep {
    az: AzCli,
    group: String,
    name: String,
    sku: String,
}

impl RegistryStep {
    pub fn new(
        az: AzCli,
        group: impl Into<String>,
        name: impl Into<String>,
        sku: impl Into<String>,
    ) -> Self {
        Self {
            az,
            group: group.into(),
            name: name.into(),
            sku: sku.into(),
        }
    }
}

#[async_trait::async_trait]
impl ProvisionStep for RegistryStep {
    fn name(&self) -> &str {
        "container_registry"
    }

    async fn check_exists(&self, _context: &StepContext) -> Result<bool> {
        self.az.registry_exists(&self.group, &self.name).await
    }

    async fn execute(&self, _context: &mut StepContext) -> Result<StepResult> {
        self.az
            .create_registry(&self.group, &self.name, &self.sku)
            .await?;
        Ok(
            StepResult::new(self.name(), StepStatus::Created, Duration::ZERO)
                .with_detail(format!("{} ({})", self.name, self.sku)),
        )
    }
}

/// 讀出 registry 的登入位址與管理帳號，寫進上下文給後面的步驟。
/// 資源已存在的重跑也需要這一步，所以沒有 check_exists
pub struct RegistryCredentialsStep {
    az: AzCli,
    registry_name: String,
}

impl RegistryCredentialsStep {
    pub fn new(az: AzCli, registry_name: impl Into<String>) -> Self {
        Self {
            az,
            registry_name: registry_name.into(),
        }
    }
}

#[async_trait::async_trait]
impl ProvisionStep for RegistryCredentialsStep {
    fn name(&self) -> &str {
        "registry_credentials"
    }

    async fn execute(&self, context: &mut StepContext) -> Result<StepResult> {
        let server = self.az.registry_login_server(&self.registry_name).await?;
        let credentials = self.az.registry_credentials(&self.registry_name).await?;

        context.set_value(REGISTRY_SERVER_KEY, &server);
        context.set_credentials(credentials);

        Ok(StepResult::new(self.name(), StepStatus::Done, Duration::ZERO).with_detail(server))
    }
}

/// Build 本地映像、打上 registry 標籤、推上去
pub struct ImageBuildStep {
    docker: DockerCli,
    context_dir: PathBuf,
    image_name: String,
    image_tag: String,
}

impl ImageBuildStep {
    pub fn new(
        docker: DockerCli,
        context_dir: impl Into<PathBuf>,
        image_name: impl Into<String>,
        image_tag: impl Into<String>,
    ) -> Self {
        Self {
            docker,
            context_dir: context_dir.into(),
            image_name: image_name.into(),
            image_tag: image_tag.into(),
        }
    }
}

#[async_trait::async_trait]
impl ProvisionStep for ImageBuildStep {
    fn name(&self) -> &str {
        "image_build_push"
    }

    async fn execute(&self, context: &mut StepContext) -> Result<StepResult> {
        let server = require_registry_server(self.name(), context)?;
        let credentials = require_credentials(self.name(), context)?;

        let local_tag = format!("{}:{}", self.image_name, self.image_tag);
        let remote_tag = super::image_ref(&server, &self.image_name, &self.image_tag);

        self.docker.login(&server, &credentials).await?;
        self.docker.build(&self.context_dir, &local_tag).await?;
        self.docker.tag(&local_tag, &remote_tag).await?;
        self.docker.push(&remote_tag).await?;

        Ok(StepResult::new(self.name(), StepStatus::Done, Duration::ZERO).with_detail(remote_tag))
    }
}
