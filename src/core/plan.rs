use crate::app::azure::AzCli;
use crate::app::docker::DockerCli;
use crate::app::steps::deploy_steps::{
    ContainerFqdnStep, ContainerInstanceStep, PackageStep, RestartContainerStep,
    RestartWebAppStep, WebAppHostnameStep, ZipDeployStep,
};
use crate::app::steps::registry_steps::{ImageBuildStep, RegistryCredentialsStep, RegistryStep};
use crate::app::steps::resource_steps::{
    AppServicePlanStep, AppSettingsStep, ContainerConfigStep, DeleteGroupStep, ResourceGroupStep,
    StartupFileStep, WebAppKind, WebAppStep,
};
use crate::config::deploy_config::DeployConfig;
use crate::core::step_sequence::StepSequence;
use crate::domain::model::DeployTarget;
use crate::startup;
use crate::utils::error::Result;

/// 依部署目標組出佈建步驟
pub fn provision_plan(
    config: &DeployConfig,
    az: &AzCli,
    docker: &DockerCli,
    execution_id: String,
) -> Result<StepSequence> {
    let mut sequence =
        StepSequence::new(execution_id).with_monitoring(config.monitoring_enabled());
    let group = &config.azure.resource_group;

    sequence.add_step(Box::new(ResourceGroupStep::new(
        az.clone(),
        group,
        &config.azure.location,
    )));

    match config.project.target {
        DeployTarget::AppserviceCode => {
            let plan = config.require_plan()?;
            let webapp = config.require_webapp()?;
            let runtime = webapp.runtime.clone().ok_or_else(|| {
                crate::utils::error::DeployError::MissingConfigError {
                    field: "webapp.runtime".to_string(),
                }
            })?;

            sequence.add_step(Box::new(AppServicePlanStep::new(
                az.clone(),
                group,
                &plan.name,
                &plan.sku,
                plan.linux,
            )));
            sequence.add_step(Box::new(WebAppStep::new(
                az.clone(),
                group,
                &plan.name,
                &webapp.name,
                WebAppKind::Code { runtime },
            )));
            sequence.add_step(Box::new(AppSettingsStep::new(
                az.clone(),
                group,
                &webapp.name,
                config.app_settings(),
            )));
            if let Some(startup_command) = &webapp.startup_command {
                let command = startup::substitute_placeholders(
                    startup_command,
                    config.app.port,
                    config.app.workers,
                );
                sequence.add_step(Box::new(StartupFileStep::new(
                    az.clone(),
                    group,
                    &webapp.name,
                    command,
                )));
            }
            sequence.add_step(Box::new(WebAppHostnameStep::new(
                az.clone(),
                group,
                &webapp.name,
            )));
        }
        DeployTarget::AppserviceContainer => {
            let plan = config.require_plan()?;
            let webapp = config.require_webapp()?;
            let registry = config.require_registry()?;
            let image = config.require_image()?;

            sequence.add_step(Box::new(AppServicePlanStep::new(
                az.clone(),
                group,
                &plan.name,
                &plan.sku,
                plan.linux,
            )));
            sequence.add_step(Box::new(RegistryStep::new(
                az.clone(),
                group,
                &registry.name,
                &registry.sku,
            )));
            sequence.add_step(Box::new(RegistryCredentialsStep::new(
                az.clone(),
                &registry.name,
            )));
            sequence.add_step(Box::new(WebAppStep::new(
                az.clone(),
                group,
                &plan.name,
                &webapp.name,
                WebAppKind::Container {
                    image_name: image.name.clone(),
                    image_tag: image.tag.clone(),
                },
            )));
            sequence.add_step(Box::new(ContainerConfigStep::new(
                az.clone(),
                group,
                &webapp.name,
                &image.name,
                &image.tag,
            )));
            sequence.add_step(Box::new(AppSettingsStep::new(
                az.clone(),
                group,
                &webapp.name,
                config.app_settings(),
            )));
            sequence.add_step(Box::new(WebAppHostnameStep::new(
                az.clone(),
                group,
                &webapp.name,
            )));
        }
        DeployTarget::ContainerInstance => {
            let registry = config.require_registry()?;
            let image = config.require_image()?;
            let container = config.require_container()?;

            sequence.add_step(Box::new(RegistryStep::new(
                az.clone(),
                group,
                &registry.name,
                &registry.sku,
            )));
            sequence.add_step(Box::new(RegistryCredentialsStep::new(
                az.clone(),
                &registry.name,
            )));
            // Container Instance 建立時就要拉映像，先推上去
            sequence.add_step(Box::new(ImageBuildStep::new(
                docker.clone(),
                &image.context_dir,
                &image.name,
                &image.tag,
            )));
            sequence.add_step(Box::new(ContainerInstanceStep::new(
                az.clone(),
                group,
                &container.name,
                &container.dns_label,
                container.cpu,
                container.memory_gb,
                &image.name,
                &image.tag,
                config.app.port,
                config.container_env(),
            )));
            sequence.add_step(Box::new(ContainerFqdnStep::new(
                az.clone(),
                group,
                &container.name,
                config.app.port,
            )));
        }
    }

    Ok(sequence)
}

/// 部署新版程式或映像到已佈建好的資源
pub fn deploy_plan(
    config: &DeployConfig,
    az: &AzCli,
    docker: &DockerCli,
    execution_id: String,
) -> Result<StepSequence> {
    let mut sequence =
        StepSequence::new(execution_id).with_monitoring(config.monitoring_enabled());
    let group = &config.azure.resource_group;

    match config.project.target {
        DeployTarget::AppserviceCode => {
            let webapp = config.require_webapp()?;
            let zip_path =
                std::env::temp_dir().join(format!("{}-deploy.zip", config.project.name));

            sequence.add_step(Box::new(PackageStep::new(
                &config.app.source_dir,
                config.app.excludes.clone(),
                zip_path,
            )));
            sequence.add_step(Box::new(ZipDeployStep::new(
                az.clone(),
                group,
                &webapp.name,
            )));
            sequence.add_step(Box::new(WebAppHostnameStep::new(
                az.clone(),
                group,
                &webapp.name,
            )));
        }
        DeployTarget::AppserviceContainer => {
            let webapp = config.require_webapp()?;
            let registry = config.require_registry()?;
            let image = config.require_image()?;

            sequence.add_step(Box::new(RegistryCredentialsStep::new(
                az.clone(),
                &registry.name,
            )));
            sequence.add_step(Box::new(ImageBuildStep::new(
                docker.clone(),
                &image.context_dir,
                &image.name,
                &image.tag,
            )));
            // 重啟讓 Web App 重新拉映像
            sequence.add_step(Box::new(RestartWebAppStep::new(
                az.clone(),
                group,
                &webapp.name,
            )));
            sequence.add_step(Box::new(WebAppHostnameStep::new(
                az.clone(),
                group,
                &webapp.name,
            )));
        }
        DeployTarget::ContainerInstance => {
            let registry = config.require_registry()?;
            let image = config.require_image()?;
            let container = config.require_container()?;

            sequence.add_step(Box::new(RegistryCredentialsStep::new(
                az.clone(),
                &registry.name,
            )));
            sequence.add_step(Box::new(ImageBuildStep::new(
                docker.clone(),
                &image.context_dir,
                &image.name,
                &image.tag,
            )));
            sequence.add_step(Box::new(RestartContainerStep::new(
                az.clone(),
                group,
                &container.name,
            )));
            sequence.add_step(Box::new(ContainerFqdnStep::new(
                az.clone(),
                group,
                &container.name,
                config.app.port,
            )));
        }
    }

    Ok(sequence)
}

/// 拆除：整個 resource group 一次刪掉
pub fn teardown_plan(
    config: &DeployConfig,
    az: &AzCli,
    execution_id: String,
) -> Result<StepSequence> {
    let mut sequence =
        StepSequence::new(execution_id).with_monitoring(config.monitoring_enabled());
    sequence.add_step(Box::new(DeleteGroupStep::new(
        az.clone(),
        &config.azure.resource_group,
    )));
    Ok(sequence)
}
