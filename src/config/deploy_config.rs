use crate::domain::model::DeployTarget;
use crate::utils::error::{DeployError, Result};
use crate::utils::validation::{
    self, Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    pub project: ProjectConfig,
    pub azure: AzureConfig,
    pub plan: Option<PlanConfig>,
    pub webapp: Option<WebAppConfig>,
    pub registry: Option<RegistryConfig>,
    pub image: Option<ImageConfig>,
    pub container: Option<ContainerConfig>,
    #[serde(default)]
    pub app: AppConfig,
    pub api: Option<ApiConfig>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    pub target: DeployTarget,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureConfig {
    pub resource_group: String,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanConfig {
    pub name: String,
    #[serde(default = "default_plan_sku")]
    pub sku: String,
    #[serde(default = "default_true")]
    pub linux: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebAppConfig {
    pub name: String,
    pub runtime: Option<String>,        // 例如 "PYTHON:3.11"，code 部署才需要
    pub startup_command: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub name: String,
    #[serde(default = "default_registry_sku")]
    pub sku: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    pub name: String,
    #[serde(default = "default_image_tag")]
    pub tag: String,
    #[serde(default = "default_dir")]
    pub context_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerConfig {
    pub name: String,
    pub dns_label: String,
    #[serde(default = "default_cpu")]
    pub cpu: f64,
    #[serde(default = "default_memory_gb")]
    pub memory_gb: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_dir")]
    pub source_dir: String,
    #[serde(default = "default_excludes")]
    pub excludes: Vec<String>,
    /// 伺服器啟動命令，{port} 和 {workers} 會被替換
    #[serde(default)]
    pub server_command: Vec<String>,
    #[serde(default = "default_workers")]
    pub workers: u32,
    pub install_command: Option<Vec<String>>,
    pub install_probe: Option<Vec<String>>,
    /// 額外的 app settings，PORT 與 WEBSITES_PORT 之外的部分
    #[serde(default)]
    pub settings: HashMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            source_dir: default_dir(),
            excludes: default_excludes(),
            server_command: Vec::new(),
            workers: default_workers(),
            install_command: None,
            install_probe: None,
            settings: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
}

fn default_plan_sku() -> String {
    "B1".to_string()
}

fn default_registry_sku() -> String {
    "Basic".to_string()
}

fn default_image_tag() -> String {
    "latest".to_string()
}

fn default_dir() -> String {
    ".".to_string()
}

fn default_true() -> bool {
    true
}

fn default_port() -> u16 {
    8000
}

fn default_excludes() -> Vec<String> {
    [".git", "target", "__pycache__", ".venv", "venv"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn default_workers() -> u32 {
    2
}

fn default_cpu() -> f64 {
    1.0
}

fn default_memory_gb() -> f64 {
    1.5
}

fn default_timeout_seconds() -> u64 {
    30
}

impl DeployConfig {
    /// 從 TOML 檔案載入部署配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DeployError::IoError)?;
        Self::from_str(&content)
    }

    /// 從 TOML 字串解析部署配置
    pub fn from_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DeployError::ConfigValidationError {
            field: "deploy_toml_parsing".to_string(),
            message: format!("Deploy TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證部署配置，缺漏的區段依部署目標判斷
    pub fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("project.name", &self.project.name)?;
        validation::validate_resource_group_name(
            "azure.resource_group",
            &self.azure.resource_group,
        )?;
        validation::validate_non_empty_string("azure.location", &self.azure.location)?;
        validation::validate_port("app.port", self.app.port)?;
        validation::validate_path("app.source_dir", &self.app.source_dir)?;
        validation::validate_range("app.workers", self.app.workers, 1, 64)?;

        if let Some(webapp) = &self.webapp {
            validation::validate_dns_name("webapp.name", &webapp.name)?;
        }
        if let Some(image) = &self.image {
            validation::validate_path("image.context_dir", &image.context_dir)?;
        }
        if let Some(registry) = &self.registry {
            validation::validate_registry_name("registry.name", &registry.name)?;
        }
        if let Some(container) = &self.container {
            validation::validate_dns_name("container.name", &container.name)?;
            validation::validate_dns_name("container.dns_label", &container.dns_label)?;
            validation::validate_positive_number("container.cpu", container.cpu, 0.1)?;
            validation::validate_positive_number(
                "container.memory_gb",
                container.memory_gb,
                0.1,
            )?;
        }
        if let Some(api) = &self.api {
            validation::validate_url("api.base_url", &api.base_url)?;
        }

        // 各部署目標必備的區段
        match self.project.target {
            DeployTarget::AppserviceCode => {
                self.require_plan()?;
                let webapp = self.require_webapp()?;
                if webapp.runtime.is_none() {
                    return Err(DeployError::MissingConfigError {
                        field: "webapp.runtime".to_string(),
                    });
                }
            }
            DeployTarget::AppserviceContainer => {
                self.require_plan()?;
                self.require_webapp()?;
                self.require_registry()?;
                self.require_image()?;
            }
            DeployTarget::ContainerInstance => {
                self.require_registry()?;
                self.require_image()?;
                self.require_container()?;
            }
        }

        Ok(())
    }

    pub fn require_plan(&self) -> Result<&PlanConfig> {
        self.plan.as_ref().ok_or_else(|| DeployError::MissingConfigError {
            field: "plan".to_string(),
        })
    }

    pub fn require_webapp(&self) -> Result<&WebAppConfig> {
        self.webapp
            .as_ref()
            .ok_or_else(|| DeployError::MissingConfigError {
                field: "webapp".to_string(),
            })
    }

    pub fn require_registry(&self) -> Result<&RegistryConfig> {
        self.registry
            .as_ref()
            .ok_or_else(|| DeployError::MissingConfigError {
                field: "registry".to_string(),
            })
    }

    pub fn require_image(&self) -> Result<&ImageConfig> {
        self.image
            .as_ref()
            .ok_or_else(|| DeployError::MissingConfigError {
                field: "image".to_string(),
            })
    }

    pub fn require_container(&self) -> Result<&ContainerConfig> {
        self.container
            .as_ref()
            .ok_or_else(|| DeployError::MissingConfigError {
                field: "container".to_string(),
            })
    }

    pub fn require_api(&self) -> Result<&ApiConfig> {
        self.api.as_ref().ok_or_else(|| DeployError::MissingConfigError {
            field: "api".to_string(),
        })
    }

    /// 完整映像位址：<login server>/<name>:<tag>
    pub fn image_ref(&self, login_server: &str) -> Result<String> {
        let image = self.require_image()?;
        Ok(format!("{}/{}:{}", login_server, image.name, image.tag))
    }

    /// Web App 的 app settings，永遠包含連接埠設定
    pub fn app_settings(&self) -> Vec<(String, String)> {
        let port = self.app.port.to_string();
        let mut settings = vec![
            ("WEBSITES_PORT".to_string(), port.clone()),
            ("PORT".to_string(), port),
        ];

        // HashMap 沒有順序，排序讓輸出穩定
        let mut extra: Vec<_> = self
            .app
            .settings
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        extra.sort();
        settings.extend(extra);
        settings
    }

    /// Container Instance 的環境變數，不含 App Service 專屬的 WEBSITES_PORT
    pub fn container_env(&self) -> Vec<(String, String)> {
        let mut env = vec![("PORT".to_string(), self.app.port.to_string())];
        let mut extra: Vec<_> = self
            .app
            .settings
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        extra.sort();
        env.extend(extra);
        env
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl Validate for DeployConfig {
    fn validate(&self) -> Result<()> {
        self.validate()
    }
}
