use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Missing required config field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Config validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Failed to launch '{program}': {details}")]
    CommandSpawnError { program: String, details: String },

    #[error("Command '{command}' exited with status {status}: {stderr}")]
    CommandFailedError {
        command: String,
        status: i32,
        stderr: String,
    },

    #[error("Unexpected output from '{command}': {message}")]
    UnexpectedOutputError { command: String, message: String },

    #[error("Step '{step}' failed: {details}")]
    StepFailedError { step: String, details: String },

    #[error("Packaging error: {message}")]
    PackagingError { message: String },

    #[error("Startup error: {message}")]
    StartupError { message: String },

    #[error("Health check against {url} failed: {reason}")]
    HealthCheckError { url: String, reason: String },

    #[error("API call to {endpoint} failed: {message}")]
    ApiError {
        endpoint: String,
        status: Option<u16>,
        message: String,
    },
}

/// 錯誤分類，方便日誌過濾與統計
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Config,
    Command,
    Network,
    Packaging,
    Runtime,
}

/// 錯誤嚴重程度，決定 CLI 的退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DeployError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DeployError::MissingConfigError { .. }
            | DeployError::InvalidConfigValueError { .. }
            | DeployError::ConfigValidationError { .. } => ErrorCategory::Config,
            DeployError::CommandSpawnError { .. }
            | DeployError::CommandFailedError { .. }
            | DeployError::UnexpectedOutputError { .. }
            | DeployError::StepFailedError { .. } => ErrorCategory::Command,
            DeployError::HttpError(_)
            | DeployError::HealthCheckError { .. }
            | DeployError::ApiError { .. } => ErrorCategory::Network,
            DeployError::ZipError(_) | DeployError::PackagingError { .. } => {
                ErrorCategory::Packaging
            }
            DeployError::IoError(_)
            | DeployError::SerializationError(_)
            | DeployError::StartupError { .. } => ErrorCategory::Runtime,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            DeployError::MissingConfigError { .. }
            | DeployError::InvalidConfigValueError { .. }
            | DeployError::ConfigValidationError { .. } => ErrorSeverity::High,
            // 找不到外部 CLI 屬於環境問題
            DeployError::CommandSpawnError { .. } => ErrorSeverity::Critical,
            DeployError::CommandFailedError { .. }
            | DeployError::UnexpectedOutputError { .. }
            | DeployError::StepFailedError { .. } => ErrorSeverity::High,
            // 網路錯誤通常重試即可恢復
            DeployError::HttpError(_)
            | DeployError::HealthCheckError { .. }
            | DeployError::ApiError { .. } => ErrorSeverity::Medium,
            DeployError::ZipError(_)
            | DeployError::PackagingError { .. }
            | DeployError::SerializationError(_) => ErrorSeverity::High,
            DeployError::IoError(_) | DeployError::StartupError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            DeployError::MissingConfigError { field } => {
                format!("Add '{}' to deploy.toml or the environment", field)
            }
            DeployError::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}' in deploy.toml", field)
            }
            DeployError::ConfigValidationError { field, .. } => {
                format!("Review the '{}' section of deploy.toml", field)
            }
            DeployError::CommandSpawnError { program, .. } => format!(
                "Make sure '{}' is installed and on PATH (run '{} --version' to check)",
                program, program
            ),
            DeployError::CommandFailedError { command, .. } => format!(
                "Inspect the stderr output above; re-run '{}' manually to reproduce",
                command
            ),
            DeployError::StepFailedError { step, .. } => format!(
                "Fix the underlying failure and re-run; existing resources are detected, so '{}' resumes where it stopped",
                step
            ),
            DeployError::HttpError(_) => {
                "Check network connectivity and that the service URL is reachable".to_string()
            }
            DeployError::HealthCheckError { url, .. } => format!(
                "Confirm the service is running and that {} is the right URL",
                url
            ),
            DeployError::ApiError { endpoint, .. } => format!(
                "Check the service logs for {}; the request is safe to retry",
                endpoint
            ),
            DeployError::ZipError(_) | DeployError::PackagingError { .. } => {
                "Check the app source directory and exclude list in deploy.toml".to_string()
            }
            DeployError::IoError(_) => {
                "Check file permissions and available disk space".to_string()
            }
            DeployError::SerializationError(_) | DeployError::UnexpectedOutputError { .. } => {
                "The external command returned unexpected output; re-run with --verbose".to_string()
            }
            DeployError::StartupError { .. } => {
                "Check the server command and install command in deploy.toml".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            DeployError::MissingConfigError { field } => {
                format!("Configuration is incomplete: '{}' is required", field)
            }
            DeployError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            DeployError::ConfigValidationError { message, .. } => {
                format!("Configuration problem: {}", message)
            }
            DeployError::CommandSpawnError { program, .. } => {
                format!("Could not run '{}' - is it installed?", program)
            }
            DeployError::CommandFailedError {
                command, status, ..
            } => {
                format!("'{}' failed with exit code {}", command, status)
            }
            DeployError::StepFailedError { step, details } => {
                format!("Deployment stopped at step '{}': {}", step, details)
            }
            DeployError::HealthCheckError { url, reason } => {
                format!("Service at {} is not healthy: {}", url, reason)
            }
            DeployError::ApiError {
                endpoint,
                status,
                message,
            } => match status {
                Some(code) => format!("API {} returned HTTP {}: {}", endpoint, code, message),
                None => format!("API {} is unreachable: {}", endpoint, message),
            },
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DeployError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_map_to_high_severity() {
        let err = DeployError::MissingConfigError {
            field: "azure.resource_group".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Config);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_spawn_error_is_critical() {
        let err = DeployError::CommandSpawnError {
            program: "az".to_string(),
            details: "No such file or directory".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.recovery_suggestion().contains("az"));
    }

    #[test]
    fn test_api_error_message_includes_status() {
        let err = DeployError::ApiError {
            endpoint: "/analyze".to_string(),
            status: Some(500),
            message: "internal error".to_string(),
        };
        assert!(err.user_friendly_message().contains("500"));
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }
}
