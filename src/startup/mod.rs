use crate::config::deploy_config::AppConfig;
use crate::domain::model::CommandSpec;
use crate::utils::error::{DeployError, Result};

/// 啟動命令裡的 {port} 和 {workers} 佔位符替換
pub fn substitute_placeholders(text: &str, port: u16, workers: u32) -> String {
    text.replace("{port}", &port.to_string())
        .replace("{workers}", &workers.to_string())
}

/// 連接埠決定順序：PORT 環境變數 > 配置 > 8000
pub fn resolve_port(config_port: u16) -> u16 {
    resolve_port_from(std::env::var("PORT").ok().as_deref(), config_port)
}

fn resolve_port_from(env_port: Option<&str>, config_port: u16) -> u16 {
    match env_port.and_then(|value| value.parse::<u16>().ok()) {
        Some(port) if port > 0 => port,
        _ => {
            if config_port > 0 {
                config_port
            } else {
                8000
            }
        }
    }
}

/// 依賴安裝：探測命令成功就跳過，失敗或沒設探測就跑安裝
pub async fn ensure_dependencies(app: &AppConfig) -> Result<()> {
    let Some(install_command) = &app.install_command else {
        return Ok(());
    };

    if let Some(probe) = &app.install_probe {
        if run_probe(probe).await? {
            tracing::info!("✅ Dependencies already installed");
            return Ok(());
        }
    }

    tracing::info!("📥 Installing dependencies...");
    run_install(install_command).await
}

async fn run_probe(argv: &[String]) -> Result<bool> {
    let (program, args) = split_argv(argv, "app.install_probe")?;
    let output = tokio::process::Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|e| DeployError::CommandSpawnError {
            program: program.to_string(),
            details: e.to_string(),
        })?;
    Ok(output.status.success())
}

async fn run_install(argv: &[String]) -> Result<()> {
    let (program, args) = split_argv(argv, "app.install_command")?;
    // 繼承 stdio，安裝進度直接顯示
    let status = tokio::process::Command::new(program)
        .args(args)
        .status()
        .await
        .map_err(|e| DeployError::CommandSpawnError {
            program: program.to_string(),
            details: e.to_string(),
        })?;

    if !status.success() {
        return Err(DeployError::StartupError {
            message: format!("dependency install exited with {:?}", status.code()),
        });
    }
    Ok(())
}

fn split_argv<'a>(argv: &'a [String], field: &str) -> Result<(&'a str, &'a [String])> {
    match argv.split_first() {
        Some((program, args)) => Ok((program.as_str(), args)),
        None => Err(DeployError::InvalidConfigValueError {
            field: field.to_string(),
            value: "[]".to_string(),
            reason: "command must have at least a program name".to_string(),
        }),
    }
}

/// 安裝依賴後把行程交給伺服器，回傳子行程的退出碼
pub async fn launch(app: &AppConfig) -> Result<i32> {
    if app.server_command.is_empty() {
        return Err(DeployError::InvalidConfigValueError {
            field: "app.server_command".to_string(),
            value: "[]".to_string(),
            reason: "server command must not be empty".to_string(),
        });
    }

    let port = resolve_port(app.port);
    let argv: Vec<String> = app
        .server_command
        .iter()
        .map(|part| substitute_placeholders(part, port, app.workers))
        .collect();

    ensure_dependencies(app).await?;

    let spec = CommandSpec::new(&argv[0])
        .args(argv[1..].iter().cloned())
        .env("PORT", port.to_string())
        .current_dir(&app.source_dir);

    tracing::info!("🚀 Starting server on port {}: {}", port, spec.display_line());

    let mut command = tokio::process::Command::new(&spec.program);
    command.args(&spec.args);
    for (key, value) in &spec.env {
        command.env(key, value);
    }
    if let Some(dir) = &spec.current_dir {
        command.current_dir(dir);
    }

    let status = command
        .status()
        .await
        .map_err(|e| DeployError::CommandSpawnError {
            program: spec.program.clone(),
            details: e.to_string(),
        })?;

    match status.code() {
        Some(code) => Ok(code),
        None => {
            tracing::warn!("Server terminated by signal");
            Ok(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_placeholders() {
        assert_eq!(
            substitute_placeholders("gunicorn --bind 0.0.0.0:{port} --workers {workers}", 8000, 2),
            "gunicorn --bind 0.0.0.0:8000 --workers 2"
        );
        assert_eq!(substitute_placeholders("uvicorn app:app", 8000, 2), "uvicorn app:app");
    }

    #[test]
    fn test_resolve_port_order() {
        // 環境變數優先
        assert_eq!(resolve_port_from(Some("9000"), 8000), 9000);
        // 解析不了就退回配置
        assert_eq!(resolve_port_from(Some("not-a-port"), 8080), 8080);
        assert_eq!(resolve_port_from(None, 8080), 8080);
        // 最後的預設值
        assert_eq!(resolve_port_from(Some("0"), 0), 8000);
    }

    #[tokio::test]
    async fn test_launch_rejects_empty_command() {
        let app = AppConfig::default();

        let error = launch(&app).await.unwrap_err();
        match error {
            DeployError::InvalidConfigValueError { field, .. } => {
                assert_eq!(field, "app.server_command")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_launch_returns_child_exit_code() {
        let app = AppConfig {
            server_command: vec!["sh".to_string(), "-c".to_string(), "exit 7".to_string()],
            ..AppConfig::default()
        };

        let code = launch(&app).await.unwrap();
        assert_eq!(code, 7);
    }

    #[tokio::test]
    async fn test_launch_exports_port() {
        let app = AppConfig {
            port: 9123,
            server_command: vec![
                "sh".to_string(),
                "-c".to_string(),
                "test -n \"$PORT\"".to_string(),
            ],
            ..AppConfig::default()
        };

        let code = launch(&app).await.unwrap();
        assert_eq!(code, 0);
    }
}
