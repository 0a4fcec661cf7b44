use std::time::Duration;

use analyzer_deploy::config::deploy_config::MonitoringConfig;
use analyzer_deploy::core::step_sequence::StepSequence;
use analyzer_deploy::domain::model::StepResult;
use analyzer_deploy::utils::logger;
use analyzer_deploy::{startup, verify, Cli, Commands, DeployConfig, DeployEngine, DeployError};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting analyzer-deploy CLI");
    tracing::info!("📁 Loading deployment configuration from: {}", cli.config);

    // 載入部署配置
    let mut config = match DeployConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    // CLI 的 --monitor 覆蓋配置裡的監控設定
    if let Some(monitor) = cli.monitor {
        let log_level = config
            .monitoring
            .as_ref()
            .and_then(|m| m.log_level.clone());
        config.monitoring = Some(MonitoringConfig {
            enabled: monitor,
            log_level,
        });
    }
    if config.monitoring_enabled() {
        tracing::info!("🔍 System monitoring enabled");
    }

    match cli.command {
        Commands::Provision { dry_run } => {
            if dry_run {
                tracing::info!("🔍 DRY RUN MODE - No Azure resources will be touched");
            }
            let engine = DeployEngine::new(config);
            match engine.provision(dry_run).await {
                Ok(results) => {
                    display_step_results("Provisioning", &results);
                    println!("✅ Provisioning completed successfully!");
                }
                Err(e) => fail("Provisioning", e),
            }
        }
        Commands::Deploy => {
            let engine = DeployEngine::new(config);
            match engine.deploy().await {
                Ok(results) => {
                    display_step_results("Deployment", &results);
                    println!("✅ Deployment completed successfully!");
                }
                Err(e) => fail("Deployment", e),
            }
        }
        Commands::Start => {
            tracing::info!("🚀 Starting application server");
            match startup::launch(&config.app).await {
                Ok(code) => {
                    if code != 0 {
                        tracing::error!("❌ Server exited with code {}", code);
                    }
                    std::process::exit(code);
                }
                Err(e) => fail("Startup", e),
            }
        }
        Commands::Verify { url } => {
            let timeout = config
                .api
                .as_ref()
                .map(|api| api.timeout_seconds)
                .unwrap_or(30);
            let base_url = match url.or_else(|| config.api.as_ref().map(|api| api.base_url.clone()))
            {
                Some(base_url) => base_url,
                None => {
                    eprintln!("❌ No URL to verify");
                    eprintln!("💡 Pass --url or set [api] base_url in the config");
                    std::process::exit(1);
                }
            };

            match verify::check_health(&base_url, Duration::from_secs(timeout)).await {
                Ok(()) => println!("✅ Service at {} is healthy", base_url),
                Err(e) => fail("Verification", e),
            }
        }
        Commands::Teardown { yes } => {
            if !yes {
                eprintln!(
                    "❌ Teardown deletes resource group '{}' and everything in it",
                    config.azure.resource_group
                );
                eprintln!("💡 Re-run with --yes to confirm");
                std::process::exit(1);
            }
            let engine = DeployEngine::new(config);
            match engine.teardown().await {
                Ok(results) => {
                    display_step_results("Teardown", &results);
                    println!("✅ Teardown completed successfully!");
                }
                Err(e) => fail("Teardown", e),
            }
        }
    }

    Ok(())
}

fn display_step_results(label: &str, results: &[StepResult]) {
    println!();
    println!("📊 {} Results Summary:", label);

    let summary = StepSequence::get_execution_summary(results);
    if let Some(total) = summary.get("total_steps") {
        println!("  Total Steps: {}", total);
    }
    if let Some(created) = summary.get("created") {
        println!("  Created: {}", created);
    }
    if let Some(existing) = summary.get("already_exists") {
        println!("  Already Existing: {}", existing);
    }
    if let Some(skipped) = summary.get("skipped") {
        println!("  Skipped: {}", skipped);
    }

    let total_duration: Duration = results.iter().map(|r| r.duration).sum();
    println!("  Total Execution Time: {:?}", total_duration);
    println!();

    println!("📝 Step Details:");
    for (index, result) in results.iter().enumerate() {
        println!(
            "  {}. {} - {} in {:?}",
            index + 1,
            result.step_name,
            result.status,
            result.duration
        );
        if let Some(detail) = &result.detail {
            println!("     {}", detail);
        }
    }
    println!();
}

fn fail(label: &str, e: DeployError) {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
        label,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    // 輸出用戶友好的錯誤信息
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        analyzer_deploy::utils::error::ErrorSeverity::Low => 0, // 警告，但成功
        analyzer_deploy::utils::error::ErrorSeverity::Medium => 2, // 重試錯誤
        analyzer_deploy::utils::error::ErrorSeverity::High => 1, // 處理錯誤
        analyzer_deploy::utils::error::ErrorSeverity::Critical => 3, // 系統錯誤
    };

    if exit_code > 0 {
        std::process::exit(exit_code);
    }
}
