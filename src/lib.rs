pub mod app;
pub mod client;
pub mod config;
pub mod core;
pub mod domain;
pub mod package;
pub mod startup;
pub mod utils;
pub mod verify;

#[cfg(feature = "cli")]
pub use config::{Cli, Commands};

pub use client::AnalyzerClient;
pub use config::deploy_config::DeployConfig;
pub use core::engine::DeployEngine;
pub use domain::model::DeployTarget;
pub use utils::error::{DeployError, Result};
