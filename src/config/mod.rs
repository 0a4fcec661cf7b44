pub mod deploy_config;

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "analyzer-deploy")]
#[command(about = "Azure deployment toolkit for the content analyzer service")]
pub struct Cli {
    /// Path to deployment configuration file
    #[arg(short, long, default_value = "deploy.toml", global = true)]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override monitoring setting from config
    #[arg(long, global = true)]
    pub monitor: Option<bool>,

    #[command(subcommand)]
    pub command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
pub enum Commands {
    /// Create the Azure resources for the configured deploy target
    Provision {
        /// Show the step plan without executing
        #[arg(long)]
        dry_run: bool,
    },
    /// Push the current application build to the provisioned resources
    Deploy,
    /// Install dependencies and hand off to the application server
    Start,
    /// Check the deployed service's health endpoint
    Verify {
        /// Check this URL instead of the one from config
        #[arg(long)]
        url: Option<String>,
    },
    /// Delete the resource group and everything in it
    Teardown {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}
