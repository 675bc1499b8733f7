use clap::Parser;
use restake_core::infrastructure::config::{CONFIG_PATH_ENV, ENV_PREFIX, PROFILE_ENV};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "restake-service")]
#[command(about = "Staking, swap-exit and rebalance flows over HTTP", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Apply `[profiles.<name>]` overrides from the configuration file
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Override chain RPC URL
    #[arg(short, long)]
    pub rpc_url: Option<String>,

    /// Log filters, e.g. `info` or `debug,restake_core=trace`
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Directory for rolling log files
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Flags become environment overrides so they win over the file like any other env var.
    pub fn apply_to_env(&self) {
        if let Some(config_path) = &self.config {
            std::env::set_var(CONFIG_PATH_ENV, config_path);
        }
        if let Some(profile) = &self.profile {
            std::env::set_var(PROFILE_ENV, profile);
        }
        if let Some(rpc_url) = &self.rpc_url {
            std::env::set_var(format!("{ENV_PREFIX}CHAIN__RPC_URL"), rpc_url);
        }
        if let Some(level) = &self.log_level {
            std::env::set_var(format!("{ENV_PREFIX}LOGGING__FILTERS"), level);
        }
        if let Some(dir) = &self.log_dir {
            std::env::set_var(format!("{ENV_PREFIX}LOGGING__DIR"), dir);
        }
    }
}
