mod loader;
mod types;
pub mod validation;

pub use loader::{load_config, load_config_from_file, load_config_from_file_with_profile, redact_url, ENV_PREFIX};
pub use types::*;

use crate::foundation::RestakeError;
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_ENV: &str = "RESTAKE_CONFIG_PATH";
pub const PROFILE_ENV: &str = "RESTAKE_PROFILE";
pub const DEFAULT_CONFIG_FILE: &str = "restake.toml";

/// `RESTAKE_CONFIG_PATH` if set, otherwise `restake.toml` in the working directory.
pub fn resolve_config_path() -> Result<PathBuf, RestakeError> {
    if let Ok(value) = std::env::var(CONFIG_PATH_ENV) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(DEFAULT_CONFIG_FILE))
}

/// Load, apply the optional profile, and validate.
pub fn load_app_config(path: &Path, profile: Option<&str>) -> Result<AppConfig, RestakeError> {
    let config = match profile {
        Some(profile) => load_config_from_file_with_profile(path, profile)?,
        None => load_config_from_file(path)?,
    };
    config.validate().map_err(|errors| RestakeError::ConfigError(format!("validation failed: {}", errors.join("; "))))?;
    Ok(config)
}
