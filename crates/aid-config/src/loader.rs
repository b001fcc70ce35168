use std::path::Path;
use std::time::Duration;

use tracing::debug;

use crate::error::ConfigError;
use crate::raw::RawConfig;

/// Validated agent configuration.
#[derive(Debug, Clone)]
pub struct AidConfig {
    pub agent_name: String,
    /// Failures tolerated per object before its sync state turns to error.
    /// Always at least 1.
    pub max_operation_retry: u32,
    /// Window within which repeated failures are not accounted again.
    pub retry_cooldown: Duration,
}

impl Default for AidConfig {
    fn default() -> Self {
        AidConfig {
            agent_name: "aid".to_string(),
            max_operation_retry: 5,
            retry_cooldown: Duration::from_secs(5),
        }
    }
}

/// Load and validate the agent config. Missing keys fall back to defaults.
pub fn load_config(path: &Path) -> Result<AidConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let raw: RawConfig = serde_yaml::from_str(&content).map_err(|e| ConfigError::YamlParse {
        path: path.display().to_string(),
        source: e,
    })?;
    debug!("loaded config from {}", path.display());

    let defaults = AidConfig::default();
    let config = AidConfig {
        agent_name: raw.agent_name.unwrap_or(defaults.agent_name),
        max_operation_retry: raw.max_operation_retry.unwrap_or(defaults.max_operation_retry),
        retry_cooldown: raw.retry_cooldown.unwrap_or(defaults.retry_cooldown),
    };
    if config.max_operation_retry == 0 {
        return Err(ConfigError::Invalid {
            path: path.display().to_string(),
            message: "max_operation_retry must be at least 1".to_string(),
        });
    }
    Ok(config)
}
