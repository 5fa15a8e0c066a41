use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::Result;
use crate::time::ONE_MINUTE_MS;

/// Correlator configuration
///
/// All windows are trailing spans in milliseconds. Defaults match the
/// shipped `config/default.toml`; a config file and `CAMERA_EVENTS__`
/// environment variables may override them.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CorrelatorConfig {
    /// Time window to keep in the transition matrix
    #[serde(default = "default_transition_window_ms")]
    #[validate(range(min = 1))]
    pub transition_window_ms: i64,

    /// Time window to monitor for recent corroborating event tags
    #[serde(default = "default_recent_tag_window_ms")]
    #[validate(range(min = 1))]
    pub recent_tag_window_ms: i64,

    /// Time-to-live applied to dashboard alerts
    #[serde(default = "default_alert_ttl_ms")]
    #[validate(range(min = 1))]
    pub alert_ttl_ms: i64,
}

fn default_transition_window_ms() -> i64 {
    ONE_MINUTE_MS * 15
}

fn default_recent_tag_window_ms() -> i64 {
    ONE_MINUTE_MS * 5
}

fn default_alert_ttl_ms() -> i64 {
    ONE_MINUTE_MS * 30
}

impl Default for CorrelatorConfig {
    fn default() -> Self {
        Self {
            transition_window_ms: default_transition_window_ms(),
            recent_tag_window_ms: default_recent_tag_window_ms(),
            alert_ttl_ms: default_alert_ttl_ms(),
        }
    }
}

impl CorrelatorConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());

        let config: Self = config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: CAMERA_EVENTS_)
            .add_source(
                config::Environment::with_prefix("CAMERA_EVENTS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }
}
