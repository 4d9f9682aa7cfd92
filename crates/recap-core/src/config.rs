//! Context budget configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Environment variable overriding the total token budget.
pub const ENV_MAX_TOKENS: &str = "RECAP_MAX_TOKENS";
/// Environment variable overriding the reply reserve ratio.
pub const ENV_REPLY_RESERVE_RATIO: &str = "RECAP_REPLY_RESERVE_RATIO";
/// Environment variable overriding the recent window size.
pub const ENV_RECENT_WINDOW_SIZE: &str = "RECAP_RECENT_WINDOW_SIZE";

fn default_max_tokens() -> usize {
    32_000
}

fn default_reply_reserve_ratio() -> f64 {
    0.25
}

fn default_recent_window_size() -> usize {
    8
}

/// Immutable per-session budget configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Total token budget.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Fraction of the budget reserved for the model's reply (0 to 1).
    #[serde(default = "default_reply_reserve_ratio")]
    pub reply_reserve_ratio: f64,

    /// Number of recent turns always kept verbatim.
    #[serde(default = "default_recent_window_size")]
    pub recent_window_size: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            reply_reserve_ratio: default_reply_reserve_ratio(),
            recent_window_size: default_recent_window_size(),
        }
    }
}

impl ContextConfig {
    /// Tokens available for context after the reply reserve.
    pub fn available_tokens(&self) -> usize {
        (self.max_tokens as f64 * (1.0 - self.reply_reserve_ratio)) as usize
    }

    /// Validate field ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_tokens == 0 {
            return Err(ConfigError::Invalid {
                field: "max_tokens",
                reason: "must be positive".to_string(),
            });
        }
        if !(0.0..1.0).contains(&self.reply_reserve_ratio) {
            return Err(ConfigError::Invalid {
                field: "reply_reserve_ratio",
                reason: format!("{} is outside [0, 1)", self.reply_reserve_ratio),
            });
        }
        if self.recent_window_size == 0 {
            return Err(ConfigError::Invalid {
                field: "recent_window_size",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Build from environment overrides, falling back to defaults for
    /// unset or unparsable variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(value) = env_parse(ENV_MAX_TOKENS) {
            config.max_tokens = value;
        }
        if let Some(value) = env_parse(ENV_REPLY_RESERVE_RATIO) {
            config.reply_reserve_ratio = value;
        }
        if let Some(value) = env_parse(ENV_RECENT_WINDOW_SIZE) {
            config.recent_window_size = value;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Read an environment variable, treating unset, empty, or unparsable
/// values as absent.
fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse().ok())
}
