//! Environment-based configuration.

use anyhow::{Context, Result};

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord bot token. Required; startup is fatal without it.
    pub discord_token: String,
    /// Default log filter for env_logger (overridable via RUST_LOG).
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let discord_token = std::env::var("DISCORD_TOKEN")
            .context("DISCORD_TOKEN must be set (see .env.example)")?;
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Config {
            discord_token,
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so parallel test threads never race on the process env.
    #[test]
    fn test_from_env() {
        std::env::remove_var("DISCORD_TOKEN");
        assert!(Config::from_env().is_err());

        std::env::set_var("DISCORD_TOKEN", "token-123");
        std::env::remove_var("LOG_LEVEL");
        let config = Config::from_env().unwrap();
        assert_eq!(config.discord_token, "token-123");
        assert_eq!(config.log_level, "info");

        std::env::set_var("LOG_LEVEL", "debug");
        let config = Config::from_env().unwrap();
        assert_eq!(config.log_level, "debug");
    }
}
