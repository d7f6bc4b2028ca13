//! Configuration management for signloop
//!
//! TOML file for the static deployment configuration (playlist, timing
//! constants, player command), with command-line/environment overrides for
//! the few values an operator changes per device.
//!
//! All values are immutable after startup. The process restarts to pick up
//! a new configuration (that is what the update monitor is for).

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Configuration file contents
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Ordered playlist of media references (file paths or URLs). Must be
    /// non-empty.
    pub playlist: Vec<String>,

    /// Consecutive failures tolerated for one item before skipping it
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before re-attempting a failed item
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Interval between remote version checks
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Interval between unconditional heartbeat restarts
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,

    /// Version endpoint polled for new deployments. Update checks are
    /// disabled when absent.
    #[serde(default)]
    pub version_url: Option<String>,

    /// External player binary invoked once per playlist item
    #[serde(default = "default_player_command")]
    pub player_command: String,

    /// Extra arguments passed to the player before the media reference
    #[serde(default)]
    pub player_args: Vec<String>,

    /// Status HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_delay_ms() -> u64 {
    2_000
}

fn default_poll_interval_ms() -> u64 {
    60_000
}

fn default_heartbeat_interval_ms() -> u64 {
    43_200_000 // 12 hours
}

fn default_player_command() -> String {
    "mpv".to_string()
}

fn default_port() -> u16 {
    5770
}

/// Command-line configuration overrides
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub version_url: Option<String>,
}

/// Complete application configuration
///
/// TOML values merged with command-line overrides and validated.
#[derive(Debug, Clone)]
pub struct Config {
    pub playlist: Vec<String>,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub poll_interval_ms: u64,
    pub heartbeat_interval_ms: u64,
    pub version_url: Option<String>,
    pub player_command: String,
    pub player_args: Vec<String>,
    pub port: u16,
}

impl Config {
    /// Load configuration from a TOML file, applying CLI overrides
    ///
    /// Priority: command-line arguments > TOML file > built-in defaults.
    pub async fn load(path: &Path, overrides: ConfigOverrides) -> Result<Self> {
        let toml_str = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::Config(format!("failed to read config file {:?}: {}", path, e))
        })?;

        let config = Self::from_toml_str(&toml_str, overrides)?;
        info!("loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Parse configuration from a TOML string, applying CLI overrides
    pub fn from_toml_str(toml_str: &str, overrides: ConfigOverrides) -> Result<Self> {
        let toml_config: TomlConfig = toml::from_str(toml_str)
            .map_err(|e| Error::Config(format!("failed to parse TOML: {}", e)))?;

        let config = Config {
            playlist: toml_config.playlist,
            max_retries: toml_config.max_retries,
            retry_delay_ms: toml_config.retry_delay_ms,
            poll_interval_ms: toml_config.poll_interval_ms,
            heartbeat_interval_ms: toml_config.heartbeat_interval_ms,
            version_url: overrides.version_url.or(toml_config.version_url),
            player_command: toml_config.player_command,
            player_args: toml_config.player_args,
            port: overrides.port.unwrap_or(toml_config.port),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.playlist.is_empty() {
            return Err(Error::Config("playlist must not be empty".to_string()));
        }
        if self.max_retries == 0 {
            return Err(Error::Config("max_retries must be at least 1".to_string()));
        }
        if self.player_command.is_empty() {
            return Err(Error::Config("player_command must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config = Config::from_toml_str(
            r#"playlist = ["videos/a.mp4", "videos/b.mp4"]"#,
            ConfigOverrides::default(),
        )
        .unwrap();

        assert_eq!(config.playlist.len(), 2);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.retry_delay_ms, 2_000);
        assert_eq!(config.poll_interval_ms, 60_000);
        assert_eq!(config.heartbeat_interval_ms, 43_200_000);
        assert_eq!(config.player_command, "mpv");
        assert_eq!(config.port, 5770);
        assert!(config.version_url.is_none());
    }

    #[test]
    fn test_empty_playlist_rejected() {
        let result = Config::from_toml_str("playlist = []", ConfigOverrides::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_max_retries_rejected() {
        let result = Config::from_toml_str(
            r#"
            playlist = ["a.mp4"]
            max_retries = 0
            "#,
            ConfigOverrides::default(),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_overrides_win() {
        let config = Config::from_toml_str(
            r#"
            playlist = ["a.mp4"]
            port = 6000
            version_url = "http://example.com/version"
            "#,
            ConfigOverrides {
                port: Some(7000),
                version_url: Some("http://other.example.com/version".to_string()),
            },
        )
        .unwrap();

        assert_eq!(config.port, 7000);
        assert_eq!(
            config.version_url.as_deref(),
            Some("http://other.example.com/version")
        );
    }

    #[test]
    fn test_duration_accessors() {
        let config = Config::from_toml_str(
            r#"
            playlist = ["a.mp4"]
            retry_delay_ms = 500
            "#,
            ConfigOverrides::default(),
        )
        .unwrap();

        assert_eq!(config.retry_delay(), Duration::from_millis(500));
        assert_eq!(config.poll_interval(), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"playlist = ["x.mp4"]"#).unwrap();

        let config = Config::load(file.path(), ConfigOverrides::default())
            .await
            .unwrap();
        assert_eq!(config.playlist, vec!["x.mp4".to_string()]);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let result = Config::load(
            Path::new("/nonexistent/signloop.toml"),
            ConfigOverrides::default(),
        )
        .await;
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
