//! Orchestrator configuration
//!
//! Defaults cover a typical household. A JSON file in the user's config
//! directory and the `SONOS_FAVORITES_BOOTSTRAP` variable can override them.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PlaybackError, Result};

/// Environment variable naming the device used for topology and favorites
pub const BOOTSTRAP_ENV: &str = "SONOS_FAVORITES_BOOTSTRAP";

/// Configuration for the playback orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Address of any device in the household, used to fetch the topology
    pub bootstrap_address: Option<String>,
    /// TCP connect budget for each SOAP call
    pub soap_connect_timeout_ms: u64,
    /// Read budget for each SOAP call
    pub soap_read_timeout_ms: u64,
    /// Wait before the single retry of a failed URI-set step
    pub uri_retry_delay_ms: u64,
    /// Wait between a successful URI-set and play
    pub play_delay_ms: u64,
    /// `RequestedCount` for every browse
    pub browse_page_size: u32,
    /// Content directory container holding the favorites
    pub favorites_container: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            bootstrap_address: None,
            soap_connect_timeout_ms: 5_000,
            soap_read_timeout_ms: 10_000,
            uri_retry_delay_ms: 500,
            play_delay_ms: 250,
            browse_page_size: 100,
            favorites_container: "FV:2".to_string(),
        }
    }
}

impl OrchestratorConfig {
    pub fn with_bootstrap_address(mut self, address: impl Into<String>) -> Self {
        self.bootstrap_address = Some(address.into());
        self
    }

    pub fn with_soap_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.soap_connect_timeout_ms = duration_ms(connect);
        self.soap_read_timeout_ms = duration_ms(read);
        self
    }

    pub fn with_uri_retry_delay(mut self, delay: Duration) -> Self {
        self.uri_retry_delay_ms = duration_ms(delay);
        self
    }

    pub fn with_play_delay(mut self, delay: Duration) -> Self {
        self.play_delay_ms = duration_ms(delay);
        self
    }

    pub fn with_browse_page_size(mut self, size: u32) -> Self {
        self.browse_page_size = size;
        self
    }

    pub fn with_favorites_container(mut self, container: impl Into<String>) -> Self {
        self.favorites_container = container.into();
        self
    }

    pub fn soap_connect_timeout(&self) -> Duration {
        Duration::from_millis(self.soap_connect_timeout_ms)
    }

    pub fn soap_read_timeout(&self) -> Duration {
        Duration::from_millis(self.soap_read_timeout_ms)
    }

    pub fn uri_retry_delay(&self) -> Duration {
        Duration::from_millis(self.uri_retry_delay_ms)
    }

    pub fn play_delay(&self) -> Duration {
        Duration::from_millis(self.play_delay_ms)
    }

    /// `<config dir>/sonos-favorites/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sonos-favorites").join("config.json"))
    }

    /// Read a JSON config file, missing keys take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| PlaybackError::Config(format!("reading {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| PlaybackError::Config(format!("parsing {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the default file when it exists, then apply the environment
    pub fn load_default() -> Result<Self> {
        let config = match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "loading configuration");
                Self::load(&path)?
            }
            _ => Self::default(),
        };
        Ok(config.apply_env())
    }

    /// Apply `SONOS_FAVORITES_BOOTSTRAP` when set and non-empty
    pub fn apply_env(self) -> Self {
        match std::env::var(BOOTSTRAP_ENV) {
            Ok(address) if !address.trim().is_empty() => self.with_bootstrap_address(address.trim()),
            _ => self,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.browse_page_size == 0 {
            return Err(PlaybackError::Config("browse_page_size must be positive".to_string()));
        }
        if self.favorites_container.trim().is_empty() {
            return Err(PlaybackError::Config("favorites_container is empty".to_string()));
        }
        Ok(())
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.uri_retry_delay(), Duration::from_millis(500));
        assert_eq!(config.play_delay(), Duration::from_millis(250));
        assert_eq!(config.soap_read_timeout(), Duration::from_secs(10));
        assert_eq!(config.browse_page_size, 100);
        assert_eq!(config.favorites_container, "FV:2");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: OrchestratorConfig =
            serde_json::from_str(r#"{"bootstrap_address":"192.168.1.20","play_delay_ms":100}"#).unwrap();
        assert_eq!(config.bootstrap_address.as_deref(), Some("192.168.1.20"));
        assert_eq!(config.play_delay_ms, 100);
        assert_eq!(config.uri_retry_delay_ms, 500);
    }

    #[test]
    fn test_load_rejects_zero_page_size() {
        let path = std::env::temp_dir().join(format!("sonos-favorites-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"browse_page_size":0}"#).unwrap();
        let result = OrchestratorConfig::load(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(PlaybackError::Config(_))));
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let result = OrchestratorConfig::load("/nonexistent/sonos-favorites.json");
        assert!(matches!(result, Err(PlaybackError::Config(_))));
    }

    #[test]
    fn test_builder() {
        let config = OrchestratorConfig::default()
            .with_play_delay(Duration::ZERO)
            .with_uri_retry_delay(Duration::from_millis(20))
            .with_browse_page_size(25);
        assert_eq!(config.play_delay_ms, 0);
        assert_eq!(config.uri_retry_delay_ms, 20);
        assert_eq!(config.browse_page_size, 25);
    }
}
