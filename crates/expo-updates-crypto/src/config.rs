//! Transport configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for [`crate::transport::HttpKeyTransport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Directory for persisted key responses.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: Option<PathBuf>,

    /// Whether key responses are persisted to `cache_dir`.
    #[serde(default = "default_persist_cache")]
    pub persist_cache: bool,

    /// User-Agent sent with key requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout() -> u64 {
    30
}

fn default_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir()
        .or_else(dirs::home_dir)
        .map(|base| base.join("expo-updates").join("keys"))
}

fn default_persist_cache() -> bool {
    true
}

fn default_user_agent() -> String {
    concat!("expo-updates-crypto/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            cache_dir: default_cache_dir(),
            persist_cache: default_persist_cache(),
            user_agent: default_user_agent(),
        }
    }
}

impl TransportConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `EXPO_UPDATES_KEY_TIMEOUT` | Request timeout in seconds |
    /// | `EXPO_UPDATES_KEY_CACHE_DIR` | Directory for persisted key responses |
    /// | `EXPO_UPDATES_KEY_CACHE` | `0`/`false` keeps the cache in memory only |
    pub fn from_env() -> Self {
        Self {
            timeout_secs: std::env::var("EXPO_UPDATES_KEY_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_timeout),
            cache_dir: std::env::var("EXPO_UPDATES_KEY_CACHE_DIR")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .or_else(default_cache_dir),
            persist_cache: std::env::var("EXPO_UPDATES_KEY_CACHE")
                .map(|v| !(v == "0" || v.eq_ignore_ascii_case("false")))
                .unwrap_or_else(|_| default_persist_cache()),
            user_agent: default_user_agent(),
        }
    }

    /// Set the request timeout.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set the cache directory.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Keep cached key responses in memory only.
    pub fn in_memory_cache(mut self) -> Self {
        self.persist_cache = false;
        self
    }

    /// Directory the key cache writes to, if persistence is on.
    pub fn effective_cache_dir(&self) -> Option<&PathBuf> {
        if self.persist_cache {
            self.cache_dir.as_ref()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        std::env::remove_var("EXPO_UPDATES_KEY_TIMEOUT");
        std::env::remove_var("EXPO_UPDATES_KEY_CACHE_DIR");
        std::env::remove_var("EXPO_UPDATES_KEY_CACHE");
    }

    #[test]
    fn test_defaults() {
        let config = TransportConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert!(config.persist_cache);
        assert!(config.user_agent.starts_with("expo-updates-crypto/"));
    }

    #[test]
    #[serial]
    fn test_from_env() {
        clear_env();
        std::env::set_var("EXPO_UPDATES_KEY_TIMEOUT", "5");
        std::env::set_var("EXPO_UPDATES_KEY_CACHE_DIR", "/tmp/expo-keys");
        std::env::set_var("EXPO_UPDATES_KEY_CACHE", "false");

        let config = TransportConfig::from_env();
        clear_env();

        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.cache_dir, Some(PathBuf::from("/tmp/expo-keys")));
        assert!(!config.persist_cache);
        assert_eq!(config.effective_cache_dir(), None);
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_timeout_uses_default() {
        clear_env();
        std::env::set_var("EXPO_UPDATES_KEY_TIMEOUT", "soon");

        let config = TransportConfig::from_env();
        clear_env();

        assert_eq!(config.timeout_secs, 30);
        assert!(config.persist_cache);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: TransportConfig =
            serde_json::from_str(r#"{"timeout_secs": 10, "persist_cache": false}"#).unwrap();
        assert_eq!(config.timeout_secs, 10);
        assert!(!config.persist_cache);
        assert!(config.user_agent.starts_with("expo-updates-crypto/"));
    }

    #[test]
    fn test_builder() {
        let config = TransportConfig::default()
            .with_timeout_secs(3)
            .with_cache_dir("/var/cache/keys");
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(
            config.effective_cache_dir(),
            Some(&PathBuf::from("/var/cache/keys"))
        );
    }
}
