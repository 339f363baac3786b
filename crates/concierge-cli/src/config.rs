//! Configuration file support

use concierge_api::{HttpBackendConfig, http::DEFAULT_BASE_URL, http::DEFAULT_CHAT_PATH};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Overrides the config file location
pub const CONFIG_PATH_ENV: &str = "TRIP_CONCIERGE_CONFIG_PATH";

/// Backend base URL
pub const BACKEND_URL_ENV: &str = "TRIP_CONCIERGE_BACKEND_URL";

/// Backend base URL as exported for the web frontend
pub const LEGACY_BACKEND_URL_ENV: &str = "REACT_APP_BACKEND_URL";

/// Errors reading a config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Configuration for the concierge client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend base URL
    pub backend_url: Option<String>,
    /// Chat endpoint path
    pub chat_path: Option<String>,
    /// Per-request timeout in seconds
    pub request_timeout_secs: Option<u64>,
    /// Whether to use TUI mode by default
    pub tui: Option<bool>,
    /// Color theme (dark, light)
    pub theme: Option<String>,
    /// Itinerary file loaded into the buffer at startup
    pub itinerary_file: Option<PathBuf>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("trip-concierge")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from the default location.
    ///
    /// A missing file yields defaults; an unreadable one is logged and ignored.
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{}", e);
                eprintln!("Warning: {}", e);
                Self::default()
            }
        }
    }

    /// Load config from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save config to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        let default_config = Config {
            backend_url: Some(DEFAULT_BASE_URL.to_string()),
            chat_path: Some(DEFAULT_CHAT_PATH.to_string()),
            request_timeout_secs: Some(60),
            tui: Some(true),
            theme: Some("dark".to_string()),
            itinerary_file: None,
        };

        default_config.save_to(&path)?;
        Ok(path)
    }

    /// Backend URL by precedence: CLI flag, environment, config file, default
    pub fn backend_url(&self, cli: Option<&str>) -> String {
        self.backend_url_with_env(cli, |key| std::env::var(key).ok())
    }

    fn backend_url_with_env(
        &self,
        cli: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> String {
        let non_empty = |s: &str| !s.trim().is_empty();
        cli.filter(|s| non_empty(s))
            .map(str::to_string)
            .or_else(|| env(BACKEND_URL_ENV).filter(|s| non_empty(s)))
            .or_else(|| env(LEGACY_BACKEND_URL_ENV).filter(|s| non_empty(s)))
            .or_else(|| self.backend_url.clone().filter(|s| non_empty(s)))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Connection settings for the HTTP backend
    pub fn backend_config(&self, cli_url: Option<&str>, cli_chat_path: Option<&str>) -> HttpBackendConfig {
        let defaults = HttpBackendConfig::default();
        HttpBackendConfig {
            base_url: self.backend_url(cli_url),
            chat_path: cli_chat_path
                .map(str::to_string)
                .or_else(|| self.chat_path.clone())
                .unwrap_or(defaults.chat_path),
            timeout: self
                .request_timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# Trip Concierge configuration file
# Place at ~/.config/trip-concierge/config.toml (Linux/Mac)
# or %APPDATA%\trip-concierge\config.toml (Windows)

# Backend base URL. TRIP_CONCIERGE_BACKEND_URL or REACT_APP_BACKEND_URL
# override this; --backend-url overrides both.
backend_url = "http://localhost:8000"

# Chat endpoint path relative to the base URL
chat_path = "/api/chat"

# Per-request timeout in seconds
request_timeout_secs = 60

# Whether to use TUI mode by default (true by default)
# Set to false for simple stdin/stdout mode
tui = true

# Color theme: dark or light
theme = "dark"

# Itinerary loaded into the buffer at startup (optional)
# itinerary_file = "~/trips/dubai.txt"
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_backend_url_precedence() {
        let config = Config {
            backend_url: Some("http://file:1".into()),
            ..Default::default()
        };
        let env = env_from(&[
            (BACKEND_URL_ENV, "http://env:2"),
            (LEGACY_BACKEND_URL_ENV, "http://react:3"),
        ]);

        assert_eq!(config.backend_url_with_env(Some("http://cli:0"), &env), "http://cli:0");
        assert_eq!(config.backend_url_with_env(None, &env), "http://env:2");
        assert_eq!(
            config.backend_url_with_env(None, env_from(&[(LEGACY_BACKEND_URL_ENV, "http://react:3")])),
            "http://react:3"
        );
        assert_eq!(config.backend_url_with_env(None, env_from(&[])), "http://file:1");
        assert_eq!(
            Config::default().backend_url_with_env(None, env_from(&[(BACKEND_URL_ENV, "  ")])),
            DEFAULT_BASE_URL
        );
    }

    #[test]
    fn test_backend_config_defaults_and_overrides() {
        let config = Config {
            chat_path: Some("/api/ask".into()),
            request_timeout_secs: Some(5),
            ..Default::default()
        };
        let backend = config.backend_config(Some("http://cli:0"), None);
        assert_eq!(backend.base_url, "http://cli:0");
        assert_eq!(backend.chat_path, "/api/ask");
        assert_eq!(backend.timeout, Duration::from_secs(5));

        let backend = Config::default().backend_config(Some("http://cli:0"), Some("/x"));
        assert_eq!(backend.chat_path, "/x");
        assert_eq!(backend.timeout, HttpBackendConfig::default().timeout);
    }

    #[test]
    fn test_load_from_parses_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "backend_url = \"http://trips:9000\"\ntheme = \"light\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.backend_url.as_deref(), Some("http://trips:9000"));
        assert_eq!(config.theme.as_deref(), Some("light"));
        assert_eq!(config.tui, None);
    }

    #[test]
    fn test_load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "tui = \"maybe\"").unwrap();

        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse { .. })));
        assert!(matches!(
            Config::load_from(&dir.path().join("missing.toml")),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_example_config_parses() {
        let config: Config = toml::from_str(example_config()).unwrap();
        assert_eq!(config.chat_path.as_deref(), Some("/api/chat"));
        assert_eq!(config.tui, Some(true));
    }

    #[test]
    #[serial]
    fn test_init_writes_default_file_at_env_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        // SAFETY: serialized with other env-mutating tests
        unsafe { std::env::set_var(CONFIG_PATH_ENV, &path) };

        let written = Config::init().unwrap();
        assert_eq!(written, path);
        let config = Config::load();
        assert_eq!(config.backend_url.as_deref(), Some(DEFAULT_BASE_URL));
        assert_eq!(config.tui, Some(true));

        unsafe { std::env::remove_var(CONFIG_PATH_ENV) };
    }

    #[test]
    #[serial]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        unsafe { std::env::set_var(CONFIG_PATH_ENV, dir.path().join("none.toml")) };
        assert_eq!(Config::load(), Config::default());
        unsafe { std::env::remove_var(CONFIG_PATH_ENV) };
    }
}
