//! Configuration for ~/.config/topnews/config.toml and the resolved runtime
//! settings built from it at startup.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are ignored with a warning. The API key normally comes from
//! the `API_KEY` environment variable; the file's `api_key` is only a fallback.
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the news API key.
pub const API_KEY_ENV: &str = "API_KEY";

/// Default news API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://newsapi.org/v2/";

/// Database file name used when no path is configured.
pub const DEFAULT_DATABASE_FILE: &str = "news.db";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("No news API key: set the API_KEY environment variable")]
    MissingApiKey,
}

// ============================================================================
// Configuration File
// ============================================================================

/// Contents of the config file.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// `Debug` masks `api_key`.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the news API; endpoint names are appended to it.
    pub api_base_url: String,

    /// SQLite database file. Defaults to `news.db` in the config directory.
    pub database_path: Option<PathBuf>,

    /// Per-request timeout in seconds. 0 = wait indefinitely.
    pub request_timeout_secs: u64,

    /// Styled (colored) terminal output.
    pub color: bool,

    /// News API key (fallback for the API_KEY env var).
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            database_path: None,
            request_timeout_secs: 30,
            color: true,
            api_key: None,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_base_url", &self.api_base_url)
            .field("database_path", &self.database_path)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("color", &self.color)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 5] = [
        "api_base_url",
        "database_path",
        "request_timeout_secs",
        "color",
        "api_key",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }
}

// ============================================================================
// Resolved Settings
// ============================================================================

/// Runtime settings handed to the components that need them.
///
/// Built once at startup; nothing reads the environment after that.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_base_url: String,
    pub api_key: SecretString,
    pub request_timeout: Option<Duration>,
    pub database_path: PathBuf,
    pub color: bool,
}

impl Settings {
    /// Defaults for everything except the key.
    pub fn new(api_key: SecretString) -> Self {
        let defaults = Config::default();
        Self {
            api_base_url: defaults.api_base_url,
            api_key,
            request_timeout: timeout_from_secs(defaults.request_timeout_secs),
            database_path: PathBuf::from(DEFAULT_DATABASE_FILE),
            color: defaults.color,
        }
    }

    /// Combine the config file with the environment.
    ///
    /// `env_api_key` is the value of [`API_KEY_ENV`], if set; it wins over the
    /// file. A relative or missing `database_path` is placed in `config_dir`.
    pub fn resolve(
        config: Config,
        env_api_key: Option<String>,
        config_dir: &Path,
    ) -> Result<Self, ConfigError> {
        let api_key = env_api_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| config.api_key.filter(|k| !k.trim().is_empty()))
            .map(SecretString::from)
            .ok_or(ConfigError::MissingApiKey)?;

        let database_path = match config.database_path {
            Some(path) if path.is_absolute() => path,
            Some(path) => config_dir.join(path),
            None => config_dir.join(DEFAULT_DATABASE_FILE),
        };

        Ok(Self {
            api_base_url: config.api_base_url,
            api_key,
            request_timeout: timeout_from_secs(config.request_timeout_secs),
            database_path,
            color: config.color,
        })
    }
}

fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn write_config(name: &str, content: &str) -> (PathBuf, PathBuf) {
        let dir = std::env::temp_dir().join(format!("topnews_config_test_{name}"));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_base_url, "https://newsapi.org/v2/");
        assert_eq!(config.database_path, None);
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.color);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/topnews_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let (dir, path) = write_config("whitespace", "   \n  \n  ");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.request_timeout_secs, 30);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let (dir, path) = write_config("partial", "color = false\n");
        let config = Config::load(&path).unwrap();
        assert!(!config.color);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config() {
        let content = r#"
api_base_url = "https://news.example.com/v2/"
database_path = "/var/lib/topnews/news.db"
request_timeout_secs = 5
color = false
api_key = "file-key"
"#;
        let (dir, path) = write_config("full", content);
        let config = Config::load(&path).unwrap();
        assert_eq!(config.api_base_url, "https://news.example.com/v2/");
        assert_eq!(
            config.database_path.as_deref(),
            Some(Path::new("/var/lib/topnews/news.db"))
        );
        assert_eq!(config.request_timeout_secs, 5);
        assert!(!config.color);
        assert_eq!(config.api_key.as_deref(), Some("file-key"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let (dir, path) = write_config("invalid", "this is not [valid toml");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let (dir, path) = write_config("unknown", "color = true\ntheme = \"dark\"\n");
        assert!(Config::load(&path).is_ok());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let (dir, path) = write_config("wrongtype", "request_timeout_secs = \"soon\"\n");
        assert!(Config::load(&path).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_too_large_file_rejected() {
        let (dir, path) = write_config("too_large", &"a".repeat(1_048_577));
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_debug_masks_api_key() {
        let config = Config {
            api_key: Some("super-secret-key-12345".to_string()),
            ..Config::default()
        };
        let debug_output = format!("{:?}", config);
        assert!(!debug_output.contains("super-secret-key-12345"));
        assert!(debug_output.contains("[REDACTED]"));
    }

    #[test]
    fn test_resolve_env_key_wins() {
        let config = Config {
            api_key: Some("file-key".to_string()),
            ..Config::default()
        };
        let settings =
            Settings::resolve(config, Some("env-key".to_string()), Path::new("/cfg")).unwrap();
        assert_eq!(settings.api_key.expose_secret(), "env-key");
    }

    #[test]
    fn test_resolve_falls_back_to_file_key() {
        let config = Config {
            api_key: Some("file-key".to_string()),
            ..Config::default()
        };
        let settings = Settings::resolve(config, None, Path::new("/cfg")).unwrap();
        assert_eq!(settings.api_key.expose_secret(), "file-key");
    }

    #[test]
    fn test_resolve_without_key_is_fatal() {
        let result = Settings::resolve(Config::default(), None, Path::new("/cfg"));
        assert!(matches!(result, Err(ConfigError::MissingApiKey)));

        let result = Settings::resolve(Config::default(), Some("  ".to_string()), Path::new("/cfg"));
        assert!(matches!(result, Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn test_resolve_database_path() {
        let key = || Some("k".to_string());
        let dir = Path::new("/cfg");

        let default = Settings::resolve(Config::default(), key(), dir).unwrap();
        assert_eq!(default.database_path, PathBuf::from("/cfg/news.db"));

        let relative = Config {
            database_path: Some(PathBuf::from("other.db")),
            ..Config::default()
        };
        let settings = Settings::resolve(relative, key(), dir).unwrap();
        assert_eq!(settings.database_path, PathBuf::from("/cfg/other.db"));

        let absolute = Config {
            database_path: Some(PathBuf::from("/data/news.db")),
            ..Config::default()
        };
        let settings = Settings::resolve(absolute, key(), dir).unwrap();
        assert_eq!(settings.database_path, PathBuf::from("/data/news.db"));
    }

    #[test]
    fn test_zero_timeout_disables_timeout() {
        let config = Config {
            request_timeout_secs: 0,
            ..Config::default()
        };
        let settings = Settings::resolve(config, Some("k".to_string()), Path::new("/cfg")).unwrap();
        assert_eq!(settings.request_timeout, None);
        assert_eq!(
            Settings::new(SecretString::from("k".to_string())).request_timeout,
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn test_settings_debug_hides_key() {
        let settings = Settings::new(SecretString::from("very-secret".to_string()));
        assert!(!format!("{:?}", settings).contains("very-secret"));
    }
}
