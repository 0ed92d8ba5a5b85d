//! Application configuration.
//!
//! Settings come from an optional TOML file (`inkhaven.toml` in the working
//! directory unless a path is given), then environment overrides for the
//! classifier credential and the listening port.

use crate::error::{ConfigError, CoreError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "inkhaven.toml";
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
pub const PORT_ENV: &str = "PORT";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub classifier: ClassifierConfig,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    /// Only ever read from the environment.
    #[serde(skip)]
    pub anthropic_api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub feed_xml: PathBuf,
    pub feed_json: PathBuf,
    pub tag_cache: PathBuf,
    pub community_tags: PathBuf,
    pub author_bios: PathBuf,
    pub static_dir: PathBuf,
    /// Extra author table merged over the bundled one.
    pub author_overrides: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            feed_xml: PathBuf::from("inkhaven_updated.xml"),
            feed_json: PathBuf::from("inkhaven_feed.json"),
            tag_cache: PathBuf::from("tagged_posts.json"),
            community_tags: PathBuf::from("community_tags.json"),
            author_bios: PathBuf::from("author_bios.json"),
            static_dir: PathBuf::from("web/static"),
            author_overrides: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub model: String,
    pub max_tokens: u32,
    /// Pause between consecutive classifier calls.
    pub request_delay_ms: u64,
    pub timeout_secs: u64,
    pub api_base_url: Option<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-5-20250929".to_string(),
            max_tokens: 150,
            request_delay_ms: 500,
            timeout_secs: 60,
            api_base_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Json,
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub sqlite_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Json,
            sqlite_url: "sqlite://inkhaven.db?mode=rwc".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, or from `inkhaven.toml` if it exists.
    ///
    /// An explicitly requested file must exist; the default one is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, CoreError> {
        let mut config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound {
                        path: path.display().to_string(),
                    }
                    .into());
                }
                Self::from_toml_file(path)?
            }
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_toml_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, CoreError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&contents)?)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply environment overrides through `lookup` so tests need not touch
    /// the process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|key| !key.trim().is_empty()) {
            self.anthropic_api_key = Some(key);
        }

        if let Some(port) = lookup(PORT_ENV) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    field: PORT_ENV.to_string(),
                    value: port.clone(),
                })?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                value: "0".to_string(),
            });
        }
        if self.classifier.max_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                field: "classifier.max_tokens".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.anthropic_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvironmentVariable {
                var_name: API_KEY_ENV.to_string(),
            })
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.classifier.request_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.classifier.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.classifier.max_tokens, 150);
        assert_eq!(config.request_delay(), Duration::from_millis(500));
        assert_eq!(config.paths.tag_cache, PathBuf::from("tagged_posts.json"));
        assert_eq!(config.storage.backend, StorageBackend::Json);
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [server]
            port = 9000

            [classifier]
            request_delay_ms = 0

            [storage]
            backend = "sqlite"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.classifier.request_delay_ms, 0);
        assert_eq!(config.classifier.model, "claude-sonnet-4-5-20250929");
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let result = AppConfig::from_toml_str("[server\nport = 1");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> =
            HashMap::from([(API_KEY_ENV, "sk-test"), (PORT_ENV, "8123")]);
        let mut config = AppConfig::default();
        config
            .apply_env(|name| env.get(name).map(|value| value.to_string()))
            .unwrap();

        assert_eq!(config.require_api_key().unwrap(), "sk-test");
        assert_eq!(config.server.port, 8123);
    }

    #[test]
    fn test_invalid_port_env() {
        let mut config = AppConfig::default();
        let result = config.apply_env(|name| (name == PORT_ENV).then(|| "eighty".to_string()));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_missing_api_key() {
        let config = AppConfig::default();
        assert!(matches!(
            config.require_api_key(),
            Err(ConfigError::MissingEnvironmentVariable { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let result = AppConfig::load(Some(&missing));
        assert!(matches!(
            result,
            Err(CoreError::Config(ConfigError::FileNotFound { .. }))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inkhaven.toml");
        std::fs::write(&path, "[paths]\ntag_cache = \"cache/tags.json\"\n").unwrap();

        let config = AppConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.paths.tag_cache, PathBuf::from("cache/tags.json"));
        assert_eq!(config.paths.community_tags, PathBuf::from("community_tags.json"));
    }
}
