//! DialogSearch configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::planner::{DEFAULT_LIMIT, MAX_LIMIT, PlannerConfig};

/// Main DialogSearch configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Record store location
    pub database: DatabaseConfig,

    /// HTTP server settings
    pub server: ServerConfig,

    /// Pagination and index caching
    pub search: SearchConfig,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Validate configuration before use
    pub fn validate(&self) -> Result<()> {
        if self.search.default_limit == 0 {
            return Err(eyre::eyre!("search.default-limit must be greater than zero"));
        }
        if self.search.default_limit > self.search.max_limit {
            return Err(eyre::eyre!(
                "search.default-limit ({}) exceeds search.max-limit ({})",
                self.search.default_limit,
                self.search.max_limit
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .dialogsearch.yml
        let local_config = PathBuf::from(".dialogsearch.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/dialogsearch/dialogsearch.yml
        if let Some(user_config) = user_config_path()
            && user_config.exists()
        {
            match Self::load_from_file(&user_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is initialized
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates = [
            config_path.cloned(),
            Some(PathBuf::from(".dialogsearch.yml")),
            user_config_path(),
        ];
        candidates
            .into_iter()
            .flatten()
            .find(|p| p.exists())
            .and_then(|p| fs::read_to_string(p).ok())
            .and_then(|content| serde_yaml::from_str::<Config>(&content).ok())
            .and_then(|config| config.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("dialogsearch").join("dialogsearch.yml"))
}

/// Record store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data.db"),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind: String,

    /// Allow cross-origin requests from any origin
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
            cors: true,
        }
    }
}

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Page size when a request gives none
    #[serde(rename = "default-limit")]
    pub default_limit: u64,

    /// Larger requested page sizes are clamped to this
    #[serde(rename = "max-limit")]
    pub max_limit: u64,

    /// Keep the contiguity index between requests
    #[serde(rename = "cache-index")]
    pub cache_index: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
            cache_index: true,
        }
    }
}

impl SearchConfig {
    pub fn planner_config(&self) -> PlannerConfig {
        PlannerConfig {
            default_limit: self.default_limit,
            max_limit: self.max_limit,
            cache_index: self.cache_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.database.path, PathBuf::from("data.db"));
        assert_eq!(config.server.bind, "0.0.0.0:8000");
        assert_eq!(config.search.default_limit, 200);
        assert_eq!(config.search.max_limit, 1000);
        assert!(config.search.cache_index);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
database:
  path: /srv/hsr/data.db

server:
  bind: 127.0.0.1:9000
  cors: false

search:
  default-limit: 50
  max-limit: 500
  cache-index: false

log-level: debug
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.database.path, PathBuf::from("/srv/hsr/data.db"));
        assert_eq!(config.server.bind, "127.0.0.1:9000");
        assert!(!config.server.cors);
        assert_eq!(config.search.default_limit, 50);
        assert_eq!(config.search.max_limit, 500);
        assert!(!config.search.cache_index);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
search:
  max-limit: 300
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        // Specified value
        assert_eq!(config.search.max_limit, 300);

        // Defaults for unspecified
        assert_eq!(config.search.default_limit, 200);
        assert_eq!(config.server.bind, "0.0.0.0:8000");
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_validate_rejects_default_above_max() {
        let mut config = Config::default();
        config.search.default_limit = 2000;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max-limit"));

        config.search.default_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_explicit_path_and_log_level() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ds.yml");
        std::fs::write(&path, "log-level: WARN\ndatabase:\n  path: corpus.db\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.database.path, PathBuf::from("corpus.db"));
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("WARN"));
    }

    #[test]
    fn test_load_explicit_missing_path_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("absent.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_planner_config_mirrors_search_section() {
        let search = SearchConfig {
            default_limit: 10,
            max_limit: 20,
            cache_index: false,
        };
        let planner = search.planner_config();
        assert_eq!(planner.default_limit, 10);
        assert_eq!(planner.max_limit, 20);
        assert!(!planner.cache_index);
    }
}
