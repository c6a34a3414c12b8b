use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub memex: MemexConfig,
    pub embeddings: EmbeddingsConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Memex-specific configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MemexConfig {
    /// Path to the vault root. Notes, artifacts and the journal live here,
    /// and the indexer walks this tree for markdown files.
    pub vault_path: PathBuf,
    pub db_path: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Embeddings configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingsConfig {
    pub provider: String,
    pub model: String,
    pub api_key_env: String,
    pub batch_size: usize,
    pub dimensions: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

/// Search configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_k")]
    pub default_k: usize,
    #[serde(default = "default_min_score")]
    pub min_score: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_k: default_k(),
            min_score: default_min_score(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_cache_capacity() -> usize {
    1000
}

fn default_k() -> usize {
    20
}

fn default_min_score() -> f32 {
    -1.0
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for the config file in this order:
    /// 1. Path specified in MEMEX_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        // .env is optional; ignore errors
        let _ = dotenv::dotenv();

        let config_path = std::env::var("MEMEX_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config = Self::from_toml_str(&config_str)?;

        // The API key must be resolvable before any indexing starts
        std::env::var(&config.embeddings.api_key_env).with_context(|| {
            format!(
                "Environment variable {} not set. Set it in your .env file or as an environment variable.",
                config.embeddings.api_key_env
            )
        })?;

        if !config.memex.vault_path.is_dir() {
            anyhow::bail!(
                "vault_path is not a directory: {}. Set vault_path in config.toml to your vault root.",
                config.memex.vault_path.display()
            );
        }

        Ok(config)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str).context("Failed to parse config.toml")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.embeddings.batch_size == 0 {
            anyhow::bail!("embeddings.batch_size must be greater than 0");
        }

        if self.embeddings.dimensions == 0 {
            anyhow::bail!("embeddings.dimensions must be greater than 0");
        }

        if self.embeddings.timeout_secs == 0 {
            anyhow::bail!("embeddings.timeout_secs must be greater than 0");
        }

        if self.search.default_k == 0 {
            anyhow::bail!("search.default_k must be greater than 0");
        }

        // Cosine similarity ranges over [-1, 1]
        if self.search.min_score < -1.0 || self.search.min_score > 1.0 {
            anyhow::bail!("search.min_score must be between -1.0 and 1.0");
        }

        Ok(())
    }

    /// Get database path
    pub fn db_path(&self) -> &Path {
        &self.memex.db_path
    }

    /// Get the vault root path
    pub fn vault_path(&self) -> &Path {
        &self.memex.vault_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config_toml() -> &'static str {
        r#"
[memex]
vault_path = "./vault"
db_path = "./index.db"
log_level = "debug"

[embeddings]
provider = "openai"
model = "text-embedding-3-small"
api_key_env = "OPENAI_API_KEY"
batch_size = 100
dimensions = 1536

[search]
default_k = 10
min_score = 0.2
"#
    }

    #[test]
    fn test_config_parse_success() {
        let config = Config::from_toml_str(test_config_toml()).unwrap();
        assert_eq!(config.memex.log_level, "debug");
        assert_eq!(config.embeddings.batch_size, 100);
        assert_eq!(config.embeddings.dimensions, 1536);
        assert_eq!(config.search.default_k, 10);
        assert!((config.search.min_score - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_config_defaults() {
        // No [search] section, no optional embedding fields
        let config = Config::from_toml_str(
            r#"
[memex]
vault_path = "./vault"
db_path = "./index.db"

[embeddings]
provider = "openai"
model = "text-embedding-3-small"
api_key_env = "OPENAI_API_KEY"
batch_size = 64
dimensions = 1024
"#,
        )
        .unwrap();

        assert_eq!(config.memex.log_level, "info");
        assert_eq!(config.search.default_k, 20);
        assert_eq!(config.embeddings.timeout_secs, 30);
        assert_eq!(config.embeddings.cache_capacity, 1000);
    }

    #[test]
    fn test_config_rejects_zero_k() {
        let toml = test_config_toml().replace("default_k = 10", "default_k = 0");
        assert!(Config::from_toml_str(&toml).is_err());
    }

    #[test]
    fn test_config_rejects_bad_min_score() {
        let toml = test_config_toml().replace("min_score = 0.2", "min_score = 1.5");
        assert!(Config::from_toml_str(&toml).is_err());
    }

    #[test]
    fn test_config_rejects_zero_dimensions() {
        let toml = test_config_toml().replace("dimensions = 1536", "dimensions = 0");
        assert!(Config::from_toml_str(&toml).is_err());
    }
}
