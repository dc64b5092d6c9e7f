//! Configuration management.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use dmarcwatch::WatchConfig;
use serde::{Deserialize, Serialize};

use crate::output::OutputFormat;

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Default output format.
    pub output_format: Option<OutputFormat>,

    /// Registry file location.
    pub store_path: Option<PathBuf>,

    /// Lookup, cache and watch tuning.
    #[serde(default)]
    pub watch: WatchConfig,
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("org", "dmarcwatch", "dmarcwatch")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
}

impl Config {
    /// Get the config file path.
    pub fn path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Default registry file path.
    pub fn default_store_path() -> Result<PathBuf> {
        Ok(project_dirs()?.data_dir().join("registry.json"))
    }

    /// Load configuration from file.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("invalid config in {}", path.display()))
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.watch.validate()?;
        Ok(config)
    }

    /// Save configuration to file.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Set one value by key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "output_format" | "output" => self.output_format = Some(value.parse()?),
            "store_path" | "store" => self.store_path = Some(PathBuf::from(value)),
            "cache_ttl_secs" => self.watch.cache_ttl_secs = value.parse()?,
            "dns.timeout_secs" => self.watch.dns.timeout_secs = value.parse()?,
            "dns.attempts" => self.watch.dns.attempts = value.parse()?,
            "concurrency" => self.watch.concurrency = value.parse()?,
            "watch_interval_secs" => self.watch.watch_interval_secs = value.parse()?,
            _ => anyhow::bail!(
                "Unknown config key: {key}\n\n\
                 Available keys:\n  \
                 output_format        - Default output format (pretty/json/csv/yaml)\n  \
                 store_path           - Registry file location\n  \
                 cache_ttl_secs       - Registry cache lifetime\n  \
                 dns.timeout_secs     - DNS timeout per attempt\n  \
                 dns.attempts         - DNS attempts per name server\n  \
                 concurrency          - Parallel lookups for check\n  \
                 watch_interval_secs  - Seconds between watch rounds"
            ),
        }
        self.watch.validate()?;
        Ok(())
    }
}
