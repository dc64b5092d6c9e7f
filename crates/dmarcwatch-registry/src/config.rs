//! Runtime configuration for validation, caching and the watch loop.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Tuning for registry operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Lifetime of cached registry listings and details (default: 3600)
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Resolver settings
    #[serde(default)]
    pub dns: DnsConfig,

    /// Parallel lookups when checking several domains (default: 8)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Delay between watch rounds (default: 300)
    #[serde(default = "default_watch_interval")]
    pub watch_interval_secs: u64,
}

/// Resolver timeout and retry settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsConfig {
    /// Per-attempt timeout in seconds (default: 5)
    #[serde(default = "default_dns_timeout")]
    pub timeout_secs: u64,

    /// Attempts per name server (default: 2)
    #[serde(default = "default_dns_attempts")]
    pub attempts: usize,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl(),
            dns: DnsConfig::default(),
            concurrency: default_concurrency(),
            watch_interval_secs: default_watch_interval(),
        }
    }
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_dns_timeout(),
            attempts: default_dns_attempts(),
        }
    }
}

impl WatchConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Parse config from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no operation can run with
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(Error::Config("concurrency must be at least 1".into()));
        }
        if self.watch_interval_secs == 0 {
            return Err(Error::Config("watch_interval_secs must be at least 1".into()));
        }
        Ok(())
    }

    /// Cache lifetime
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Watch interval
    pub const fn watch_interval(&self) -> Duration {
        Duration::from_secs(self.watch_interval_secs)
    }
}

impl DnsConfig {
    /// Per-attempt timeout
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// Default value functions for serde.
const fn default_cache_ttl() -> u64 {
    60 * 60
}

const fn default_concurrency() -> usize {
    8
}

const fn default_watch_interval() -> u64 {
    300
}

const fn default_dns_timeout() -> u64 {
    5
}

const fn default_dns_attempts() -> usize {
    2
}
