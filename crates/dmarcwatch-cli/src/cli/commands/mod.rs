//! Command implementations.

pub mod check;
pub mod config;
pub mod details;
pub mod parse;
pub mod recheck;
pub mod registry;
pub mod upvote;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use dmarcwatch::dns::{HickoryLookup, ResolverSettings};
use dmarcwatch::{JsonFileStore, Registry, WatchConfig};
use tracing::debug;

use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Output format
    pub output_format: OutputFormat,

    /// Verbose output
    pub verbose: bool,

    /// Disable colors
    pub no_color: bool,

    /// Registry file
    pub store_path: PathBuf,

    /// Lookup, cache and watch tuning
    pub watch: WatchConfig,
}

impl Context {
    /// Resolver settings from the configured DNS tuning.
    pub fn resolver_settings(&self) -> ResolverSettings {
        ResolverSettings {
            timeout: self.watch.dns.timeout(),
            attempts: self.watch.dns.attempts,
        }
    }

    /// Open the registry backed by the system resolver and the registry file.
    pub async fn registry(&self) -> Result<Registry<HickoryLookup>> {
        let lookup = HickoryLookup::with_settings(self.resolver_settings())
            .context("failed to create DNS resolver")?;
        let store = JsonFileStore::open(&self.store_path)
            .await
            .with_context(|| format!("failed to open registry at {}", self.store_path.display()))?;
        debug!(path = %self.store_path.display(), "registry opened");

        Ok(Registry::builder(lookup)
            .store(Arc::new(store))
            .config(&self.watch)
            .build())
    }
}
