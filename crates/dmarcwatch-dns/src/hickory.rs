//! System resolver lookups via hickory.

use std::time::Duration;

use async_trait::async_trait;
use dmarcwatch_core::LookupError;
use hickory_resolver::TokioResolver;
use tracing::debug;

use crate::lookup::DnsLookup;

/// Resolver tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverSettings {
    /// Per-attempt timeout
    pub timeout: Duration,
    /// Attempts per name server
    pub attempts: usize,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            attempts: 2,
        }
    }
}

impl ResolverSettings {
    /// Upper bound for one lookup, retries included
    #[must_use]
    pub fn deadline(&self) -> Duration {
        let attempts = u32::try_from(self.attempts.max(1)).unwrap_or(u32::MAX);
        self.timeout.saturating_mul(attempts) + Duration::from_secs(1)
    }
}

/// DNS lookups through the system-configured resolver
#[derive(Clone)]
pub struct HickoryLookup {
    resolver: TokioResolver,
    settings: ResolverSettings,
}

impl HickoryLookup {
    /// Create a lookup using the system resolver and default settings
    pub fn new() -> Result<Self, LookupError> {
        Self::with_settings(ResolverSettings::default())
    }

    /// Create a lookup using the system resolver with custom settings
    pub fn with_settings(settings: ResolverSettings) -> Result<Self, LookupError> {
        let mut builder = TokioResolver::builder_tokio()
            .map_err(|e| LookupError::ResolverInit(e.to_string()))?;

        let opts = builder.options_mut();
        opts.timeout = settings.timeout;
        opts.attempts = settings.attempts;

        Ok(Self {
            resolver: builder.build(),
            settings,
        })
    }

    /// Map a resolver error onto "no records" or a [`LookupError`]
    fn classify_error(name: &str, e: &hickory_resolver::ResolveError) -> Option<LookupError> {
        if e.is_no_records_found() || e.is_nx_domain() {
            return None;
        }

        let msg = e.to_string().to_lowercase();
        if msg.contains("timed out") || msg.contains("timeout") {
            Some(LookupError::Timeout(name.to_string()))
        } else {
            Some(LookupError::Transport {
                name: name.to_string(),
                message: e.to_string(),
            })
        }
    }
}

#[async_trait]
impl DnsLookup for HickoryLookup {
    async fn txt_records(&self, name: &str) -> Result<Vec<String>, LookupError> {
        debug!(name = name, "querying TXT records");

        let lookup = tokio::time::timeout(self.settings.deadline(), self.resolver.txt_lookup(name))
            .await
            .map_err(|_| LookupError::Timeout(name.to_string()))?;

        match lookup {
            Ok(response) => Ok(response
                .iter()
                .map(|txt| {
                    txt.iter()
                        .map(|data| String::from_utf8_lossy(data).to_string())
                        .collect::<Vec<_>>()
                        .join("")
                })
                .collect()),
            Err(e) => match Self::classify_error(name, &e) {
                None => {
                    debug!(name = name, error = %e, "no TXT records");
                    Ok(Vec::new())
                }
                Some(err) => Err(err),
            },
        }
    }
}
