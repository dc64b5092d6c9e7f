//! Registry of non-compliant domains.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dmarcwatch_core::{sort_entries, DomainEntry, ValidationResult};
use dmarcwatch_dns::{normalize_domain, DnsLookup};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cache::{TtlCache, DEFAULT_TTL};
use crate::clock::{Clock, SystemClock};
use crate::config::WatchConfig;
use crate::ledger::VoteLedger;
use crate::storage::{DomainStore, MemoryStore, StoredDomain};
use crate::validation::DomainValidationService;
use crate::{Error, Result};

const LISTING_KEY: &str = "registry";

const VOTE_RECORDED: &str = "Vote recorded";
const ALREADY_VOTED: &str = "Already voted for this domain";
const NOT_IN_REGISTRY: &str = "Domain not found in registry";

/// Result of an upvote request.
///
/// Refusals are ordinary outcomes with `success == false`, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpvoteOutcome {
    /// Whether a vote was counted
    pub success: bool,

    /// Count after this vote, present on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_upvote_count: Option<u64>,

    /// Human readable outcome
    pub message: String,
}

impl UpvoteOutcome {
    fn recorded(count: u64) -> Self {
        Self {
            success: true,
            new_upvote_count: Some(count),
            message: VOTE_RECORDED.to_string(),
        }
    }

    fn refused(message: &str) -> Self {
        Self {
            success: false,
            new_upvote_count: None,
            message: message.to_string(),
        }
    }
}

/// Validation, storage, caching and voting behind one handle.
///
/// Every piece of state lives in this instance; two registries never
/// share a cache or a ledger.
pub struct Registry<L> {
    validator: DomainValidationService<L>,
    store: Arc<dyn DomainStore>,
    /// Listing tagged with the store generation it was read at
    listing: TtlCache<&'static str, (u64, Vec<DomainEntry>)>,
    generation: AtomicU64,
    details: TtlCache<String, ValidationResult>,
    ledger: VoteLedger,
    cache_ttl: Duration,
}

impl<L> std::fmt::Debug for Registry<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("listing", &self.listing)
            .field("details", &self.details)
            .field("generation", &self.generation)
            .field("ledger", &self.ledger)
            .field("cache_ttl", &self.cache_ttl)
            .finish_non_exhaustive()
    }
}

impl<L: DnsLookup> Registry<L> {
    /// Create a builder around a DNS collaborator
    #[must_use]
    pub fn builder(lookup: L) -> RegistryBuilder<L> {
        RegistryBuilder::new(lookup)
    }

    /// Validate `domain` and update the registry.
    ///
    /// A compliant domain is removed from the registry; any other result
    /// is stored, keeping existing upvotes.
    pub async fn validate(&self, domain: &str) -> Result<ValidationResult> {
        let result = self.validator.validate_domain(domain).await?;
        self.apply(&result).await?;
        Ok(result)
    }

    /// Re-validate a domain, dropping it from the registry if it is now
    /// compliant
    pub async fn recheck(&self, domain: &str) -> Result<ValidationResult> {
        debug!(domain = %domain, "rechecking domain");
        self.validate(domain).await
    }

    /// Non-compliant domains, most upvoted first
    ///
    /// A listing read before a later mutation is never served again, even
    /// if it reached the cache after that mutation invalidated it.
    pub async fn list(&self) -> Result<Vec<DomainEntry>> {
        let generation = self.generation.load(Ordering::Acquire);
        let (read_at, entries) = self.load_listing(generation).await?;
        if read_at >= generation {
            return Ok(entries);
        }

        debug!(read_at, generation, "dropping stale registry listing");
        self.listing.delete(&LISTING_KEY);
        let generation = self.generation.load(Ordering::Acquire);
        Ok(self.load_listing(generation).await?.1)
    }

    async fn load_listing(&self, generation: u64) -> Result<(u64, Vec<DomainEntry>)> {
        self.listing
            .try_get_or_set(LISTING_KEY, Some(self.cache_ttl), move || async move {
                let stored = self.store.non_compliant_domains().await?;
                let mut entries: Vec<DomainEntry> = stored.iter().map(StoredDomain::entry).collect();
                sort_entries(&mut entries);
                debug!(entries = entries.len(), "loaded registry listing");
                Ok::<_, Error>((generation, entries))
            })
            .await
    }

    /// Drop the cached listing and mark every earlier read as stale
    fn invalidate_listing(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.listing.delete(&LISTING_KEY);
    }

    /// Latest result for a domain, or `None` if it was never recorded
    pub async fn details(&self, domain: &str) -> Result<Option<ValidationResult>> {
        let domain = normalize_domain(domain);
        if let Some(result) = self.details.get(&domain) {
            debug!(domain = %domain, "details cache hit");
            return Ok(Some(result));
        }

        let Some(stored) = self.store.get_domain(&domain).await? else {
            return Ok(None);
        };
        self.details
            .set(domain, stored.result.clone(), Some(self.cache_ttl));
        Ok(Some(stored.result))
    }

    /// Count one upvote from `client_ip` for a listed domain.
    ///
    /// Each client may vote once per domain. If storage fails the vote is
    /// withdrawn from the ledger so the client can try again.
    pub async fn upvote(&self, domain: &str, client_ip: &str) -> Result<UpvoteOutcome> {
        let domain = normalize_domain(domain);
        if self.store.get_domain(&domain).await?.is_none() {
            return Ok(UpvoteOutcome::refused(NOT_IN_REGISTRY));
        }
        if !self.ledger.record_vote(client_ip, &domain) {
            debug!(domain = %domain, client = %client_ip, "duplicate vote refused");
            return Ok(UpvoteOutcome::refused(ALREADY_VOTED));
        }

        match self.store.increment_upvotes(&domain).await {
            Ok(count) => {
                self.invalidate_listing();
                info!(domain = %domain, upvotes = count, "vote recorded");
                Ok(UpvoteOutcome::recorded(count))
            }
            Err(e) => {
                self.ledger.forget(client_ip, &domain);
                warn!(domain = %domain, error = %e, "vote rolled back after storage failure");
                Err(e.into())
            }
        }
    }

    /// Drop expired cache entries; returns how many were reclaimed
    pub fn housekeeping(&self) -> usize {
        let reclaimed = self.listing.cleanup() + self.details.cleanup();
        if reclaimed > 0 {
            debug!(reclaimed, "cache housekeeping");
        }
        reclaimed
    }

    /// Clear both caches and every recorded vote
    pub fn reset(&self) {
        self.listing.clear();
        self.details.clear();
        self.ledger.clear();
    }

    /// Vote ledger
    pub const fn ledger(&self) -> &VoteLedger {
        &self.ledger
    }

    /// Storage collaborator
    pub fn store(&self) -> &dyn DomainStore {
        self.store.as_ref()
    }

    /// Validation service
    pub const fn validator(&self) -> &DomainValidationService<L> {
        &self.validator
    }

    async fn apply(&self, result: &ValidationResult) -> Result<()> {
        let domain = &result.domain;
        if result.is_valid {
            if self.store.delete_domain(domain).await? {
                info!(domain = %domain, "domain is compliant, removed from registry");
            }
        } else if self.store.get_domain(domain).await?.is_some() {
            self.store.update_domain(result).await?;
            info!(domain = %domain, issues = result.issues.len(), "registry entry updated");
        } else {
            self.store.create_domain(result).await?;
            info!(domain = %domain, issues = result.issues.len(), "domain added to registry");
        }

        self.invalidate_listing();
        self.details
            .set(domain.clone(), result.clone(), Some(self.cache_ttl));
        Ok(())
    }
}

/// Builder for configuring a [`Registry`]
pub struct RegistryBuilder<L> {
    lookup: L,
    store: Option<Arc<dyn DomainStore>>,
    clock: Arc<dyn Clock>,
    cache_ttl: Duration,
}

impl<L: DnsLookup> RegistryBuilder<L> {
    /// Create a builder with an in-memory store, the system clock and a
    /// 60-minute cache TTL
    #[must_use]
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            store: None,
            clock: Arc::new(SystemClock),
            cache_ttl: DEFAULT_TTL,
        }
    }

    /// Set the storage collaborator
    #[must_use]
    pub fn store(mut self, store: Arc<dyn DomainStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the time source used for check timestamps and cache expiry
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set the cache lifetime
    #[must_use]
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Apply the cache settings from a config
    #[must_use]
    pub fn config(self, config: &WatchConfig) -> Self {
        self.cache_ttl(config.cache_ttl())
    }

    /// Build the registry
    #[must_use]
    pub fn build(self) -> Registry<L> {
        let store: Arc<dyn DomainStore> = match self.store {
            Some(store) => store,
            None => Arc::new(MemoryStore::new()),
        };

        Registry {
            validator: DomainValidationService::with_clock(self.lookup, Arc::clone(&self.clock)),
            store,
            listing: TtlCache::with_clock(Arc::clone(&self.clock)).with_default_ttl(self.cache_ttl),
            details: TtlCache::with_clock(self.clock).with_default_ttl(self.cache_ttl),
            generation: AtomicU64::new(0),
            ledger: VoteLedger::new(),
            cache_ttl: self.cache_ttl,
        }
    }
}
