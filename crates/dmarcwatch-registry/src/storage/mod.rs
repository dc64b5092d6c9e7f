//! Storage of checked domains, keyed by domain name.

mod json_file;
mod memory;

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dmarcwatch_core::{DomainEntry, StorageError, ValidationResult};
use serde::{Deserialize, Serialize};

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// A stored domain document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDomain {
    /// Latest check result
    pub result: ValidationResult,

    /// Community upvotes
    #[serde(default)]
    pub upvotes: u64,

    /// Time of the first check that stored this domain
    pub first_seen: DateTime<Utc>,
}

impl StoredDomain {
    /// Registry view of this document
    #[must_use]
    pub fn entry(&self) -> DomainEntry {
        DomainEntry::new(self.result.clone(), self.upvotes)
    }
}

/// Durable storage collaborator.
///
/// `increment_upvotes` must be atomic: concurrent increments on one
/// domain may not lose updates.
#[async_trait]
pub trait DomainStore: Send + Sync {
    /// Fetch one domain
    async fn get_domain(&self, domain: &str) -> Result<Option<StoredDomain>, StorageError>;

    /// Store a newly seen domain with zero upvotes. If the domain already
    /// exists its result is replaced and its upvotes are kept.
    async fn create_domain(&self, result: &ValidationResult) -> Result<StoredDomain, StorageError>;

    /// Replace the result of an existing domain, keeping its upvotes
    async fn update_domain(&self, result: &ValidationResult) -> Result<StoredDomain, StorageError>;

    /// Remove a domain; returns true if it existed
    async fn delete_domain(&self, domain: &str) -> Result<bool, StorageError>;

    /// Every stored domain whose latest result is not valid
    async fn non_compliant_domains(&self) -> Result<Vec<StoredDomain>, StorageError>;

    /// Add one upvote and return the new count
    async fn increment_upvotes(&self, domain: &str) -> Result<u64, StorageError>;
}

/// In-memory table shared by the store implementations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
struct DomainTable {
    domains: BTreeMap<String, StoredDomain>,
}

impl DomainTable {
    fn get(&self, domain: &str) -> Option<StoredDomain> {
        self.domains.get(domain).cloned()
    }

    fn create(&mut self, result: &ValidationResult) -> StoredDomain {
        let stored = self
            .domains
            .entry(result.domain.clone())
            .and_modify(|existing| existing.result = result.clone())
            .or_insert_with(|| StoredDomain {
                result: result.clone(),
                upvotes: 0,
                first_seen: result.check_timestamp,
            });
        stored.clone()
    }

    fn update(&mut self, result: &ValidationResult) -> Result<StoredDomain, StorageError> {
        let existing = self
            .domains
            .get_mut(&result.domain)
            .ok_or_else(|| not_found(&result.domain))?;
        existing.result = result.clone();
        Ok(existing.clone())
    }

    fn delete(&mut self, domain: &str) -> bool {
        self.domains.remove(domain).is_some()
    }

    fn non_compliant(&self) -> Vec<StoredDomain> {
        self.domains
            .values()
            .filter(|d| !d.result.is_valid)
            .cloned()
            .collect()
    }

    fn increment(&mut self, domain: &str) -> Result<u64, StorageError> {
        let existing = self.domains.get_mut(domain).ok_or_else(|| not_found(domain))?;
        existing.upvotes = existing.upvotes.saturating_add(1);
        Ok(existing.upvotes)
    }

    fn len(&self) -> usize {
        self.domains.len()
    }
}

fn not_found(domain: &str) -> StorageError {
    StorageError::Backend(format!("domain not found: {domain}"))
}
