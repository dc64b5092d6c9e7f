use async_trait::async_trait;
use dmarcwatch_core::{StorageError, ValidationResult};
use tokio::sync::RwLock;

use super::{DomainStore, DomainTable, StoredDomain};

/// In-memory store. Not durable; used by tests and one-shot runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: RwLock<DomainTable>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored domains
    pub async fn len(&self) -> usize {
        self.table.read().await.len()
    }

    /// Returns true if nothing is stored
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl DomainStore for MemoryStore {
    async fn get_domain(&self, domain: &str) -> Result<Option<StoredDomain>, StorageError> {
        Ok(self.table.read().await.get(domain))
    }

    async fn create_domain(&self, result: &ValidationResult) -> Result<StoredDomain, StorageError> {
        Ok(self.table.write().await.create(result))
    }

    async fn update_domain(&self, result: &ValidationResult) -> Result<StoredDomain, StorageError> {
        self.table.write().await.update(result)
    }

    async fn delete_domain(&self, domain: &str) -> Result<bool, StorageError> {
        Ok(self.table.write().await.delete(domain))
    }

    async fn non_compliant_domains(&self) -> Result<Vec<StoredDomain>, StorageError> {
        Ok(self.table.read().await.non_compliant())
    }

    async fn increment_upvotes(&self, domain: &str) -> Result<u64, StorageError> {
        self.table.write().await.increment(domain)
    }
}
