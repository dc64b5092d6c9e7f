use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dmarcwatch_core::{StorageError, ValidationResult};
use tokio::sync::Mutex;
use tracing::debug;

use super::{DomainStore, DomainTable, StoredDomain};

/// Store kept as one JSON document on disk.
///
/// The whole table is loaded on open and rewritten after every mutation.
/// Writes go to a sibling temp file that is renamed over the original.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    table: Mutex<DomainTable>,
}

impl JsonFileStore {
    /// Open the store at `path`, starting empty if the file does not exist
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let table = match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => DomainTable::default(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => DomainTable::default(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), domains = table.len(), "opened registry file");

        Ok(Self {
            path,
            table: Mutex::new(table),
        })
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, table: &DomainTable) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(table)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Apply `change` to a copy of the table, persist the copy, then swap it
    /// in. The in-memory table only moves once the file has been written.
    async fn commit<T>(
        &self,
        change: impl FnOnce(&mut DomainTable) -> Result<T, StorageError> + Send,
    ) -> Result<T, StorageError> {
        let mut table = self.table.lock().await;
        let mut next = table.clone();
        let out = change(&mut next)?;
        self.persist(&next).await?;
        *table = next;
        Ok(out)
    }
}

#[async_trait]
impl DomainStore for JsonFileStore {
    async fn get_domain(&self, domain: &str) -> Result<Option<StoredDomain>, StorageError> {
        Ok(self.table.lock().await.get(domain))
    }

    async fn create_domain(&self, result: &ValidationResult) -> Result<StoredDomain, StorageError> {
        self.commit(|table| Ok(table.create(result))).await
    }

    async fn update_domain(&self, result: &ValidationResult) -> Result<StoredDomain, StorageError> {
        self.commit(|table| table.update(result)).await
    }

    async fn delete_domain(&self, domain: &str) -> Result<bool, StorageError> {
        if self.table.lock().await.get(domain).is_none() {
            return Ok(false);
        }
        self.commit(|table| Ok(table.delete(domain))).await
    }

    async fn non_compliant_domains(&self) -> Result<Vec<StoredDomain>, StorageError> {
        Ok(self.table.lock().await.non_compliant())
    }

    async fn increment_upvotes(&self, domain: &str) -> Result<u64, StorageError> {
        self.commit(|table| table.increment(domain)).await
    }
}
