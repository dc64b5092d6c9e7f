//! In-memory DNS answers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dmarcwatch_core::LookupError;

use crate::lookup::{dmarc_name, DnsLookup};

/// Lookup backed by a fixed table of TXT records.
///
/// Names are matched case-insensitively. Unknown names have no records.
#[derive(Debug, Default)]
pub struct StaticLookup {
    txt: HashMap<String, Vec<String>>,
    failures: HashMap<String, LookupError>,
    queries: AtomicUsize,
}

impl StaticLookup {
    /// Create an empty lookup table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add TXT records for an exact name
    #[must_use]
    pub fn with_txt<I, S>(mut self, name: &str, records: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.txt
            .entry(name.to_ascii_lowercase())
            .or_default()
            .extend(records.into_iter().map(Into::into));
        self
    }

    /// Publish a DMARC record for `domain` at `_dmarc.<domain>`
    #[must_use]
    pub fn with_dmarc(self, domain: &str, record: &str) -> Self {
        self.with_txt(&dmarc_name(domain), [record])
    }

    /// Make every query for `name` fail with `error`
    #[must_use]
    pub fn with_failure(mut self, name: &str, error: LookupError) -> Self {
        self.failures.insert(name.to_ascii_lowercase(), error);
        self
    }

    /// Number of TXT queries answered so far
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DnsLookup for StaticLookup {
    async fn txt_records(&self, name: &str) -> Result<Vec<String>, LookupError> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        let key = name.to_ascii_lowercase();
        if let Some(error) = self.failures.get(&key) {
            return Err(error.clone());
        }
        Ok(self.txt.get(&key).cloned().unwrap_or_default())
    }
}
