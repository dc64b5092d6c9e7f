//! The DNS collaborator seam.

use async_trait::async_trait;
use dmarcwatch_core::parser::VERSION_PREFIX;
use dmarcwatch_core::LookupError;
use tracing::debug;

/// Name queried for a domain's DMARC policy
#[must_use]
pub fn dmarc_name(domain: &str) -> String {
    format!("_dmarc.{domain}")
}

/// Pick the first TXT record that is a DMARC record
#[must_use]
pub fn select_dmarc_record(records: Vec<String>) -> Option<String> {
    records
        .into_iter()
        .find(|record| record.trim_start().starts_with(VERSION_PREFIX))
}

/// DNS lookups needed to validate a domain's DMARC setup.
///
/// Implementors supply [`txt_records`](Self::txt_records); the DMARC
/// lookup itself is provided.
#[async_trait]
pub trait DnsLookup: Send + Sync {
    /// All TXT records at `name`, each record's strings concatenated.
    ///
    /// A name with no TXT records (including NXDOMAIN) yields an empty
    /// list, not an error.
    async fn txt_records(&self, name: &str) -> Result<Vec<String>, LookupError>;

    /// Syntax check run before any query is sent
    fn validate_domain_format(&self, domain: &str) -> bool {
        crate::is_valid_domain(domain)
    }

    /// Fetch the DMARC record published for `domain`.
    ///
    /// Returns `Ok(None)` if no TXT record at `_dmarc.<domain>` starts
    /// with `v=DMARC1`.
    async fn lookup_dmarc_record(&self, domain: &str) -> Result<Option<String>, LookupError> {
        if !self.validate_domain_format(domain) {
            return Err(LookupError::InvalidFormat(domain.to_string()));
        }

        let name = dmarc_name(domain);
        let records = self.txt_records(&name).await?;
        debug!(name = %name, count = records.len(), "fetched TXT records");

        Ok(select_dmarc_record(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dmarc_name() {
        assert_eq!(dmarc_name("example.com"), "_dmarc.example.com");
    }

    #[test]
    fn test_select_first_dmarc_record() {
        let records = vec![
            "google-site-verification=abc".to_string(),
            "v=DMARC1; p=reject".to_string(),
            "v=DMARC1; p=none".to_string(),
        ];
        assert_eq!(
            select_dmarc_record(records).as_deref(),
            Some("v=DMARC1; p=reject")
        );
    }

    #[test]
    fn test_select_none_without_dmarc_record() {
        let records = vec!["v=spf1 -all".to_string(), "v=DMARC2; p=none".to_string()];
        assert_eq!(select_dmarc_record(records), None);
        assert_eq!(select_dmarc_record(Vec::new()), None);
    }
}
