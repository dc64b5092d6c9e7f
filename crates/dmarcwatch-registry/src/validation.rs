//! Domain validation: DNS lookup, then parse, then evaluate.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dmarcwatch_core::{evaluate, parse, LookupError, ValidationResult};
use dmarcwatch_dns::{normalize_domain, DnsLookup};
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};

/// Build the result for a domain from the record found for it (if any).
///
/// Pure: no I/O, and identical inputs give identical results.
#[must_use]
pub fn validate_record(
    domain: &str,
    record: Option<&str>,
    checked_at: DateTime<Utc>,
) -> ValidationResult {
    let Some(record) = record else {
        return ValidationResult::missing(domain, checked_at);
    };

    match parse(record) {
        Ok(policy) => {
            let issues = evaluate(&policy);
            ValidationResult::evaluated(domain, policy, issues, checked_at)
        }
        Err(e) => ValidationResult::unparseable(domain, record, &e, checked_at),
    }
}

/// Validates a domain's DMARC setup against live DNS
#[derive(Debug)]
pub struct DomainValidationService<L> {
    lookup: L,
    clock: Arc<dyn Clock>,
}

impl<L: DnsLookup> DomainValidationService<L> {
    /// Create a service on the system clock
    pub fn new(lookup: L) -> Self {
        Self::with_clock(lookup, Arc::new(SystemClock))
    }

    /// Create a service on the given clock
    pub fn with_clock(lookup: L, clock: Arc<dyn Clock>) -> Self {
        Self { lookup, clock }
    }

    /// The DNS collaborator
    pub const fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Validate `domain`.
    ///
    /// Missing, weak or broken records are reported in the result. Only
    /// a malformed domain name or a DNS transport failure is an error, and
    /// a malformed name is rejected before any query is sent.
    pub async fn validate_domain(&self, domain: &str) -> Result<ValidationResult, LookupError> {
        let domain = normalize_domain(domain);
        if !self.lookup.validate_domain_format(&domain) {
            debug!(domain = %domain, "rejecting malformed domain");
            return Err(LookupError::InvalidFormat(domain));
        }

        let record = self.lookup.lookup_dmarc_record(&domain).await?;
        let result = validate_record(&domain, record.as_deref(), self.clock.now());

        info!(
            domain = %domain,
            valid = result.is_valid,
            issues = result.issues.len(),
            "validated domain"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmarcwatch_core::{IssueKind, Severity};
    use dmarcwatch_dns::StaticLookup;

    #[tokio::test]
    async fn test_missing_record() {
        let service = DomainValidationService::new(StaticLookup::new());
        let result = service.validate_domain("example.com").await.unwrap();
        assert!(!result.is_valid);
        assert!(result.dmarc_record.is_none());
        assert_eq!(result.issues[0].kind, IssueKind::MissingRecord);
    }

    #[tokio::test]
    async fn test_weak_record_is_still_valid() {
        let lookup = StaticLookup::new().with_dmarc("example.com", "v=DMARC1; p=none");
        let service = DomainValidationService::new(lookup);

        let result = service.validate_domain("example.com").await.unwrap();
        assert!(result.is_valid);
        assert_eq!(result.issues.len(), 3);
        assert_eq!(result.count_severity(Severity::Warning), 1);
        assert!(result.parsed_policy.is_some());
    }

    #[tokio::test]
    async fn test_bad_reporting_address_invalidates() {
        let lookup = StaticLookup::new()
            .with_dmarc("example.com", "v=DMARC1; p=reject; sp=reject; rua=mailto:nobody");
        let service = DomainValidationService::new(lookup);

        let result = service.validate_domain("example.com").await.unwrap();
        assert!(!result.is_valid);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].kind, IssueKind::SyntaxError);
    }

    #[tokio::test]
    async fn test_unparseable_record_becomes_syntax_issue() {
        let lookup = StaticLookup::new().with_dmarc("example.com", "v=DMARC1; p=maybe");
        let service = DomainValidationService::new(lookup);

        let result = service.validate_domain("example.com").await.unwrap();
        assert!(!result.is_valid);
        assert_eq!(result.dmarc_record.as_deref(), Some("v=DMARC1; p=maybe"));
        assert!(result.parsed_policy.is_none());
        assert_eq!(result.issues[0].kind, IssueKind::SyntaxError);
        assert_eq!(result.issues[0].severity, Severity::Error);
    }

    #[tokio::test]
    async fn test_malformed_domain_fails_before_lookup() {
        let service = DomainValidationService::new(StaticLookup::new());
        let err = service.validate_domain("not_a_domain").await.unwrap_err();
        assert!(matches!(err, LookupError::InvalidFormat(_)));
        assert_eq!(service.lookup().query_count(), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let lookup = StaticLookup::new().with_failure(
            "_dmarc.example.com",
            LookupError::Transport {
                name: "_dmarc.example.com".into(),
                message: "SERVFAIL".into(),
            },
        );
        let service = DomainValidationService::new(lookup);
        let err = service.validate_domain("example.com").await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_domain_is_normalized() {
        let lookup = StaticLookup::new().with_dmarc("example.com", "v=DMARC1; p=reject");
        let service = DomainValidationService::new(lookup);
        let result = service.validate_domain("Example.COM.").await.unwrap();
        assert_eq!(result.domain, "example.com");
        assert!(result.dmarc_record.is_some());
    }

    #[test]
    fn test_validate_record_is_pure() {
        let at = Utc::now();
        let record = Some("v=DMARC1; p=quarantine; pct=30");
        assert_eq!(
            validate_record("a.com", record, at),
            validate_record("a.com", record, at)
        );
    }
}
