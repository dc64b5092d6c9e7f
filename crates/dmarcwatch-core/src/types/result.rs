use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DmarcPolicy, IssueKind, Severity, ValidationIssue};

/// Outcome of checking one domain.
///
/// Each check produces a fresh snapshot; results are never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// Domain that was checked
    pub domain: String,

    /// Raw DMARC record, `None` if none was published
    pub dmarc_record: Option<String>,

    /// True iff a record exists and no issue has severity `error`
    pub is_valid: bool,

    /// Findings in evaluation order
    pub issues: Vec<ValidationIssue>,

    /// When the check ran
    pub check_timestamp: DateTime<Utc>,

    /// Parsed policy, absent if the record was missing or unparseable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_policy: Option<DmarcPolicy>,
}

impl ValidationResult {
    /// Result for a domain that publishes no DMARC record
    #[must_use]
    pub fn missing(domain: impl Into<String>, checked_at: DateTime<Utc>) -> Self {
        let domain = domain.into();
        let issue = ValidationIssue::new(
            IssueKind::MissingRecord,
            Severity::Error,
            format!("No DMARC record found at _dmarc.{domain}"),
            "Publish a TXT record at _dmarc.<domain>, starting with \
             \"v=DMARC1; p=none; rua=mailto:<address>\" and tightening the policy over time",
        );
        Self {
            domain,
            dmarc_record: None,
            is_valid: false,
            issues: vec![issue],
            check_timestamp: checked_at,
            parsed_policy: None,
        }
    }

    /// Result for a record that was found but could not be parsed
    #[must_use]
    pub fn unparseable(
        domain: impl Into<String>,
        record: impl Into<String>,
        reason: &crate::ParseError,
        checked_at: DateTime<Utc>,
    ) -> Self {
        let issue = ValidationIssue::new(
            IssueKind::SyntaxError,
            Severity::Error,
            format!("DMARC record could not be parsed: {reason}"),
            "Fix the record syntax; see RFC 7489 section 6.3 for the tag grammar",
        );
        Self {
            domain: domain.into(),
            dmarc_record: Some(record.into()),
            is_valid: false,
            issues: vec![issue],
            check_timestamp: checked_at,
            parsed_policy: None,
        }
    }

    /// Result for a parsed record and its evaluation
    #[must_use]
    pub fn evaluated(
        domain: impl Into<String>,
        policy: DmarcPolicy,
        issues: Vec<ValidationIssue>,
        checked_at: DateTime<Utc>,
    ) -> Self {
        let is_valid = !issues.iter().any(ValidationIssue::is_error);
        Self {
            domain: domain.into(),
            dmarc_record: Some(policy.raw_record.clone()),
            is_valid,
            issues,
            check_timestamp: checked_at,
            parsed_policy: Some(policy),
        }
    }

    /// Returns true if any issue has severity `error`
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(ValidationIssue::is_error)
    }

    /// Count of issues at the given severity
    #[must_use]
    pub fn count_severity(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_missing_record_is_never_valid() {
        let result = ValidationResult::missing("example.com", at());
        assert!(!result.is_valid);
        assert!(result.dmarc_record.is_none());
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].kind, IssueKind::MissingRecord);
        assert_eq!(result.issues[0].severity, Severity::Error);
    }

    #[test]
    fn test_evaluated_validity_follows_error_issues() {
        let policy = DmarcPolicy::new("v=DMARC1; p=none");
        let warning = ValidationIssue::new(IssueKind::WeakPolicy, Severity::Warning, "weak", "fix");
        let ok = ValidationResult::evaluated("example.com", policy.clone(), vec![warning], at());
        assert!(ok.is_valid);
        assert_eq!(ok.dmarc_record.as_deref(), Some("v=DMARC1; p=none"));

        let error = ValidationIssue::new(IssueKind::SyntaxError, Severity::Error, "bad", "fix");
        let bad = ValidationResult::evaluated("example.com", policy, vec![error], at());
        assert!(!bad.is_valid);
        assert!(bad.has_errors());
    }

    #[test]
    fn test_result_wire_format() {
        let result = ValidationResult::missing("example.com", at());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["domain"], "example.com");
        assert!(json["dmarcRecord"].is_null());
        assert_eq!(json["isValid"], false);
        assert_eq!(json["checkTimestamp"], "2026-03-01T12:00:00Z");
        assert_eq!(json["issues"][0]["type"], "missing_record");
    }
}
