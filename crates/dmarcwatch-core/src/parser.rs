//! DMARC TXT record parser.
//!
//! Records are semicolon-separated `tag=value` pairs that must start with
//! `v=DMARC1`. Example: `"v=DMARC1; p=reject; rua=mailto:dmarc@example.com"`
//!
//! Parsing is lenient about layout (whitespace, empty segments, segments
//! without `=`, unknown tags such as `fo` or `ri`) and strict about values:
//! an out-of-range `pct` or an unknown policy keyword rejects the record.

use crate::error::ParseError;
use crate::types::{Alignment, AlignmentMode, DmarcPolicy, PolicyAction};

/// Literal every DMARC record must start with.
pub const VERSION_PREFIX: &str = "v=DMARC1";

/// Tags the parser acts on. Everything else is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Version,
    Policy,
    SubdomainPolicy,
    Percentage,
    AggregateReports,
    FailureReports,
    DkimAlignment,
    SpfAlignment,
}

impl Tag {
    /// Look up a tag by its lower-cased key
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "v" => Some(Self::Version),
            "p" => Some(Self::Policy),
            "sp" => Some(Self::SubdomainPolicy),
            "pct" => Some(Self::Percentage),
            "rua" => Some(Self::AggregateReports),
            "ruf" => Some(Self::FailureReports),
            "adkim" => Some(Self::DkimAlignment),
            "aspf" => Some(Self::SpfAlignment),
            _ => None,
        }
    }
}

/// Parse a raw DMARC TXT record.
///
/// A later occurrence of a single-valued tag overrides an earlier one;
/// `rua` and `ruf` addresses accumulate in declaration order. A record
/// without a `p` tag parses with policy `none`.
pub fn parse(record: &str) -> Result<DmarcPolicy, ParseError> {
    let trimmed = record.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }
    if !trimmed.starts_with(VERSION_PREFIX) {
        return Err(ParseError::MissingVersion);
    }

    let mut policy = DmarcPolicy::new(record);

    for (key, value) in tag_pairs(trimmed) {
        let key = key.to_ascii_lowercase();
        let Some(tag) = Tag::from_key(&key) else {
            continue;
        };
        apply_tag(&mut policy, tag, value)?;
    }

    Ok(policy)
}

/// Split a record into trimmed `(key, value)` pairs, skipping segments
/// that are empty or have no `=`.
fn tag_pairs(record: &str) -> impl Iterator<Item = (&str, &str)> {
    record
        .split(';')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .filter_map(|segment| segment.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim()))
}

fn apply_tag(policy: &mut DmarcPolicy, tag: Tag, value: &str) -> Result<(), ParseError> {
    match tag {
        Tag::Version => {
            if value != "DMARC1" {
                return Err(ParseError::InvalidVersion(value.to_string()));
            }
        }
        Tag::Policy => policy.policy = parse_action("p", value)?,
        Tag::SubdomainPolicy => policy.subdomain_policy = Some(parse_action("sp", value)?),
        Tag::Percentage => policy.percentage = Some(parse_percentage(value)?),
        Tag::AggregateReports | Tag::FailureReports => {
            policy.reporting_addresses.extend(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|addr| !addr.is_empty())
                    .map(ToString::to_string),
            );
        }
        Tag::DkimAlignment => {
            let mode = parse_alignment("adkim", value)?;
            policy.alignment.get_or_insert_with(Alignment::default).dkim = mode;
        }
        Tag::SpfAlignment => {
            let mode = parse_alignment("aspf", value)?;
            policy.alignment.get_or_insert_with(Alignment::default).spf = mode;
        }
    }
    Ok(())
}

fn parse_action(tag: &'static str, value: &str) -> Result<PolicyAction, ParseError> {
    PolicyAction::from_value(value).ok_or_else(|| ParseError::InvalidPolicy {
        tag,
        value: value.to_string(),
    })
}

fn parse_alignment(tag: &'static str, value: &str) -> Result<AlignmentMode, ParseError> {
    AlignmentMode::from_value(value).ok_or_else(|| ParseError::InvalidAlignment {
        tag,
        value: value.to_string(),
    })
}

/// Only plain decimal digits; `+50`, `50.0` and `-1` are rejected.
fn parse_percentage(value: &str) -> Result<u8, ParseError> {
    let invalid = || ParseError::InvalidPercentage(value.to_string());

    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    match value.parse::<u32>() {
        Ok(n) if n <= 100 => u8::try_from(n).map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_record() {
        let policy = parse("v=DMARC1; p=none").unwrap();
        assert_eq!(policy, DmarcPolicy::new("v=DMARC1; p=none"));
        assert_eq!(policy.policy, PolicyAction::None);
        assert_eq!(policy.raw_record, "v=DMARC1; p=none");
    }

    #[test]
    fn test_full_record() {
        let record = "v=DMARC1; p=reject; pct=50; rua=mailto:dmarc@example.com; adkim=s; aspf=r";
        let policy = parse(record).unwrap();
        assert_eq!(policy.policy, PolicyAction::Reject);
        assert_eq!(policy.percentage, Some(50));
        assert_eq!(policy.reporting_addresses, vec!["mailto:dmarc@example.com"]);
        assert_eq!(
            policy.alignment,
            Some(Alignment {
                spf: AlignmentMode::Relaxed,
                dkim: AlignmentMode::Strict,
            })
        );
        assert!(policy.subdomain_policy.is_none());
    }

    #[test]
    fn test_wrong_version_is_rejected() {
        assert_eq!(parse("v=DMARC2; p=none"), Err(ParseError::MissingVersion));
        assert_eq!(parse("p=none; v=DMARC1"), Err(ParseError::MissingVersion));
        assert_eq!(parse("spf1 -all"), Err(ParseError::MissingVersion));
    }

    #[test]
    fn test_empty_record_is_rejected() {
        assert_eq!(parse(""), Err(ParseError::Empty));
        assert_eq!(parse("   "), Err(ParseError::Empty));
    }

    #[test]
    fn test_repeated_version_must_match() {
        assert_eq!(
            parse("v=DMARC1; p=none; v=DMARC3"),
            Err(ParseError::InvalidVersion("DMARC3".into()))
        );
        assert_eq!(
            parse("v=DMARC1x; p=none"),
            Err(ParseError::InvalidVersion("DMARC1x".into()))
        );
        assert!(parse("v=DMARC1; v=DMARC1; p=none").is_ok());
    }

    #[test]
    fn test_invalid_policy_values() {
        assert!(matches!(
            parse("v=DMARC1; p=block"),
            Err(ParseError::InvalidPolicy { tag: "p", .. })
        ));
        assert!(matches!(
            parse("v=DMARC1; p=reject; sp=maybe"),
            Err(ParseError::InvalidPolicy { tag: "sp", .. })
        ));
    }

    #[test]
    fn test_percentage_bounds() {
        assert_eq!(parse("v=DMARC1; p=none; pct=0").unwrap().percentage, Some(0));
        assert_eq!(parse("v=DMARC1; p=none; pct=100").unwrap().percentage, Some(100));
        for bad in ["101", "-1", "+50", "50.5", "abc", ""] {
            let record = format!("v=DMARC1; p=none; pct={bad}");
            assert_eq!(
                parse(&record),
                Err(ParseError::InvalidPercentage(bad.into())),
                "pct={bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_alignment_normalization() {
        let policy = parse("v=DMARC1; p=none; adkim=relaxed; aspf=strict").unwrap();
        let alignment = policy.alignment.unwrap();
        assert_eq!(alignment.dkim, AlignmentMode::Relaxed);
        assert_eq!(alignment.spf, AlignmentMode::Strict);

        assert!(matches!(
            parse("v=DMARC1; p=none; aspf=x"),
            Err(ParseError::InvalidAlignment { tag: "aspf", .. })
        ));
    }

    #[test]
    fn test_single_alignment_tag_defaults_other_side() {
        let policy = parse("v=DMARC1; p=reject; adkim=s").unwrap();
        assert_eq!(
            policy.alignment,
            Some(Alignment {
                spf: AlignmentMode::Relaxed,
                dkim: AlignmentMode::Strict,
            })
        );
    }

    #[test]
    fn test_reporting_addresses_keep_order_and_duplicates() {
        let record = "v=DMARC1; p=quarantine; rua=mailto:a@example.com, mailto:b@example.com; \
                      ruf=mailto:a@example.com";
        let policy = parse(record).unwrap();
        assert_eq!(
            policy.reporting_addresses,
            vec![
                "mailto:a@example.com",
                "mailto:b@example.com",
                "mailto:a@example.com",
            ]
        );
    }

    #[test]
    fn test_layout_leniency() {
        let policy = parse("  v=DMARC1 ;; p = reject ; garbage ; fo=1 ; ri=3600 ;  ").unwrap();
        assert_eq!(policy.policy, PolicyAction::Reject);
        assert!(policy.reporting_addresses.is_empty());
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let policy = parse("v=DMARC1; P=reject; SP=quarantine; PCT=25").unwrap();
        assert_eq!(policy.policy, PolicyAction::Reject);
        assert_eq!(policy.subdomain_policy, Some(PolicyAction::Quarantine));
        assert_eq!(policy.percentage, Some(25));
    }

    #[test]
    fn test_later_tag_overrides_earlier() {
        let policy = parse("v=DMARC1; p=none; p=reject").unwrap();
        assert_eq!(policy.policy, PolicyAction::Reject);
    }

    #[test]
    fn test_missing_policy_tag_defaults_to_none() {
        let policy = parse("v=DMARC1; rua=mailto:d@example.com").unwrap();
        assert_eq!(policy.policy, PolicyAction::None);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let record = "v=DMARC1; p=quarantine; sp=reject; pct=75; rua=mailto:x@example.org";
        assert_eq!(parse(record).unwrap(), parse(record).unwrap());
    }
}
