use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ValidationResult;

/// Why a domain is listed in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DmarcStatus {
    /// No DMARC record published
    Missing,
    /// Record has at least one error
    Invalid,
    /// Record parses without errors but the domain is still listed
    Weak,
}

impl std::fmt::Display for DmarcStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(f, "missing"),
            Self::Invalid => write!(f, "invalid"),
            Self::Weak => write!(f, "weak"),
        }
    }
}

/// A non-compliant domain as shown in the registry.
///
/// Built from a stored result with [`DomainEntry::new`]; `dmarc_status` and
/// `last_checked` are derived from the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainEntry {
    /// Registered domain
    pub domain: String,

    /// Time of the most recent check
    pub last_checked: DateTime<Utc>,

    /// Community upvotes
    pub upvotes: u64,

    /// Derived status
    pub dmarc_status: DmarcStatus,

    /// Most recent check result
    pub validation_result: ValidationResult,
}

impl DomainEntry {
    /// Build an entry from a check result and its vote count
    #[must_use]
    pub fn new(validation_result: ValidationResult, upvotes: u64) -> Self {
        Self {
            domain: validation_result.domain.clone(),
            last_checked: validation_result.check_timestamp,
            upvotes,
            dmarc_status: crate::dmarc_status(&validation_result),
            validation_result,
        }
    }
}
