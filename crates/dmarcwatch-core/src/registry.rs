//! Registry status derivation and display ordering.

use std::cmp::Ordering;

use crate::types::{DmarcStatus, DomainEntry, ValidationResult};

/// Derive the registry status of a check result.
///
/// Fully compliant results never reach the registry, so anything without
/// errors is reported as `weak`.
#[must_use]
pub fn dmarc_status(result: &ValidationResult) -> DmarcStatus {
    if result.dmarc_record.is_none() {
        DmarcStatus::Missing
    } else if result.has_errors() {
        DmarcStatus::Invalid
    } else {
        DmarcStatus::Weak
    }
}

/// Registry ordering: most upvotes first, then most recently checked.
#[must_use]
pub fn compare_entries(a: &DomainEntry, b: &DomainEntry) -> Ordering {
    b.upvotes
        .cmp(&a.upvotes)
        .then_with(|| b.last_checked.cmp(&a.last_checked))
}

/// Sort entries into registry order.
///
/// The sort is stable: entries with equal upvotes and check time keep
/// their input order.
pub fn sort_entries(entries: &mut [DomainEntry]) {
    entries.sort_by(compare_entries);
}
