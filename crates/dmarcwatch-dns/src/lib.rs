//! DNS lookup of `_dmarc` TXT records.
//!
//! This crate provides the DNS side of dmarcwatch:
//!
//! - [`DnsLookup`]: the lookup trait the validation service depends on
//! - [`is_valid_domain`]: syntax check run before any query is sent
//! - [`HickoryLookup`]: system resolver (feature `hickory`, on by default)
//! - [`StaticLookup`]: in-memory answers for tests and offline use

#![doc(html_root_url = "https://docs.rs/dmarcwatch-dns/0.3.0")]

mod format;
mod lookup;
mod static_lookup;

#[cfg(feature = "hickory")]
mod hickory;

pub use format::{is_valid_domain, normalize_domain, MAX_DOMAIN_LEN, MAX_LABEL_LEN};
pub use lookup::{dmarc_name, select_dmarc_record, DnsLookup};
pub use static_lookup::StaticLookup;

#[cfg(feature = "hickory")]
pub use hickory::{HickoryLookup, ResolverSettings};

pub use dmarcwatch_core::LookupError;
