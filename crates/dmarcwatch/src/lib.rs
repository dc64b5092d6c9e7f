//! DMARC record parsing, policy evaluation and a registry of non-compliant domains.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use dmarcwatch::dns::HickoryLookup;
//! use dmarcwatch::Registry;
//!
//! #[tokio::main]
//! async fn main() -> dmarcwatch::Result<()> {
//!     let registry = Registry::builder(HickoryLookup::new()?).build();
//!
//!     // Check a domain and record it if it is non-compliant
//!     let result = registry.validate("example.com").await?;
//!     println!("valid: {}", result.is_valid);
//!     for issue in &result.issues {
//!         println!("[{}] {}", issue.severity, issue.message);
//!     }
//!
//!     // Registry, most upvoted first
//!     for entry in registry.list().await? {
//!         println!("{} ({}, {} votes)", entry.domain, entry.dmarc_status, entry.upvotes);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! Records can also be checked offline:
//!
//! ```rust
//! let policy = dmarcwatch::parse("v=DMARC1; p=reject; pct=50").unwrap();
//! assert_eq!(policy.percentage, Some(50));
//! assert_eq!(dmarcwatch::evaluate(&policy).len(), 3);
//! ```
//!
//! # Features
//!
//! - `default` - Enables `hickory`
//! - `hickory` - System DNS resolver ([`dns::HickoryLookup`])

#![doc(html_root_url = "https://docs.rs/dmarcwatch/0.3.0")]

// Re-export core types
pub use dmarcwatch_core::*;

// Re-export registry
pub use dmarcwatch_registry::{
    resolve_client_ip, validate_record, Clock, DnsConfig, DomainStore, DomainValidationService,
    JsonFileStore, ManualClock, MemoryStore, Registry, RegistryBuilder, StoredDomain,
    SystemClock, TtlCache, UpvoteOutcome, VoteLedger, WatchConfig, UNKNOWN_CLIENT,
};

// Re-export DNS lookups
pub use dmarcwatch_dns as dns;

// Re-export runtime for convenience
pub use serde;
pub use serde_json;
pub use tokio;
