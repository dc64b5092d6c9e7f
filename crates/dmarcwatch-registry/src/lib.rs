//! Domain validation, caching, voting and registry management.
//!
//! The main entry point is [`Registry`], which composes:
//!
//! - [`DomainValidationService`]: DNS lookup, parse and evaluate
//! - [`DomainStore`]: persistence of non-compliant domains
//! - [`TtlCache`]: cache-first reads of the registry and domain details
//! - [`VoteLedger`]: one upvote per client IP per domain
//!
//! All process state is owned by explicit instances; nothing is global.
//!
//! # Example
//!
//! ```rust,ignore
//! use dmarcwatch_dns::StaticLookup;
//! use dmarcwatch_registry::Registry;
//!
//! let lookup = StaticLookup::new().with_dmarc("example.com", "v=DMARC1; p=none");
//! let registry = Registry::builder(lookup).build();
//!
//! let result = registry.validate("example.com").await?;
//! assert!(result.is_valid);
//! ```

#![doc(html_root_url = "https://docs.rs/dmarcwatch-registry/0.3.0")]

pub mod cache;
pub mod client_ip;
pub mod clock;
pub mod config;
pub mod ledger;
mod registry;
pub mod storage;
mod validation;

pub use cache::TtlCache;
pub use client_ip::{resolve_client_ip, UNKNOWN_CLIENT};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{DnsConfig, WatchConfig};
pub use ledger::VoteLedger;
pub use registry::{Registry, RegistryBuilder, UpvoteOutcome};
pub use storage::{DomainStore, JsonFileStore, MemoryStore, StoredDomain};
pub use validation::{validate_record, DomainValidationService};

pub use dmarcwatch_core::{Error, Result};
