//! Core types and logic for DMARC compliance checking.
//!
//! This crate provides the pure, synchronous heart of dmarcwatch:
//!
//! - **Types**: The data model shared by every layer ([`DmarcPolicy`],
//!   [`ValidationIssue`], [`ValidationResult`], [`DomainEntry`])
//! - **Parser**: [`parse`] turns a raw `_dmarc` TXT record into a [`DmarcPolicy`]
//! - **Evaluator**: [`evaluate`] inspects a policy and lists its weaknesses
//! - **Registry policy**: [`dmarc_status`] and [`sort_entries`] for the
//!   non-compliant domain registry
//! - **Errors**: The error taxonomy shared across crates, rooted at [`Error`]
//!
//! # Example
//!
//! ```rust
//! use dmarcwatch_core::{evaluate, parse, IssueKind};
//!
//! let policy = parse("v=DMARC1; p=none").unwrap();
//! let issues = evaluate(&policy);
//! assert_eq!(issues[0].kind, IssueKind::WeakPolicy);
//! ```

#![doc(html_root_url = "https://docs.rs/dmarcwatch-core/0.3.0")]

mod error;
pub mod evaluator;
pub mod parser;
pub mod registry;
pub mod types;

pub use error::{Error, LookupError, ParseError, Result, StorageError};
pub use evaluator::evaluate;
pub use parser::parse;
pub use registry::{dmarc_status, sort_entries};
pub use types::*;
