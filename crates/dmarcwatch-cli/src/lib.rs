//! # dmarcwatch-cli
//!
//! Command-line interface for DMARC checks and the non-compliant domain registry.
//!
//! ## Features
//!
//! - **Offline parsing**: `parse` evaluates a record without touching DNS
//! - **Live checks**: `check`, `recheck` and `watch` query `_dmarc` TXT records
//! - **Registry**: `registry`, `details` and `upvote` over a JSON file store
//! - **Multiple output formats**: Pretty tables, JSON, CSV, YAML

pub mod cli;
pub mod config;
pub mod output;

pub use cli::run;
