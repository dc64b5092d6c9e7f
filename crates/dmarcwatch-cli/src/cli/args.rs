//! Command-line argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;

/// DMARC checker and registry of non-compliant domains
///
/// Looks up `_dmarc` TXT records, explains what is weak or broken in them,
/// and keeps the failing domains in a local registry ranked by upvotes.
#[derive(Parser, Debug)]
#[command(name = "dmarcwatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Registry file (or set DMARCWATCH_STORE env var)
    #[arg(long, env = "DMARCWATCH_STORE", global = true)]
    pub store: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse and evaluate a DMARC record without any DNS lookup
    Parse(ParseArgs),

    /// Check one or more domains and update the registry
    Check(CheckArgs),

    /// Re-check a domain, removing it from the registry if now compliant
    Recheck(DomainArgs),

    /// Show the latest result recorded for a domain
    Details(DomainArgs),

    /// List non-compliant domains, most upvoted first
    Registry,

    /// Upvote a domain in the registry
    ///
    /// Votes are stored in the registry file, but the record of who voted
    /// lives only in memory. One vote per client is enforced within one
    /// process; separate invocations do not see each other's voters.
    Upvote(UpvoteArgs),

    /// Periodically re-check domains and report status changes
    Watch(WatchArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),
}

// ============================================================================
// Parse command
// ============================================================================

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Raw record, e.g. "v=DMARC1; p=reject; rua=mailto:dmarc@example.com"
    pub record: String,
}

// ============================================================================
// Domain commands
// ============================================================================

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Domains to check
    #[arg(required = true)]
    pub domains: Vec<String>,

    /// Parallel lookups (defaults to the configured concurrency)
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,
}

#[derive(Args, Debug)]
pub struct DomainArgs {
    /// Domain name
    pub domain: String,
}

#[derive(Args, Debug)]
pub struct UpvoteArgs {
    /// Domain to upvote
    pub domain: String,

    /// Client address the vote is recorded for
    #[arg(long)]
    pub ip: Option<String>,
}

// ============================================================================
// Watch command
// ============================================================================

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Domains to watch
    #[arg(required = true)]
    pub domains: Vec<String>,

    /// Seconds between rounds (defaults to the configured interval)
    #[arg(short, long)]
    pub interval: Option<u64>,
}

// ============================================================================
// Config command
// ============================================================================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
    },

    /// Show configuration file path
    Path,
}
