//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::output::OutputFormat;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.no_color);

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Load configuration
    let config = Config::load()?;

    // Determine output format
    let output_format = cli
        .output
        .or(config.output_format)
        .unwrap_or(OutputFormat::Pretty);

    // Registry file from CLI/env, then config, then the data directory
    let store_path = match cli.store.or_else(|| config.store_path.clone()) {
        Some(path) => path,
        None => Config::default_store_path()?,
    };

    // Create context for commands
    let ctx = commands::Context {
        output_format,
        verbose: cli.verbose,
        no_color: cli.no_color,
        store_path,
        watch: config.watch,
    };

    // Dispatch to appropriate command
    match cli.command {
        Commands::Parse(args) => commands::parse::execute(&ctx, args),
        Commands::Check(args) => commands::check::execute(&ctx, args).await,
        Commands::Recheck(args) => commands::recheck::execute(&ctx, args).await,
        Commands::Details(args) => commands::details::execute(&ctx, args).await,
        Commands::Registry => commands::registry::execute(&ctx).await,
        Commands::Upvote(args) => commands::upvote::execute(&ctx, args).await,
        Commands::Watch(args) => commands::watch::execute(&ctx, args).await,
        Commands::Config(args) => commands::config::execute(&ctx, args),
    }
}

/// Log to stderr. `RUST_LOG` wins; otherwise `--verbose` selects debug.
fn init_logging(verbose: bool, no_color: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_target(verbose)
        .try_init();
}
