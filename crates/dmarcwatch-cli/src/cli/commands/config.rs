//! `dmarcwatch config` - CLI configuration management.

use anyhow::Result;
use colored::Colorize;

use super::Context;
use crate::cli::args::{ConfigArgs, ConfigCommands};
use crate::config::Config;
use crate::output::{self, OutputFormat};

pub fn execute(ctx: &Context, args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(ctx),
        ConfigCommands::Set { key, value } => set_config(&key, &value),
        ConfigCommands::Path => show_path(),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let config = Config::load()?;

    if output::print_structured(ctx.output_format, &config)? {
        return Ok(());
    }

    println!("{}", "Current Configuration:".bold());
    println!();
    println!(
        "  {} {}",
        "output_format:".bold(),
        config.output_format.unwrap_or(OutputFormat::Pretty)
    );
    let store = config.store_path.as_ref().map_or_else(
        || format!("{} {}", ctx.store_path.display(), "(in use)".dimmed()),
        |p| p.display().to_string(),
    );
    println!("  {} {store}", "store_path:".bold());
    println!("  {} {}", "cache_ttl_secs:".bold(), config.watch.cache_ttl_secs);
    println!("  {} {}", "dns.timeout_secs:".bold(), config.watch.dns.timeout_secs);
    println!("  {} {}", "dns.attempts:".bold(), config.watch.dns.attempts);
    println!("  {} {}", "concurrency:".bold(), config.watch.concurrency);
    println!(
        "  {} {}",
        "watch_interval_secs:".bold(),
        config.watch.watch_interval_secs
    );

    Ok(())
}

fn set_config(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;
    println!("{} {} set to {}.", "Success:".green().bold(), key, value.cyan());
    Ok(())
}

fn show_path() -> Result<()> {
    let path = Config::path()?;
    println!("{}", path.display());
    Ok(())
}
