//! `dmarcwatch upvote` - Vote for a domain in the registry.

use anyhow::Result;
use colored::Colorize;
use dmarcwatch::UNKNOWN_CLIENT;

use super::Context;
use crate::cli::args::UpvoteArgs;
use crate::output::{self, OutputFormat};

pub async fn execute(ctx: &Context, args: UpvoteArgs) -> Result<()> {
    let registry = ctx.registry().await?;
    let ip = args.ip.as_deref().unwrap_or(UNKNOWN_CLIENT);
    let outcome = registry.upvote(&args.domain, ip).await?;

    if output::print_structured(ctx.output_format, &outcome)? {
        return Ok(());
    }

    match ctx.output_format {
        OutputFormat::Csv => output::print_csv(&[&outcome])?,
        _ => match outcome.new_upvote_count {
            Some(count) if outcome.success => println!(
                "{} {} ({} now has {count} upvotes)",
                "Success:".green().bold(),
                outcome.message,
                args.domain.cyan()
            ),
            _ => println!("{} {}", "Not counted:".yellow().bold(), outcome.message),
        },
    }

    Ok(())
}
