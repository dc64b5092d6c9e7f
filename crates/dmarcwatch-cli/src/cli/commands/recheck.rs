//! `dmarcwatch recheck` - Re-validate one domain.

use anyhow::Result;
use colored::Colorize;
use dmarcwatch::dns::normalize_domain;

use super::Context;
use crate::cli::args::DomainArgs;
use crate::output::{self, OutputFormat, ResultRecord};

pub async fn execute(ctx: &Context, args: DomainArgs) -> Result<()> {
    let registry = ctx.registry().await?;
    let domain = normalize_domain(&args.domain);
    let was_listed = registry.store().get_domain(&domain).await?.is_some();
    let result = registry.recheck(&domain).await?;

    if output::print_structured(ctx.output_format, &result)? {
        return Ok(());
    }

    match ctx.output_format {
        OutputFormat::Csv => output::print_csv(&[ResultRecord::from(&result)])?,
        _ => {
            output::print_result_pretty(&result);
            println!();
            match (was_listed, result.is_valid) {
                (true, true) => println!("{}", "Now compliant: removed from the registry.".green().bold()),
                (false, false) => println!("{}", "Added to the registry.".yellow()),
                (true, false) => println!("{}", "Still non-compliant.".red()),
                (false, true) => {}
            }
        }
    }

    Ok(())
}
