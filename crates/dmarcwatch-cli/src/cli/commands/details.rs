//! `dmarcwatch details` - Latest recorded result for a domain.

use anyhow::Result;

use super::Context;
use crate::cli::args::DomainArgs;
use crate::output::{self, OutputFormat, ResultRecord};

pub async fn execute(ctx: &Context, args: DomainArgs) -> Result<()> {
    let registry = ctx.registry().await?;
    let Some(result) = registry.details(&args.domain).await? else {
        anyhow::bail!(
            "No record of {} in the registry.\n\n\
             Check it first with: dmarcwatch check {}",
            args.domain,
            args.domain
        );
    };

    if output::print_structured(ctx.output_format, &result)? {
        return Ok(());
    }

    match ctx.output_format {
        OutputFormat::Csv => output::print_csv(&[ResultRecord::from(&result)])?,
        _ => output::print_result_pretty(&result),
    }

    Ok(())
}
