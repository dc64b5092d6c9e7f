//! `dmarcwatch check` - Validate domains and update the registry.

use anyhow::Result;
use colored::Colorize;
use dmarcwatch::ValidationResult;
use futures_util::stream::{self, StreamExt};
use tracing::warn;

use super::Context;
use crate::cli::args::CheckArgs;
use crate::output::{self, OutputFormat, ResultRecord};

pub async fn execute(ctx: &Context, args: CheckArgs) -> Result<()> {
    let registry = ctx.registry().await?;
    let concurrency = args.concurrency.unwrap_or(ctx.watch.concurrency).max(1);

    // Results come back in input order; failures are reported per domain.
    let shared = &registry;
    let outcomes: Vec<(String, dmarcwatch::Result<ValidationResult>)> =
        stream::iter(args.domains)
            .map(move |domain| async move {
                let outcome = shared.validate(&domain).await;
                (domain, outcome)
            })
            .buffered(concurrency)
            .collect()
            .await;

    let mut results = Vec::new();
    let mut failures = Vec::new();
    for (domain, outcome) in outcomes {
        match outcome {
            Ok(result) => results.push(result),
            Err(e) => {
                warn!(domain = %domain, error = %e, "check failed");
                failures.push((domain, e));
            }
        }
    }

    if !output::print_structured(ctx.output_format, &results)? {
        match ctx.output_format {
            OutputFormat::Csv => {
                let rows: Vec<ResultRecord<'_>> = results.iter().map(ResultRecord::from).collect();
                output::print_csv(&rows)?;
            }
            _ => {
                for (i, result) in results.iter().enumerate() {
                    if i > 0 {
                        println!();
                    }
                    output::print_result_pretty(result);
                }
            }
        }
    }

    for (domain, e) in &failures {
        eprintln!("{} {domain}: {e}", "Error:".red().bold());
    }
    if failures.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("{} of {} checks failed", failures.len(), failures.len() + results.len())
    }
}
