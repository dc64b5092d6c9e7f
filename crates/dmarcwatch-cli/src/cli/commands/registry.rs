//! `dmarcwatch registry` - List non-compliant domains.

use anyhow::Result;

use super::Context;
use crate::output::{self, EntryRecord, OutputFormat};

pub async fn execute(ctx: &Context) -> Result<()> {
    let registry = ctx.registry().await?;
    let entries = registry.list().await?;

    if output::print_structured(ctx.output_format, &entries)? {
        return Ok(());
    }

    match ctx.output_format {
        OutputFormat::Csv => {
            let rows: Vec<EntryRecord<'_>> = entries.iter().map(EntryRecord::from).collect();
            output::print_csv(&rows)?;
        }
        _ => output::print_entries_pretty(&entries),
    }

    Ok(())
}
