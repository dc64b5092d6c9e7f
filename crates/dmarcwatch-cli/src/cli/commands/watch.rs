//! `dmarcwatch watch` - Periodic re-checks with change reporting.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use dmarcwatch::{dmarc_status, DmarcStatus, ValidationResult};
use serde::Serialize;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use super::Context;
use crate::cli::args::WatchArgs;
use crate::output::OutputFormat;

/// Compliance state of a watched domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Standing {
    Compliant,
    Listed(DmarcStatus),
}

impl Standing {
    fn of(result: &ValidationResult) -> Self {
        if result.is_valid {
            Self::Compliant
        } else {
            Self::Listed(dmarc_status(result))
        }
    }
}

impl std::fmt::Display for Standing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Compliant => write!(f, "compliant"),
            Self::Listed(status) => write!(f, "{status}"),
        }
    }
}

impl Serialize for Standing {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One observed change, streamed as it happens.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Change<'a> {
    domain: &'a str,
    previous: Option<Standing>,
    current: Standing,
    issues: usize,
    checked_at: chrono::DateTime<Utc>,
}

/// Returns the change if `current` differs from what was last seen.
fn observe(
    seen: &mut HashMap<String, Standing>,
    domain: &str,
    current: Standing,
) -> Option<Option<Standing>> {
    let previous = seen.insert(domain.to_string(), current);
    (previous != Some(current)).then_some(previous)
}

pub async fn execute(ctx: &Context, args: WatchArgs) -> Result<()> {
    let registry = ctx.registry().await?;
    let period = args
        .interval
        .map_or_else(|| ctx.watch.watch_interval(), Duration::from_secs)
        .max(Duration::from_secs(1));

    if ctx.output_format == OutputFormat::Pretty {
        println!(
            "{} {} domain(s) every {}s (Ctrl-C to stop)",
            "Watching".bold(),
            args.domains.len(),
            period.as_secs()
        );
    }

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut seen: HashMap<String, Standing> = HashMap::new();

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("watch interrupted");
                break;
            }
        }

        for domain in &args.domains {
            let result = match registry.recheck(domain).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(domain = %domain, error = %e, "watch check failed");
                    eprintln!("{} {domain}: {e}", "Error:".red().bold());
                    continue;
                }
            };

            let current = Standing::of(&result);
            if let Some(previous) = observe(&mut seen, &result.domain, current) {
                let change = Change {
                    domain: &result.domain,
                    previous,
                    current,
                    issues: result.issues.len(),
                    checked_at: result.check_timestamp,
                };
                print_change(ctx.output_format, &change)?;
            }
        }

        registry.housekeeping();
    }

    Ok(())
}

fn print_change(format: OutputFormat, change: &Change<'_>) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(change)?),
        OutputFormat::Yaml => print!("---\n{}", serde_yaml::to_string(change)?),
        OutputFormat::Csv => {
            let previous = change.previous.map(|p| p.to_string()).unwrap_or_default();
            println!(
                "{},{},{},{},{}",
                change.domain,
                previous,
                change.current,
                change.issues,
                change.checked_at.to_rfc3339()
            );
        }
        OutputFormat::Pretty => {
            let current = match change.current {
                Standing::Compliant => change.current.to_string().green().bold(),
                Standing::Listed(_) => change.current.to_string().red().bold(),
            };
            let stamp = change.checked_at.format("%H:%M:%S").to_string();
            match change.previous {
                None => println!("[{}] {} is {current}", stamp.dimmed(), change.domain.cyan()),
                Some(previous) => println!(
                    "[{}] {} changed {previous} -> {current}",
                    stamp.dimmed(),
                    change.domain.cyan()
                ),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_reports_first_sight_and_changes_only() {
        let mut seen = HashMap::new();
        let listed = Standing::Listed(DmarcStatus::Missing);

        assert_eq!(observe(&mut seen, "a.com", listed), Some(None));
        assert_eq!(observe(&mut seen, "a.com", listed), None);
        assert_eq!(
            observe(&mut seen, "a.com", Standing::Compliant),
            Some(Some(listed))
        );
    }

    #[test]
    fn test_standing_follows_validity() {
        let missing = ValidationResult::missing("a.com", Utc::now());
        assert_eq!(Standing::of(&missing), Standing::Listed(DmarcStatus::Missing));
        assert_eq!(Standing::Listed(DmarcStatus::Invalid).to_string(), "invalid");
    }
}
