//! `dmarcwatch parse` - Offline record parsing and evaluation.

use anyhow::Result;
use colored::Colorize;
use dmarcwatch::{evaluate, parse, DmarcPolicy, ValidationIssue};
use serde::Serialize;

use super::Context;
use crate::cli::args::ParseArgs;
use crate::output::{self, OutputFormat};

/// Parsed policy with its findings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ParseReport {
    policy: DmarcPolicy,
    is_valid: bool,
    issues: Vec<ValidationIssue>,
}

#[derive(Serialize)]
struct IssueRecord<'a> {
    #[serde(rename = "type")]
    kind: String,
    severity: String,
    message: &'a str,
    recommendation: &'a str,
}

/// A record that does not parse is an error, so the process exits non-zero.
pub fn execute(ctx: &Context, args: ParseArgs) -> Result<()> {
    let policy = parse(&args.record)?;
    let issues = evaluate(&policy);
    let report = ParseReport {
        is_valid: !issues.iter().any(ValidationIssue::is_error),
        policy,
        issues,
    };

    if output::print_structured(ctx.output_format, &report)? {
        return Ok(());
    }

    match ctx.output_format {
        OutputFormat::Csv => {
            let rows: Vec<IssueRecord<'_>> = report
                .issues
                .iter()
                .map(|issue| IssueRecord {
                    kind: issue.kind.to_string(),
                    severity: issue.severity.to_string(),
                    message: &issue.message,
                    recommendation: &issue.recommendation,
                })
                .collect();
            output::print_csv(&rows)
        }
        _ => {
            print_report_pretty(&report);
            Ok(())
        }
    }
}

fn print_report_pretty(report: &ParseReport) {
    let policy = &report.policy;
    println!("{}", "Parsed DMARC record:".bold());
    println!("  {} {}", "Policy:".bold(), policy.policy);
    match policy.subdomain_policy {
        Some(sp) => println!("  {} {sp}", "Subdomain policy:".bold()),
        None => println!(
            "  {} {} {}",
            "Subdomain policy:".bold(),
            policy.policy,
            "(inherited)".dimmed()
        ),
    }
    println!(
        "  {} {}%",
        "Coverage:".bold(),
        policy.percentage.unwrap_or(100)
    );
    if let Some(alignment) = policy.alignment {
        println!(
            "  {} spf={} dkim={}",
            "Alignment:".bold(),
            alignment.spf,
            alignment.dkim
        );
    }
    if !policy.reporting_addresses.is_empty() {
        println!(
            "  {} {}",
            "Reports to:".bold(),
            policy.reporting_addresses.join(", ")
        );
    }

    println!();
    output::print_issues(&report.issues);
    println!();
    if report.is_valid {
        println!("{}", "Record has no errors.".green());
    } else {
        println!("{}", "Record has errors.".red().bold());
    }
}
