//! Output formatting for different formats.

use std::str::FromStr;

use anyhow::Result;
use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use dmarcwatch::{DmarcStatus, DomainEntry, Severity, ValidationIssue, ValidationResult};
use serde::{Deserialize, Serialize};
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Available output formats.
#[derive(Debug, Clone, Copy, Default, ValueEnum, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed tables with colors
    #[default]
    Pretty,
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// YAML output
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "table" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => anyhow::bail!(
                "Unknown output format: {s}\n\
                 Valid formats: pretty, json, csv, yaml"
            ),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
            Self::Yaml => write!(f, "yaml"),
        }
    }
}

/// Print a value as JSON or YAML.
///
/// Returns false for formats that need a command-specific rendering.
pub fn print_structured<T: Serialize + ?Sized>(format: OutputFormat, value: &T) -> Result<bool> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
        OutputFormat::Pretty | OutputFormat::Csv => return Ok(false),
    }
    Ok(true)
}

/// Write CSV rows with a header to stdout.
pub fn print_csv<T: Serialize>(rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(std::io::stdout().lock());
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Tabled)]
struct IssueRow {
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Finding")]
    message: String,
    #[tabled(rename = "Recommendation")]
    recommendation: String,
}

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Upvotes")]
    upvotes: u64,
    #[tabled(rename = "Issues")]
    issues: usize,
    #[tabled(rename = "Last checked")]
    last_checked: String,
}

/// Flat CSV view of a check result.
#[derive(Serialize)]
pub struct ResultRecord<'a> {
    domain: &'a str,
    is_valid: bool,
    dmarc_record: &'a str,
    errors: usize,
    warnings: usize,
    infos: usize,
    checked_at: String,
}

impl<'a> From<&'a ValidationResult> for ResultRecord<'a> {
    fn from(result: &'a ValidationResult) -> Self {
        Self {
            domain: &result.domain,
            is_valid: result.is_valid,
            dmarc_record: result.dmarc_record.as_deref().unwrap_or(""),
            errors: result.count_severity(Severity::Error),
            warnings: result.count_severity(Severity::Warning),
            infos: result.count_severity(Severity::Info),
            checked_at: result.check_timestamp.to_rfc3339(),
        }
    }
}

/// Flat CSV view of a registry entry.
#[derive(Serialize)]
pub struct EntryRecord<'a> {
    domain: &'a str,
    dmarc_status: DmarcStatus,
    upvotes: u64,
    issues: usize,
    last_checked: String,
}

impl<'a> From<&'a DomainEntry> for EntryRecord<'a> {
    fn from(entry: &'a DomainEntry) -> Self {
        Self {
            domain: &entry.domain,
            dmarc_status: entry.dmarc_status,
            upvotes: entry.upvotes,
            issues: entry.validation_result.issues.len(),
            last_checked: entry.last_checked.to_rfc3339(),
        }
    }
}

/// Colored severity label.
pub fn severity_label(severity: Severity) -> ColoredString {
    match severity {
        Severity::Error => "error".red().bold(),
        Severity::Warning => "warning".yellow().bold(),
        Severity::Info => "info".blue(),
    }
}

/// Colored registry status label.
pub fn status_label(status: DmarcStatus) -> ColoredString {
    match status {
        DmarcStatus::Missing => "missing".red().bold(),
        DmarcStatus::Invalid => "invalid".red(),
        DmarcStatus::Weak => "weak".yellow(),
    }
}

/// Print issues as a table, or a note if there are none.
pub fn print_issues(issues: &[ValidationIssue]) {
    if issues.is_empty() {
        println!("  {}", "No issues found".green());
        return;
    }

    let rows: Vec<IssueRow> = issues
        .iter()
        .map(|issue| IssueRow {
            severity: severity_label(issue.severity).to_string(),
            kind: issue.kind.to_string(),
            message: issue.message.clone(),
            recommendation: issue.recommendation.clone(),
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
}

/// Print one check result in the pretty format.
pub fn print_result_pretty(result: &ValidationResult) {
    let verdict = if result.is_valid {
        "compliant".green().bold()
    } else {
        "non-compliant".red().bold()
    };
    println!("{} {} ({verdict})", "Domain:".bold(), result.domain.cyan().bold());

    match &result.dmarc_record {
        Some(record) => println!("  {} {record}", "Record:".bold()),
        None => println!("  {} {}", "Record:".bold(), "(none published)".dimmed()),
    }
    if let Some(policy) = &result.parsed_policy {
        println!(
            "  {} p={} sp={} pct={}",
            "Policy:".bold(),
            policy.policy,
            policy.effective_subdomain_policy(),
            policy.percentage.unwrap_or(100)
        );
    }
    println!();
    print_issues(&result.issues);
    println!(
        "{}",
        format!("Checked: {}", result.check_timestamp.to_rfc3339()).dimmed()
    );
}

/// Print the registry as a ranked table.
pub fn print_entries_pretty(entries: &[DomainEntry]) {
    if entries.is_empty() {
        println!("{}", "Registry is empty: every checked domain is compliant.".green());
        return;
    }

    let rows: Vec<EntryRow> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| EntryRow {
            rank: i + 1,
            domain: entry.domain.clone(),
            status: status_label(entry.dmarc_status).to_string(),
            upvotes: entry.upvotes,
            issues: entry.validation_result.issues.len(),
            last_checked: entry.last_checked.format("%Y-%m-%d %H:%M UTC").to_string(),
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
}
