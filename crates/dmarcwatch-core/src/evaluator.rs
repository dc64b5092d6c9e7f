//! Policy evaluation: turns a parsed record into a list of findings.
//!
//! Checks run in a fixed order and never short-circuit, so the issue list
//! for a given policy is always the same sequence.

use crate::types::{DmarcPolicy, IssueKind, PolicyAction, Severity, ValidationIssue};

/// Evaluate a parsed policy.
///
/// Order of checks: domain policy, coverage, reporting addresses,
/// subdomain policy, alignment, then each reporting address's syntax.
#[must_use]
pub fn evaluate(policy: &DmarcPolicy) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if policy.policy == PolicyAction::None {
        issues.push(ValidationIssue::new(
            IssueKind::WeakPolicy,
            Severity::Warning,
            "DMARC policy is set to \"none\", which provides no protection against spoofing",
            "Once aggregate reports look clean, move to p=quarantine and then p=reject",
        ));
    }

    if let Some(pct) = policy.percentage.filter(|&p| p < 100) {
        issues.push(ValidationIssue::new(
            IssueKind::ConfigurationIssue,
            Severity::Info,
            format!("Partial coverage: the policy applies to only {pct}% of failing messages"),
            "Raise pct to 100 so every failing message is covered by the policy",
        ));
    }

    if policy.reporting_addresses.is_empty() {
        issues.push(ValidationIssue::new(
            IssueKind::ConfigurationIssue,
            Severity::Info,
            "No reporting addresses configured (rua/ruf)",
            "Add rua=mailto:<address> to receive aggregate reports about mail sent as this domain",
        ));
    }

    match policy.subdomain_policy {
        None => issues.push(ValidationIssue::new(
            IssueKind::ConfigurationIssue,
            Severity::Info,
            format!(
                "No explicit subdomain policy; subdomains inherit p={}",
                policy.policy
            ),
            "Set sp= explicitly so subdomain handling is a deliberate choice",
        )),
        Some(PolicyAction::None) if policy.policy != PolicyAction::None => {
            issues.push(ValidationIssue::new(
                IssueKind::WeakPolicy,
                Severity::Warning,
                format!(
                    "Subdomain policy (sp=none) is weaker than the domain policy (p={})",
                    policy.policy
                ),
                "Set sp=quarantine or sp=reject, or remove sp to inherit the domain policy",
            ));
        }
        Some(_) => {}
    }

    if policy.alignment.is_some_and(|a| a.is_fully_relaxed()) {
        issues.push(ValidationIssue::new(
            IssueKind::AlignmentIssue,
            Severity::Info,
            "Both SPF and DKIM alignment are relaxed",
            "Consider adkim=s and/or aspf=s if all mail is sent from the exact domain",
        ));
    }

    for address in &policy.reporting_addresses {
        if !is_valid_report_address(address) {
            issues.push(ValidationIssue::new(
                IssueKind::SyntaxError,
                Severity::Error,
                format!("Invalid reporting address: {address}"),
                "Use the form mailto:local@domain.tld",
            ));
        }
    }

    issues
}

/// Checks `[mailto:]local@domain.tld`: no whitespace, a single `@`, and a
/// dot inside the domain part with text on both sides.
#[must_use]
pub fn is_valid_report_address(address: &str) -> bool {
    let email = strip_mailto(address.trim());

    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    domain
        .char_indices()
        .filter(|&(_, c)| c == '.')
        .any(|(i, _)| i > 0 && i + 1 < domain.len())
}

fn strip_mailto(address: &str) -> &str {
    match address.get(..7) {
        Some(scheme) if scheme.eq_ignore_ascii_case("mailto:") => &address[7..],
        _ => address,
    }
}
