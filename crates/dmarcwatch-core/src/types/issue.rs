use serde::{Deserialize, Serialize};

/// Category of a validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// No DMARC record published at `_dmarc.<domain>`
    MissingRecord,
    /// Record or one of its values is syntactically wrong
    SyntaxError,
    /// Policy offers little or no protection
    WeakPolicy,
    /// SPF/DKIM alignment is loose
    AlignmentIssue,
    /// Incomplete or discouraged configuration
    ConfigurationIssue,
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRecord => write!(f, "missing_record"),
            Self::SyntaxError => write!(f, "syntax_error"),
            Self::WeakPolicy => write!(f, "weak_policy"),
            Self::AlignmentIssue => write!(f, "alignment_issue"),
            Self::ConfigurationIssue => write!(f, "configuration_issue"),
        }
    }
}

/// How serious a finding is.
///
/// Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Advisory only
    Info,
    /// Works, but should be improved
    Warning,
    /// Makes the domain non-compliant
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A single finding produced while validating a domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Finding category
    #[serde(rename = "type")]
    pub kind: IssueKind,

    /// Finding severity
    pub severity: Severity,

    /// What is wrong
    pub message: String,

    /// How to fix it
    pub recommendation: String,
}

impl ValidationIssue {
    /// Create a new issue
    #[must_use]
    pub fn new(
        kind: IssueKind,
        severity: Severity,
        message: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            recommendation: recommendation.into(),
        }
    }

    /// Returns true if this issue makes the domain non-compliant
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
