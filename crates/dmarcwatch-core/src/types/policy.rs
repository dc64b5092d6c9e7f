use serde::{Deserialize, Serialize};

/// DMARC protocol version.
///
/// Only `DMARC1` exists; any other version fails to parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DmarcVersion {
    /// `v=DMARC1`
    #[default]
    #[serde(rename = "DMARC1")]
    Dmarc1,
}

impl std::fmt::Display for DmarcVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DMARC1")
    }
}

/// Requested handling for mail that fails DMARC (`p=` / `sp=`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyAction {
    /// Monitor only
    #[default]
    None,
    /// Deliver to spam/junk
    Quarantine,
    /// Refuse the message
    Reject,
}

impl PolicyAction {
    /// Parse a tag value, case-insensitively
    #[must_use]
    pub fn from_value(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "quarantine" => Some(Self::Quarantine),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }

    /// Returns the tag value literal
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Quarantine => "quarantine",
            Self::Reject => "reject",
        }
    }
}

impl std::fmt::Display for PolicyAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier alignment strictness (`adkim=` / `aspf=`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentMode {
    /// Organizational domains must match
    #[default]
    Relaxed,
    /// Exact domain match required
    Strict,
}

impl AlignmentMode {
    /// Parse `r`, `s`, `relaxed` or `strict`, case-insensitively
    #[must_use]
    pub fn from_value(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "r" | "relaxed" => Some(Self::Relaxed),
            "s" | "strict" => Some(Self::Strict),
            _ => None,
        }
    }
}

impl std::fmt::Display for AlignmentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Relaxed => write!(f, "relaxed"),
            Self::Strict => write!(f, "strict"),
        }
    }
}

/// SPF and DKIM alignment modes.
///
/// Present on a policy as soon as either `adkim` or `aspf` is declared;
/// the undeclared side keeps the RFC default of relaxed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Alignment {
    /// `aspf=`
    pub spf: AlignmentMode,
    /// `adkim=`
    pub dkim: AlignmentMode,
}

impl Alignment {
    /// Returns true if both identifiers use relaxed alignment
    #[must_use]
    pub fn is_fully_relaxed(&self) -> bool {
        self.spf == AlignmentMode::Relaxed && self.dkim == AlignmentMode::Relaxed
    }
}

/// A parsed DMARC record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DmarcPolicy {
    /// Protocol version
    pub version: DmarcVersion,

    /// Domain policy (`p=`)
    pub policy: PolicyAction,

    /// Subdomain policy (`sp=`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdomain_policy: Option<PolicyAction>,

    /// Share of failing mail the policy applies to (`pct=`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<u8>,

    /// `rua` then `ruf` addresses in declaration order, duplicates kept
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reporting_addresses: Vec<String>,

    /// Alignment modes, if `adkim` or `aspf` was declared
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,

    /// The record exactly as it was handed to the parser
    pub raw_record: String,
}

impl DmarcPolicy {
    /// Create a policy with every optional tag absent
    #[must_use]
    pub fn new(raw_record: impl Into<String>) -> Self {
        Self {
            version: DmarcVersion::Dmarc1,
            policy: PolicyAction::None,
            subdomain_policy: None,
            percentage: None,
            reporting_addresses: Vec::new(),
            alignment: None,
            raw_record: raw_record.into(),
        }
    }

    /// Policy that applies to subdomains, falling back to the domain policy
    #[must_use]
    pub fn effective_subdomain_policy(&self) -> PolicyAction {
        self.subdomain_policy.unwrap_or(self.policy)
    }
}
