use thiserror::Error;

/// Result type alias for dmarcwatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while parsing a DMARC record.
///
/// Any of these rejects the whole record; a partially parsed policy is
/// never returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Record is empty or whitespace only
    #[error("DMARC record is empty")]
    Empty,

    /// Record does not start with `v=DMARC1`
    #[error("DMARC record must start with v=DMARC1")]
    MissingVersion,

    /// A `v` tag carried something other than `DMARC1`
    #[error("invalid DMARC version: {0}")]
    InvalidVersion(String),

    /// `p` or `sp` is not one of none, quarantine, reject
    #[error("invalid {tag} value: {value} (expected none, quarantine or reject)")]
    InvalidPolicy {
        /// Tag name as written in the record
        tag: &'static str,
        /// Offending value
        value: String,
    },

    /// `pct` is not an integer between 0 and 100
    #[error("invalid pct value: {0} (expected an integer from 0 to 100)")]
    InvalidPercentage(String),

    /// `adkim` or `aspf` is not one of r, s, relaxed, strict
    #[error("invalid {tag} value: {value} (expected r, s, relaxed or strict)")]
    InvalidAlignment {
        /// Tag name as written in the record
        tag: &'static str,
        /// Offending value
        value: String,
    },
}

/// Errors from the DNS collaborator.
///
/// "No DMARC record" is not an error; lookups return `None` for that.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Domain failed the syntax check; no query was sent
    #[error("invalid domain format: {0}")]
    InvalidFormat(String),

    /// Resolver gave up waiting for an answer
    #[error("DNS lookup timed out for {0}")]
    Timeout(String),

    /// Any other resolver or transport failure
    #[error("DNS lookup failed for {name}: {message}")]
    Transport {
        /// Name that was queried
        name: String,
        /// Resolver error text
        message: String,
    },

    /// The system resolver could not be constructed
    #[error("failed to create resolver: {0}")]
    ResolverInit(String),
}

impl LookupError {
    /// Returns true if a caller may retry the lookup with backoff
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Transport { .. })
    }
}

/// Errors from the storage collaborator
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backing file could not be read or written
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored document could not be encoded or decoded
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend-specific failure
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Top-level error for dmarcwatch operations
#[derive(Error, Debug)]
pub enum Error {
    /// DMARC record could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// DNS collaborator failed
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// Storage collaborator failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Configuration is invalid or unreadable
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns true if the error is retryable
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Lookup(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// HTTP-equivalent status code for a transport binding
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Parse(_) | Self::Lookup(LookupError::InvalidFormat(_)) => 400,
            Self::Lookup(LookupError::Timeout(_)) => 504,
            Self::Lookup(_) => 502,
            Self::Storage(_) | Self::Config(_) => 500,
        }
    }
}
