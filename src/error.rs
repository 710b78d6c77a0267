// Error types for the library modules. The binary wraps these in
// `anyhow::Error` with extra context; the library keeps them typed so
// callers (and tests) can match on the failure kind.

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while reading input, talking to the API
/// or writing the combined output.
#[derive(Error, Debug)]
pub enum VulnCheckError {
    /// The CSV file named by the operator does not exist.
    #[error("input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    /// The CSV header has no column with the requested name.
    #[error("column '{column}' not found in {}", path.display())]
    MissingColumn { column: String, path: PathBuf },

    #[error("failed to parse CSV input: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The API key cannot be carried in an HTTP header (control characters).
    #[error("API key contains characters not allowed in an HTTP header")]
    InvalidCredential,

    #[error("invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Connection, TLS or timeout failure from the HTTP layer.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A non-401 response whose body is not JSON.
    #[error("response for {cve} is not valid JSON: {source}")]
    MalformedResponse {
        cve: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Prompting or printing on the terminal failed (closed stdin, no tty).
    #[error("terminal I/O failed: {0}")]
    Terminal(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VulnCheckError>;
