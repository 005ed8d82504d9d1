//! # Remote Query Errors
//!
//! Everything that can go wrong between issuing a [`Query`](storefront_core::Query)
//! and holding a list of rows.
//!
//! ## Error Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Source                          DbError                               │
//! │  ──────────────────────────────  ────────────────────────────────────  │
//! │  CoreError (bad query)           InvalidQuery                          │
//! │  url::ParseError                 InvalidUrl                            │
//! │  reqwest timeout                 Timeout                               │
//! │  reqwest connect / send          Request                               │
//! │  non-2xx PostgREST response      Api { status, code, message }         │
//! │  body not a JSON array of rows   Decode                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use storefront_core::CoreError;
use thiserror::Error;

/// Result type for remote queries.
pub type DbResult<T> = Result<T, DbError>;

/// A failed remote query.
#[derive(Debug, Error)]
pub enum DbError {
    /// The query was rejected before being sent.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The configured service URL could not be parsed or joined.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The request never produced a response (DNS, connect, TLS, ...).
    #[error("Request failed: {0}")]
    Request(String),

    /// The HTTP client gave up waiting.
    #[error("Request timed out")]
    Timeout,

    /// The service answered with an error status.
    ///
    /// `code` is the PostgREST / PostgreSQL error code when the body had one
    /// (e.g. `42P01` for a missing relation).
    #[error("Service error {status}{}: {message}", code_suffix(.code))]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The response body was not a JSON array of objects.
    #[error("Failed to decode rows: {0}")]
    Decode(String),

    /// The in-memory backend has no such table.
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// Client construction or other internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref()
        .map(|c| format!(" ({})", c))
        .unwrap_or_default()
}

impl DbError {
    /// Returns true if sending the same query again could succeed.
    ///
    /// The catalog store never retries on its own; this is for callers that
    /// want to.
    pub fn is_retryable(&self) -> bool {
        match self {
            DbError::Request(_) | DbError::Timeout => true,
            DbError::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Returns true if the failure is the caller's fault (bad query, 4xx).
    pub fn is_client_error(&self) -> bool {
        match self {
            DbError::InvalidQuery(_) | DbError::UnknownTable(_) => true,
            DbError::Api { status, .. } => (400..500).contains(status) && *status != 429,
            _ => false,
        }
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<CoreError> for DbError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidQuery(msg) => DbError::InvalidQuery(msg),
            CoreError::NotAnObject(kind) => DbError::Decode(format!("row is a JSON {}", kind)),
        }
    }
}

impl From<url::ParseError> for DbError {
    fn from(err: url::ParseError) -> Self {
        DbError::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Decode(err.to_string())
    }
}

impl From<reqwest::Error> for DbError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DbError::Timeout
        } else if err.is_decode() {
            DbError::Decode(err.to_string())
        } else if err.is_builder() {
            DbError::Internal(err.to_string())
        } else {
            DbError::Request(err.to_string())
        }
    }
}
