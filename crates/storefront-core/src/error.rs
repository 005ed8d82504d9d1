//! # Error Types
//!
//! Domain errors for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core   CoreError   - malformed queries / rows              │
//! │  storefront-db     DbError     - remote query failures                 │
//! │  storefront-store  StoreError  - refresh and config failures           │
//! │                                                                         │
//! │  Flow: CoreError → DbError → StoreError → log line (UI stays stale)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Errors raised while building queries or interpreting rows.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A query is structurally invalid.
    ///
    /// ## When This Occurs
    /// - Empty table name
    /// - Empty filter or order column
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// A row returned by the backend is not a JSON object.
    #[error("Expected a JSON object row, got {0}")]
    NotAnObject(String),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::InvalidQuery("table name is empty".into());
        assert_eq!(err.to_string(), "Invalid query: table name is empty");

        let err = CoreError::NotAnObject("array".into());
        assert!(err.to_string().contains("array"));
    }
}
