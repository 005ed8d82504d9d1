//! # Store Error Types
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Store Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────────────┐        ┌─────────────────────────────┐    │
//! │  │        Refresh          │        │       Configuration         │    │
//! │  │                         │        │                             │    │
//! │  │  QueryFailed            │        │  InvalidConfig              │    │
//! │  │   (entity + DbError)    │        │  InvalidUrl                 │    │
//! │  │                         │        │  ConfigLoadFailed           │    │
//! │  │  Never mutates state,   │        │  ConfigSaveFailed           │    │
//! │  │  logged where it occurs │        │  Client                     │    │
//! │  └─────────────────────────┘        └─────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use storefront_db::DbError;
use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the catalog store and its configuration.
#[derive(Debug, Error)]
pub enum StoreError {
    // =========================================================================
    // Refresh Errors
    // =========================================================================
    /// The remote query behind a refresh failed. The target collection was
    /// left as it was.
    #[error("Failed to load {entity}: {source}")]
    QueryFailed {
        entity: &'static str,
        #[source]
        source: DbError,
    },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    /// The data client could not be constructed.
    #[error("Failed to create data client: {0}")]
    Client(#[from] DbError),
}

impl StoreError {
    /// The remote error behind a failed refresh.
    pub fn db_error(&self) -> Option<&DbError> {
        match self {
            StoreError::QueryFailed { source, .. } => Some(source),
            StoreError::Client(source) => Some(source),
            _ => None,
        }
    }

    /// Returns true if this error came from a refresh rather than setup.
    pub fn is_query_failure(&self) -> bool {
        matches!(self, StoreError::QueryFailed { .. })
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidConfig(_)
                | StoreError::InvalidUrl(_)
                | StoreError::ConfigLoadFailed(_)
                | StoreError::ConfigSaveFailed(_)
        )
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<toml::de::Error> for StoreError {
    fn from(err: toml::de::Error) -> Self {
        StoreError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for StoreError {
    fn from(err: toml::ser::Error) -> Self {
        StoreError::ConfigSaveFailed(err.to_string())
    }
}

impl From<url::ParseError> for StoreError {
    fn from(err: url::ParseError) -> Self {
        StoreError::InvalidUrl(err.to_string())
    }
}
