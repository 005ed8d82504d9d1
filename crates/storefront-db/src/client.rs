//! # Query Client
//!
//! The seam between the catalog state and whatever answers its queries.

use std::sync::Arc;

use async_trait::async_trait;
use storefront_core::{Query, Record};

use crate::error::DbResult;

/// A remote relational service that can run a [`Query`].
///
/// Implementations filter and sort server-side; the rows come back in the
/// order the query asked for.
#[async_trait]
pub trait QueryClient: Send + Sync {
    /// Runs a select, returning the rows or the service's error.
    async fn select(&self, query: &Query) -> DbResult<Vec<Record>>;
}

#[async_trait]
impl<T: QueryClient + ?Sized> QueryClient for Arc<T> {
    async fn select(&self, query: &Query) -> DbResult<Vec<Record>> {
        (**self).select(query).await
    }
}
