//! # Catalog Store
//!
//! Owns the product and category collections and the refreshes that
//! replace them.
//!
//! ## Refresh Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        One Refresh                                      │
//! │                                                                         │
//! │  fetch_*()                                                             │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  QueryClient::select(query)   ← filtering + ordering done remotely     │
//! │     │                                                                   │
//! │     ├── Ok(rows)  ──► collection.replace(rows)   → Ok(Applied{rows})   │
//! │     │                 (or dropped as stale under                        │
//! │     │                  LatestRequestWins         → Ok(Superseded))     │
//! │     │                                                                   │
//! │     └── Err(e)    ──► error!(...)                → Err(QueryFailed)    │
//! │                       collection untouched                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Collections start empty and are only filled by an explicit refresh.
//! Refresh errors are logged where they happen and returned; callers that
//! only render the collections can ignore the result and keep showing the
//! previous contents.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use storefront_core::{all_categories_query, Category, Entity, Product, ProductScope, Query};
use storefront_db::{QueryClient, RestClient};
use tracing::{debug, error, info, warn};

use crate::collection::Collection;
use crate::config::{RefreshPolicy, StorefrontConfig};
use crate::error::{StoreError, StoreResult};

/// What a successful refresh did to its collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// The collection now holds exactly the returned rows.
    Applied { rows: usize },

    /// A newer request had already been published; the rows were dropped.
    /// Only happens under [`RefreshPolicy::LatestRequestWins`].
    Superseded,
}

impl Refresh {
    pub fn is_applied(&self) -> bool {
        matches!(self, Refresh::Applied { .. })
    }
}

// =============================================================================
// Request Sequencing
// =============================================================================

/// Per-collection request counter used by [`RefreshPolicy::LatestRequestWins`].
#[derive(Debug, Default)]
struct Sequencer {
    issued: AtomicU64,
    applied: Mutex<u64>,
}

impl Sequencer {
    fn next_ticket(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Runs `publish` unless a newer ticket was already published.
    fn publish_if_current(&self, ticket: u64, publish: impl FnOnce()) -> bool {
        let mut applied = self.applied.lock().unwrap_or_else(|e| e.into_inner());
        if ticket < *applied {
            return false;
        }
        publish();
        *applied = ticket;
        true
    }
}

// =============================================================================
// Catalog Store
// =============================================================================

/// Observable product and category catalog backed by a remote database.
///
/// ## Usage
/// ```rust,ignore
/// let store = CatalogStore::from_config(&StorefrontConfig::load(None)?)?;
///
/// let mut products = store.products().subscribe();
/// store.fetch_products_by_category(3).await.ok();
///
/// products.changed().await?;
/// render(&products.borrow());
/// ```
pub struct CatalogStore {
    client: Arc<dyn QueryClient>,
    products: Collection<Product>,
    categories: Collection<Category>,
    policy: RefreshPolicy,
    product_seq: Sequencer,
    category_seq: Sequencer,
}

impl CatalogStore {
    /// Creates a store publishing into the given collections.
    pub fn new(
        client: Arc<dyn QueryClient>,
        products: Collection<Product>,
        categories: Collection<Category>,
    ) -> Self {
        CatalogStore {
            client,
            products,
            categories,
            policy: RefreshPolicy::default(),
            product_seq: Sequencer::default(),
            category_seq: Sequencer::default(),
        }
    }

    /// Creates a store with fresh, empty collections.
    pub fn with_client(client: Arc<dyn QueryClient>) -> Self {
        Self::new(client, Collection::new(), Collection::new())
    }

    /// Creates a PostgREST-backed store from configuration.
    pub fn from_config(config: &StorefrontConfig) -> StoreResult<Self> {
        config.validate()?;
        let client = RestClient::new(config.rest_client_config())?;
        Ok(Self::with_client(Arc::new(client)).with_policy(config.refresh_policy()))
    }

    /// Sets how overlapping refreshes are reconciled.
    pub fn with_policy(mut self, policy: RefreshPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RefreshPolicy {
        self.policy
    }

    /// Products, ordered by product name.
    pub fn products(&self) -> &Collection<Product> {
        &self.products
    }

    /// Categories, ordered by category name.
    pub fn categories(&self) -> &Collection<Category> {
        &self.categories
    }

    /// Reloads every product, ordered by product name.
    pub async fn fetch_all_products(&self) -> StoreResult<Refresh> {
        self.refresh(ProductScope::All.query(), &self.products, &self.product_seq)
            .await
    }

    /// Reloads every category, ordered by category name.
    pub async fn fetch_all_categories(&self) -> StoreResult<Refresh> {
        self.refresh(all_categories_query(), &self.categories, &self.category_seq)
            .await
    }

    /// Reloads products belonging to `category_id`.
    ///
    /// Any id `<= 0`, negative ones included, loads the whole catalog exactly
    /// as [`fetch_all_products`](Self::fetch_all_products) does.
    pub async fn fetch_products_by_category(&self, category_id: i64) -> StoreResult<Refresh> {
        self.fetch_products(ProductScope::from_category_id(category_id))
            .await
    }

    /// Reloads products for an already-routed scope.
    pub async fn fetch_products(&self, scope: ProductScope) -> StoreResult<Refresh> {
        match scope {
            ProductScope::All => self.fetch_all_products().await,
            ProductScope::Category(category_id) => {
                debug!(category_id, "Loading products for category");
                self.refresh(scope.query(), &self.products, &self.product_seq)
                    .await
            }
        }
    }

    /// Runs both full refreshes concurrently. Never called implicitly.
    pub async fn load_all(&self) -> (StoreResult<Refresh>, StoreResult<Refresh>) {
        tokio::join!(self.fetch_all_products(), self.fetch_all_categories())
    }

    async fn refresh<E: Entity>(
        &self,
        query: Query,
        target: &Collection<E>,
        seq: &Sequencer,
    ) -> StoreResult<Refresh> {
        let ticket = seq.next_ticket();
        debug!(entity = E::TABLE, query = %query, seq = ticket, "Refreshing collection");

        let rows = match self.client.select(&query).await {
            Ok(rows) => rows,
            Err(source) => {
                error!(
                    entity = E::TABLE,
                    query = %query,
                    error = %source,
                    "Catalog refresh failed, keeping previous contents"
                );
                return Err(StoreError::QueryFailed {
                    entity: E::TABLE,
                    source,
                });
            }
        };

        let count = rows.len();
        let rows: Vec<E> = rows.into_iter().map(E::from).collect();

        match self.policy {
            RefreshPolicy::LastResponseWins => target.replace(rows),
            RefreshPolicy::LatestRequestWins => {
                if !seq.publish_if_current(ticket, || target.replace(rows)) {
                    warn!(
                        entity = E::TABLE,
                        query = %query,
                        seq = ticket,
                        "Dropping response superseded by a newer request"
                    );
                    return Ok(Refresh::Superseded);
                }
            }
        }

        info!(entity = E::TABLE, rows = count, seq = ticket, "Collection replaced");
        Ok(Refresh::Applied { rows: count })
    }
}
