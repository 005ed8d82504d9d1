//! # storefront-store: Observable Catalog State
//!
//! The state layer a storefront UI binds to: two observable collections
//! (products and categories) and the refreshes that reload them from the
//! remote database.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      storefront-store (THIS CRATE)                      │
//! │                                                                         │
//! │  ┌───────────────────────────────────────────────────────────────────┐ │
//! │  │                        CatalogStore                               │ │
//! │  │                                                                   │ │
//! │  │   fetch_all_products()          ──► Collection<Product>           │ │
//! │  │   fetch_products_by_category(n) ──► Collection<Product>           │ │
//! │  │   fetch_all_categories()        ──► Collection<Category>          │ │
//! │  └──────────────────────────────┬────────────────────────────────────┘ │
//! │                                 │                                       │
//! │         ┌───────────────────────┼────────────────────────┐             │
//! │         ▼                       ▼                        ▼             │
//! │  ┌─────────────┐       ┌─────────────────┐      ┌────────────────┐     │
//! │  │ collection  │       │     config      │      │     error      │     │
//! │  │ watch-based │       │ TOML + env vars │      │  StoreError    │     │
//! │  │ observables │       │ RefreshPolicy   │      │                │     │
//! │  └─────────────┘       └─────────────────┘      └────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Behavior
//!
//! - Collections start empty. Nothing is fetched until a refresh is called.
//! - A successful refresh replaces the whole collection with the returned rows.
//! - A failed refresh is logged and leaves the collection untouched.
//! - Filtering and ordering happen remotely; rows are published as received.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_store::{CatalogStore, StorefrontConfig};
//!
//! let config = StorefrontConfig::load(None)?;
//! let store = CatalogStore::from_config(&config)?;
//!
//! let _listener = store.products().listen(|products| {
//!     println!("{} products", products.len());
//! });
//!
//! store.fetch_all_categories().await.ok();
//! store.fetch_products_by_category(3).await.ok();
//! ```

pub mod catalog;
pub mod collection;
pub mod config;
pub mod error;

pub use catalog::{CatalogStore, Refresh};
pub use collection::{Collection, Listener};
pub use config::{RefreshPolicy, RemoteSettings, StoreSettings, StorefrontConfig};
pub use error::{StoreError, StoreResult};

// Re-exported so UI code only needs this crate.
pub use storefront_core::{Category, Entity, Product, ProductScope, Record};
