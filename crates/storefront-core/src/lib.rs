//! # storefront-core: Pure Catalog Types
//!
//! Types shared by the remote clients and the observable catalog state.
//! Nothing in here performs I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 UI (subscribes to collections)                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ watch::Receiver                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              storefront-store (CatalogStore)                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Query                                  │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ storefront-core (THIS CRATE) ★                  │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                  │   │
//! │  │   │  record   │  │   query   │  │   scope   │                  │   │
//! │  │   │  Product  │  │   Query   │  │ Product-  │                  │   │
//! │  │   │  Category │  │   Order   │  │ Scope     │                  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              storefront-db (PostgREST / in-memory)              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`record`] - Opaque rows and the `Product` / `Category` entities
//! - [`query`] - Table query with equality filters and a single ordering
//! - [`scope`] - Routing policy for "products in category N"
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::{Direction, ProductScope};
//!
//! let query = ProductScope::from_category_id(3).query();
//! assert_eq!(query.table_name(), "product");
//! assert_eq!(query.order().unwrap().direction, Direction::Ascending);
//!
//! // Zero and negative ids both mean "every product"
//! assert_eq!(ProductScope::from_category_id(-5), ProductScope::All);
//! ```

pub mod error;
pub mod query;
pub mod record;
pub mod scope;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult};
pub use query::{compare_values, Direction, Filter, Order, Query};
pub use record::{
    Category, Entity, Product, Record, CATEGORY_NAME, CATEGORY_TABLE, PRODUCT_CATEGORY_ID,
    PRODUCT_NAME, PRODUCT_TABLE,
};
pub use scope::{all_categories_query, ProductScope};
