//! # Product Scope
//!
//! Decides which product query a "products by category" request turns into.
//!
//! ```text
//!   category_id > 0   ──►  ProductScope::Category(id)
//!                           product?category_id=eq.<id>&order=product_name.asc
//!
//!   category_id <= 0  ──►  ProductScope::All
//!                           product?order=product_name.asc
//! ```
//!
//! Negative ids are deliberately folded into `All`; callers rely on that.

use crate::query::Query;
use crate::record::{Category, Entity, Product, PRODUCT_CATEGORY_ID};

/// Which products a refresh should load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductScope {
    /// The whole catalog.
    #[default]
    All,
    /// Products whose category reference equals the id.
    Category(i64),
}

impl ProductScope {
    /// Routes a raw category id. `0` is the "no filter" sentinel.
    pub fn from_category_id(category_id: i64) -> Self {
        if category_id > 0 {
            ProductScope::Category(category_id)
        } else {
            ProductScope::All
        }
    }

    /// The query this scope issues, always ordered by product name.
    pub fn query(&self) -> Query {
        let query = Query::table(Product::TABLE);
        let query = match self {
            ProductScope::All => query,
            ProductScope::Category(id) => query.eq(PRODUCT_CATEGORY_ID, *id),
        };
        query.ascending(Product::NAME_COLUMN)
    }
}

impl From<i64> for ProductScope {
    fn from(category_id: i64) -> Self {
        ProductScope::from_category_id(category_id)
    }
}

/// Query loading every category, ordered by name.
pub fn all_categories_query() -> Query {
    Query::table(Category::TABLE).ascending(Category::NAME_COLUMN)
}
