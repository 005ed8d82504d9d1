//! # Records and Entities
//!
//! Rows are owned by the remote schema. This crate never declares their
//! columns; a [`Record`] is a JSON object carried through untouched, and the
//! entity types only know the handful of column names the catalog queries by.
//!
//! ## Entity Columns
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Entity     Table        Name column       Other columns used          │
//! │  ────────   ──────────   ───────────────   ────────────────────────    │
//! │  Product    "product"    "product_name"    "category_id" (filter)      │
//! │  Category   "category"   "category_name"   -                           │
//! │                                                                         │
//! │  Every other column (price, description, ...) passes through opaque.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

// =============================================================================
// Column Names
// =============================================================================

/// Remote table holding products.
pub const PRODUCT_TABLE: &str = "product";

/// Column products are ordered by.
pub const PRODUCT_NAME: &str = "product_name";

/// Column referencing the owning category.
pub const PRODUCT_CATEGORY_ID: &str = "category_id";

/// Remote table holding categories.
pub const CATEGORY_TABLE: &str = "category";

/// Column categories are ordered by.
pub const CATEGORY_NAME: &str = "category_name";

// =============================================================================
// Record
// =============================================================================

/// An untyped row as returned by the remote service.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Record(Map::new())
    }

    /// Adds a column, builder style. Mostly useful for seeding test data.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(column.into(), value.into());
        self
    }

    /// Sets a column, returning the previous value.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(column.into(), value.into())
    }

    /// Returns the raw value of a column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    /// Returns a column as a string slice, if it is a JSON string.
    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.0.get(column).and_then(Value::as_str)
    }

    /// Returns a column as an integer, if it is an integral JSON number.
    pub fn get_i64(&self, column: &str) -> Option<i64> {
        self.0.get(column).and_then(Value::as_i64)
    }

    /// Number of columns in the row.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the row carries no columns.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Record(map)
    }
}

impl TryFrom<Value> for Record {
    type Error = CoreError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Record(map)),
            other => Err(CoreError::NotAnObject(json_kind(&other).to_string())),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Entity
// =============================================================================

/// A named remote relation queried as a whole.
pub trait Entity: From<Record> + Clone + Send + Sync + 'static {
    /// Remote table name.
    const TABLE: &'static str;

    /// Column the catalog sorts this entity by.
    const NAME_COLUMN: &'static str;

    /// Borrows the raw row.
    fn record(&self) -> &Record;

    /// Display name, when the row carries one.
    fn name(&self) -> Option<&str> {
        self.record().get_str(Self::NAME_COLUMN)
    }
}

/// A product row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Product(Record);

impl Product {
    /// Category reference, if present and integral.
    pub fn category_id(&self) -> Option<i64> {
        self.0.get_i64(PRODUCT_CATEGORY_ID)
    }
}

impl From<Record> for Product {
    fn from(record: Record) -> Self {
        Product(record)
    }
}

impl Entity for Product {
    const TABLE: &'static str = PRODUCT_TABLE;
    const NAME_COLUMN: &'static str = PRODUCT_NAME;

    fn record(&self) -> &Record {
        &self.0
    }
}

/// A category row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(Record);

impl From<Record> for Category {
    fn from(record: Record) -> Self {
        Category(record)
    }
}

impl Entity for Category {
    const TABLE: &'static str = CATEGORY_TABLE;
    const NAME_COLUMN: &'static str = CATEGORY_NAME;

    fn record(&self) -> &Record {
        &self.0
    }
}
