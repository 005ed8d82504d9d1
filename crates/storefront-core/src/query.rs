//! # Query Model
//!
//! A [`Query`] names one remote table, zero or more equality filters and at
//! most one ordering column. That is the whole query surface the catalog
//! needs; filtering and sorting are the backend's job.
//!
//! ## Ordering Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Direction     Nulls / missing     Numbers        Strings              │
//! │  ──────────    ───────────────     ───────────    ─────────────────    │
//! │  Ascending     last                numeric        byte-wise            │
//! │  Descending    first               numeric        byte-wise            │
//! │                                                                         │
//! │  Matches PostgreSQL defaults (ASC NULLS LAST / DESC NULLS FIRST).      │
//! │  Mixed types order as: boolean < number < string < array < object.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`compare_values`] and [`Query::sort`] are used by the in-memory backend
//! and by tests that check a backend honoured the requested order.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::record::Record;

// =============================================================================
// Direction / Order
// =============================================================================

/// Sort direction for a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl Direction {
    /// PostgREST spelling (`asc` / `desc`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordering directive: one column, one direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.column, self.direction)
    }
}

// =============================================================================
// Filter
// =============================================================================

/// Row filter. Only equality is supported.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq { column: String, value: Value },
}

impl Filter {
    /// Column the filter applies to.
    pub fn column(&self) -> &str {
        match self {
            Filter::Eq { column, .. } => column,
        }
    }

    /// Operand rendered the way PostgREST expects it (strings unquoted).
    pub fn operand(&self) -> String {
        match self {
            Filter::Eq { value, .. } => render_value(value),
        }
    }

    /// True when `record` passes this filter.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Filter::Eq { column, value } => record
                .get(column)
                .map(|actual| values_equal(actual, value))
                .unwrap_or(false),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Eq { column, .. } => write!(f, "{}=eq.{}", column, self.operand()),
        }
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Loose equality: numbers compare numerically, and a numeric string equals
/// the number it spells.
fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a == b,
            _ => a.as_f64() == b.as_f64(),
        },
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            s.trim().parse::<f64>().ok() == n.as_f64()
        }
        (a, b) => a == b,
    }
}

// =============================================================================
// Query
// =============================================================================

/// A select over one remote table.
///
/// ## Usage
/// ```rust
/// use storefront_core::{Direction, Query};
///
/// let query = Query::table("product")
///     .eq("category_id", 3)
///     .order_by("product_name", Direction::Ascending);
///
/// assert_eq!(query.to_string(), "product?category_id=eq.3&order=product_name.asc");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    table: String,
    filters: Vec<Filter>,
    order: Option<Order>,
}

impl Query {
    /// Starts a query selecting every row of `table`.
    pub fn table(table: impl Into<String>) -> Self {
        Query {
            table: table.into(),
            filters: Vec::new(),
            order: None,
        }
    }

    /// Adds an equality filter.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    /// Sets the ordering column, replacing any previous one.
    pub fn order_by(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.order = Some(Order {
            column: column.into(),
            direction,
        });
        self
    }

    /// Shorthand for an ascending [`order_by`](Self::order_by).
    pub fn ascending(self, column: impl Into<String>) -> Self {
        self.order_by(column, Direction::Ascending)
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    /// Checks that every name in the query is non-empty.
    pub fn validate(&self) -> CoreResult<()> {
        if self.table.trim().is_empty() {
            return Err(CoreError::InvalidQuery("table name is empty".into()));
        }

        if self.filters.iter().any(|f| f.column().trim().is_empty()) {
            return Err(CoreError::InvalidQuery(format!(
                "filter on table '{}' has an empty column",
                self.table
            )));
        }

        if let Some(order) = &self.order {
            if order.column.trim().is_empty() {
                return Err(CoreError::InvalidQuery(format!(
                    "order on table '{}' has an empty column",
                    self.table
                )));
            }
        }

        Ok(())
    }

    /// True when `record` passes every filter.
    pub fn matches(&self, record: &Record) -> bool {
        self.filters.iter().all(|f| f.matches(record))
    }

    /// Stable sort of `rows` by the ordering column. No-op without an order.
    pub fn sort(&self, rows: &mut [Record]) {
        if let Some(order) = &self.order {
            rows.sort_by(|a, b| {
                compare_values(a.get(&order.column), b.get(&order.column), order.direction)
            });
        }
    }

    /// Filters then sorts, the way a backend evaluates this query.
    pub fn apply<'a>(&self, rows: impl IntoIterator<Item = &'a Record>) -> Vec<Record> {
        let mut selected: Vec<Record> = rows
            .into_iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect();
        self.sort(&mut selected);
        selected
    }

    /// True when `rows` already respect the ordering column.
    pub fn is_ordered(&self, rows: &[Record]) -> bool {
        match &self.order {
            Some(order) => rows.windows(2).all(|pair| {
                compare_values(
                    pair[0].get(&order.column),
                    pair[1].get(&order.column),
                    order.direction,
                ) != Ordering::Greater
            }),
            None => true,
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.table)?;
        let mut sep = '?';
        for filter in &self.filters {
            write!(f, "{}{}", sep, filter)?;
            sep = '&';
        }
        if let Some(order) = &self.order {
            write!(f, "{}order={}", sep, order)?;
        }
        Ok(())
    }
}

// =============================================================================
// Value Ordering
// =============================================================================

/// Compares two optional column values for `direction`.
///
/// Missing columns and JSON nulls are treated alike.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>, direction: Direction) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());

    match (a, b, direction) {
        (None, None, _) => Ordering::Equal,
        (None, Some(_), Direction::Ascending) => Ordering::Greater,
        (None, Some(_), Direction::Descending) => Ordering::Less,
        (Some(_), None, Direction::Ascending) => Ordering::Less,
        (Some(_), None, Direction::Descending) => Ordering::Greater,
        (Some(a), Some(b), Direction::Ascending) => compare_present(a, b),
        (Some(a), Some(b), Direction::Descending) => compare_present(a, b).reverse(),
    }
}

fn compare_present(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => a
                .as_f64()
                .partial_cmp(&b.as_f64())
                .unwrap_or(Ordering::Equal),
        },
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (a, b) if type_rank(a) == type_rank(b) => a.to_string().cmp(&b.to_string()),
        (a, b) => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn named(name: &str) -> Record {
        Record::new().with("product_name", name)
    }

    fn names(rows: &[Record]) -> Vec<&str> {
        rows.iter().filter_map(|r| r.get_str("product_name")).collect()
    }

    #[test]
    fn test_display_matches_postgrest_params() {
        let all = Query::table("category").ascending("category_name");
        assert_eq!(all.to_string(), "category?order=category_name.asc");

        let filtered = Query::table("product")
            .eq("category_id", 2)
            .order_by("product_name", Direction::Descending);
        assert_eq!(
            filtered.to_string(),
            "product?category_id=eq.2&order=product_name.desc"
        );

        assert_eq!(Query::table("product").eq("sku", "AB-1").to_string(), "product?sku=eq.AB-1");
    }

    #[test]
    fn test_validate() {
        assert!(Query::table("product").ascending("product_name").validate().is_ok());
        assert!(Query::table("  ").validate().is_err());
        assert!(Query::table("product").eq("", 1).validate().is_err());
        assert!(Query::table("product").ascending("").validate().is_err());
    }

    #[test]
    fn test_sort_ascending_is_non_decreasing() {
        let query = Query::table("product").ascending("product_name");
        let mut rows = vec![named("Cherry"), named("Apple"), named("Banana")];

        assert!(!query.is_ordered(&rows));
        query.sort(&mut rows);

        assert_eq!(names(&rows), vec!["Apple", "Banana", "Cherry"]);
        assert!(query.is_ordered(&rows));
    }

    #[test]
    fn test_sort_is_stable() {
        let query = Query::table("product").ascending("product_name");
        let mut rows = vec![
            named("Apple").with("id", 1),
            named("Apple").with("id", 2),
            named("Aardvark").with("id", 3),
        ];
        query.sort(&mut rows);

        let ids: Vec<i64> = rows.iter().filter_map(|r| r.get_i64("id")).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_nulls_last_ascending_first_descending() {
        let rows = vec![named("B"), Record::new().with("product_name", Value::Null), named("A")];

        let asc = Query::table("product").ascending("product_name").apply(&rows);
        assert_eq!(asc[2].get("product_name"), Some(&Value::Null));

        let desc = Query::table("product")
            .order_by("product_name", Direction::Descending)
            .apply(&rows);
        assert_eq!(desc[0].get("product_name"), Some(&Value::Null));
        assert_eq!(names(&desc), vec!["B", "A"]);
    }

    #[test]
    fn test_numbers_compare_numerically() {
        assert_eq!(
            compare_values(Some(&json!(9)), Some(&json!(10)), Direction::Ascending),
            Ordering::Less
        );
        assert_eq!(
            compare_values(Some(&json!(2.5)), Some(&json!(2)), Direction::Ascending),
            Ordering::Greater
        );
    }

    #[test]
    fn test_eq_filter() {
        let rows = vec![
            named("Milk").with("category_id", 2),
            named("Bread").with("category_id", 5),
            named("Cheese").with("category_id", 2.0),
            named("Loose"),
        ];

        let selected = Query::table("product")
            .eq("category_id", 2)
            .ascending("product_name")
            .apply(&rows);

        assert_eq!(names(&selected), vec!["Cheese", "Milk"]);
    }

    #[test]
    fn test_eq_filter_numeric_string() {
        let row = named("Milk").with("category_id", "2");
        assert!(Query::table("product").eq("category_id", 2).matches(&row));
        assert!(!Query::table("product").eq("category_id", 3).matches(&row));
    }
}
