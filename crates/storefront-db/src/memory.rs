//! # In-Memory Backend
//!
//! A [`QueryClient`] that evaluates queries against tables held in process.
//! It applies filters and ordering the way the hosted service does, so code
//! above it sees the same contract: rows come back already filtered and
//! sorted.
//!
//! Used as the stub backend in tests. Besides data it can be told to fail a
//! table or delay answers, and it remembers every query it received.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use storefront_core::{Query, Record};
use tokio::sync::RwLock;
use tracing::debug;

use crate::client::QueryClient;
use crate::error::{DbError, DbResult};

#[derive(Debug, Default)]
struct MemoryState {
    tables: HashMap<String, Vec<Record>>,
    failures: HashMap<String, String>,
    latency: HashMap<String, Duration>,
    next_delays: HashMap<String, VecDeque<Duration>>,
    issued: Vec<Query>,
}

/// Process-local stand-in for the remote database.
#[derive(Debug, Default)]
pub struct MemoryClient {
    state: RwLock<MemoryState>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the contents of `table`. Rows are stored in the given order;
    /// the ordering a query asks for is applied at select time.
    pub async fn set_table(&self, table: impl Into<String>, rows: Vec<Record>) {
        self.state.write().await.tables.insert(table.into(), rows);
    }

    /// Appends one row to `table`, creating the table if needed.
    pub async fn push_row(&self, table: impl Into<String>, row: Record) {
        self.state
            .write()
            .await
            .tables
            .entry(table.into())
            .or_default()
            .push(row);
    }

    /// Makes every select on `table` fail with `message` until cleared.
    pub async fn fail_table(&self, table: impl Into<String>, message: impl Into<String>) {
        self.state
            .write()
            .await
            .failures
            .insert(table.into(), message.into());
    }

    pub async fn clear_failure(&self, table: &str) {
        self.state.write().await.failures.remove(table);
    }

    /// Delay applied to every select on `table`.
    pub async fn set_latency(&self, table: impl Into<String>, latency: Duration) {
        self.state.write().await.latency.insert(table.into(), latency);
    }

    /// Delay for the next select on `table` only. Queued delays are used
    /// first-in first-out before falling back to [`set_latency`](Self::set_latency).
    pub async fn delay_next(&self, table: impl Into<String>, delay: Duration) {
        self.state
            .write()
            .await
            .next_delays
            .entry(table.into())
            .or_default()
            .push_back(delay);
    }

    /// Every query received so far, oldest first.
    pub async fn issued(&self) -> Vec<Query> {
        self.state.read().await.issued.clone()
    }

    /// Most recent query received, if any.
    pub async fn last_issued(&self) -> Option<Query> {
        self.state.read().await.issued.last().cloned()
    }
}

#[async_trait]
impl QueryClient for MemoryClient {
    async fn select(&self, query: &Query) -> DbResult<Vec<Record>> {
        query.validate()?;
        let table = query.table_name();

        // Evaluate under the lock, answer after the simulated latency.
        let (delay, outcome) = {
            let mut state = self.state.write().await;
            state.issued.push(query.clone());

            let delay = state
                .next_delays
                .get_mut(table)
                .and_then(VecDeque::pop_front)
                .or_else(|| state.latency.get(table).copied());

            let outcome = if let Some(message) = state.failures.get(table) {
                Err(DbError::Api {
                    status: 400,
                    code: None,
                    message: message.clone(),
                })
            } else {
                match state.tables.get(table) {
                    Some(rows) => Ok(query.apply(rows)),
                    None => Err(DbError::UnknownTable(table.to_string())),
                }
            };

            (delay, outcome)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        debug!(query = %query, ok = outcome.is_ok(), "In-memory select");
        outcome
    }
}
