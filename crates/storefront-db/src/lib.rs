//! # storefront-db: Remote Data Access
//!
//! Runs catalog [`Query`](storefront_core::Query) values against a data
//! service and hands back rows.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Data Flow                             │
//! │                                                                         │
//! │  CatalogStore::fetch_all_products()                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   storefront-db (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  QueryClient  │    │  RestClient   │    │ MemoryClient │  │   │
//! │  │   │  (client.rs)  │◄───│  (rest.rs)    │    │ (memory.rs)  │  │   │
//! │  │   │               │◄───┼───────────────┼────│              │  │   │
//! │  │   │ select(query) │    │ PostgREST GET │    │ tables in RAM│  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │             Hosted PostgreSQL (PostgREST gateway)               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`client`] - The `QueryClient` trait
//! - [`rest`] - PostgREST over HTTP
//! - [`memory`] - In-process backend with failure and latency injection
//! - [`error`] - Remote query error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_db::{QueryClient, RestClient, RestClientConfig};
//! use storefront_core::ProductScope;
//!
//! let client = RestClient::new(RestClientConfig {
//!     base_url: "https://abcd.supabase.co".into(),
//!     api_key: anon_key,
//!     ..Default::default()
//! })?;
//!
//! let rows = client.select(&ProductScope::Category(3).query()).await?;
//! ```

pub mod client;
pub mod error;
pub mod memory;
pub mod rest;

pub use client::QueryClient;
pub use error::{DbError, DbResult};
pub use memory::MemoryClient;
pub use rest::{RestClient, RestClientConfig};
