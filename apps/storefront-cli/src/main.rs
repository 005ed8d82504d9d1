//! # Storefront CLI
//!
//! Loads the catalog from the configured data service and prints it.
//!
//! ```text
//! storefront [--config <path>] [--policy <policy>] <command>
//!
//!   products [--category <id>]   products, optionally for one category
//!   categories                   all categories
//!   all                          products and categories
//! ```
//!
//! A failed refresh is logged and the (empty) collection is still printed,
//! the same way a storefront page keeps rendering. Only configuration
//! problems end the process with an error.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use storefront_store::{CatalogStore, RefreshPolicy, StorefrontConfig};

#[derive(Parser, Debug)]
#[clap(name = "storefront", version, about = "Inspect the storefront catalog")]
struct CliArgs {
    /// Path to storefront.toml. Defaults to the platform config directory.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Overrides the configured refresh policy.
    #[clap(long)]
    pub policy: Option<RefreshPolicy>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Load products, ordered by name.
    Products {
        /// Only products in this category. 0 or less means all products.
        #[clap(long, default_value_t = 0, allow_negative_numbers = true)]
        category: i64,
    },

    /// Load categories, ordered by name.
    Categories,

    /// Load products and categories concurrently.
    All,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing();

    let mut config = StorefrontConfig::load(args.config).context("Loading configuration")?;
    if let Some(policy) = args.policy {
        config.store.refresh_policy = policy;
    }
    info!(url = %config.remote.url, policy = %config.refresh_policy(), "Configuration loaded");

    let store = CatalogStore::from_config(&config).context("Creating catalog store")?;

    let output = run(&store, &args.command).await?;
    println!("{output}");
    Ok(())
}

/// Runs one command and renders the collections it touched.
async fn run(store: &CatalogStore, command: &Command) -> Result<String> {
    // Failures are already logged by the store.
    let value = match command {
        Command::Products { category } => {
            let _ = store.fetch_products_by_category(*category).await;
            serde_json::to_value(&*store.products().snapshot())?
        }
        Command::Categories => {
            let _ = store.fetch_all_categories().await;
            serde_json::to_value(&*store.categories().snapshot())?
        }
        Command::All => {
            let _ = store.load_all().await;
            json!({
                "categories": &*store.categories().snapshot(),
                "products": &*store.products().snapshot(),
            })
        }
    };

    Ok(serde_json::to_string_pretty(&value)?)
}
