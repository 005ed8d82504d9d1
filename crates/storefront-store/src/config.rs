//! # Storefront Configuration
//!
//! Where the catalog lives and how concurrent refreshes are reconciled.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOREFRONT_URL=https://abcd.supabase.co                            │
//! │     STOREFRONT_ANON_KEY=eyJhbGciOi...                                  │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/storefront/storefront.toml (Linux)                       │
//! │     ~/Library/Application Support/com.storefront.storefront/...        │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     local PostgREST on :54321, last-response-wins                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [remote]
//! url = "https://abcd.supabase.co"
//! anon_key = "eyJhbGciOi..."
//! schema = "public"
//! timeout_secs = 30
//!
//! [store]
//! refresh_policy = "last_response_wins"  # or "latest_request_wins"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use storefront_db::RestClientConfig;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Refresh Policy
// =============================================================================

/// How a collection reconciles refreshes that overlap in time.
///
/// ```text
///   t0  fetch_products_by_category(1) ──────────────────────┐ (slow)
///   t1  fetch_all_products()          ────────┐ (fast)       │
///                                             ▼              ▼
///   LastResponseWins:    [all products] → [category 1]   (final: category 1)
///   LatestRequestWins:   [all products] → (discarded)    (final: all products)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicy {
    /// Whichever response arrives last is published, regardless of when its
    /// request was issued.
    #[default]
    LastResponseWins,

    /// A response is dropped if a newer request for the same collection has
    /// already been published.
    LatestRequestWins,
}

impl std::fmt::Display for RefreshPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefreshPolicy::LastResponseWins => write!(f, "last_response_wins"),
            RefreshPolicy::LatestRequestWins => write!(f, "latest_request_wins"),
        }
    }
}

impl std::str::FromStr for RefreshPolicy {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "last_response_wins" | "last_response" => Ok(RefreshPolicy::LastResponseWins),
            "latest_request_wins" | "latest_request" | "sequenced" => {
                Ok(RefreshPolicy::LatestRequestWins)
            }
            other => Err(StoreError::InvalidConfig(format!(
                "Unknown refresh policy: '{}'. Valid options: last_response_wins, latest_request_wins",
                other
            ))),
        }
    }
}

// =============================================================================
// Remote Settings
// =============================================================================

/// Connection settings for the hosted database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSettings {
    /// Project URL; PostgREST is reached under `/rest/v1/`.
    #[serde(default = "default_url")]
    pub url: String,

    /// Public (anonymous) API key.
    #[serde(default)]
    pub anon_key: String,

    /// Database schema holding the catalog tables.
    #[serde(default = "default_schema")]
    pub schema: String,

    /// HTTP request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_url() -> String {
    "http://localhost:54321".to_string()
}

fn default_schema() -> String {
    "public".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for RemoteSettings {
    fn default() -> Self {
        RemoteSettings {
            url: default_url(),
            anon_key: String::new(),
            schema: default_schema(),
            timeout_secs: default_timeout(),
        }
    }
}

// =============================================================================
// Store Settings
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub refresh_policy: RefreshPolicy,
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete storefront configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorefrontConfig {
    #[serde(default)]
    pub remote: RemoteSettings,

    #[serde(default)]
    pub store: StoreSettings,
}

impl StorefrontConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (storefront.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> StoreResult<Self> {
        Self::load_with_env(config_path, |key| std::env::var(key).ok())
    }

    fn load_with_env(
        config_path: Option<PathBuf>,
        env: impl Fn(&str) -> Option<String>,
    ) -> StoreResult<Self> {
        let mut config = match config_path.or_else(Self::default_config_path) {
            Some(path) if path.exists() => Self::read_file(&path)?,
            Some(path) => {
                debug!(path = %path.display(), "No config file, starting from defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_overrides(env);
        config.validate()?;

        if config.remote.anon_key.is_empty() {
            warn!("No anon key configured; requests will be sent unauthenticated");
        }

        Ok(config)
    }

    fn read_file(path: &Path) -> StoreResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| StoreError::ConfigLoadFailed(format!("{}: {}", path.display(), e)))?;
        let config = toml::from_str(&contents)?;
        info!(path = %path.display(), "Read storefront config");
        Ok(config)
    }

    /// Like [`load`](Self::load), but any failure falls back to the defaults.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        match Self::load(config_path) {
            Ok(config) => config,
            Err(error) => {
                warn!(%error, "Using default storefront config");
                Self::default()
            }
        }
    }

    /// Writes the configuration as TOML, creating parent directories.
    pub fn save(&self, config_path: Option<PathBuf>) -> StoreResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| StoreError::ConfigSaveFailed("no config directory on this platform".into()))?;

        let contents = toml::to_string_pretty(self)?;
        write_file(&path, &contents)
            .map_err(|e| StoreError::ConfigSaveFailed(format!("{}: {}", path.display(), e)))?;

        info!(path = %path.display(), "Storefront config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> StoreResult<()> {
        let url = Url::parse(&self.remote.url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(StoreError::InvalidUrl(format!(
                "Service URL must start with http:// or https://, got: {}",
                self.remote.url
            )));
        }

        if self.remote.schema.trim().is_empty() {
            return Err(StoreError::InvalidConfig("schema must not be empty".into()));
        }

        if self.remote.timeout_secs == 0 {
            return Err(StoreError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies `STOREFRONT_*` overrides read through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("STOREFRONT_URL") {
            debug!(url = %url, "Overriding service URL from environment");
            self.remote.url = url;
        }

        if let Some(key) = lookup("STOREFRONT_ANON_KEY") {
            self.remote.anon_key = key;
        }

        if let Some(schema) = lookup("STOREFRONT_SCHEMA") {
            self.remote.schema = schema;
        }

        if let Some(timeout) = lookup("STOREFRONT_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(secs) => self.remote.timeout_secs = secs,
                Err(_) => warn!(value = %timeout, "Ignoring non-numeric STOREFRONT_TIMEOUT_SECS"),
            }
        }

        if let Some(policy) = lookup("STOREFRONT_REFRESH_POLICY") {
            match policy.parse() {
                Ok(parsed) => {
                    debug!(policy = %policy, "Overriding refresh policy from environment");
                    self.store.refresh_policy = parsed;
                }
                Err(e) => warn!(error = %e, "Ignoring STOREFRONT_REFRESH_POLICY"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "storefront", "storefront")
            .map(|dirs| dirs.config_dir().join("storefront.toml"))
    }

    /// Settings for the PostgREST client.
    pub fn rest_client_config(&self) -> RestClientConfig {
        RestClientConfig {
            base_url: self.remote.url.clone(),
            api_key: self.remote.anon_key.clone(),
            schema: self.remote.schema.clone(),
            timeout: Duration::from_secs(self.remote.timeout_secs),
        }
    }

    pub fn refresh_policy(&self) -> RefreshPolicy {
        self.store.refresh_policy
    }
}

fn write_file(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_refresh_policy_parsing() {
        assert_eq!(
            "last_response_wins".parse::<RefreshPolicy>().unwrap(),
            RefreshPolicy::LastResponseWins
        );
        assert_eq!(
            "Latest-Request-Wins".parse::<RefreshPolicy>().unwrap(),
            RefreshPolicy::LatestRequestWins
        );
        assert_eq!(
            "sequenced".parse::<RefreshPolicy>().unwrap(),
            RefreshPolicy::LatestRequestWins
        );
        assert!("newest".parse::<RefreshPolicy>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = StorefrontConfig::default();
        assert_eq!(config.remote.url, "http://localhost:54321");
        assert_eq!(config.remote.schema, "public");
        assert_eq!(config.remote.timeout_secs, 30);
        assert_eq!(config.refresh_policy(), RefreshPolicy::LastResponseWins);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = StorefrontConfig::default();

        config.remote.url = "ws://example.com".into();
        assert!(matches!(config.validate(), Err(StoreError::InvalidUrl(_))));

        config.remote.url = "not a url".into();
        assert!(matches!(config.validate(), Err(StoreError::InvalidUrl(_))));

        config.remote.url = "https://abcd.supabase.co".into();
        config.remote.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(StoreError::InvalidConfig(_))));

        config.remote.timeout_secs = 5;
        config.remote.schema = " ".into();
        assert!(config.validate().is_err());

        config.remote.schema = "shop".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("STOREFRONT_URL", "https://abcd.supabase.co"),
            ("STOREFRONT_ANON_KEY", "anon"),
            ("STOREFRONT_TIMEOUT_SECS", "7"),
            ("STOREFRONT_REFRESH_POLICY", "latest_request_wins"),
        ]
        .into_iter()
        .collect();

        let mut config = StorefrontConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.remote.url, "https://abcd.supabase.co");
        assert_eq!(config.remote.anon_key, "anon");
        assert_eq!(config.remote.schema, "public");
        assert_eq!(config.remote.timeout_secs, 7);
        assert_eq!(config.refresh_policy(), RefreshPolicy::LatestRequestWins);
    }

    #[test]
    fn test_bad_overrides_are_ignored() {
        let mut config = StorefrontConfig::default();
        config.apply_overrides(|key| match key {
            "STOREFRONT_TIMEOUT_SECS" => Some("soon".to_string()),
            "STOREFRONT_REFRESH_POLICY" => Some("whatever".to_string()),
            _ => None,
        });

        assert_eq!(config.remote.timeout_secs, 30);
        assert_eq!(config.refresh_policy(), RefreshPolicy::LastResponseWins);
    }

    #[test]
    fn test_toml_round_trip_keeps_sections() {
        let mut config = StorefrontConfig::default();
        config.store.refresh_policy = RefreshPolicy::LatestRequestWins;

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[remote]"));
        assert!(toml_str.contains("refresh_policy = \"latest_request_wins\""));

        let parsed: StorefrontConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.refresh_policy(), RefreshPolicy::LatestRequestWins);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let parsed: StorefrontConfig =
            toml::from_str("[remote]\nurl = \"https://abcd.supabase.co\"\n").unwrap();
        assert_eq!(parsed.remote.url, "https://abcd.supabase.co");
        assert_eq!(parsed.remote.timeout_secs, 30);
        assert_eq!(parsed.refresh_policy(), RefreshPolicy::LastResponseWins);
    }

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("storefront-{}-{}", name, std::process::id()))
    }

    #[test]
    fn test_load_and_save_explicit_path() {
        let dir = temp_dir("save");
        let path = dir.join("nested").join("storefront.toml");

        let mut config = StorefrontConfig::default();
        config.remote.url = "https://abcd.supabase.co".into();
        config.remote.schema = "shop".into();
        config.store.refresh_policy = RefreshPolicy::LatestRequestWins;
        config.save(Some(path.clone())).unwrap();

        let loaded = StorefrontConfig::load_with_env(Some(path), |_| None).unwrap();
        assert_eq!(loaded.remote.url, "https://abcd.supabase.co");
        assert_eq!(loaded.remote.schema, "shop");
        assert_eq!(loaded.refresh_policy(), RefreshPolicy::LatestRequestWins);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_env_overrides_file_values() {
        let dir = temp_dir("env");
        let path = dir.join("storefront.toml");
        StorefrontConfig::default().save(Some(path.clone())).unwrap();

        let loaded = StorefrontConfig::load_with_env(Some(path), |key| match key {
            "STOREFRONT_SCHEMA" => Some("shop".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(loaded.remote.schema, "shop");

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = temp_dir("missing").join("storefront.toml");
        let loaded = StorefrontConfig::load_with_env(Some(path), |_| None).unwrap();
        assert_eq!(loaded.remote.url, "http://localhost:54321");
    }

    #[test]
    fn test_invalid_file_fails_load_but_not_load_or_default() {
        let dir = temp_dir("invalid");
        let path = dir.join("storefront.toml");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(&path, "[remote\nurl = ").unwrap();

        let err = StorefrontConfig::load_with_env(Some(path.clone()), |_| None).unwrap_err();
        assert!(matches!(err, StoreError::ConfigLoadFailed(_)));

        let fallback = StorefrontConfig::load_or_default(Some(path));
        assert_eq!(fallback.remote.url, "http://localhost:54321");
        assert_eq!(fallback.remote.timeout_secs, 30);
        assert_eq!(fallback.refresh_policy(), RefreshPolicy::LastResponseWins);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_save_reports_unwritable_path() {
        let dir = temp_dir("blocked");
        std::fs::create_dir_all(&dir).unwrap();
        let blocker = dir.join("file");
        std::fs::write(&blocker, "").unwrap();

        let err = StorefrontConfig::default()
            .save(Some(blocker.join("storefront.toml")))
            .unwrap_err();
        assert!(matches!(err, StoreError::ConfigSaveFailed(_)));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_rest_client_config() {
        let mut config = StorefrontConfig::default();
        config.remote.timeout_secs = 12;
        let rest = config.rest_client_config();
        assert_eq!(rest.timeout, Duration::from_secs(12));
        assert_eq!(rest.base_url, config.remote.url);
    }
}
