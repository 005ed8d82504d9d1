//! # PostgREST Client
//!
//! Runs catalog queries against a hosted PostgreSQL exposed through
//! PostgREST (`<project>/rest/v1/<table>`).
//!
//! ## Request Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Query::table("product").eq("category_id", 2).ascending("product_name") │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  GET https://<project>/rest/v1/product                                 │
//! │      ?select=*                                                         │
//! │      &category_id=eq.2                                                 │
//! │      &order=product_name.asc                                           │
//! │                                                                         │
//! │  apikey: <anon key>                                                    │
//! │  Authorization: Bearer <anon key>                                      │
//! │  Accept-Profile: <schema>        (only for a non-public schema)        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  200 [ {...}, {...} ]            → Ok(Vec<Record>)                     │
//! │  4xx/5xx {code, message, ...}    → Err(DbError::Api)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Filtering and sorting happen on the server. The client sends one request
//! per query and never retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use storefront_core::{Query, Record};
use tracing::debug;
use url::Url;

use crate::client::QueryClient;
use crate::error::{DbError, DbResult};

/// Path PostgREST is mounted under on hosted projects.
const REST_PATH: &str = "rest/v1/";

/// Schema PostgREST serves when no profile header is sent.
const DEFAULT_SCHEMA: &str = "public";

/// Settings for [`RestClient`].
#[derive(Debug, Clone)]
pub struct RestClientConfig {
    /// Project URL, e.g. `https://abcd.supabase.co`.
    pub base_url: String,

    /// Anonymous (public) API key.
    pub api_key: String,

    /// Database schema to query.
    pub schema: String,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for RestClientConfig {
    fn default() -> Self {
        RestClientConfig {
            base_url: "http://localhost:54321".to_string(),
            api_key: String::new(),
            schema: DEFAULT_SCHEMA.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Error body returned by PostgREST.
#[derive(Debug, Deserialize)]
struct PostgrestErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

/// HTTP client for a PostgREST endpoint.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    rest_url: Url,
    schema: String,
}

impl RestClient {
    /// Creates a client. Fails on an unparsable URL or a key that cannot be
    /// sent as a header.
    pub fn new(config: RestClientConfig) -> DbResult<Self> {
        let rest_url = rest_url(&config.base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if !config.api_key.is_empty() {
            let key = HeaderValue::from_str(&config.api_key)
                .map_err(|e| DbError::Internal(format!("invalid API key header: {}", e)))?;
            let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
                .map_err(|e| DbError::Internal(format!("invalid API key header: {}", e)))?;
            headers.insert("apikey", key);
            headers.insert(AUTHORIZATION, bearer);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(RestClient {
            http,
            rest_url,
            schema: config.schema,
        })
    }

    /// Full URL of a table endpoint (without query string).
    pub fn endpoint(&self, table: &str) -> DbResult<Url> {
        Ok(self.rest_url.join(table)?)
    }

    /// Query-string pairs PostgREST expects for `query`.
    pub fn params(query: &Query) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), "*".to_string())];

        for filter in query.filters() {
            params.push((filter.column().to_string(), format!("eq.{}", filter.operand())));
        }

        if let Some(order) = query.order() {
            params.push(("order".to_string(), order.to_string()));
        }

        params
    }
}

#[async_trait]
impl QueryClient for RestClient {
    async fn select(&self, query: &Query) -> DbResult<Vec<Record>> {
        query.validate()?;

        let url = self.endpoint(query.table_name())?;
        let mut request = self.http.get(url).query(&Self::params(query));
        if self.schema != DEFAULT_SCHEMA {
            request = request.header("Accept-Profile", self.schema.as_str());
        }

        debug!(query = %query, "Sending PostgREST select");
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }

        let rows: Vec<Record> = serde_json::from_str(&body)?;
        debug!(query = %query, rows = rows.len(), "PostgREST select returned");
        Ok(rows)
    }
}

/// Builds `<base>/rest/v1/` so that table names join underneath it.
fn rest_url(base_url: &str) -> DbResult<Url> {
    let trimmed = base_url.trim().trim_end_matches('/');
    let base = Url::parse(&format!("{}/", trimmed))?;

    match base.scheme() {
        "http" | "https" => Ok(base.join(REST_PATH)?),
        other => Err(DbError::InvalidUrl(format!(
            "expected http or https, got '{}'",
            other
        ))),
    }
}

/// Turns an error response into [`DbError::Api`], keeping whatever detail
/// the body carries.
fn api_error(status: u16, body: &str) -> DbError {
    match serde_json::from_str::<PostgrestErrorBody>(body) {
        Ok(parsed) => {
            let mut message = parsed.message.unwrap_or_else(|| body.to_string());
            if let Some(details) = parsed.details.filter(|d| !d.is_empty()) {
                message = format!("{} ({})", message, details);
            }
            if let Some(hint) = parsed.hint.filter(|h| !h.is_empty()) {
                message = format!("{}; hint: {}", message, hint);
            }
            DbError::Api {
                status,
                code: parsed.code,
                message,
            }
        }
        Err(_) => DbError::Api {
            status,
            code: None,
            message: if body.trim().is_empty() {
                "empty response body".to_string()
            } else {
                body.trim().to_string()
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::{all_categories_query, ProductScope};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn client(base_url: &str) -> RestClient {
        RestClient::new(RestClientConfig {
            base_url: base_url.to_string(),
            api_key: "anon-key".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_under_rest_path() {
        let c = client("https://abcd.supabase.co");
        assert_eq!(
            c.endpoint("product").unwrap().as_str(),
            "https://abcd.supabase.co/rest/v1/product"
        );

        // Trailing slash and a path prefix are both kept intact
        let c = client("http://localhost:8000/proxy/");
        assert_eq!(
            c.endpoint("category").unwrap().as_str(),
            "http://localhost:8000/proxy/rest/v1/category"
        );
    }

    #[test]
    fn test_rejects_bad_urls() {
        let err = RestClient::new(RestClientConfig {
            base_url: "not a url".into(),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, DbError::InvalidUrl(_)));

        let err = RestClient::new(RestClientConfig {
            base_url: "ftp://example.com".into(),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, DbError::InvalidUrl(_)));
    }

    #[test]
    fn test_params_for_filtered_products() {
        let params = RestClient::params(&ProductScope::Category(2).query());
        assert_eq!(
            params,
            vec![
                ("select".to_string(), "*".to_string()),
                ("category_id".to_string(), "eq.2".to_string()),
                ("order".to_string(), "product_name.asc".to_string()),
            ]
        );
    }

    #[test]
    fn test_params_for_categories() {
        let params = RestClient::params(&all_categories_query());
        assert_eq!(params.len(), 2);
        assert_eq!(params[1], ("order".to_string(), "category_name.asc".to_string()));
    }

    #[test]
    fn test_api_error_from_postgrest_body() {
        let body = r#"{"code":"42P01","details":null,"hint":null,"message":"relation \"public.prodcut\" does not exist"}"#;
        match api_error(404, body) {
            DbError::Api { status, code, message } => {
                assert_eq!(status, 404);
                assert_eq!(code.as_deref(), Some("42P01"));
                assert!(message.contains("prodcut"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_api_error_keeps_details_and_hint() {
        let body = r#"{"code":"PGRST100","details":"unexpected 'x'","hint":"check the order syntax","message":"failed to parse order"}"#;
        let err = api_error(400, body);
        let text = err.to_string();
        assert!(text.contains("failed to parse order (unexpected 'x')"));
        assert!(text.contains("hint: check the order syntax"));
    }

    #[test]
    fn test_api_error_from_plain_text() {
        match api_error(502, "Bad Gateway\n") {
            DbError::Api { code, message, .. } => {
                assert!(code.is_none());
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        match api_error(500, "") {
            DbError::Api { message, .. } => assert_eq!(message, "empty response body"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_query_is_rejected_before_sending() {
        let c = client("http://127.0.0.1:9");
        let err = c.select(&Query::table("")).await.unwrap_err();
        assert!(matches!(err, DbError::InvalidQuery(_)));
    }

    /// Answers a single HTTP request with a canned response. The handle
    /// yields the request head, lowercased.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut chunk = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;

            String::from_utf8_lossy(&head).to_lowercase()
        });

        (base_url, handle)
    }

    #[tokio::test]
    async fn test_select_sends_postgrest_request() {
        let (base_url, server) =
            serve_once("200 OK", r#"[{"product_name":"Apple","category_id":2}]"#).await;
        let c = RestClient::new(RestClientConfig {
            base_url,
            api_key: "anon-key".to_string(),
            schema: "shop".to_string(),
            ..Default::default()
        })
        .unwrap();

        let rows = c.select(&ProductScope::Category(2).query()).await.unwrap();
        let head = server.await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_str("product_name"), Some("Apple"));
        assert!(head.starts_with(
            "get /rest/v1/product?select=*&category_id=eq.2&order=product_name.asc http/1.1\r\n"
        ));
        assert!(head.contains("\r\napikey: anon-key\r\n"));
        assert!(head.contains("\r\nauthorization: bearer anon-key\r\n"));
        assert!(head.contains("\r\naccept: application/json\r\n"));
        assert!(head.contains("\r\naccept-profile: shop\r\n"));
    }

    #[tokio::test]
    async fn test_public_schema_and_no_key_send_no_extra_headers() {
        let (base_url, server) = serve_once("200 OK", "[]").await;
        let c = RestClient::new(RestClientConfig {
            base_url,
            ..Default::default()
        })
        .unwrap();

        let rows = c.select(&all_categories_query()).await.unwrap();
        let head = server.await.unwrap();

        assert!(rows.is_empty());
        assert!(head.starts_with("get /rest/v1/category?select=*&order=category_name.asc "));
        assert!(!head.contains("accept-profile"));
        assert!(!head.contains("apikey"));
        assert!(!head.contains("authorization"));
    }

    #[tokio::test]
    async fn test_error_status_becomes_api_error() {
        let (base_url, server) = serve_once(
            "404 Not Found",
            r#"{"code":"42P01","details":null,"hint":null,"message":"relation does not exist"}"#,
        )
        .await;

        let err = client(&base_url)
            .select(&ProductScope::All.query())
            .await
            .unwrap_err();
        server.await.unwrap();

        match err {
            DbError::Api { status, code, message } => {
                assert_eq!(status, 404);
                assert_eq!(code.as_deref(), Some("42P01"));
                assert_eq!(message, "relation does not exist");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_array_body_is_decode_error() {
        let (base_url, server) = serve_once("200 OK", r#"{"not":"array"}"#).await;

        let err = client(&base_url)
            .select(&ProductScope::All.query())
            .await
            .unwrap_err();
        server.await.unwrap();

        assert!(matches!(err, DbError::Decode(_)));
    }
}
