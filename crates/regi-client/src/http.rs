//! # HTTP Adapters
//!
//! reqwest implementations of [`ProductCatalog`] and [`PurchaseLedger`].
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Remote Endpoints                                │
//! │                                                                         │
//! │  GET {base}/products/{code}                                            │
//! │     200 {name, code, price} ─────► Ok(Some(product))                   │
//! │     200 null ────────────────────► Ok(None)                            │
//! │     404 ─────────────────────────► Ok(None)                            │
//! │     5xx / connect / timeout ─────► retry with backoff, then Err        │
//! │     other status / bad body ─────► Err (no retry)                      │
//! │                                                                         │
//! │  POST {base}/purchase/                                                 │
//! │     200 {success: true, total_price, total_price_ex_tax} ─► Ok(totals) │
//! │     200 {success: false} ────────► Err(Rejected)                       │
//! │     anything else ───────────────► Err (never retried)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use regi_core::{AdapterError, Money, Product, PurchaseRequest, PurchaseTotals};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::adapter::{ProductCatalog, PurchaseLedger};
use crate::config::ServiceSettings;
use crate::error::{ClientError, ClientResult};

// =============================================================================
// Shared Plumbing
// =============================================================================

/// Builds the HTTP client shared by both adapters.
fn build_client(settings: &ServiceSettings) -> ClientResult<Client> {
    Ok(Client::builder()
        .timeout(settings.request_timeout())
        .build()?)
}

/// Parses the base URL and checks it can have path segments appended.
fn parse_base(settings: &ServiceSettings) -> ClientResult<Url> {
    let base = settings.base_url()?;
    if base.cannot_be_a_base() {
        return Err(ClientError::InvalidUrl(format!(
            "Service URL cannot carry a path: {base}"
        )));
    }
    Ok(base)
}

/// Appends percent-encoded path segments to `base`.
fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// Maps a reqwest failure onto the adapter taxonomy.
fn map_request_error(err: reqwest::Error, timeout_secs: u64) -> AdapterError {
    if err.is_timeout() {
        AdapterError::Timeout(timeout_secs)
    } else if err.is_decode() {
        AdapterError::InvalidResponse(err.to_string())
    } else {
        AdapterError::Transport(err.to_string())
    }
}

/// Builds both adapters over one connection pool.
pub fn connect(settings: &ServiceSettings) -> ClientResult<(HttpCatalog, HttpLedger)> {
    let client = build_client(settings)?;
    let base = parse_base(settings)?;

    Ok((
        HttpCatalog::with_client(client.clone(), base.clone(), settings),
        HttpLedger::with_client(client, base, settings),
    ))
}

// =============================================================================
// Catalog
// =============================================================================

/// Product lookups over `GET /products/{code}`.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: Client,
    base: Url,
    timeout_secs: u64,
    lookup_retries: u32,
    initial_backoff: std::time::Duration,
    max_backoff: std::time::Duration,
}

impl HttpCatalog {
    /// Creates a catalog client with its own connection pool.
    pub fn new(settings: &ServiceSettings) -> ClientResult<Self> {
        Ok(Self::with_client(
            build_client(settings)?,
            parse_base(settings)?,
            settings,
        ))
    }

    fn with_client(client: Client, base: Url, settings: &ServiceSettings) -> Self {
        HttpCatalog {
            client,
            base,
            timeout_secs: settings.request_timeout_secs,
            lookup_retries: settings.lookup_retries,
            initial_backoff: settings.initial_backoff(),
            max_backoff: settings.max_backoff(),
        }
    }

    /// The URL a code is looked up at.
    pub fn product_url(&self, code: &str) -> Url {
        endpoint(&self.base, &["products", code])
    }

    async fn fetch_once(&self, url: Url) -> Result<Option<Product>, AdapterError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| map_request_error(e, self.timeout_secs))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AdapterError::Status {
                status: status.as_u16(),
            });
        }

        // The catalog answers `null` for codes it does not know
        let product: Option<Product> = response
            .json()
            .await
            .map_err(|e| map_request_error(e, self.timeout_secs))?;

        if let Some(product) = &product {
            if product.price.is_negative() {
                return Err(AdapterError::InvalidResponse(format!(
                    "negative price {} for product {}",
                    product.price.minor(),
                    product.code
                )));
            }
        }

        Ok(product)
    }

    fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.initial_backoff,
            max_interval: self.max_backoff,
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

impl ProductCatalog for HttpCatalog {
    async fn fetch_product(&self, code: &str) -> Result<Option<Product>, AdapterError> {
        let url = self.product_url(code);
        let mut backoff = self.create_backoff();
        let mut retry_count = 0u32;

        loop {
            match self.fetch_once(url.clone()).await {
                Err(err) if err.is_transient() && retry_count < self.lookup_retries => {
                    retry_count += 1;
                    let Some(delay) = backoff.next_backoff() else {
                        return Err(err);
                    };
                    warn!(
                        code,
                        attempt = retry_count,
                        ?delay,
                        error = %err,
                        "Catalog lookup failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                result => {
                    debug!(code, retries = retry_count, found = ?result.as_ref().map(Option::is_some), "Catalog lookup finished");
                    return result;
                }
            }
        }
    }
}

// =============================================================================
// Ledger
// =============================================================================

/// Body of a `POST /purchase/` answer. A refusal may omit the totals.
#[derive(Debug, Deserialize)]
struct PurchaseResponse {
    success: bool,
    #[serde(default)]
    total_price: Option<Money>,
    #[serde(default)]
    total_price_ex_tax: Option<Money>,
    #[serde(default)]
    message: Option<String>,
}

impl PurchaseResponse {
    fn into_totals(self) -> Result<PurchaseTotals, AdapterError> {
        if !self.success {
            return Err(AdapterError::Rejected(
                self.message
                    .unwrap_or_else(|| "ledger declined the purchase".to_string()),
            ));
        }

        let (Some(total), Some(total_ex_tax)) = (self.total_price, self.total_price_ex_tax) else {
            return Err(AdapterError::InvalidResponse(
                "accepted purchase without totals".to_string(),
            ));
        };
        if total.is_negative() || total_ex_tax.is_negative() {
            return Err(AdapterError::InvalidResponse(format!(
                "negative totals {} / {}",
                total.minor(),
                total_ex_tax.minor()
            )));
        }

        Ok(PurchaseTotals::new(total, total_ex_tax))
    }
}

/// Purchase submission over `POST /purchase/`.
#[derive(Debug, Clone)]
pub struct HttpLedger {
    client: Client,
    base: Url,
    timeout_secs: u64,
}

impl HttpLedger {
    /// Creates a ledger client with its own connection pool.
    pub fn new(settings: &ServiceSettings) -> ClientResult<Self> {
        Ok(Self::with_client(
            build_client(settings)?,
            parse_base(settings)?,
            settings,
        ))
    }

    fn with_client(client: Client, base: Url, settings: &ServiceSettings) -> Self {
        HttpLedger {
            client,
            base,
            timeout_secs: settings.request_timeout_secs,
        }
    }

    /// The URL purchases are posted to (trailing slash included).
    pub fn purchase_url(&self) -> Url {
        endpoint(&self.base, &["purchase", ""])
    }
}

impl PurchaseLedger for HttpLedger {
    async fn submit_purchase(&self, request: &PurchaseRequest) -> Result<PurchaseTotals, AdapterError> {
        let response = self
            .client
            .post(self.purchase_url())
            .json(request)
            .send()
            .await
            .map_err(|e| map_request_error(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::Status {
                status: status.as_u16(),
            });
        }

        let body: PurchaseResponse = response
            .json()
            .await
            .map_err(|e| map_request_error(e, self.timeout_secs))?;

        body.into_totals()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, State};
    use axum::http::StatusCode as AxumStatus;
    use axum::response::{IntoResponse, Response};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use regi_core::PurchaseLine;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Default)]
    struct Hits {
        flaky: AtomicUsize,
        broken: AtomicUsize,
        purchases: AtomicUsize,
    }

    async fn product(State(hits): State<Arc<Hits>>, Path(code): Path<String>) -> Response {
        match code.as_str() {
            "A1" => Json(json!({"name": "Tea", "code": "A1", "price": 150})).into_response(),
            "4901234567890" => Json(json!({"name": "お茶", "code": 4901234567890u64, "price": 165}))
                .into_response(),
            "green tea" => Json(json!({"name": code, "code": code, "price": 130})).into_response(),
            "NULL" => Json(serde_json::Value::Null).into_response(),
            "NEG" => Json(json!({"name": "Refund", "code": "NEG", "price": -10})).into_response(),
            "GARBAGE" => (AxumStatus::OK, "<html>").into_response(),
            "BAD" => AxumStatus::BAD_REQUEST.into_response(),
            "SLOW" => {
                tokio::time::sleep(Duration::from_millis(1500)).await;
                Json(json!({"name": "Slow", "code": "SLOW", "price": 1})).into_response()
            }
            "BROKEN" => {
                hits.broken.fetch_add(1, Ordering::SeqCst);
                AxumStatus::INTERNAL_SERVER_ERROR.into_response()
            }
            "FLAKY" => {
                if hits.flaky.fetch_add(1, Ordering::SeqCst) == 0 {
                    AxumStatus::SERVICE_UNAVAILABLE.into_response()
                } else {
                    Json(json!({"name": "Flaky", "code": "FLAKY", "price": 99})).into_response()
                }
            }
            _ => AxumStatus::NOT_FOUND.into_response(),
        }
    }

    async fn purchase(State(hits): State<Arc<Hits>>, Json(req): Json<PurchaseRequest>) -> Response {
        hits.purchases.fetch_add(1, Ordering::SeqCst);

        if req.emp_code == "FAIL" {
            return AxumStatus::INTERNAL_SERVER_ERROR.into_response();
        }
        if req.products.is_empty() {
            return Json(json!({
                "success": false,
                "total_price": 0,
                "total_price_ex_tax": 0,
                "message": "no products"
            }))
            .into_response();
        }
        match req.pos_no.as_str() {
            "CLOSED" => {
                return Json(json!({"success": false, "message": "register closed"})).into_response()
            }
            "NOTOTAL" => return Json(json!({"success": true})).into_response(),
            "REFUND" => {
                return Json(json!({
                    "success": true,
                    "total_price": -165,
                    "total_price_ex_tax": -150
                }))
                .into_response()
            }
            _ => {}
        }

        let ex_tax: i64 = req.products.iter().map(|l| 150 * l.quantity as i64).sum();
        Json(json!({
            "success": true,
            "total_price": ex_tax * 11 / 10,
            "total_price_ex_tax": ex_tax
        }))
        .into_response()
    }

    async fn serve() -> (ServiceSettings, Arc<Hits>) {
        let hits = Arc::new(Hits::default());
        let router = Router::new()
            .route("/products/{code}", get(product))
            .route("/purchase/", post(purchase))
            .with_state(hits.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let settings = ServiceSettings {
            base_url: format!("http://{addr}"),
            request_timeout_secs: 1,
            lookup_retries: 2,
            initial_backoff_ms: 1,
            max_backoff_ms: 5,
        };
        (settings, hits)
    }

    fn request(emp_code: &str, products: Vec<PurchaseLine>) -> PurchaseRequest {
        PurchaseRequest {
            emp_code: emp_code.to_string(),
            store_code: "30".to_string(),
            pos_no: "90".to_string(),
            products,
        }
    }

    fn tea_line() -> PurchaseLine {
        PurchaseLine {
            code: "A1".to_string(),
            quantity: 1,
        }
    }

    #[test]
    fn test_endpoint_urls() {
        let settings = ServiceSettings {
            base_url: "http://pos.local:8000/api/".to_string(),
            ..Default::default()
        };
        let (catalog, ledger) = connect(&settings).unwrap();

        assert_eq!(
            catalog.product_url("A 1/2").as_str(),
            "http://pos.local:8000/api/products/A%201%2F2"
        );
        assert_eq!(
            ledger.purchase_url().as_str(),
            "http://pos.local:8000/api/purchase/"
        );
    }

    #[test]
    fn test_rejects_unusable_base_url() {
        let settings = ServiceSettings {
            base_url: "mailto:pos@example.com".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            HttpCatalog::new(&settings),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_found_product() {
        let (settings, _) = serve().await;
        let catalog = HttpCatalog::new(&settings).unwrap();

        let product = catalog.fetch_product("A1").await.unwrap().unwrap();
        assert_eq!(product, Product::new("A1", "Tea", Money::from_minor(150)));

        let product = catalog.fetch_product("4901234567890").await.unwrap().unwrap();
        assert_eq!(product.code, "4901234567890");

        let product = catalog.fetch_product("green tea").await.unwrap().unwrap();
        assert_eq!(product.name, "green tea");
    }

    #[tokio::test]
    async fn test_fetch_not_found() {
        let (settings, _) = serve().await;
        let catalog = HttpCatalog::new(&settings).unwrap();

        assert_eq!(catalog.fetch_product("NULL").await.unwrap(), None);
        assert_eq!(catalog.fetch_product("ZZ9").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_fetch_invalid_responses() {
        let (settings, _) = serve().await;
        let catalog = HttpCatalog::new(&settings).unwrap();

        assert!(matches!(
            catalog.fetch_product("GARBAGE").await,
            Err(AdapterError::InvalidResponse(_))
        ));
        assert!(matches!(
            catalog.fetch_product("NEG").await,
            Err(AdapterError::InvalidResponse(_))
        ));
        assert_eq!(
            catalog.fetch_product("BAD").await,
            Err(AdapterError::Status { status: 400 })
        );
    }

    #[tokio::test]
    async fn test_fetch_retries_transient_failures() {
        let (settings, hits) = serve().await;
        let catalog = HttpCatalog::new(&settings).unwrap();

        let product = catalog.fetch_product("FLAKY").await.unwrap().unwrap();
        assert_eq!(product.code, "FLAKY");
        assert_eq!(hits.flaky.load(Ordering::SeqCst), 2);

        assert_eq!(
            catalog.fetch_product("BROKEN").await,
            Err(AdapterError::Status { status: 500 })
        );
        assert_eq!(hits.broken.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let (mut settings, _) = serve().await;
        settings.lookup_retries = 0;
        let catalog = HttpCatalog::new(&settings).unwrap();

        assert_eq!(
            catalog.fetch_product("SLOW").await,
            Err(AdapterError::Timeout(1))
        );
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let settings = ServiceSettings {
            base_url: format!("http://{addr}"),
            lookup_retries: 0,
            ..Default::default()
        };
        let catalog = HttpCatalog::new(&settings).unwrap();

        assert!(matches!(
            catalog.fetch_product("A1").await,
            Err(AdapterError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_submit_purchase() {
        let (settings, _) = serve().await;
        let ledger = HttpLedger::new(&settings).unwrap();

        let totals = ledger
            .submit_purchase(&request(
                "9999999999",
                vec![PurchaseLine {
                    code: "A1".to_string(),
                    quantity: 5,
                }],
            ))
            .await
            .unwrap();

        assert_eq!(totals.total_inclusive_tax, Money::from_minor(825));
        assert_eq!(totals.total_exclusive_tax, Money::from_minor(750));
    }

    #[tokio::test]
    async fn test_submit_rejected() {
        let (settings, _) = serve().await;
        let ledger = HttpLedger::new(&settings).unwrap();

        assert_eq!(
            ledger.submit_purchase(&request("9999999999", vec![])).await,
            Err(AdapterError::Rejected("no products".to_string()))
        );
    }

    #[tokio::test]
    async fn test_submit_refusal_without_totals() {
        let (settings, _) = serve().await;
        let ledger = HttpLedger::new(&settings).unwrap();

        let mut req = request("9999999999", vec![tea_line()]);
        req.pos_no = "CLOSED".to_string();
        assert_eq!(
            ledger.submit_purchase(&req).await,
            Err(AdapterError::Rejected("register closed".to_string()))
        );

        req.pos_no = "NOTOTAL".to_string();
        assert!(matches!(
            ledger.submit_purchase(&req).await,
            Err(AdapterError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_submit_negative_totals() {
        let (settings, _) = serve().await;
        let ledger = HttpLedger::new(&settings).unwrap();

        let mut req = request("9999999999", vec![tea_line()]);
        req.pos_no = "REFUND".to_string();
        assert!(matches!(
            ledger.submit_purchase(&req).await,
            Err(AdapterError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_submit_is_never_retried() {
        let (settings, hits) = serve().await;
        let ledger = HttpLedger::new(&settings).unwrap();

        let line = PurchaseLine {
            code: "A1".to_string(),
            quantity: 1,
        };
        assert_eq!(
            ledger.submit_purchase(&request("FAIL", vec![line])).await,
            Err(AdapterError::Status { status: 500 })
        );
        assert_eq!(hits.purchases.load(Ordering::SeqCst), 1);
    }
}
