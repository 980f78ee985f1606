use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::core::cache::Cache;
use crate::core::catalog::{
    CatalogProvider, Category, Country, Currency, DataSource, Product, VerificationStatus,
    VoteCount,
};
use crate::providers::util::with_retry;

const PRODUCTS_CACHE_KEY: &str = "productos";

/// Catalog backend reading the `productos_ultimos_precios` REST view.
pub struct SupabaseCatalog {
    base_url: String,
    api_key: String,
    cache: Arc<Cache<String, Vec<Product>>>,
}

impl SupabaseCatalog {
    pub fn new(base_url: &str, api_key: &str, cache: Arc<Cache<String, Vec<Product>>>) -> Self {
        SupabaseCatalog {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            cache,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawCountryPrice {
    value: f64,
    #[serde(default)]
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPriceData {
    #[serde(rename = "AR")]
    ar: RawCountryPrice,
    #[serde(rename = "US")]
    us: Option<RawCountryPrice>,
    #[serde(rename = "CL")]
    cl: Option<RawCountryPrice>,
    #[serde(rename = "BR")]
    br: Option<RawCountryPrice>,
    #[serde(rename = "EU")]
    eu: Option<RawCountryPrice>,
}

#[derive(Debug, Deserialize)]
struct RawProduct {
    product_id: u64,
    product_name: String,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    category_id: Option<String>,
    created_at: DateTime<Utc>,
    data: RawPriceData,
    #[serde(default)]
    data_source: Option<DataSource>,
    #[serde(default)]
    verification_status: Option<VerificationStatus>,
    #[serde(default)]
    votes_up: u32,
    #[serde(default)]
    votes_down: u32,
}

/// Ingestion-boundary adapter: older view revisions drifted on field names
/// and casing, so everything raw is mapped here and nowhere else.
fn map_raw_product(raw: RawProduct) -> Product {
    let native_currency = match raw.data.ar.currency.as_deref() {
        Some("USD") => Currency::Usd,
        _ => Currency::Ars,
    };

    let mut reference_prices = BTreeMap::new();
    for (country, price) in [
        (Country::Usa, &raw.data.us),
        (Country::Chile, &raw.data.cl),
        (Country::Brazil, &raw.data.br),
        (Country::Europe, &raw.data.eu),
    ] {
        if let Some(price) = price {
            reference_prices.insert(country, price.value);
        }
    }

    let category = raw
        .category_id
        .as_deref()
        .and_then(|id| id.parse::<Category>().ok())
        .unwrap_or(Category::Other);

    Product {
        id: raw.product_id,
        name: raw.product_name,
        brand: raw.brand,
        native_price: raw.data.ar.value,
        native_currency,
        reference_prices,
        category,
        votes: VoteCount {
            up: raw.votes_up,
            down: raw.votes_down,
        },
        last_updated: raw.created_at,
        data_source: raw.data_source.unwrap_or(DataSource::Manual),
        verification_status: raw.verification_status,
    }
}

#[async_trait]
impl CatalogProvider for SupabaseCatalog {
    async fn fetch_products(&self) -> Result<Vec<Product>> {
        if let Some(cached) = self.cache.get(&PRODUCTS_CACHE_KEY.to_string()).await {
            return Ok(cached);
        }

        let url = format!("{}/rest/v1/productos_ultimos_precios", self.base_url);
        debug!("Requesting product catalog from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("carodolar/1.0")
            .build()?;
        let response = with_retry(
            || async {
                client
                    .get(&url)
                    .header("apikey", self.api_key.as_str())
                    .header("Authorization", format!("Bearer {}", self.api_key))
                    .send()
                    .await
            },
            3,
            500,
        )
        .await
        .context("Failed to fetch product catalog")?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} fetching product catalog",
                response.status()
            ));
        }

        let response_text = response
            .text()
            .await
            .context("Failed to read product catalog response")?;

        if response_text.trim().is_empty() {
            return Err(anyhow!("Received empty product catalog response"));
        }

        let raw_products: Vec<RawProduct> = serde_json::from_str(&response_text)
            .with_context(|| {
                format!("Failed to parse product catalog response: '{response_text}'")
            })?;

        let products: Vec<Product> = raw_products.into_iter().map(map_raw_product).collect();
        debug!("Fetched {} products", products.len());

        self.cache
            .put(PRODUCTS_CACHE_KEY.to_string(), products.clone())
            .await;

        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SAMPLE_ROW: &str = r#"{
        "product_id": 1,
        "product_name": "iPhone 15 Pro",
        "brand": "Apple",
        "category_id": "tech",
        "created_at": "2024-04-15T00:00:00Z",
        "data": {
            "AR": {"value": 3900000, "currency": "ARS"},
            "US": {"value": 1500},
            "CL": {"value": 1275}
        },
        "data_source": "scraped",
        "votes_up": 12,
        "votes_down": 3
    }"#;

    #[test]
    fn test_raw_product_mapping() {
        let raw: RawProduct = serde_json::from_str(SAMPLE_ROW).unwrap();
        let product = map_raw_product(raw);

        assert_eq!(product.id, 1);
        assert_eq!(product.name, "iPhone 15 Pro");
        assert_eq!(product.brand.as_deref(), Some("Apple"));
        assert_eq!(product.native_price, 3_900_000.0);
        assert_eq!(product.native_currency, Currency::Ars);
        assert_eq!(product.category, Category::Tech);
        assert_eq!(product.reference_prices.get(&Country::Usa), Some(&1500.0));
        assert_eq!(product.reference_prices.get(&Country::Chile), Some(&1275.0));
        assert_eq!(product.reference_prices.get(&Country::Brazil), None);
        assert_eq!(product.votes.up, 12);
        assert_eq!(product.data_source, DataSource::Scraped);
    }

    #[test]
    fn test_unknown_category_maps_to_other() {
        let row = r#"{
            "product_id": 2,
            "product_name": "Misterio",
            "category_id": "electronics",
            "created_at": "2024-04-15T00:00:00Z",
            "data": {"AR": {"value": 10, "currency": "USD"}}
        }"#;
        let raw: RawProduct = serde_json::from_str(row).unwrap();
        let product = map_raw_product(raw);

        assert_eq!(product.category, Category::Other);
        assert_eq!(product.native_currency, Currency::Usd);
        assert!(product.reference_prices.is_empty());
        assert_eq!(product.data_source, DataSource::Manual);
    }

    #[tokio::test]
    async fn test_successful_catalog_fetch_sends_auth_headers() {
        let mock_server = MockServer::start().await;
        let mock_response = format!("[{SAMPLE_ROW}]");

        Mock::given(method("GET"))
            .and(path("/rest/v1/productos_ultimos_precios"))
            .and(header("apikey", "service-key"))
            .and(header("Authorization", "Bearer service-key"))
            .respond_with(ResponseTemplate::new(200).set_body_string(&mock_response))
            .mount(&mock_server)
            .await;

        let cache = Arc::new(Cache::new());
        let provider = SupabaseCatalog::new(&mock_server.uri(), "service-key", cache);
        let products = provider.fetch_products().await.unwrap();

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "iPhone 15 Pro");
    }

    #[tokio::test]
    async fn test_catalog_api_error_response() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/productos_ultimos_precios"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let cache = Arc::new(Cache::new());
        let provider = SupabaseCatalog::new(&mock_server.uri(), "bad-key", cache);
        let result = provider.fetch_products().await;

        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 401 Unauthorized fetching product catalog"
        );
    }

    #[tokio::test]
    async fn test_catalog_api_empty_response() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/productos_ultimos_precios"))
            .respond_with(ResponseTemplate::new(200).set_body_string(""))
            .mount(&mock_server)
            .await;

        let cache = Arc::new(Cache::new());
        let provider = SupabaseCatalog::new(&mock_server.uri(), "service-key", cache);
        let result = provider.fetch_products().await;

        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "Received empty product catalog response"
        );
    }

    #[tokio::test]
    async fn test_catalog_api_malformed_response() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/productos_ultimos_precios"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"rows": []}"#))
            .mount(&mock_server)
            .await;

        let cache = Arc::new(Cache::new());
        let provider = SupabaseCatalog::new(&mock_server.uri(), "service-key", cache);
        let result = provider.fetch_products().await;

        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse product catalog response")
        );
    }
}
