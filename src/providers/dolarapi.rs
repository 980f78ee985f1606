use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::core::cache::Cache;
use crate::core::rates::{ExchangeRate, RateProvider};

const RATES_CACHE_KEY: &str = "dolares";

// DolarApiProvider implementation for RateProvider
pub struct DolarApiProvider {
    base_url: String,
    cache: Arc<Cache<String, Vec<ExchangeRate>>>,
}

impl DolarApiProvider {
    pub fn new(base_url: &str, cache: Arc<Cache<String, Vec<ExchangeRate>>>) -> Self {
        DolarApiProvider {
            base_url: base_url.to_string(),
            cache,
        }
    }
}

#[derive(Deserialize, Debug)]
struct DolarApiQuote {
    casa: String,
    nombre: String,
    #[serde(default)]
    compra: Option<f64>,
    venta: f64,
    #[serde(alias = "fechaActualizacion")]
    fecha_actualizacion: Option<DateTime<Utc>>,
}

impl From<DolarApiQuote> for ExchangeRate {
    fn from(quote: DolarApiQuote) -> Self {
        ExchangeRate {
            id: quote.casa,
            name: format!("Dólar {}", quote.nombre),
            sell_value: quote.venta,
            buy_value: quote.compra,
            updated_at: quote.fecha_actualizacion,
        }
    }
}

#[async_trait]
impl RateProvider for DolarApiProvider {
    #[instrument(name = "DolarApiFetch", skip(self))]
    async fn fetch_rates(&self) -> Result<Vec<ExchangeRate>> {
        if let Some(cached) = self.cache.get(&RATES_CACHE_KEY.to_string()).await {
            return Ok(cached);
        }

        let url = format!("{}/v1/dolares", self.base_url);
        debug!("Requesting exchange rates from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("carodolar/1.0")
            .build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for URL: {}", e, url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} fetching exchange rates",
                response.status()
            ));
        }

        let text = response.text().await?;
        let quotes: Vec<DolarApiQuote> = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse exchange rate response: {}", e))?;

        let rates: Vec<ExchangeRate> = quotes
            .into_iter()
            .filter(|q| q.venta > 0.0)
            .map(ExchangeRate::from)
            .collect();

        if rates.is_empty() {
            return Err(anyhow!("No usable exchange rates in response"));
        }

        debug!("Fetched {} exchange rates", rates.len());
        self.cache.put(RATES_CACHE_KEY.to_string(), rates.clone()).await;

        Ok(rates)
    }
}
