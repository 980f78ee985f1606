//! Exchange rate quotes and fetch abstractions

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rate id used when the config does not select one.
pub const DEFAULT_RATE_ID: &str = "blue";

/// A named ARS/USD quote (Blue, Oficial, MEP, CCL, Cripto). The sell value
/// drives all normalization; the buy side is informational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub id: String,
    pub name: String,
    pub sell_value: f64,
    #[serde(default)]
    pub buy_value: Option<f64>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ExchangeRate {
    fn fallback(id: &str, name: &str, sell_value: f64) -> Self {
        ExchangeRate {
            id: id.to_string(),
            name: name.to_string(),
            sell_value,
            buy_value: None,
            updated_at: None,
        }
    }
}

/// Static quote table used when the rate provider is unreachable. Stale by
/// construction; callers log a warning before falling back to it.
pub fn fallback_rates() -> Vec<ExchangeRate> {
    vec![
        ExchangeRate::fallback("blue", "Dólar Blue", 1000.0),
        ExchangeRate::fallback("oficial", "Dólar Oficial", 870.0),
        ExchangeRate::fallback("mep", "Dólar MEP", 980.0),
        ExchangeRate::fallback("ccl", "Dólar CCL", 990.0),
        ExchangeRate::fallback("cripto", "Dólar Cripto", 1015.0),
    ]
}

/// Finds the quote with the given id; an unknown id falls back to the first
/// quote of the set. Returns `None` only for an empty set.
pub fn select_rate<'a>(rates: &'a [ExchangeRate], id: &str) -> Option<&'a ExchangeRate> {
    rates.iter().find(|r| r.id == id).or_else(|| rates.first())
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_rates(&self) -> Result<Vec<ExchangeRate>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_table_is_usable() {
        let rates = fallback_rates();
        assert!(!rates.is_empty());
        assert!(rates.iter().all(|r| r.sell_value > 0.0));
        assert!(rates.iter().any(|r| r.id == DEFAULT_RATE_ID));
    }

    #[test]
    fn test_select_known_rate() {
        let rates = fallback_rates();
        let rate = select_rate(&rates, "mep").unwrap();
        assert_eq!(rate.id, "mep");
        assert_eq!(rate.sell_value, 980.0);
    }

    #[test]
    fn test_unknown_rate_falls_back_to_first() {
        let rates = fallback_rates();
        let rate = select_rate(&rates, "turista").unwrap();
        assert_eq!(rate.id, "blue");
    }

    #[test]
    fn test_empty_rate_set() {
        assert!(select_rate(&[], "blue").is_none());
    }
}
