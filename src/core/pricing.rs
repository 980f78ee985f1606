//! Price normalization and comparison.
//!
//! Every product price is expressed in either ARS or USD; the selected
//! exchange rate converts it into both currencies, and the comparison
//! yields a full-precision percentage difference against each reference
//! country. Rounding is a display concern and happens in the CLI layer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::core::catalog::{Country, Currency, Product};
use crate::core::rates::ExchangeRate;

#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    #[error("invalid exchange rate: sell value must be positive, got {0}")]
    InvalidRate(f64),
    #[error("comparison undefined: reference price is zero")]
    UndefinedComparison,
}

/// A product price expressed in both currencies under one exchange rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvertedPrice {
    pub usd: f64,
    pub ars: f64,
}

/// Converts a product's native price into USD and ARS under `rate`.
///
/// The native side is carried through unchanged, so an ARS-priced product
/// keeps its exact ARS value and a USD-priced product keeps its exact USD
/// value.
pub fn normalize(product: &Product, rate: &ExchangeRate) -> Result<ConvertedPrice, PricingError> {
    if rate.sell_value <= 0.0 || !rate.sell_value.is_finite() {
        return Err(PricingError::InvalidRate(rate.sell_value));
    }

    let converted = match product.native_currency {
        Currency::Usd => ConvertedPrice {
            usd: product.native_price,
            ars: product.native_price * rate.sell_value,
        },
        Currency::Ars => ConvertedPrice {
            usd: product.native_price / rate.sell_value,
            ars: product.native_price,
        },
    };
    Ok(converted)
}

/// Percentage difference of `base_usd` against `reference_usd`:
/// `((base - reference) / reference) * 100`.
///
/// A zero reference has no defined difference and is reported as an error
/// rather than a NaN that could leak into output.
pub fn percent_difference(base_usd: f64, reference_usd: f64) -> Result<f64, PricingError> {
    if reference_usd == 0.0 {
        return Err(PricingError::UndefinedComparison);
    }
    Ok(((base_usd - reference_usd) / reference_usd) * 100.0)
}

/// A product with its prices normalized under one exchange rate.
///
/// `percent_diff` holds only the defined comparisons; a reference country
/// with a zero price is absent from the map and excluded from averages.
/// `is_more_expensive` is the strict `> 0` classification against the USA
/// reference: exact equality counts as "cheaper or equal", and so does a
/// missing USA comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedProduct {
    pub product: Product,
    pub price_usd: f64,
    pub price_ars: f64,
    pub percent_diff: BTreeMap<Country, f64>,
    pub is_more_expensive: bool,
}

impl NormalizedProduct {
    /// The headline comparison against the USA reference, when defined.
    pub fn usa_diff(&self) -> Option<f64> {
        self.percent_diff.get(&Country::Usa).copied()
    }
}

/// Normalizes a product and computes its percentage difference against
/// every reference country with a non-zero price.
pub fn normalize_product(
    product: &Product,
    rate: &ExchangeRate,
) -> Result<NormalizedProduct, PricingError> {
    let converted = normalize(product, rate)?;

    let mut percent_diff = BTreeMap::new();
    for (country, reference_usd) in &product.reference_prices {
        if let Ok(diff) = percent_difference(converted.usd, *reference_usd) {
            percent_diff.insert(*country, diff);
        }
    }

    let is_more_expensive = percent_diff
        .get(&Country::Usa)
        .is_some_and(|diff| *diff > 0.0);

    Ok(NormalizedProduct {
        product: product.clone(),
        price_usd: converted.usd,
        price_ars: converted.ars,
        percent_diff,
        is_more_expensive,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{Category, DataSource, VoteCount};
    use chrono::{TimeZone, Utc};

    fn rate(sell_value: f64) -> ExchangeRate {
        ExchangeRate {
            id: "blue".to_string(),
            name: "Dólar Blue".to_string(),
            sell_value,
            buy_value: None,
            updated_at: None,
        }
    }

    fn product(native_price: f64, native_currency: Currency, price_usa: f64) -> Product {
        let mut reference_prices = BTreeMap::new();
        reference_prices.insert(Country::Usa, price_usa);
        Product {
            id: 1,
            name: "Test".to_string(),
            brand: None,
            native_price,
            native_currency,
            reference_prices,
            category: Category::Tech,
            votes: VoteCount::default(),
            last_updated: Utc.with_ymd_and_hms(2024, 4, 15, 0, 0, 0).unwrap(),
            data_source: DataSource::Manual,
            verification_status: None,
        }
    }

    #[test]
    fn test_usd_priced_product() {
        let product = product(1060.0, Currency::Usd, 1000.0);
        let normalized = normalize_product(&product, &rate(1250.0)).unwrap();

        assert_eq!(normalized.price_usd, 1060.0);
        assert_eq!(normalized.price_ars, 1_325_000.0);
        assert_eq!(normalized.usa_diff(), Some(6.0));
        assert!(normalized.is_more_expensive);
    }

    #[test]
    fn test_ars_priced_product() {
        let product = product(199_999.0, Currency::Ars, 115.0);
        let normalized = normalize_product(&product, &rate(1250.0)).unwrap();

        // The ARS side is the identity; no conversion loss.
        assert_eq!(normalized.price_ars, 199_999.0);
        assert!((normalized.price_usd - 159.9992).abs() < 1e-9);
        assert!((normalized.usa_diff().unwrap() - 39.13).abs() < 0.005);
        assert!(normalized.is_more_expensive);
    }

    #[test]
    fn test_inverse_conversion_recovers_usd_price() {
        let product = product(42.5, Currency::Usd, 40.0);
        let converted = normalize(&product, &rate(987.5)).unwrap();
        assert_eq!(converted.ars, 42.5 * 987.5);
        assert!((converted.ars / 987.5 - 42.5).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_rate_rejected() {
        let product = product(100.0, Currency::Ars, 10.0);
        assert_eq!(
            normalize(&product, &rate(0.0)).unwrap_err(),
            PricingError::InvalidRate(0.0)
        );
        assert_eq!(
            normalize(&product, &rate(-870.0)).unwrap_err(),
            PricingError::InvalidRate(-870.0)
        );
    }

    #[test]
    fn test_percent_difference_sign() {
        assert!(percent_difference(120.0, 100.0).unwrap() > 0.0);
        assert!(percent_difference(80.0, 100.0).unwrap() < 0.0);
        assert_eq!(percent_difference(100.0, 100.0).unwrap(), 0.0);
        assert_eq!(
            percent_difference(100.0, 0.0).unwrap_err(),
            PricingError::UndefinedComparison
        );
    }

    #[test]
    fn test_equal_prices_not_more_expensive() {
        let product = product(100.0, Currency::Usd, 100.0);
        let normalized = normalize_product(&product, &rate(1000.0)).unwrap();
        assert_eq!(normalized.usa_diff(), Some(0.0));
        assert!(!normalized.is_more_expensive);
    }

    #[test]
    fn test_zero_reference_excluded() {
        let mut product = product(100.0, Currency::Usd, 0.0);
        product.reference_prices.insert(Country::Chile, 80.0);

        let normalized = normalize_product(&product, &rate(1000.0)).unwrap();
        assert_eq!(normalized.usa_diff(), None);
        assert!(!normalized.is_more_expensive);
        assert_eq!(normalized.percent_diff.get(&Country::Chile), Some(&25.0));
    }

    #[test]
    fn test_rate_switch_changes_normalization() {
        let product = product(1_000_000.0, Currency::Ars, 1000.0);
        let blue = normalize_product(&product, &rate(1000.0)).unwrap();
        let oficial = normalize_product(&product, &rate(800.0)).unwrap();

        assert_eq!(blue.price_usd, 1000.0);
        assert_eq!(oficial.price_usd, 1250.0);
        assert!(!blue.is_more_expensive);
        assert!(oficial.is_more_expensive);
    }
}
