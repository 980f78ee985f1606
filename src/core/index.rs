//! Per-category price indices.
//!
//! Recomputed in full from the current normalized set whenever the catalog
//! or the selected rate changes; catalogs are tens of products, so an O(n)
//! recompute per change beats incremental bookkeeping.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

use crate::core::catalog::Category;
use crate::core::pricing::NormalizedProduct;

/// Percent bounds for the trend classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendThresholds {
    pub up: f64,
    pub down: f64,
}

impl Default for TrendThresholds {
    fn default() -> Self {
        TrendThresholds {
            up: 5.0,
            down: -5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Trend::Up => "sube",
                Trend::Down => "baja",
                Trend::Stable => "estable",
            }
        )
    }
}

impl Trend {
    fn classify(average_percent_diff: f64, thresholds: &TrendThresholds) -> Self {
        if average_percent_diff > thresholds.up {
            Trend::Up
        } else if average_percent_diff < thresholds.down {
            Trend::Down
        } else {
            Trend::Stable
        }
    }
}

/// Aggregate index for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryIndex {
    pub category: Category,
    pub average_percent_diff: f64,
    pub trend: Trend,
    /// Products that contributed to the average (defined USA comparison).
    pub product_count: usize,
}

/// Groups the normalized set by category and averages the USA percentage
/// difference per group.
///
/// Products without a defined USA comparison contribute nothing; a category
/// with no contributing products is omitted entirely rather than reported
/// as a misleading 0%.
pub fn aggregate(
    products: &[NormalizedProduct],
    thresholds: &TrendThresholds,
) -> BTreeMap<Category, CategoryIndex> {
    let mut sums: BTreeMap<Category, (f64, usize)> = BTreeMap::new();
    for product in products {
        if let Some(diff) = product.usa_diff() {
            let entry = sums.entry(product.product.category).or_insert((0.0, 0));
            entry.0 += diff;
            entry.1 += 1;
        }
    }

    sums.into_iter()
        .map(|(category, (sum, count))| {
            let average_percent_diff = sum / count as f64;
            (
                category,
                CategoryIndex {
                    category,
                    average_percent_diff,
                    trend: Trend::classify(average_percent_diff, thresholds),
                    product_count: count,
                },
            )
        })
        .collect()
}

/// The dashboard headline: mean USA percentage difference across the whole
/// catalog, or `None` when no product has a defined comparison.
pub fn general_index(products: &[NormalizedProduct]) -> Option<f64> {
    let diffs: Vec<f64> = products.iter().filter_map(|p| p.usa_diff()).collect();
    if diffs.is_empty() {
        return None;
    }
    Some(diffs.iter().sum::<f64>() / diffs.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{Country, Currency, DataSource, Product, VoteCount};
    use crate::core::pricing::normalize_product;
    use crate::core::rates::fallback_rates;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn normalized(id: u64, category: Category, price_usd: f64, price_usa: Option<f64>) -> NormalizedProduct {
        let mut reference_prices = BTreeMap::new();
        if let Some(price_usa) = price_usa {
            reference_prices.insert(Country::Usa, price_usa);
        }
        let product = Product {
            id,
            name: format!("Producto {id}"),
            brand: None,
            native_price: price_usd,
            native_currency: Currency::Usd,
            reference_prices,
            category,
            votes: VoteCount::default(),
            last_updated: Utc.with_ymd_and_hms(2024, 4, 15, 0, 0, 0).unwrap(),
            data_source: DataSource::Manual,
            verification_status: None,
        };
        let rates = fallback_rates();
        normalize_product(&product, &rates[0]).unwrap()
    }

    #[test]
    fn test_empty_set_yields_empty_map() {
        assert!(aggregate(&[], &TrendThresholds::default()).is_empty());
        assert_eq!(general_index(&[]), None);
    }

    #[test]
    fn test_category_without_comparison_is_omitted() {
        let products = vec![
            normalized(1, Category::Tech, 120.0, Some(100.0)),
            normalized(2, Category::Food, 50.0, None),
        ];

        let indices = aggregate(&products, &TrendThresholds::default());
        assert_eq!(indices.len(), 1);
        assert!(indices.contains_key(&Category::Tech));
        assert!(!indices.contains_key(&Category::Food));
    }

    #[test]
    fn test_average_and_trend_per_category() {
        let products = vec![
            normalized(1, Category::Tech, 120.0, Some(100.0)), // +20%
            normalized(2, Category::Tech, 140.0, Some(100.0)), // +40%
            normalized(3, Category::Food, 85.0, Some(100.0)),  // -15%
            normalized(4, Category::Home, 103.0, Some(100.0)), // +3%
        ];

        let indices = aggregate(&products, &TrendThresholds::default());

        let tech = &indices[&Category::Tech];
        assert!((tech.average_percent_diff - 30.0).abs() < 1e-9);
        assert_eq!(tech.trend, Trend::Up);
        assert_eq!(tech.product_count, 2);

        let food = &indices[&Category::Food];
        assert!((food.average_percent_diff + 15.0).abs() < 1e-9);
        assert_eq!(food.trend, Trend::Down);

        let home = &indices[&Category::Home];
        assert_eq!(home.trend, Trend::Stable);
    }

    #[test]
    fn test_threshold_boundaries_are_strict() {
        let thresholds = TrendThresholds::default();
        assert_eq!(Trend::classify(5.0, &thresholds), Trend::Stable);
        assert_eq!(Trend::classify(5.01, &thresholds), Trend::Up);
        assert_eq!(Trend::classify(-5.0, &thresholds), Trend::Stable);
        assert_eq!(Trend::classify(-5.01, &thresholds), Trend::Down);
    }

    #[test]
    fn test_general_index_skips_undefined() {
        let products = vec![
            normalized(1, Category::Tech, 120.0, Some(100.0)), // +20%
            normalized(2, Category::Food, 90.0, Some(100.0)),  // -10%
            normalized(3, Category::Cars, 999.0, None),
        ];
        let index = general_index(&products).unwrap();
        assert!((index - 5.0).abs() < 1e-9);
    }
}
