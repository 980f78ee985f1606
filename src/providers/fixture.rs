use anyhow::Result;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::BTreeMap;

use crate::core::catalog::{
    CatalogProvider, Category, Country, Currency, DataSource, Product, VerificationStatus,
    VoteCount,
};

/// Built-in sample catalog, used when no remote backend is configured.
/// Keeps the dashboard usable offline and doubles as demo data.
pub struct FixtureCatalog;

impl FixtureCatalog {
    pub fn new() -> Self {
        FixtureCatalog
    }
}

impl Default for FixtureCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogProvider for FixtureCatalog {
    async fn fetch_products(&self) -> Result<Vec<Product>> {
        Ok(sample_products())
    }
}

struct SampleProduct {
    id: u64,
    name: &'static str,
    brand: Option<&'static str>,
    native_price: f64,
    native_currency: Currency,
    references: &'static [(Country, f64)],
    category: Category,
    votes: (u32, u32),
    date: (i32, u32, u32),
    data_source: DataSource,
    verification_status: Option<VerificationStatus>,
}

const SAMPLES: &[SampleProduct] = &[
    SampleProduct {
        id: 1,
        name: "iPhone 15 Pro",
        brand: Some("Apple"),
        native_price: 3_900_000.0,
        native_currency: Currency::Ars,
        references: &[
            (Country::Usa, 1500.0),
            (Country::Chile, 1275.0),
            (Country::Europe, 1725.0),
        ],
        category: Category::Tech,
        votes: (42, 5),
        date: (2024, 4, 15),
        data_source: DataSource::Scraped,
        verification_status: None,
    },
    SampleProduct {
        id: 2,
        name: "Nike Air Max",
        brand: Some("Nike"),
        native_price: 250_000.0,
        native_currency: Currency::Ars,
        references: &[(Country::Usa, 180.0), (Country::Brazil, 135.0)],
        category: Category::Fashion,
        votes: (18, 2),
        date: (2024, 4, 12),
        data_source: DataSource::Manual,
        verification_status: None,
    },
    SampleProduct {
        id: 3,
        name: "Café Starbucks 250g",
        brand: Some("Starbucks"),
        native_price: 15_000.0,
        native_currency: Currency::Ars,
        references: &[(Country::Usa, 18.0), (Country::Chile, 15.3)],
        category: Category::Food,
        votes: (9, 1),
        date: (2024, 4, 14),
        data_source: DataSource::Manual,
        verification_status: None,
    },
    SampleProduct {
        id: 4,
        name: "MacBook Air M2",
        brand: Some("Apple"),
        native_price: 4_500_000.0,
        native_currency: Currency::Ars,
        references: &[(Country::Usa, 1299.0), (Country::Europe, 1494.0)],
        category: Category::Tech,
        votes: (31, 4),
        date: (2024, 4, 10),
        data_source: DataSource::Scraped,
        verification_status: None,
    },
    SampleProduct {
        id: 5,
        name: "Jean Levi's 501",
        brand: Some("Levi's"),
        native_price: 120.0,
        native_currency: Currency::Usd,
        references: &[(Country::Usa, 69.5)],
        category: Category::Fashion,
        votes: (7, 3),
        date: (2024, 4, 18),
        data_source: DataSource::UserContributed,
        verification_status: Some(VerificationStatus::Approved),
    },
    SampleProduct {
        id: 6,
        name: "PlayStation 5",
        brand: Some("Sony"),
        native_price: 850.0,
        native_currency: Currency::Usd,
        references: &[(Country::Usa, 499.0), (Country::Brazil, 560.0)],
        category: Category::Tech,
        votes: (3, 0),
        date: (2024, 4, 20),
        data_source: DataSource::UserContributed,
        verification_status: Some(VerificationStatus::Pending),
    },
];

pub fn sample_products() -> Vec<Product> {
    SAMPLES
        .iter()
        .map(|sample| {
            let (year, month, day) = sample.date;
            Product {
                id: sample.id,
                name: sample.name.to_string(),
                brand: sample.brand.map(str::to_string),
                native_price: sample.native_price,
                native_currency: sample.native_currency,
                reference_prices: sample
                    .references
                    .iter()
                    .copied()
                    .collect::<BTreeMap<Country, f64>>(),
                category: sample.category,
                votes: VoteCount {
                    up: sample.votes.0,
                    down: sample.votes.1,
                },
                last_updated: Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap(),
                data_source: sample.data_source,
                verification_status: sample.verification_status,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixture_catalog_is_well_formed() {
        let products = FixtureCatalog::new().fetch_products().await.unwrap();

        assert!(!products.is_empty());
        for product in &products {
            assert!(product.native_price >= 0.0);
            assert!(product.reference_prices.values().all(|p| *p >= 0.0));
            assert!(
                product.reference_prices.contains_key(&Country::Usa),
                "{} lacks a USA reference",
                product.name
            );
        }

        // Ids are unique; the vote state keys on them.
        let mut ids: Vec<u64> = products.iter().map(|p| p.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), products.len());
    }

    #[tokio::test]
    async fn test_fixture_covers_verification_states() {
        let products = FixtureCatalog::new().fetch_products().await.unwrap();
        assert!(products.iter().any(|p| p.is_verified()));
        assert!(products.iter().any(|p| !p.is_verified()));
    }
}
