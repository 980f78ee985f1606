//! Product catalog types and fetch abstractions

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

/// A reference country whose USD price is compared against Argentina.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Country {
    Usa,
    Chile,
    Brazil,
    Europe,
}

impl Display for Country {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Country::Usa => "EE.UU.",
                Country::Chile => "Chile",
                Country::Brazil => "Brasil",
                Country::Europe => "Europa",
            }
        )
    }
}

/// Currency a product's Argentina price is recorded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "ARS")]
    Ars,
    #[serde(rename = "USD")]
    Usd,
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Currency::Ars => "ARS",
                Currency::Usd => "USD",
            }
        )
    }
}

impl FromStr for Currency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ARS" => Ok(Currency::Ars),
            "USD" => Ok(Currency::Usd),
            _ => Err(anyhow::anyhow!("Invalid currency: {}", s)),
        }
    }
}

/// Closed category set for the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Tech,
    Food,
    Fashion,
    Home,
    Cars,
    Other,
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Category::Tech => "Tecnología",
                Category::Food => "Gastronomía",
                Category::Fashion => "Moda",
                Category::Home => "Hogar",
                Category::Cars => "Autos",
                Category::Other => "Otros",
            }
        )
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tech" => Ok(Category::Tech),
            "food" => Ok(Category::Food),
            "fashion" => Ok(Category::Fashion),
            "home" => Ok(Category::Home),
            "cars" => Ok(Category::Cars),
            "other" => Ok(Category::Other),
            _ => Err(anyhow::anyhow!("Invalid category: {}", s)),
        }
    }
}

/// How a product's price entered the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Scraped,
    Manual,
    UserContributed,
    Verified,
}

/// Moderation state of a user-contributed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
}

/// Server-known community vote counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCount {
    #[serde(default)]
    pub up: u32,
    #[serde(default)]
    pub down: u32,
}

/// A catalog entry: the Argentina price in its native currency plus the USD
/// prices of the reference countries it is compared against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    pub native_price: f64,
    pub native_currency: Currency,
    /// USD prices per reference country. Sparse: only the countries a
    /// product was actually surveyed in appear here.
    #[serde(default)]
    pub reference_prices: BTreeMap<Country, f64>,
    pub category: Category,
    #[serde(default)]
    pub votes: VoteCount,
    pub last_updated: DateTime<Utc>,
    pub data_source: DataSource,
    #[serde(default)]
    pub verification_status: Option<VerificationStatus>,
}

impl Product {
    /// Whether the product passes the "solo verificados" filter: trusted
    /// sources count as verified, as does an approved moderation status.
    pub fn is_verified(&self) -> bool {
        matches!(self.data_source, DataSource::Verified | DataSource::Scraped)
            || self.verification_status == Some(VerificationStatus::Approved)
    }
}

#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn fetch_products(&self) -> Result<Vec<Product>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn product(source: DataSource, status: Option<VerificationStatus>) -> Product {
        Product {
            id: 1,
            name: "Test".to_string(),
            brand: None,
            native_price: 100.0,
            native_currency: Currency::Usd,
            reference_prices: BTreeMap::new(),
            category: Category::Other,
            votes: VoteCount::default(),
            last_updated: Utc.with_ymd_and_hms(2024, 4, 15, 0, 0, 0).unwrap(),
            data_source: source,
            verification_status: status,
        }
    }

    #[test]
    fn test_verified_predicate() {
        assert!(product(DataSource::Verified, None).is_verified());
        assert!(product(DataSource::Scraped, None).is_verified());
        assert!(!product(DataSource::Manual, None).is_verified());
        assert!(
            !product(
                DataSource::UserContributed,
                Some(VerificationStatus::Pending)
            )
            .is_verified()
        );
        assert!(
            product(
                DataSource::UserContributed,
                Some(VerificationStatus::Approved)
            )
            .is_verified()
        );
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("tech".parse::<Category>().unwrap(), Category::Tech);
        assert_eq!("FOOD".parse::<Category>().unwrap(), Category::Food);
        assert!("electronics".parse::<Category>().is_err());
    }

    #[test]
    fn test_product_deserialization() {
        let yaml_str = r#"
id: 7
name: "iPhone 15 Pro"
native_price: 3900000
native_currency: "ARS"
reference_prices:
  usa: 1500.0
  chile: 1275.0
category: tech
votes:
  up: 12
  down: 3
last_updated: "2024-04-15T00:00:00Z"
data_source: scraped
"#;
        let product: Product = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(product.name, "iPhone 15 Pro");
        assert_eq!(product.native_currency, Currency::Ars);
        assert_eq!(product.reference_prices.get(&Country::Usa), Some(&1500.0));
        assert_eq!(product.reference_prices.len(), 2);
        assert_eq!(product.votes.up, 12);
        assert_eq!(product.verification_status, None);
        assert!(product.is_verified());
    }
}
