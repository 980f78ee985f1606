//! User contributions and their moderation lifecycle.
//!
//! A contribution is a candidate product reported by the community. It is
//! validated on intake, sits in a pending queue, and only enters the catalog
//! once approved. The queue file is a plain YAML list; durable storage is a
//! concern of the hosting backend, not of this module.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::core::catalog::{
    Category, Country, Currency, DataSource, Product, VerificationStatus, VoteCount,
};

#[derive(Debug, Error, PartialEq)]
pub enum ContributionError {
    #[error("product name is required")]
    MissingName,
    #[error("prices must be strictly positive")]
    NonPositivePrice,
    #[error("source URL is required")]
    MissingSourceUrl,
    #[error("contributor name is required")]
    MissingContributor,
    #[error("contribution has already been reviewed")]
    NotPending,
}

/// A candidate product awaiting moderation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub id: u64,
    pub product_name: String,
    #[serde(default)]
    pub brand: Option<String>,
    pub price_argentina: f64,
    pub price_argentina_currency: Currency,
    pub price_usa: f64,
    pub category: Category,
    pub source_url: String,
    pub contributor_name: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub status: VerificationStatus,
    pub created_at: DateTime<Utc>,
}

impl Contribution {
    /// Intake validation: the same required fields the contribution form
    /// enforces, plus the catalog invariants on prices.
    pub fn validate(&self) -> Result<(), ContributionError> {
        if self.product_name.trim().is_empty() {
            return Err(ContributionError::MissingName);
        }
        if self.price_argentina <= 0.0 || self.price_usa <= 0.0 {
            return Err(ContributionError::NonPositivePrice);
        }
        if self.source_url.trim().is_empty() {
            return Err(ContributionError::MissingSourceUrl);
        }
        if self.contributor_name.trim().is_empty() {
            return Err(ContributionError::MissingContributor);
        }
        Ok(())
    }

    pub fn approve(&mut self) -> Result<(), ContributionError> {
        if self.status != VerificationStatus::Pending {
            return Err(ContributionError::NotPending);
        }
        self.status = VerificationStatus::Approved;
        Ok(())
    }

    pub fn reject(&mut self) -> Result<(), ContributionError> {
        if self.status != VerificationStatus::Pending {
            return Err(ContributionError::NotPending);
        }
        self.status = VerificationStatus::Rejected;
        Ok(())
    }

    /// Turns an approved contribution into a catalog entry.
    pub fn into_product(self) -> Product {
        let mut reference_prices = BTreeMap::new();
        reference_prices.insert(Country::Usa, self.price_usa);
        Product {
            id: self.id,
            name: self.product_name,
            brand: self.brand,
            native_price: self.price_argentina,
            native_currency: self.price_argentina_currency,
            reference_prices,
            category: self.category,
            votes: VoteCount::default(),
            last_updated: self.created_at,
            data_source: DataSource::UserContributed,
            verification_status: Some(self.status),
        }
    }
}

/// The moderation queue, stored as a YAML document.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionQueue {
    #[serde(default)]
    pub contributions: Vec<Contribution>,
}

impl ContributionQueue {
    /// Loads the queue; a missing file is an empty queue, not an error.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(ContributionQueue::default());
        }
        let queue_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read contributions file: {}", path.display()))?;
        let queue: Self = serde_yaml::from_str(&queue_str)
            .with_context(|| format!("Failed to parse contributions file: {}", path.display()))?;
        Ok(queue)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let queue_str = serde_yaml::to_string(self)?;
        fs::write(path, queue_str)
            .with_context(|| format!("Failed to write contributions file: {}", path.display()))?;
        Ok(())
    }

    pub fn next_id(&self) -> u64 {
        self.contributions.iter().map(|c| c.id).max().unwrap_or(0) + 1
    }

    pub fn find_mut(&mut self, id: u64) -> Option<&mut Contribution> {
        self.contributions.iter_mut().find(|c| c.id == id)
    }

    pub fn pending(&self) -> impl Iterator<Item = &Contribution> {
        self.contributions
            .iter()
            .filter(|c| c.status == VerificationStatus::Pending)
    }
}
