use crate::core::catalog::{Category, Currency, VerificationStatus};
use crate::core::config::AppConfig;
use crate::core::contrib::{Contribution, ContributionQueue};
use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

/// Raw form input for a new candidate product.
#[derive(Debug, Clone)]
pub struct ContributeOptions {
    pub name: String,
    pub price_argentina: f64,
    pub currency: String,
    pub price_usa: f64,
    pub category: String,
    pub source_url: String,
    pub contributor: String,
    pub notes: Option<String>,
}

/// Validates a contribution and appends it to the moderation queue.
pub async fn run(config: &AppConfig, options: &ContributeOptions) -> Result<()> {
    let currency = options
        .currency
        .parse::<Currency>()
        .with_context(|| format!("Unknown currency: {}", options.currency))?;
    let category = options
        .category
        .parse::<Category>()
        .with_context(|| format!("Unknown category: {}", options.category))?;

    let queue_path = config.contributions_path()?;
    let mut queue = ContributionQueue::load_from_path(&queue_path)?;

    let contribution = Contribution {
        id: queue.next_id(),
        product_name: options.name.clone(),
        brand: None,
        price_argentina: options.price_argentina,
        price_argentina_currency: currency,
        price_usa: options.price_usa,
        category,
        source_url: options.source_url.clone(),
        contributor_name: options.contributor.clone(),
        notes: options.notes.clone(),
        status: VerificationStatus::Pending,
        created_at: Utc::now(),
    };
    contribution.validate()?;

    let id = contribution.id;
    queue.contributions.push(contribution);
    queue.save_to_path(&queue_path)?;
    info!("Stored contribution {} at {}", id, queue_path.display());

    println!("¡Gracias por tu contribución! Será revisada por la comunidad.");
    println!("Registrada como #{id} en {}", queue_path.display());

    Ok(())
}
