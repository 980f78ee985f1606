pub mod categories;
pub mod contribute;
pub mod dashboard;
pub mod products;
pub mod review;
pub mod ui;

use tracing::warn;

use crate::core::rates::{ExchangeRate, RateProvider, fallback_rates};

/// Fetches the current quotes, falling back to the static table when the
/// provider is unreachable. Never fails: the dashboard must render even
/// with stale rates.
pub(crate) async fn load_rates(provider: &(dyn RateProvider + Send + Sync)) -> Vec<ExchangeRate> {
    match provider.fetch_rates().await {
        Ok(rates) => rates,
        Err(e) => {
            warn!("Exchange rate fetch failed: {e}. Using fallback table");
            fallback_rates()
        }
    }
}
