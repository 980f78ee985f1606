//! Core domain logic: catalog model, pricing math, ranking, votes,
//! category aggregation and contribution moderation.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod contrib;
pub mod index;
pub mod log;
pub mod pricing;
pub mod ranking;
pub mod rates;
pub mod votes;

// Re-export main types for cleaner imports
pub use catalog::{
    CatalogProvider, Category, Country, Currency, DataSource, Product, VerificationStatus,
    VoteCount,
};
pub use index::{CategoryIndex, Trend, TrendThresholds, aggregate, general_index};
pub use pricing::{
    ConvertedPrice, NormalizedProduct, PricingError, normalize, normalize_product,
    percent_difference,
};
pub use ranking::{ProductFilter, SortKey, rank_and_filter};
pub use rates::{ExchangeRate, RateProvider, fallback_rates, select_rate};
pub use votes::{VoteDirection, VoteState, net_score};
