//! Catalog ranking and filtering.
//!
//! Filters run before the sort: category first, then verification. All
//! sorts are stable, so equal keys keep their input order. Price-dependent
//! keys read the already-normalized prices, which means callers must
//! re-normalize (and re-rank) whenever the selected exchange rate changes.

use anyhow::Result;
use std::fmt::Display;
use std::str::FromStr;

use crate::core::catalog::Category;
use crate::core::pricing::NormalizedProduct;
use crate::core::votes::{VoteState, net_score};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    PriceDiff,
    PriceLow,
    PriceHigh,
    Date,
    Votes,
}

impl Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SortKey::Name => "name",
                SortKey::PriceDiff => "price_diff",
                SortKey::PriceLow => "price_low",
                SortKey::PriceHigh => "price_high",
                SortKey::Date => "date",
                SortKey::Votes => "votes",
            }
        )
    }
}

impl FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "price_diff" => Ok(SortKey::PriceDiff),
            "price_low" => Ok(SortKey::PriceLow),
            "price_high" => Ok(SortKey::PriceHigh),
            "date" => Ok(SortKey::Date),
            "votes" => Ok(SortKey::Votes),
            _ => Err(anyhow::anyhow!("Invalid sort key: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// `None` means "all".
    pub category: Option<Category>,
    pub verified_only: bool,
}

/// Collation key for Spanish product names: case- and accent-insensitive,
/// with ñ ordered as its own letter between n and o.
fn spanish_sort_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    for c in name.chars().flat_map(|c| c.to_lowercase()) {
        match c {
            'á' => key.push('a'),
            'é' => key.push('e'),
            'í' => key.push('i'),
            'ó' => key.push('o'),
            'ú' | 'ü' => key.push('u'),
            // ñ is its own letter between n and o; '\u{7f}' sorts after z.
            'ñ' => key.push_str("n\u{7f}"),
            c => key.push(c),
        }
    }
    key
}

/// Filters the catalog, then stable-sorts it by `sort_key`.
///
/// Under `price_diff`, products without a defined USA comparison rank last,
/// keeping their input order among themselves. An empty result is a valid
/// empty list, never an error.
pub fn rank_and_filter(
    products: &[NormalizedProduct],
    filter: &ProductFilter,
    sort_key: SortKey,
    votes: &VoteState,
) -> Vec<NormalizedProduct> {
    let mut filtered: Vec<NormalizedProduct> = products
        .iter()
        .filter(|p| {
            filter
                .category
                .is_none_or(|category| p.product.category == category)
        })
        .filter(|p| !filter.verified_only || p.product.is_verified())
        .cloned()
        .collect();

    match sort_key {
        SortKey::Name => {
            filtered.sort_by_key(|p| spanish_sort_key(&p.product.name));
        }
        SortKey::PriceDiff => {
            filtered.sort_by(|a, b| {
                let a_diff = a.usa_diff().unwrap_or(f64::NEG_INFINITY);
                let b_diff = b.usa_diff().unwrap_or(f64::NEG_INFINITY);
                b_diff.total_cmp(&a_diff)
            });
        }
        SortKey::PriceLow => {
            filtered.sort_by(|a, b| a.price_usd.total_cmp(&b.price_usd));
        }
        SortKey::PriceHigh => {
            filtered.sort_by(|a, b| b.price_usd.total_cmp(&a.price_usd));
        }
        SortKey::Date => {
            filtered.sort_by(|a, b| b.product.last_updated.cmp(&a.product.last_updated));
        }
        SortKey::Votes => {
            filtered.sort_by(|a, b| {
                net_score(&b.product, votes).cmp(&net_score(&a.product, votes))
            });
        }
    }

    filtered
}
