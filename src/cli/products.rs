use super::ui;
use crate::core::catalog::{CatalogProvider, Category};
use crate::core::config::AppConfig;
use crate::core::pricing::NormalizedProduct;
use crate::core::ranking::{ProductFilter, SortKey, rank_and_filter};
use crate::core::rates::{RateProvider, select_rate};
use crate::core::votes::{VoteState, net_score};
use anyhow::{Context, Result, anyhow};
use comfy_table::Cell;

/// Listing options as received from the command line; slugs are parsed
/// here so argument errors surface with context instead of a clap panic.
#[derive(Debug, Clone, Default)]
pub struct ProductListOptions {
    /// Category slug, or "all"/absent for the whole catalog.
    pub category: Option<String>,
    pub verified_only: bool,
    pub sort: String,
    pub rate: Option<String>,
}

pub async fn run(
    config: &AppConfig,
    rate_provider: &(dyn RateProvider + Send + Sync),
    catalog_provider: &(dyn CatalogProvider + Send + Sync),
    options: &ProductListOptions,
) -> Result<()> {
    let category = match options.category.as_deref() {
        None | Some("all") => None,
        Some(slug) => Some(
            slug.parse::<Category>()
                .with_context(|| format!("Unknown category: {slug}"))?,
        ),
    };
    let sort_key = options
        .sort
        .parse::<SortKey>()
        .with_context(|| format!("Unknown sort key: {}", options.sort))?;

    let (rates, products) = futures::join!(
        super::load_rates(rate_provider),
        catalog_provider.fetch_products()
    );
    let rate_id = options.rate.as_deref().unwrap_or(&config.default_rate);
    let rate = select_rate(&rates, rate_id).ok_or_else(|| anyhow!("No exchange rates available"))?;

    let products = products?;
    let normalized = super::dashboard::normalize_all(&products, rate);

    let filter = ProductFilter {
        category,
        verified_only: options.verified_only,
    };
    // Votes are session-scoped; a fresh CLI invocation starts clean.
    let ranked = rank_and_filter(&normalized, &filter, sort_key, &VoteState::new());

    if ranked.is_empty() {
        println!("No hay productos en esta categoría.");
        return Ok(());
    }

    match category {
        Some(category) => println!(
            "{}: {} producto(s), orden: {}\n",
            ui::style_text(&category.to_string(), ui::StyleType::Title),
            ranked.len(),
            sort_key
        ),
        None => println!(
            "{}: {} producto(s), orden: {}\n",
            ui::style_text("Todos los productos", ui::StyleType::Title),
            ranked.len(),
            sort_key
        ),
    }
    print_product_table(&ranked);

    Ok(())
}

pub(crate) fn print_product_table(ranked: &[NormalizedProduct]) {
    let votes = VoteState::new();
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Producto"),
        ui::header_cell("Categoría"),
        ui::header_cell("Argentina"),
        ui::header_cell("USD"),
        ui::header_cell("EE.UU. (USD)"),
        ui::header_cell("Dif. %"),
        ui::header_cell("Votos"),
        ui::header_cell("Actualizado"),
    ]);

    for product in ranked {
        let native = format!(
            "{} {}",
            product.product.native_currency,
            ui::format_money(product.product.native_price)
        );
        let usa_price = product
            .product
            .reference_prices
            .get(&crate::core::catalog::Country::Usa)
            .copied();

        let diff_cell = match product.usa_diff() {
            Some(diff) => ui::diff_cell(diff),
            None => ui::na_cell(false),
        };

        table.add_row(vec![
            Cell::new(&product.product.name),
            Cell::new(product.product.category.to_string()),
            Cell::new(native),
            Cell::new(ui::format_money(product.price_usd)),
            ui::format_optional_cell(usa_price, ui::format_money),
            diff_cell,
            Cell::new(net_score(&product.product, &votes).to_string()),
            Cell::new(product.product.last_updated.format("%d/%m/%Y").to_string()),
        ]);
    }

    println!("{table}");
}
