use super::ui;
use crate::core::catalog::CatalogProvider;
use crate::core::config::AppConfig;
use crate::core::pricing::{NormalizedProduct, normalize_product};
use crate::core::ranking::{ProductFilter, SortKey, rank_and_filter};
use crate::core::rates::{ExchangeRate, RateProvider, select_rate};
use crate::core::votes::VoteState;
use crate::core::{aggregate, general_index};
use anyhow::{Result, anyhow};
use comfy_table::Cell;
use console::style;
use tracing::warn;

/// Renders the main dashboard: the headline relative-value index, the
/// per-category indices and the catalog ranked by price difference.
pub async fn run(
    config: &AppConfig,
    rate_provider: &(dyn RateProvider + Send + Sync),
    catalog_provider: &(dyn CatalogProvider + Send + Sync),
    rate_override: Option<&str>,
) -> Result<()> {
    let (rates, products) = futures::join!(
        super::load_rates(rate_provider),
        catalog_provider.fetch_products()
    );
    let rate_id = rate_override.unwrap_or(&config.default_rate);
    let rate = select_rate(&rates, rate_id).ok_or_else(|| anyhow!("No exchange rates available"))?;

    let products = products?;
    if products.is_empty() {
        println!("No hay productos en el catálogo.");
        return Ok(());
    }

    let normalized = normalize_all(&products, rate);

    println!(
        "{}\n",
        ui::style_text("¿Argentina está cara en dólares?", ui::StyleType::Title)
    );
    print_headline(&normalized);
    print_rate_line(rate);

    let indices = aggregate(&normalized, &config.trend);
    if !indices.is_empty() {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Categoría"),
            ui::header_cell("Productos"),
            ui::header_cell("Dif. promedio"),
            ui::header_cell("Tendencia"),
        ]);
        for index in indices.values() {
            table.add_row(vec![
                Cell::new(index.category.to_string()),
                Cell::new(index.product_count.to_string()),
                ui::diff_cell(index.average_percent_diff),
                Cell::new(index.trend.to_string()),
            ]);
        }
        println!("{table}");
    }

    ui::print_separator();

    let ranked = rank_and_filter(
        &normalized,
        &ProductFilter::default(),
        SortKey::PriceDiff,
        &VoteState::new(),
    );
    super::products::print_product_table(&ranked);

    Ok(())
}

/// Normalizes the whole catalog under one rate, dropping any product the
/// normalizer rejects. After the fallback table kicks in the rate is always
/// positive, so drops here point at malformed catalog rows.
pub(crate) fn normalize_all(
    products: &[crate::core::catalog::Product],
    rate: &ExchangeRate,
) -> Vec<NormalizedProduct> {
    let pb = ui::new_progress_bar(products.len() as u64, true);
    pb.set_message("Normalizando precios...");

    let normalized = products
        .iter()
        .filter_map(|product| {
            let result = normalize_product(product, rate);
            pb.inc(1);
            match result {
                Ok(normalized) => Some(normalized),
                Err(e) => {
                    warn!("Skipping product {}: {e}", product.name);
                    None
                }
            }
        })
        .collect();
    pb.finish_and_clear();
    normalized
}

fn print_headline(normalized: &[NormalizedProduct]) {
    match general_index(normalized) {
        Some(index) => {
            let is_more_expensive = index > 0.0;
            let status_text = if is_more_expensive {
                "Argentina está más cara en promedio"
            } else {
                "Argentina está más barata en promedio"
            };
            let style_type = if is_more_expensive {
                ui::StyleType::MoreExpensive
            } else {
                ui::StyleType::Cheaper
            };
            println!(
                "Índice de Valor Relativo: {}  {}",
                ui::style_text(&format!("{index:+.2}%"), style_type),
                ui::style_text(status_text, ui::StyleType::Subtle)
            );
        }
        None => {
            println!(
                "{}",
                ui::style_text(
                    "Sin comparaciones definidas contra EE.UU.",
                    ui::StyleType::Subtle
                )
            );
        }
    }
}

fn print_rate_line(rate: &ExchangeRate) {
    let updated = rate
        .updated_at
        .map(|ts| format!(" (actualizado {})", ts.format("%d/%m/%Y %H:%M")))
        .unwrap_or_default();
    let line = format!(
        "Cotización: {} | venta ARS {}{}",
        rate.name,
        ui::format_money(rate.sell_value),
        updated
    );
    println!("{}\n", style(&line).dim());
}
