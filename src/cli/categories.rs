use super::ui;
use crate::core::catalog::CatalogProvider;
use crate::core::config::AppConfig;
use crate::core::rates::{RateProvider, select_rate};
use crate::core::{aggregate, general_index};
use anyhow::{Result, anyhow};
use comfy_table::Cell;
use console::style;

/// Renders the per-category indices with their trend classification.
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
    let normalized = super::dashboard::normalize_all(&products, rate);

    let indices = aggregate(&normalized, &config.trend);
    if indices.is_empty() {
        println!("Sin categorías con comparaciones definidas.");
        return Ok(());
    }

    println!(
        "{}\n",
        ui::style_text("Índices por categoría", ui::StyleType::Title)
    );

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Categoría"),
        ui::header_cell("Productos"),
        ui::header_cell("Dif. promedio vs EE.UU."),
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

    if let Some(index) = general_index(&normalized) {
        let line = format!("Índice general: {index:+.2}% ({})", rate.name);
        println!("\n{}", style(&line).bold());
    }

    Ok(())
}
