use super::ui;
use crate::core::config::AppConfig;
use crate::core::contrib::ContributionQueue;
use anyhow::{Context, Result, bail};
use comfy_table::Cell;

/// Moderation action over the pending queue. With neither id set, the
/// command lists what is waiting for review.
#[derive(Debug, Clone, Default)]
pub struct ReviewOptions {
    pub approve: Option<u64>,
    pub reject: Option<u64>,
}

pub async fn run(config: &AppConfig, options: &ReviewOptions) -> Result<()> {
    let queue_path = config.contributions_path()?;
    let mut queue = ContributionQueue::load_from_path(&queue_path)?;

    match (options.approve, options.reject) {
        (Some(_), Some(_)) => bail!("Use either --approve or --reject, not both"),
        (Some(id), None) => {
            let contribution = queue
                .find_mut(id)
                .with_context(|| format!("No contribution with id {id}"))?;
            contribution.approve()?;
            queue.save_to_path(&queue_path)?;
            println!("Contribución #{id} aprobada.");
        }
        (None, Some(id)) => {
            let contribution = queue
                .find_mut(id)
                .with_context(|| format!("No contribution with id {id}"))?;
            contribution.reject()?;
            queue.save_to_path(&queue_path)?;
            println!("Contribución #{id} rechazada.");
        }
        (None, None) => print_pending(&queue),
    }

    Ok(())
}

fn print_pending(queue: &ContributionQueue) {
    let pending: Vec<_> = queue.pending().collect();
    if pending.is_empty() {
        println!("No hay contribuciones pendientes.");
        return;
    }

    println!(
        "{}\n",
        ui::style_text("Contribuciones pendientes", ui::StyleType::Title)
    );

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("ID"),
        ui::header_cell("Producto"),
        ui::header_cell("Precio AR"),
        ui::header_cell("EE.UU. (USD)"),
        ui::header_cell("Categoría"),
        ui::header_cell("Fuente"),
        ui::header_cell("Autor"),
        ui::header_cell("Fecha"),
    ]);

    for contribution in pending {
        table.add_row(vec![
            Cell::new(contribution.id.to_string()),
            Cell::new(&contribution.product_name),
            Cell::new(format!(
                "{} {}",
                contribution.price_argentina_currency,
                ui::format_money(contribution.price_argentina)
            )),
            Cell::new(ui::format_money(contribution.price_usa)),
            Cell::new(contribution.category.to_string()),
            Cell::new(&contribution.source_url),
            Cell::new(&contribution.contributor_name),
            Cell::new(contribution.created_at.format("%d/%m/%Y").to_string()),
        ]);
    }
    println!("{table}");
}
