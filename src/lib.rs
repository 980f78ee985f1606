pub mod cli;
pub mod core;
pub mod providers;

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

use crate::cli::contribute::ContributeOptions;
use crate::cli::products::ProductListOptions;
use crate::cli::review::ReviewOptions;
use crate::core::catalog::CatalogProvider;
use crate::core::config::AppConfig;

/// Commands the CLI can dispatch, decoupled from the clap surface.
#[derive(Debug)]
pub enum AppCommand {
    Index { rate: Option<String> },
    Products(ProductListOptions),
    Categories { rate: Option<String> },
    Contribute(ContributeOptions),
    Review(ReviewOptions),
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Caro Dólar starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    // Create shared caches
    let rate_cache = Arc::new(crate::core::cache::Cache::new());
    let catalog_cache = Arc::new(crate::core::cache::Cache::new());

    let dolarapi_base_url = config
        .providers
        .dolarapi
        .as_ref()
        .map_or("https://dolarapi.com", |p| &p.base_url);
    let rate_provider =
        providers::dolarapi::DolarApiProvider::new(dolarapi_base_url, Arc::clone(&rate_cache));

    let catalog_provider: Box<dyn CatalogProvider + Send + Sync> =
        match config.providers.supabase.as_ref() {
            Some(supabase) => Box::new(providers::supabase::SupabaseCatalog::new(
                &supabase.base_url,
                &supabase.api_key,
                Arc::clone(&catalog_cache),
            )),
            None => Box::new(providers::fixture::FixtureCatalog::new()),
        };

    match command {
        AppCommand::Index { rate } => {
            cli::dashboard::run(
                &config,
                &rate_provider,
                catalog_provider.as_ref(),
                rate.as_deref(),
            )
            .await
        }
        AppCommand::Products(options) => {
            cli::products::run(
                &config,
                &rate_provider,
                catalog_provider.as_ref(),
                &options,
            )
            .await
        }
        AppCommand::Categories { rate } => {
            cli::categories::run(
                &config,
                &rate_provider,
                catalog_provider.as_ref(),
                rate.as_deref(),
            )
            .await
        }
        AppCommand::Contribute(options) => cli::contribute::run(&config, &options).await,
        AppCommand::Review(options) => cli::review::run(&config, &options).await,
    }
}
