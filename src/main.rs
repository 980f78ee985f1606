use anyhow::Result;
use carodolar::core::log::init_logging;
use clap::{CommandFactory, Parser, Subcommand};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the price-comparison dashboard
    Index {
        /// Exchange rate regime (blue, oficial, mep, ccl, cripto)
        #[arg(short, long)]
        rate: Option<String>,
    },
    /// List products with filters and sorting
    Products {
        /// Category slug (tech, food, fashion, home, cars, other) or "all"
        #[arg(long)]
        category: Option<String>,
        /// Only show verified products
        #[arg(long)]
        verified: bool,
        /// Sort key: name, price_diff, price_low, price_high, date, votes
        #[arg(short, long, default_value = "price_diff")]
        sort: String,
        /// Exchange rate regime (blue, oficial, mep, ccl, cripto)
        #[arg(short, long)]
        rate: Option<String>,
    },
    /// Display per-category price indices
    Categories {
        /// Exchange rate regime (blue, oficial, mep, ccl, cripto)
        #[arg(short, long)]
        rate: Option<String>,
    },
    /// Submit a candidate product for moderation
    Contribute {
        /// Product name
        #[arg(long)]
        name: String,
        /// Price in Argentina
        #[arg(long)]
        price_argentina: f64,
        /// Currency of the Argentina price (ARS or USD)
        #[arg(long, default_value = "ARS")]
        currency: String,
        /// Price in the United States, in USD
        #[arg(long)]
        price_usa: f64,
        /// Category slug (tech, food, fashion, home, cars, other)
        #[arg(long, default_value = "other")]
        category: String,
        /// Where the price was seen
        #[arg(long)]
        source_url: String,
        /// Contributor name
        #[arg(long)]
        contributor: String,
        /// Optional notes for the moderators
        #[arg(long)]
        notes: Option<String>,
    },
    /// List pending contributions, or approve/reject one
    Review {
        /// Approve the contribution with this id
        #[arg(long)]
        approve: Option<u64>,
        /// Reject the contribution with this id
        #[arg(long)]
        reject: Option<u64>,
    },
}

impl From<Commands> for carodolar::AppCommand {
    fn from(cmd: Commands) -> carodolar::AppCommand {
        match cmd {
            Commands::Index { rate } => carodolar::AppCommand::Index { rate },
            Commands::Products {
                category,
                verified,
                sort,
                rate,
            } => carodolar::AppCommand::Products(carodolar::cli::products::ProductListOptions {
                category,
                verified_only: verified,
                sort,
                rate,
            }),
            Commands::Categories { rate } => carodolar::AppCommand::Categories { rate },
            Commands::Contribute {
                name,
                price_argentina,
                currency,
                price_usa,
                category,
                source_url,
                contributor,
                notes,
            } => carodolar::AppCommand::Contribute(carodolar::cli::contribute::ContributeOptions {
                name,
                price_argentina,
                currency,
                price_usa,
                category,
                source_url,
                contributor,
                notes,
            }),
            Commands::Review { approve, reject } => {
                carodolar::AppCommand::Review(carodolar::cli::review::ReviewOptions {
                    approve,
                    reject,
                })
            }
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => carodolar::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = carodolar::core::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
providers:
  dolarapi:
    base_url: "https://dolarapi.com"

  # Uncomment to read the catalog from a Supabase project instead of the
  # built-in sample products.
  # supabase:
  #   base_url: "https://example.supabase.co"
  #   api_key: "service-key"

default_rate: "blue"

trend:
  up: 5.0
  down: -5.0
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
