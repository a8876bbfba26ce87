mod couriers;
mod places;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "shipmates-cli")]
#[command(about = "Shipmates courier rates and route lookups")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the couriers in the content database
    Couriers,
    /// Match couriers and prices for a province pair
    Quote {
        #[arg(long)]
        pickup_province: String,
        #[arg(long)]
        delivery_province: String,
    },
    /// Fetch the driving route between two place identifiers
    Route {
        #[arg(long)]
        origin: String,
        #[arg(long)]
        destination: String,
    },
    /// Resolve a place identifier into a structured address
    Resolve {
        #[arg(long)]
        place_id: String,
    },
    /// Show place suggestions for a partial address
    Autocomplete {
        #[arg(long)]
        input: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_level = std::env::var("SHIPMATES_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // Each command loads only the secrets it uses.
    match cli.command {
        Commands::Couriers => couriers::run_list(&shipmates_core::load_notion_settings()?).await,
        Commands::Quote {
            pickup_province,
            delivery_province,
        } => {
            let settings = shipmates_core::load_notion_settings()?;
            couriers::run_quote(&settings, &pickup_province, &delivery_province).await
        }
        Commands::Route {
            origin,
            destination,
        } => places::run_route(&shipmates_core::load_maps_settings()?, &origin, &destination).await,
        Commands::Resolve { place_id } => {
            places::run_resolve(&shipmates_core::load_maps_settings()?, &place_id).await
        }
        Commands::Autocomplete { input } => {
            places::run_autocomplete(&shipmates_core::load_maps_settings()?, &input).await
        }
    }
}
