mod browse;
mod validate;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use storefront_core::{AppConfig, Catalog, ConfigError};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "storefront-cli")]
#[command(about = "Storefront catalog command line interface")]
struct Cli {
    /// Catalog YAML to browse (overrides `STOREFRONT_CATALOG_PATH`)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search, filter and sort products
    Products(ProductsArgs),
    /// List categories with product counts
    Categories {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show one product with its stock status and related products
    Show {
        /// Product id
        id: String,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Load and validate a catalog YAML file
    Validate {
        /// Path to the catalog file
        path: PathBuf,
    },
}

#[derive(Debug, Args)]
struct ProductsArgs {
    /// Case-insensitive text matched against name, description and category
    #[arg(long)]
    search: Option<String>,

    /// Only products in this category (case-insensitive)
    #[arg(long)]
    category: Option<String>,

    /// Lowest price to include
    #[arg(long)]
    min_price: Option<Decimal>,

    /// Highest price to include
    #[arg(long)]
    max_price: Option<Decimal>,

    /// Only products with stock on hand
    #[arg(long)]
    in_stock: bool,

    /// Only featured products
    #[arg(long)]
    featured: bool,

    /// One of default, price-asc, price-desc, rating, newest
    #[arg(long, default_value = "default")]
    sort: String,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Only browsing commands need a valid config; `validate` runs regardless.
    let config = storefront_core::load_app_config();
    let log_level = config.as_ref().map_or("info", |c| c.log_level.as_str());
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    run(cli, config)
}

fn run(cli: Cli, config: Result<AppConfig, ConfigError>) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        println!("storefront-cli: run with --help to list commands");
        return Ok(());
    };

    match command {
        Commands::Validate { path } => validate::run_validate(&path),
        Commands::Products(args) => {
            browse::run_products(&open_catalog(config, cli.catalog)?, &args)
        }
        Commands::Categories { json } => {
            browse::run_categories(&open_catalog(config, cli.catalog)?, json)
        }
        Commands::Show { id, json } => {
            browse::run_show(&open_catalog(config, cli.catalog)?, &id, json)
        }
    }
}

fn open_catalog(
    config: Result<AppConfig, ConfigError>,
    catalog_path: Option<PathBuf>,
) -> anyhow::Result<Catalog> {
    let mut config = config?;
    if let Some(path) = catalog_path {
        tracing::debug!(path = %path.display(), "catalog path set on command line");
        config.catalog_path = Some(path);
    }
    Ok(storefront_core::open_catalog(&config)?)
}
