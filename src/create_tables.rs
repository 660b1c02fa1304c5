//! Drops (if they exist) and recreates the Sparkify star schema tables.

use anyhow::{Context, Result};
use clap::Parser;
use sparkify_etl::cli::{init_logging, parse_path};
use sparkify_etl::config::DEFAULT_CONFIG_FILE;
use sparkify_etl::warehouse::schema::TABLES;
use sparkify_etl::{open_warehouse, AppConfig, CliConfig};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "create-tables")]
#[command(about = "Drop and recreate the Sparkify tables")]
struct Args {
    /// Path to the TOML file with the database settings.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE, value_parser = parse_path)]
    config: PathBuf,

    /// Use the SQLite database at this path instead of the configured one.
    #[arg(long, value_parser = parse_path)]
    sqlite: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging()?;

    let cli_config = CliConfig {
        sqlite_path: args.sqlite,
        ..Default::default()
    };
    let config = AppConfig::load(&cli_config, &args.config)?;

    let mut warehouse = open_warehouse(&config.warehouse).context("Failed to open warehouse")?;
    warehouse
        .reset_schema()
        .context("Failed to recreate tables")?;

    for table in TABLES {
        info!("Created table {}", table.name);
    }
    Ok(())
}
