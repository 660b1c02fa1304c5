use anyhow::{Context, Result};
use clap::Parser;
use sparkify_etl::cli::{init_logging, parse_path};
use sparkify_etl::config::DEFAULT_CONFIG_FILE;
use sparkify_etl::{
    open_warehouse, process_data, AppConfig, CliConfig, FailurePolicy, LogFileExtractor,
    SongFileExtractor,
};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "sparkify-etl")]
#[command(about = "Load song and log data into the Sparkify star schema")]
struct CliArgs {
    /// Path to the TOML file with the database settings.
    #[clap(long, default_value = DEFAULT_CONFIG_FILE, value_parser = parse_path)]
    pub config: PathBuf,

    /// Use the SQLite database at this path instead of the configured one.
    #[clap(long, value_parser = parse_path)]
    pub sqlite: Option<PathBuf>,

    /// Root of the song catalog files.
    #[clap(long, value_parser = parse_path)]
    pub song_data: Option<PathBuf>,

    /// Root of the event log files.
    #[clap(long, value_parser = parse_path)]
    pub log_data: Option<PathBuf>,

    /// Roll back and skip files that fail instead of stopping the run.
    #[clap(long, default_value_t = false)]
    pub continue_on_error: bool,
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    init_logging()?;

    let cli_config = CliConfig {
        sqlite_path: cli_args.sqlite,
        song_data: cli_args.song_data,
        log_data: cli_args.log_data,
    };
    let config = AppConfig::load(&cli_config, &cli_args.config)?;
    let policy = if cli_args.continue_on_error {
        FailurePolicy::SkipFile
    } else {
        FailurePolicy::FailFast
    };

    let mut warehouse = open_warehouse(&config.warehouse).context("Failed to open warehouse")?;

    let songs = process_data(
        warehouse.as_mut(),
        &config.song_data,
        &SongFileExtractor,
        policy,
    )
    .context("Song data load failed")?;
    let logs = process_data(
        warehouse.as_mut(),
        &config.log_data,
        &LogFileExtractor,
        policy,
    )
    .context("Log data load failed")?;

    let failed = songs.files_failed + logs.files_failed;
    if failed > 0 {
        warn!("{} files were skipped because of errors", failed);
    }

    let counts = warehouse.row_counts()?;
    info!("");
    info!("Warehouse contains:");
    info!("  {} songs", counts.songs);
    info!("  {} artists", counts.artists);
    info!("  {} time rows", counts.time);
    info!("  {} users", counts.users);
    info!("  {} songplays", counts.songplays);

    Ok(())
}
