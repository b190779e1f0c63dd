//! epg-ingest: builds a program guide from decoded EIT sections.
//!
//! Sections are read as JSON lines from a file or stdin and merged into a
//! SQLite program database.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use log::{error, info};
use tokio::io::BufReader;

use epg_ingest::database::Database;
use epg_ingest::epg::{Epg, EpgConfig, KeyedVersionCheck, DEFAULT_YIELD_INTERVAL};
use epg_ingest::logging::{self, LogOptions};
use epg_ingest::source::read_sections;
use epg_ingest::store::{MemoryStore, ProgramStore};
use epg_protocol::time::UNKNOWN_DURATION_PLACEHOLDER_MS;

/// epg-ingest - Incremental EPG builder for EIT sections
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON-lines section input ("-" for stdin)
    #[arg(short, long, default_value = "-")]
    input: PathBuf,

    /// Path to the database file
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Keep programs in memory only
    #[arg(long)]
    dry_run: bool,

    /// Configuration file path
    #[arg(short = 'f', long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory where log files are stored
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Number of days to keep log files
    #[arg(long)]
    log_retention_days: Option<u64>,

    /// Pause after each processed event, in milliseconds
    #[arg(long)]
    yield_interval_ms: Option<u64>,
}

/// Configuration file format.
#[derive(Debug, serde::Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    database: DatabaseSection,
    #[serde(default)]
    logging: LoggingSection,
    #[serde(default)]
    epg: EpgSection,
}

#[derive(Debug, serde::Deserialize, Default)]
struct DatabaseSection {
    path: Option<String>,
}

#[derive(Debug, serde::Deserialize, Default)]
struct LoggingSection {
    log_dir: Option<String>,
    retention_days: Option<u64>,
    level: Option<String>,
}

#[derive(Debug, serde::Deserialize, Default)]
struct EpgSection {
    yield_interval_ms: Option<u64>,
    unknown_duration_ms: Option<i64>,
    keyed_version_check: Option<KeyedVersionCheck>,
}

fn load_config(path: &Path) -> Result<ConfigFile, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    let config: ConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

async fn ingest<S: ProgramStore>(
    store: S,
    config: EpgConfig,
    input: &Path,
) -> Result<S, Box<dyn std::error::Error>> {
    let (writer, handle) = Epg::spawn(store, config);

    let stats = if input == Path::new("-") {
        info!("Reading sections from stdin");
        read_sections(BufReader::new(tokio::io::stdin()), &writer).await
    } else {
        info!("Reading sections from {:?}", input);
        let file = tokio::fs::File::open(input).await?;
        read_sections(BufReader::new(file), &writer).await
    };
    writer.end();

    let stats = stats?;
    info!(
        "Input done: {} lines, {} sections, {} skipped",
        stats.lines, stats.sections, stats.skipped
    );

    Ok(handle.await?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load config file: explicit path > auto-detect > default
    let config_path = args.config.clone().or_else(|| {
        let default_path = PathBuf::from("epg-ingest.toml");
        default_path.exists().then_some(default_path)
    });
    let file_config = match &config_path {
        Some(path) => match load_config(path) {
            Ok(c) => {
                eprintln!("Loaded config from: {}", path.display());
                c
            }
            Err(e) => {
                eprintln!("Failed to load config file: {}", e);
                return Err(e);
            }
        },
        None => ConfigFile::default(),
    };

    // Command line takes precedence over the file
    let log_options = LogOptions {
        log_dir: Some(
            args.log_dir
                .clone()
                .or_else(|| file_config.logging.log_dir.as_ref().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from("logs")),
        ),
        retention_days: args
            .log_retention_days
            .or(file_config.logging.retention_days)
            .unwrap_or(7),
        verbose: args.verbose,
        level: file_config.logging.level.clone(),
    };
    let _log_guard = logging::init_logging(&log_options)?;

    let epg_config = EpgConfig {
        yield_interval: args
            .yield_interval_ms
            .or(file_config.epg.yield_interval_ms)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_YIELD_INTERVAL),
        unknown_duration_ms: file_config
            .epg
            .unknown_duration_ms
            .unwrap_or(UNKNOWN_DURATION_PLACEHOLDER_MS),
        keyed_version_check: file_config.epg.keyed_version_check.unwrap_or_default(),
    };
    info!("EPG config: {:?}", epg_config);

    if args.dry_run {
        let store = ingest(MemoryStore::new(), epg_config, &args.input).await?;
        info!(
            "Dry run finished: {} programs, {} writes",
            store.len(),
            store.writes().len()
        );
        return Ok(());
    }

    let db_path = args
        .database
        .or_else(|| file_config.database.path.map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("epg.db"));

    info!("Opening database: {:?}", db_path);
    let db = match Database::open(&db_path) {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    let db = ingest(db, epg_config, &args.input).await?;
    info!("Finished: {} programs in {:?}", db.program_count()?, db_path);

    Ok(())
}
