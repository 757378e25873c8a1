//! # Notethrough Explorer CLI (`nt`)
//!
//! Search the Notethrough catalog, filter by audio-feature profiles, and
//! rank the results, from the terminal.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `nt search "<query>"` | Search the remote API and rank the results |
//! | `nt rank --input <file>` | Rank a local JSON array of raw track records |
//! | `nt normalize --input <file>` | Print records in canonical form |
//!
//! ## Examples
//!
//! ```bash
//! # Club-ready tracks, most popular first
//! nt search "daft punk" --dance club --sort popularity
//!
//! # Offline ranking of an exported result set
//! nt rank --input export.json --genre "art rock" --min-year 1990 --json
//!
//! # Canonicalize legacy CSV-era records
//! cat legacy.json | nt normalize --input -
//! ```

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use notethrough::client::HttpTrackSource;
use notethrough::config::{self, Config};
use notethrough::explorer::rank_tracks;
use notethrough::filters::{filter_chips, ExplorerFilters};
use notethrough::format::result_block;
use notethrough::models::ExplorerResult;
use notethrough::normalize::normalize_tracks;
use notethrough::session::{ExplorerSession, SearchStatus, SessionSettings};

/// Notethrough explorer: search, filter, and rank tracks.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. A missing file means built-in defaults.
#[derive(Parser)]
#[command(
    name = "nt",
    about = "Notethrough explorer: search, filter, and rank tracks",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/nt.toml`. API location, candidate and result
    /// limits, and the default filter preset are read from this file.
    #[arg(long, global = true, default_value = "./config/nt.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the remote API and rank the results.
    ///
    /// Requests up to `explorer.candidate_limit` candidates from
    /// `GET {api.base_url}/tracks/search`, then scores, filters, and sorts
    /// them locally.
    Search {
        /// The search query (at least `explorer.min_query_len` characters).
        query: String,

        #[command(flatten)]
        filters: FilterArgs,

        /// Override the number of results kept.
        #[arg(long)]
        limit: Option<usize>,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Rank a local JSON array of raw track records.
    Rank {
        /// JSON file with an array of records, or `-` for stdin.
        #[arg(long)]
        input: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,

        /// Override the number of results kept.
        #[arg(long)]
        limit: Option<usize>,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print records in canonical form.
    ///
    /// Legacy display-name keys are mapped to canonical snake_case fields
    /// and every field is filled in.
    Normalize {
        /// JSON file with an array of records, or `-` for stdin.
        #[arg(long)]
        input: PathBuf,
    },
}

/// Filter flags. Each one overrides the matching field of the config preset.
#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Case-insensitive substring that at least one genre must contain.
    #[arg(long)]
    genre: Option<String>,

    #[arg(long)]
    min_popularity: Option<f64>,

    #[arg(long)]
    max_popularity: Option<f64>,

    #[arg(long)]
    min_year: Option<i32>,

    #[arg(long)]
    max_year: Option<i32>,

    /// Energy profile: `any`, `calm`, `steady`, or `high`.
    #[arg(long)]
    energy: Option<String>,

    /// Dance profile: `any`, `chill`, or `club`.
    #[arg(long)]
    dance: Option<String>,

    /// Mood profile: `any`, `moody`, or `uplifting`.
    #[arg(long)]
    vibe: Option<String>,

    /// Sort mode: `relevance`, `popularity`, `release_year`, `energy`, or `danceability`.
    #[arg(long)]
    sort: Option<String>,
}

impl FilterArgs {
    fn apply(&self, mut filters: ExplorerFilters) -> Result<ExplorerFilters> {
        if let Some(genre) = &self.genre {
            filters.genre_term = genre.clone();
        }
        if self.min_popularity.is_some() {
            filters.min_popularity = self.min_popularity;
        }
        if self.max_popularity.is_some() {
            filters.max_popularity = self.max_popularity;
        }
        if self.min_year.is_some() {
            filters.min_year = self.min_year;
        }
        if self.max_year.is_some() {
            filters.max_year = self.max_year;
        }
        if let Some(energy) = &self.energy {
            filters.energy_profile = energy.parse()?;
        }
        if let Some(dance) = &self.dance {
            filters.dance_profile = dance.parse()?;
        }
        if let Some(vibe) = &self.vibe {
            filters.vibe_profile = vibe.parse()?;
        }
        if let Some(sort) = &self.sort {
            filters.sort_by = sort.parse()?;
        }
        filters.validate()?;
        Ok(filters)
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .with_env_var("NT_LOG")
                .from_env_lossy(),
        )
        .try_init();
}

/// Read a JSON array of raw records from a file or stdin (`-`).
fn read_records(path: &Path) -> Result<Vec<Value>> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read records from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?
    };

    let value: Value = serde_json::from_str(&content).context("Input is not valid JSON")?;
    match value {
        Value::Array(records) => Ok(records),
        _ => bail!("Input must be a JSON array of track records"),
    }
}

/// Resolve a `--limit` override against the configured result limit.
fn result_limit(limit: Option<usize>, configured: usize) -> Result<usize> {
    match limit {
        Some(0) => bail!("--limit must be >= 1"),
        Some(n) => Ok(n),
        None => Ok(configured),
    }
}

fn print_results(results: &[ExplorerResult], filters: &ExplorerFilters, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }

    let chips = filter_chips(filters);
    if !chips.is_empty() {
        println!("Filters: {}", chips.join(" · "));
    }
    println!(
        "Showing {} tracks · Sorted by {}",
        results.len(),
        filters.sort_by.label()
    );

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    println!();
    for (i, result) in results.iter().enumerate() {
        println!("{}", result_block(i + 1, result));
    }
    Ok(())
}

async fn run_search(
    cfg: &Config,
    query: String,
    filter_args: &FilterArgs,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let mut settings = SessionSettings::from(&cfg.explorer);
    settings.default_filters = filter_args.apply(cfg.explorer.filters.clone())?;
    settings.result_limit = result_limit(limit, settings.result_limit)?;

    let source = HttpTrackSource::new(&cfg.api)?;
    let mut session = ExplorerSession::new(settings);
    session.set_query(query);
    session.search(&source).await;

    match session.status() {
        SearchStatus::Notice(msg) => {
            println!("{}", msg);
            Ok(())
        }
        SearchStatus::Failed(msg) => bail!("{}", msg),
        _ => print_results(session.results(), session.filters(), json),
    }
}

fn run_rank(
    cfg: &Config,
    input: &Path,
    filter_args: &FilterArgs,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let filters = filter_args.apply(cfg.explorer.filters.clone())?;
    let limit = result_limit(limit, cfg.explorer.result_limit)?;
    let records = read_records(input)?;
    let results = rank_tracks(&records, &filters, limit);
    print_results(&results, &filters, json)
}

fn run_normalize(input: &Path) -> Result<()> {
    let records = read_records(input)?;
    let tracks = normalize_tracks(&records);
    println!("{}", serde_json::to_string_pretty(&tracks)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    // Normalization needs no configuration
    if let Commands::Normalize { input } = &cli.command {
        return run_normalize(input);
    }

    let cfg = config::load_config_or_default(&cli.config)?;

    match cli.command {
        Commands::Search {
            query,
            filters,
            limit,
            json,
        } => {
            run_search(&cfg, query, &filters, limit, json).await?;
        }
        Commands::Rank {
            input,
            filters,
            limit,
            json,
        } => {
            run_rank(&cfg, &input, &filters, limit, json)?;
        }
        Commands::Normalize { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
