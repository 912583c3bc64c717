use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use signdb_core::config::{Config, Settings};
use signdb_core::types::SearchWeights;
use signdb_gesture::{FrameLandmarks, TemporalSmoother};
use signdb_hybrid::SearchService;
use signdb_store::{ContentStore, RestSource};

#[derive(Parser)]
#[command(name = "signdb", about = "Sign language lesson catalogue and unit search")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List active topics with their lesson counts
    Topics {
        /// Only topics whose name contains this text
        #[arg(long)]
        query: Option<String>,
    },
    /// List lessons, optionally for one topic
    Lessons {
        #[arg(long)]
        topic: Option<i64>,
    },
    /// Dump every unit
    Units,
    /// Find units whose sign description matches a query
    Search {
        query: String,
        /// Number of units to return
        #[arg(short)]
        k: Option<usize>,
        /// Weight of the embedding channel
        #[arg(long)]
        semantic: Option<f32>,
        /// Weight of the keyword channel
        #[arg(long)]
        lexical: Option<f32>,
    },
    /// Smooth a JSON array of per-frame landmarks into feature rows
    Smooth {
        frames: PathBuf,
        #[arg(long)]
        alpha: Option<f32>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let settings = Config::load()?.settings()?;
    match cli.command {
        Commands::Topics { query } => {
            let store = content_store(&settings)?;
            match query {
                Some(q) => print_json(&store.search_topics(&q)?),
                None => print_json(&store.all_topics()?),
            }
        }
        Commands::Lessons { topic } => {
            let store = content_store(&settings)?;
            match topic {
                Some(id) => print_json(&store.lessons_by_topic(id)?),
                None => print_json(&store.all_lessons()?),
            }
        }
        Commands::Units => print_json(&content_store(&settings)?.all_units()?),
        Commands::Search { query, k, semantic, lexical } => {
            let store = content_store(&settings)?;
            let service = SearchService::from_settings(&settings)?;
            service.ensure_initialized(|| store.all_units())?;
            let weights = (semantic.is_some() || lexical.is_some()).then(|| {
                let defaults = settings.search.weights();
                SearchWeights::new(semantic.unwrap_or(defaults.semantic), lexical.unwrap_or(defaults.lexical))
            });
            let results = service.search(&query, k.unwrap_or(settings.search.default_top_k), weights)?;
            tracing::info!(results = results.len(), "search complete");
            print_json(&results)
        }
        Commands::Smooth { frames, alpha } => {
            let raw = std::fs::read_to_string(&frames).with_context(|| format!("reading {}", frames.display()))?;
            let clip: Vec<FrameLandmarks> =
                serde_json::from_str(&raw).with_context(|| format!("parsing {}", frames.display()))?;
            let mut smoother = TemporalSmoother::new(alpha.unwrap_or(settings.gesture.smoothing_alpha))?;
            print_json(&smoother.smooth_sequence(&clip)?)
        }
    }
}

fn content_store(settings: &Settings) -> Result<ContentStore<RestSource>> {
    Ok(ContentStore::new(RestSource::new(&settings.store)?))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
