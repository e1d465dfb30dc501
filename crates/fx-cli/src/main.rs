use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fx_core::{Timestamp, Variation};
use fx_store::ExperimentStore;

#[derive(Parser)]
#[command(name = "fx", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create .fx/ with a default config and an empty cache
    Init,

    /// Fetch assignments and replace the cached snapshot
    Fetch {
        /// Read the response body from this file instead of the configured one
        #[arg(long)]
        payload: Option<std::path::PathBuf>,
    },

    /// Show the cached snapshot
    Status,

    /// Print the variation for one experiment
    Variation {
        #[arg(long)]
        experiment: String,
        /// Fetch first if the cache is missing or stale
        #[arg(long, default_value_t = false)]
        refresh: bool,
    },

    /// Write the cached snapshot as JSON; `fetch --payload` reads it back
    Export {
        #[arg(long)]
        out: Option<std::path::PathBuf>,
    },

    /// Drop the cached snapshot
    Clear,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let root = std::env::current_dir()?;

    match cli.cmd {
        Command::Init => {
            ExperimentStore::init(&root)?;
            println!("Initialized fx in {}", root.display());
        }
        Command::Fetch { payload } => {
            let store = match payload {
                Some(path) => ExperimentStore::open_with_payload(&root, path)?,
                None => ExperimentStore::open(&root)?,
            };
            let assignments = store.fetch_assignments(Timestamp::now())?;
            println!(
                "Fetched {} assignments for {} (ttl {}s)",
                assignments.variations().len(),
                store.request().platform,
                assignments.ttl()
            );
        }
        Command::Status => {
            let store = ExperimentStore::open(&root)?;
            match store.get_cached_assignments()? {
                None => println!("No cached assignments"),
                Some(a) => {
                    let now = Timestamp::now();
                    println!("Fetched at: {}", a.fetched_at().as_millis());
                    println!("Expires at: {}", a.expires_at().as_millis());
                    println!("Stale: {}", a.is_stale_at(now));
                    println!("Assignments: {}", a.variations().len());
                    for (experiment, variation) in a.variations() {
                        println!("- {} => {}", experiment, variation);
                    }
                }
            }
        }
        Command::Variation { experiment, refresh } => {
            let store = ExperimentStore::open(&root)?;
            let variation = if refresh {
                store.variation_for(&experiment, Timestamp::now())?
            } else {
                store
                    .get_cached_assignments()?
                    .map(|a| a.variation_for_experiment(&experiment))
                    .unwrap_or(Variation::Control)
            };
            println!("{}", variation);
        }
        Command::Export { out } => {
            let store = ExperimentStore::open(&root)?;
            match (store.export_cached_assignments()?, out) {
                (None, _) => println!("No cached assignments"),
                (Some(json), None) => println!("{}", json),
                (Some(json), Some(path)) => {
                    std::fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
                    println!("Exported cached assignments to {}", path.display());
                }
            }
        }
        Command::Clear => {
            let store = ExperimentStore::open(&root)?;
            store.clear_cached_assignments()?;
            println!("Cleared cached assignments");
        }
    }

    Ok(())
}
