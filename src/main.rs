//! Buildings Overview
//!
//! Generates an illustrated reStructuredText overview of all buildings in a
//! content catalog: one cost table per building and tier.

mod assets;
mod db;
mod error;
mod extract;
mod icons;
mod models;
mod overview;
mod production;
mod sample;
mod table;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "buildings-overview")]
#[command(about = "Illustrated overview of buildings, their costs and production")]
struct Cli {
    /// Path to the SQLite catalog database
    #[arg(short, long, default_value = "buildings.db")]
    database: PathBuf,

    /// Where the overview document is written
    #[arg(short, long, default_value = "docs/buildings.rst")]
    output: PathBuf,

    /// Prefix that makes image paths resolvable from the rendered document
    #[arg(
        long,
        default_value = "https://github.com/unknown-horizons/unknown-horizons/raw/master/"
    )]
    base_url: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the overview document (default)
    Generate {
        /// Print the document instead of writing the output file
        #[arg(long)]
        stdout: bool,
    },

    /// Discover action sets in a content directory
    Extract {
        /// Path to the content directory
        content_dir: PathBuf,

        /// Clear previously discovered action sets first
        #[arg(long)]
        clear: bool,
    },

    /// List all buildings in the database
    ListBuildings,

    /// Initialize empty database with schema
    Init,

    /// Load sample data for testing (without game content)
    LoadSample,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let conn = Connection::open(&cli.database)
        .with_context(|| format!("Failed to open {}", cli.database.display()))?;
    db::init_schema(&conn)?;

    match cli.command.unwrap_or(Commands::Generate { stdout: false }) {
        Commands::Generate { stdout } => {
            let catalog = db::load_catalog(&conn).context("Failed to load catalog")?;
            if stdout {
                let document = overview::render(&catalog, &cli.base_url)
                    .context("Failed to generate overview")?;
                print!("{}", document);
            } else {
                overview::write_overview(&catalog, &cli.base_url, &cli.output)
                    .with_context(|| format!("Failed to generate {}", cli.output.display()))?;
                println!("Wrote {}", cli.output.display());
            }
        }

        Commands::Extract { content_dir, clear } => {
            if clear {
                println!("Clearing discovered action sets...");
                db::clear_frames(&conn)?;
            }

            let stats = extract::extract_to_database(&conn, &content_dir)?;
            println!("\n{}", stats);
        }

        Commands::ListBuildings => {
            let buildings = db::list_buildings(&conn)?;
            if buildings.is_empty() {
                println!("No buildings in database. Run 'load-sample' first.");
            } else {
                println!("{:>5} {:<30} Tiers", "Id", "Building");
                println!("{}", "-".repeat(50));
                for b in buildings {
                    let tiers = b
                        .tiers
                        .iter()
                        .map(|t| t.to_string())
                        .collect::<Vec<_>>()
                        .join(", ");
                    println!("{:>5} {:<30} {}", b.id, b.name, tiers);
                }
            }
        }

        Commands::Init => {
            println!("Database initialized at: {}", cli.database.display());
        }

        Commands::LoadSample => {
            let count = sample::load_sample_data(&conn)?;
            println!("Loaded {} sample buildings", count);
        }
    }

    Ok(())
}
