//! HEXPATH CLI - Command-line host for the pathfinding core
//!
//! Commands:
//! - path: Plan (and optionally walk) a move on a map
//! - inspect: Summarize a map's grid
//! - generate: Write a random map
//! - bench: Time path queries on random maps

mod bench_cmd;
mod generate_cmd;
mod inspect_cmd;
mod path_cmd;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hexpath")]
#[command(about = "HEXPATH hex-grid pathfinding toolkit")]
struct Cli {
    /// Random seed for reproducibility
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find a path between two pixel positions on a map
    Path(path_cmd::PathArgs),
    /// Print grid statistics for a map
    Inspect(inspect_cmd::InspectArgs),
    /// Generate a random map file
    Generate(generate_cmd::GenerateArgs),
    /// Benchmark path queries on random maps
    Bench(bench_cmd::BenchArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Path(args) => path_cmd::run(args),
        Commands::Inspect(args) => inspect_cmd::run(args),
        Commands::Generate(args) => generate_cmd::run(args, cli.seed),
        Commands::Bench(args) => bench_cmd::run(args, cli.seed),
    }
}
