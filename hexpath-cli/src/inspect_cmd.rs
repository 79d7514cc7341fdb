//! Inspect command - summarize a map's grid
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: summarize(), report_results()
//! - Level 3: count_regions()

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use rustc_hash::FxHashSet;

use hexpath_core::{HexGrid, MapConfig};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct InspectArgs {
    /// Map JSON file
    #[arg(long, value_name = "FILE")]
    pub map: PathBuf,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
struct GridSummary {
    name: String,
    width: usize,
    height: usize,
    hex_size: f64,
    tiles: usize,
    passable: usize,
    /// Connected groups of passable tiles
    regions: usize,
    largest_region: usize,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: InspectArgs) -> Result<()> {
    let config = MapConfig::load(&args.map)
        .with_context(|| format!("Failed to load map: {}", args.map.display()))?;
    let grid = config
        .build_grid()
        .with_context(|| format!("Failed to build grid for map: {}", config.name))?;

    tracing::info!("Inspecting '{}' ({} tiles)", config.name, grid.len());

    let summary = summarize(&config, &grid);
    report_results(&summary, args.json);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn summarize(config: &MapConfig, grid: &HexGrid) -> GridSummary {
    let regions = region_sizes(grid);
    GridSummary {
        name: config.name.clone(),
        width: grid.width(),
        height: grid.height(),
        hex_size: grid.layout().size,
        tiles: grid.len(),
        passable: grid.passable_count(),
        regions: regions.len(),
        largest_region: regions.iter().copied().max().unwrap_or(0),
    }
}

fn report_results(summary: &GridSummary, json: bool) {
    if json {
        if let Ok(out) = serde_json::to_string_pretty(summary) {
            println!("{}", out);
        }
        return;
    }

    println!("\n=== HEXPATH Map: {} ===", summary.name);
    println!("Size:      {} x {} (hex size {:.1}px)", summary.width, summary.height, summary.hex_size);
    println!("Tiles:     {}", summary.tiles);
    println!(
        "Passable:  {} ({:.1}%)",
        summary.passable,
        percentage(summary.passable, summary.tiles)
    );
    println!("Regions:   {} (largest {})", summary.regions, summary.largest_region);
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Size of each connected passable region (flood fill)
fn region_sizes(grid: &HexGrid) -> Vec<usize> {
    let mut seen = FxHashSet::default();
    let mut sizes = Vec::new();

    for tile in grid.tiles().iter().filter(|t| HexGrid::is_passable(t)) {
        if !seen.insert(tile.hex) {
            continue;
        }
        let mut stack = vec![tile.hex];
        let mut size = 0;
        while let Some(hex) = stack.pop() {
            size += 1;
            for n in grid.passable_neighbors(hex) {
                if seen.insert(n.hex) {
                    stack.push(n.hex);
                }
            }
        }
        sizes.push(size);
    }

    sizes
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

// ============================================================================
// TESTS
// ============================================================================
