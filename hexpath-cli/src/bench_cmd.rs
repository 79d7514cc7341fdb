//! Bench command - time path queries on random maps
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: run_size(), report_results()
//! - Level 3: validate_args(), random_queries()
//! - Level 4: timing utilities, formatting

use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Args;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use hexpath_core::{Hex, HexGrid, MapConfig, PathFinder};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct BenchArgs {
    /// Square map sizes to test (comma-separated)
    #[arg(long, value_delimiter = ',', default_value = "16,32,64")]
    pub sizes: Vec<usize>,

    /// Path queries per map size
    #[arg(long, default_value = "200")]
    pub queries: usize,

    /// Probability that a cell is ocean
    #[arg(long, default_value = "0.25")]
    pub density: f64,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Results for one map size
#[derive(Clone, Debug)]
struct BenchResult {
    size: usize,
    tiles: usize,
    queries: usize,
    found: usize,
    total_steps: usize,
    total_expanded: usize,
    total_time: Duration,
}

impl BenchResult {
    fn avg_time(&self) -> Duration {
        if self.queries == 0 {
            Duration::ZERO
        } else {
            self.total_time / self.queries as u32
        }
    }

    fn avg_expanded(&self) -> f64 {
        ratio(self.total_expanded, self.queries)
    }

    fn avg_steps(&self) -> f64 {
        ratio(self.total_steps, self.found)
    }
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run bench command
///
/// 1. For each size, build a random map and time random queries
/// 2. Report all results
pub fn run(args: BenchArgs, seed: Option<u64>) -> Result<()> {
    tracing::info!(
        "Starting benchmarks: sizes {:?}, {} queries each",
        args.sizes,
        args.queries
    );

    validate_args(&args)?;

    let mut rng = create_rng(seed);
    let mut results = Vec::with_capacity(args.sizes.len());

    for &size in &args.sizes {
        tracing::info!("Benchmarking {}x{} map...", size, size);
        results.push(run_size(&mut rng, size, &args)?);
    }

    report_results(&results, args.json);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn run_size(rng: &mut ChaCha8Rng, size: usize, args: &BenchArgs) -> Result<BenchResult> {
    let config = MapConfig::random(rng, "bench", size, size, args.density);
    let grid = config.build_grid()?;
    let queries = random_queries(rng, &grid, args.queries);

    let mut finder = PathFinder::default();
    let mut result = BenchResult {
        size,
        tiles: grid.len(),
        queries: queries.len(),
        found: 0,
        total_steps: 0,
        total_expanded: 0,
        total_time: Duration::ZERO,
    };

    for (start, goal) in queries {
        let t0 = Instant::now();
        let path = finder.find_path(&grid, start, goal, HexGrid::is_passable);
        result.total_time += t0.elapsed();
        result.total_expanded += finder.last_stats().expanded;
        if !path.is_empty() {
            result.found += 1;
            result.total_steps += path.len();
        }
    }

    Ok(result)
}

fn report_results(results: &[BenchResult], json: bool) {
    if json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn validate_args(args: &BenchArgs) -> Result<()> {
    if !(0.0..=1.0).contains(&args.density) {
        anyhow::bail!("Ocean density must be between 0 and 1, got {}", args.density);
    }
    if args.sizes.contains(&0) {
        anyhow::bail!("Map sizes must be positive, got {:?}", args.sizes);
    }
    Ok(())
}

/// Random (start, goal) pairs between passable tiles
fn random_queries<R: Rng>(rng: &mut R, grid: &HexGrid, count: usize) -> Vec<(Hex, Hex)> {
    let passable: Vec<Hex> = grid
        .tiles()
        .iter()
        .filter(|t| HexGrid::is_passable(t))
        .map(|t| t.hex)
        .collect();

    if passable.is_empty() {
        tracing::warn!("Map has no passable tiles; skipping queries");
        return Vec::new();
    }

    (0..count)
        .map(|_| {
            let a = passable[rng.gen_range(0..passable.len())];
            let b = passable[rng.gen_range(0..passable.len())];
            (a, b)
        })
        .collect()
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Format duration for display
fn format_duration(d: Duration) -> String {
    if d.as_secs() >= 1 {
        format!("{:.2}s", d.as_secs_f64())
    } else if d.as_millis() >= 1 {
        format!("{:.1}ms", d.as_secs_f64() * 1000.0)
    } else {
        format!("{:.1}us", d.as_secs_f64() * 1_000_000.0)
    }
}

/// Print results as JSON
fn print_json_results(results: &[BenchResult]) {
    #[derive(serde::Serialize)]
    struct JsonBenchmark {
        size: usize,
        tiles: usize,
        queries: usize,
        found: usize,
        avg_steps: f64,
        avg_expanded: f64,
        avg_time_us: f64,
    }

    let output: Vec<JsonBenchmark> = results
        .iter()
        .map(|r| JsonBenchmark {
            size: r.size,
            tiles: r.tiles,
            queries: r.queries,
            found: r.found,
            avg_steps: r.avg_steps(),
            avg_expanded: r.avg_expanded(),
            avg_time_us: r.avg_time().as_secs_f64() * 1_000_000.0,
        })
        .collect();

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

/// Print results as text table
fn print_text_results(results: &[BenchResult]) {
    println!("\n=== HEXPATH Benchmark Results ===\n");
    println!(
        "{:>8} {:>8} {:>8} {:>8} {:>10} {:>12} {:>12}",
        "Size", "Tiles", "Queries", "Found", "Avg Steps", "Avg Expand", "Avg Time"
    );
    println!("{}", "-".repeat(72));

    for r in results {
        println!(
            "{:>8} {:>8} {:>8} {:>8} {:>10.1} {:>12.1} {:>12}",
            format!("{}x{}", r.size, r.size),
            r.tiles,
            r.queries,
            r.found,
            r.avg_steps(),
            r.avg_expanded(),
            format_duration(r.avg_time())
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert!(format_duration(Duration::from_micros(50)).contains("us"));
        assert!(format_duration(Duration::from_millis(5)).contains("ms"));
        assert!(format_duration(Duration::from_secs(2)).contains("s"));
    }

    #[test]
    fn test_run_size_counts_queries() {
        let args = BenchArgs {
            sizes: vec![10],
            queries: 25,
            density: 0.0,
            json: false,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let result = run_size(&mut rng, 10, &args).unwrap();
        assert_eq!(result.tiles, 100);
        assert_eq!(result.queries, 25);
        // No ocean: every query succeeds
        assert_eq!(result.found, 25);
    }

    #[test]
    fn test_validate_args_rejects_bad_density() {
        let mut args = BenchArgs {
            sizes: vec![8],
            queries: 1,
            density: 0.25,
            json: false,
        };
        assert!(validate_args(&args).is_ok());

        args.density = f64::NAN;
        assert!(validate_args(&args).is_err());
        assert!(run(args, Some(1)).is_err());

        let args = BenchArgs {
            sizes: vec![8, 0],
            queries: 1,
            density: 0.25,
            json: false,
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_random_queries_on_sea_map() {
        let grid = MapConfig::new("sea", hexpath_core::TerrainMap::filled(3, 3, hexpath_core::Terrain::Ocean))
            .build_grid()
            .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(random_queries(&mut rng, &grid, 10).is_empty());
    }
}
