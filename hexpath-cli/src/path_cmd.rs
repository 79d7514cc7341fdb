//! Path command - plan a move on a map and optionally walk it
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_grid(), plan_move(), walk(), report_results()
//! - Level 3: validate_args(), apply_blocks()
//! - Level 4: argument parsing, formatting

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};

use hexpath_core::{
    request_move, Agent, Hex, HexGrid, MapConfig, MoveOutcome, OccupantId, PassRule, PathFinder,
    PathFinderConfig, Point, SearchStats,
};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PathArgs {
    /// Map JSON file
    #[arg(long, value_name = "FILE")]
    pub map: PathBuf,

    /// Agent start position in pixels ("x,y")
    #[arg(long, value_parser = parse_point)]
    pub from: Point,

    /// Target position in pixels ("x,y")
    #[arg(long, value_parser = parse_point)]
    pub to: Point,

    /// Which tiles the agent may cross
    #[arg(long, value_enum, default_value = "land")]
    pub rule: RuleArg,

    /// Block a tile before searching ("q,r"); repeatable
    #[arg(long = "block", value_parser = parse_hex)]
    pub blocks: Vec<Hex>,

    /// Give up after expanding this many tiles
    #[arg(long)]
    pub max_expansions: Option<usize>,

    /// Walk the path at this speed (pixels/second) and report the ticks taken
    #[arg(long)]
    pub walk_speed: Option<f64>,

    /// Tick length in seconds when walking
    #[arg(long, default_value = "0.016")]
    pub dt: f64,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RuleArg {
    Land,
    Amphibious,
}

impl From<RuleArg> for PassRule {
    fn from(rule: RuleArg) -> Self {
        match rule {
            RuleArg::Land => PassRule::Land,
            RuleArg::Amphibious => PassRule::Amphibious,
        }
    }
}

/// Outcome of planning plus optional walk
#[derive(Clone, Debug)]
struct PlanReport {
    map_name: String,
    outcome: MoveOutcome,
    steps: Vec<StepInfo>,
    stats: SearchStats,
    walk_ticks: Option<usize>,
}

#[derive(Clone, Debug, serde::Serialize)]
struct StepInfo {
    q: i32,
    r: i32,
    col: i32,
    row: i32,
    x: f64,
    y: f64,
}

/// Safety stop for walking when speed is tiny
const MAX_WALK_TICKS: usize = 1_000_000;

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run path command
///
/// 1. Load the map and build the grid
/// 2. Plan the move
/// 3. Optionally walk it
/// 4. Report
pub fn run(args: PathArgs) -> Result<()> {
    validate_args(&args)?;
    let (config, mut grid) = load_grid(&args)?;

    tracing::info!(
        "Planning move on '{}' from ({:.1}, {:.1}) to ({:.1}, {:.1})",
        config.name,
        args.from.x,
        args.from.y,
        args.to.x,
        args.to.y
    );

    let mut report = plan_move(&grid, &args);
    report.map_name = config.name;

    if let Some(speed) = args.walk_speed {
        report.walk_ticks = walk(&mut grid, &args, speed);
    }

    report_results(&report, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Load map JSON and build its grid with the requested blocks applied
fn load_grid(args: &PathArgs) -> Result<(MapConfig, HexGrid)> {
    let config = MapConfig::load(&args.map)
        .with_context(|| format!("Failed to load map: {}", args.map.display()))?;

    let mut grid = config
        .build_grid()
        .with_context(|| format!("Failed to build grid for map: {}", config.name))?;

    apply_blocks(&mut grid, &args.blocks);

    Ok((config, grid))
}

/// Request a move for a fresh agent and collect the planned steps
fn plan_move(grid: &HexGrid, args: &PathArgs) -> PlanReport {
    let mut finder = create_finder(args);
    let mut agent = Agent::new(OccupantId(0), args.from, 0.0, args.rule.into());

    let outcome = request_move(&mut agent, grid, &mut finder, args.to);

    let steps: Vec<StepInfo> = agent
        .progress()
        .map(|p| p.original().iter().filter_map(|&hex| step_info(grid, hex)).collect())
        .unwrap_or_default();

    PlanReport {
        map_name: String::new(),
        outcome,
        steps,
        stats: finder.last_stats(),
        walk_ticks: None,
    }
}

/// Walk the planned path tick by tick, keeping the agent's tile occupancy
/// current. `None` if there is nothing to walk or the agent never arrives.
fn walk(grid: &mut HexGrid, args: &PathArgs, speed: f64) -> Option<usize> {
    let mut finder = create_finder(args);
    let mut agent = Agent::new(OccupantId(0), args.from, speed, args.rule.into());
    agent.sync_occupancy(grid);

    if !matches!(request_move(&mut agent, grid, &mut finder, args.to), MoveOutcome::Moving { .. }) {
        agent.leave(grid);
        return None;
    }

    let mut ticks = 0;
    let mut arrived = false;
    while ticks < MAX_WALK_TICKS {
        ticks += 1;
        if !agent.update(args.dt, grid) {
            arrived = true;
            break;
        }
        agent.sync_occupancy(grid);
        tracing::trace!("tick {}: {} steps left to draw", ticks, agent.path_to_draw(grid).len());
    }
    agent.leave(grid);

    if !arrived {
        tracing::warn!("Walk stopped after {} ticks without arriving", ticks);
        return None;
    }
    Some(ticks)
}

/// Print the report
fn report_results(report: &PlanReport, args: &PathArgs) {
    if args.json {
        print_json_results(report);
    } else {
        print_text_results(report);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Reject walk settings that can never finish
fn validate_args(args: &PathArgs) -> Result<()> {
    if let Some(speed) = args.walk_speed {
        if !speed.is_finite() || speed <= 0.0 {
            bail!("Walk speed must be a positive number, got {}", speed);
        }
    }
    if !args.dt.is_finite() || args.dt <= 0.0 {
        bail!("Tick length must be a positive number, got {}", args.dt);
    }
    Ok(())
}

/// Mark tiles as blocked, warning about hexes that are not on the grid
fn apply_blocks(grid: &mut HexGrid, blocks: &[Hex]) {
    for &hex in blocks {
        if !grid.set_blocked(hex, true) {
            tracing::warn!("Ignoring block at {}: no such tile", hex);
        }
    }
}

fn create_finder(args: &PathArgs) -> PathFinder {
    let mut config = PathFinderConfig::default();
    if let Some(limit) = args.max_expansions {
        config = config.with_max_expansions(limit);
    }
    PathFinder::new(config)
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn step_info(grid: &HexGrid, hex: Hex) -> Option<StepInfo> {
    let tile = grid.tile(hex)?;
    Some(StepInfo {
        q: hex.q,
        r: hex.r,
        col: tile.offset.col,
        row: tile.offset.row,
        x: tile.center.x,
        y: tile.center.y,
    })
}

fn outcome_name(outcome: MoveOutcome) -> &'static str {
    match outcome {
        MoveOutcome::Moving { .. } => "moving",
        MoveOutcome::AlreadyThere => "already_there",
        MoveOutcome::Unreachable => "unreachable",
        MoveOutcome::OffGrid => "off_grid",
    }
}

/// Parse "x,y" into a pixel point
pub fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = split_pair(s)?;
    let x: f64 = x.parse().map_err(|_| format!("Invalid x coordinate: {}", x))?;
    let y: f64 = y.parse().map_err(|_| format!("Invalid y coordinate: {}", y))?;
    Ok(Point::new(x, y))
}

/// Parse "q,r" into an axial hex
pub fn parse_hex(s: &str) -> Result<Hex, String> {
    let (q, r) = split_pair(s)?;
    let q: i32 = q.parse().map_err(|_| format!("Invalid q coordinate: {}", q))?;
    let r: i32 = r.parse().map_err(|_| format!("Invalid r coordinate: {}", r))?;
    Ok(Hex::new(q, r))
}

fn split_pair(s: &str) -> Result<(&str, &str), String> {
    s.split_once(',')
        .map(|(a, b)| (a.trim(), b.trim()))
        .ok_or_else(|| format!("Expected two comma-separated values, got '{}'", s))
}

/// Print results as JSON
fn print_json_results(report: &PlanReport) {
    #[derive(serde::Serialize)]
    struct JsonOutput<'a> {
        map: &'a str,
        outcome: &'static str,
        steps: &'a [StepInfo],
        expanded: usize,
        pushed: usize,
        truncated: bool,
        walk_ticks: Option<usize>,
    }

    let output = JsonOutput {
        map: &report.map_name,
        outcome: outcome_name(report.outcome),
        steps: &report.steps,
        expanded: report.stats.expanded,
        pushed: report.stats.pushed,
        truncated: report.stats.truncated,
        walk_ticks: report.walk_ticks,
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

/// Print results as text
fn print_text_results(report: &PlanReport) {
    println!("\n=== HEXPATH Path ({}) ===", report.map_name);
    println!("Outcome: {}", outcome_name(report.outcome));
    println!(
        "Search: {} expanded, {} pushed{}",
        report.stats.expanded,
        report.stats.pushed,
        if report.stats.truncated { " (truncated)" } else { "" }
    );

    if !report.steps.is_empty() {
        println!("\n{:>4} {:>10} {:>10} {:>18}", "#", "axial", "offset", "center");
        println!("{}", "-".repeat(46));
        for (i, step) in report.steps.iter().enumerate() {
            println!(
                "{:>4} {:>10} {:>10} {:>18}",
                i + 1,
                format!("({},{})", step.q, step.r),
                format!("[{},{}]", step.col, step.row),
                format!("({:.1}, {:.1})", step.x, step.y)
            );
        }
    }

    if let Some(ticks) = report.walk_ticks {
        println!("\nArrived after {} ticks", ticks);
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use hexpath_core::{Terrain, TerrainMap};

    fn args_for(from: Point, to: Point) -> PathArgs {
        PathArgs {
            map: PathBuf::from("unused.json"),
            from,
            to,
            rule: RuleArg::Land,
            blocks: Vec::new(),
            max_expansions: None,
            walk_speed: None,
            dt: 0.1,
            json: false,
        }
    }

    fn open_grid() -> HexGrid {
        MapConfig::new("open", TerrainMap::filled(6, 6, Terrain::Grass))
            .build_grid()
            .unwrap()
    }

    #[test]
    fn test_parse_point_and_hex() {
        assert_eq!(parse_point("10.5, -3").unwrap(), Point::new(10.5, -3.0));
        assert!(parse_point("10").is_err());
        assert!(parse_point("a,b").is_err());
        assert_eq!(parse_hex("2,-1").unwrap(), Hex::new(2, -1));
        assert!(parse_hex("2.5,1").is_err());
    }

    #[test]
    fn test_plan_move_reports_steps() {
        let grid = open_grid();
        let from = grid.tile_at_offset(0, 0).unwrap().center;
        let to = grid.tile_at_offset(3, 0).unwrap().center;
        let report = plan_move(&grid, &args_for(from, to));
        assert_eq!(report.outcome, MoveOutcome::Moving { steps: 3 });
        assert_eq!(report.steps.len(), 3);
        assert_eq!((report.steps[2].col, report.steps[2].row), (3, 0));
    }

    #[test]
    fn test_apply_blocks_ignores_missing_tiles() {
        let mut grid = open_grid();
        apply_blocks(&mut grid, &[Hex::new(1, 0), Hex::new(99, 99)]);
        assert!(grid.is_blocked(Hex::new(1, 0)));
        assert_eq!(grid.passable_count(), 35);
    }

    #[test]
    fn test_walk_counts_ticks() {
        let mut grid = open_grid();
        let from = grid.tile_at_offset(0, 0).unwrap().center;
        let to = grid.tile_at_offset(1, 0).unwrap().center;
        let ticks = walk(&mut grid, &args_for(from, to), 1000.0).unwrap();
        assert_eq!(ticks, 1);
        assert!(grid.tiles().iter().all(|t| t.occupants().is_empty()));

        assert!(walk(&mut grid, &args_for(from, from), 1000.0).is_none());
    }

    #[test]
    fn test_stalled_walk_does_not_arrive() {
        let mut grid = open_grid();
        let from = grid.tile_at_offset(0, 0).unwrap().center;
        let to = grid.tile_at_offset(3, 3).unwrap().center;
        assert_eq!(walk(&mut grid, &args_for(from, to), 0.0), None);
    }

    #[test]
    fn test_validate_args_rejects_bad_walk() {
        let mut args = args_for(Point::default(), Point::default());
        assert!(validate_args(&args).is_ok());

        args.walk_speed = Some(0.0);
        assert!(validate_args(&args).is_err());
        args.walk_speed = Some(f64::NAN);
        assert!(validate_args(&args).is_err());
        args.walk_speed = Some(30.0);
        assert!(validate_args(&args).is_ok());

        args.dt = -0.1;
        assert!(validate_args(&args).is_err());
    }
}
