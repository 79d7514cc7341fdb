//! Generate command - write a random map file

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use hexpath_core::MapConfig;

#[derive(Args)]
pub struct GenerateArgs {
    /// Output JSON file
    #[arg(long, value_name = "FILE")]
    pub output: PathBuf,

    /// Map columns
    #[arg(long, default_value = "20")]
    pub width: usize,

    /// Map rows
    #[arg(long, default_value = "15")]
    pub height: usize,

    /// Probability that a cell is ocean
    #[arg(long, default_value = "0.25")]
    pub density: f64,

    /// Hex radius in pixels
    #[arg(long, default_value = "32.0")]
    pub hex_size: f64,

    /// Map name (defaults to the output file stem)
    #[arg(long)]
    pub name: Option<String>,
}

pub fn run(args: GenerateArgs, seed: Option<u64>) -> Result<()> {
    let config = generate(&args, seed)?;

    config
        .save(&args.output)
        .with_context(|| format!("Failed to write map: {}", args.output.display()))?;

    tracing::info!(
        "Wrote {}x{} map '{}' to {}",
        args.width,
        args.height,
        config.name,
        args.output.display()
    );
    Ok(())
}

fn generate(args: &GenerateArgs, seed: Option<u64>) -> Result<MapConfig> {
    if args.width == 0 || args.height == 0 {
        anyhow::bail!("Map dimensions must be positive, got {}x{}", args.width, args.height);
    }
    if !(0.0..=1.0).contains(&args.density) {
        anyhow::bail!("Ocean density must be between 0 and 1, got {}", args.density);
    }

    let name = args.name.clone().unwrap_or_else(|| {
        args.output
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "generated".to_string())
    });

    let mut rng = create_rng(seed);
    let mut config = MapConfig::random(&mut rng, &name, args.width, args.height, args.density);
    config.hex_size = args.hex_size;

    // Surface layout problems now rather than when the map is loaded
    config.build_grid()?;

    Ok(config)
}

/// Create RNG from optional seed
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}
