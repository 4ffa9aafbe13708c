mod config;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mazegen::mapgen::{MapGenerator, audit_map, derive_map_seed};
use mazegen::progress::{self, ProgressSink, Silent};
use mazegen::{FlatMap, MapData};
use rand_chacha::{ChaCha8Rng, rand_core::SeedableRng};

use crate::config::{MapConfig, Overrides};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a map, print its summary, optionally draw and save it
    Generate(GenerateArgs),
    /// Load a saved map, audit it and print its summary
    Inspect(InspectArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// Grid side length
    #[arg(short, long)]
    size: Option<usize>,
    /// Run seed
    #[arg(long)]
    seed: Option<u64>,
    /// TOML file with default settings
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Where to write the map as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Draw the maze as text
    #[arg(long)]
    ascii: bool,
    /// Echo generation progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Args)]
struct InspectArgs {
    /// Path to a map JSON file written by `generate --output`
    #[arg(short, long)]
    input: PathBuf,
    /// Draw the maze as text
    #[arg(long)]
    ascii: bool,
}

fn main() -> Result<()> {
    match Cli::parse().command {
        Command::Generate(args) => generate(args),
        Command::Inspect(args) => inspect(args),
    }
}

fn generate(args: GenerateArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => MapConfig::load(path)?,
        None => MapConfig::default(),
    };
    let settings = config.resolve(Overrides {
        grid_side: args.size,
        seed: args.seed,
        output: args.output,
        ascii: args.ascii,
    });

    let generator = MapGenerator::new(settings.grid_side)?;
    let mut rng = ChaCha8Rng::seed_from_u64(derive_map_seed(settings.seed, settings.grid_side));
    let mut silent = Silent;
    let mut echo = progress::from_fn(|message: &str| eprintln!("{message}"));
    let sink: &mut dyn ProgressSink = if args.verbose { &mut echo } else { &mut silent };

    let map = generator
        .generate(&mut rng, sink)
        .with_context(|| format!("Generation failed for seed {}", settings.seed))?;

    println!("Seed: {}", settings.seed);
    report(&map, settings.ascii);

    if let Some(path) = settings.output {
        map.to_flat()
            .write_atomic(&path)
            .with_context(|| format!("Failed to write map file: {}", path.display()))?;
        println!("Saved to {}", path.display());
    }
    Ok(())
}

fn inspect(args: InspectArgs) -> Result<()> {
    let flat = FlatMap::load(&args.input)
        .with_context(|| format!("Failed to read map file: {}", args.input.display()))?;
    let map = MapData::from_flat(flat).with_context(|| "Map file does not describe a valid maze")?;
    audit_map(&map).with_context(|| "Map failed the structural audit")?;

    report(&map, args.ascii);
    Ok(())
}

fn report(map: &MapData, ascii: bool) {
    for line in render::summary(map) {
        println!("{line}");
    }
    for line in render::chain_report(map) {
        println!("  {line}");
    }
    if ascii {
        println!();
        println!("{}", render::render_ascii(map));
        println!("{}", render::LEGEND);
    }
}
