use anyhow::{Context, Result, ensure};
use clap::Parser;
use mazegen::mapgen::{MIN_GRID_SIDE, audit_map, generate_map};
use mazegen::MapData;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 500)]
    runs: u32,
    #[arg(short, long, default_value_t = 24)]
    max_size: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();
    ensure!(args.max_size >= MIN_GRID_SIDE, "--max-size must be at least {MIN_GRID_SIDE}");

    println!(
        "Fuzzing {} maps from seed {} with sides {}..={}...",
        args.runs, args.seed, MIN_GRID_SIDE, args.max_size
    );
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let span = (args.max_size - MIN_GRID_SIDE + 1) as u64;

    let mut locks = 0;
    let mut degraded = 0;
    for run in 0..args.runs {
        let map_seed = rng.next_u64();
        let side = MIN_GRID_SIDE + (rng.next_u64() % span) as usize;

        let map = generate_map(map_seed, side)
            .with_context(|| format!("run {run}: seed {map_seed} side {side} failed to generate"))?;
        let again = generate_map(map_seed, side).context("second generation failed")?;
        ensure!(
            map.fingerprint() == again.fingerprint(),
            "run {run}: seed {map_seed} side {side} is not deterministic"
        );

        let restored = MapData::from_flat(map.to_flat())
            .with_context(|| format!("run {run}: flat form of seed {map_seed} was rejected"))?;
        ensure!(
            restored.fingerprint() == map.fingerprint(),
            "run {run}: seed {map_seed} side {side} changed across a flat round trip"
        );
        audit_map(&restored)
            .with_context(|| format!("run {run}: restored seed {map_seed} failed the audit"))?;

        let chain = map.locked_connections().count();
        locks += chain;
        if chain == 1 {
            degraded += 1;
        }
    }

    println!("Fuzz passed: {} maps, {} locks, {} single-lock chains.", args.runs, locks, degraded);
    Ok(())
}
