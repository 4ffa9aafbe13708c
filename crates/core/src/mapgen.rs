//! Maze generation split into carving, grouping, key distribution and audit.

mod audit;
mod carver;
mod generator;
mod groups;
mod keys;
pub(crate) mod seed;

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;

pub use audit::audit_map;
pub use generator::{MAX_GRID_SIDE, MIN_GRID_SIDE, MapGenerator};
pub use groups::{MIN_ZONE_SIZE, ZoneTable};
pub use keys::{ChainLink, KeyChain};
pub use seed::derive_map_seed;

use crate::error::GenerationError;
use crate::map::MapData;
use crate::progress::Silent;

/// Generates a map from a run seed with a ChaCha source and no progress output.
pub fn generate_map(run_seed: u64, grid_side: usize) -> Result<MapData, GenerationError> {
    let generator = MapGenerator::new(grid_side)?;
    let mut rng = ChaCha8Rng::seed_from_u64(derive_map_seed(run_seed, grid_side));
    generator.generate(&mut rng, &mut Silent)
}
