//! Generation pipeline: fill the grid, carve, zone, distribute keys, audit.

use rand_chacha::rand_core::Rng;
use tracing::{debug, info};

use super::audit::audit_map;
use super::carver::MazeCarver;
use super::keys::{KeyChain, KeyDistributor};
use super::seed::roll;
use crate::content::{Cell, Item};
use crate::error::{GenerationError, InvariantViolation};
use crate::map::MapData;
use crate::progress::ProgressSink;
use crate::topology::GridTopology;
use crate::types::Coord;

/// Smallest grid that leaves room for a distinct start and goal.
pub const MIN_GRID_SIDE: usize = 3;
pub const MAX_GRID_SIDE: usize = 128;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapGenerator {
    grid_side: usize,
}

impl MapGenerator {
    pub fn new(grid_side: usize) -> Result<Self, GenerationError> {
        if grid_side < MIN_GRID_SIDE {
            return Err(GenerationError::InvalidConfiguration {
                grid_side,
                reason: format!("grid side must be at least {MIN_GRID_SIDE}"),
            });
        }
        if grid_side > MAX_GRID_SIDE {
            return Err(GenerationError::InvalidConfiguration {
                grid_side,
                reason: format!("grid side must be at most {MAX_GRID_SIDE}"),
            });
        }
        Ok(Self { grid_side })
    }

    pub fn grid_side(&self) -> usize {
        self.grid_side
    }

    /// Runs the whole pipeline once. Any broken invariant aborts the attempt;
    /// callers retry with a fresh random source rather than resuming.
    pub fn generate<R, P>(&self, rng: &mut R, progress: &mut P) -> Result<MapData, GenerationError>
    where
        R: Rng + ?Sized,
        P: ProgressSink + ?Sized,
    {
        self.generate_with_chain(rng, progress).map(|(map, _)| map)
    }

    /// Like [`MapGenerator::generate`], also returning the lock chain laid out.
    pub fn generate_with_chain<R, P>(
        &self,
        rng: &mut R,
        progress: &mut P,
    ) -> Result<(MapData, KeyChain), GenerationError>
    where
        R: Rng + ?Sized,
        P: ProgressSink + ?Sized,
    {
        let side = self.grid_side;
        info!(grid_side = side, "generating map");

        let mut topology = fill_grid(side, rng, progress)?;

        progress.report("Generating maze structure...".to_string());
        let start = Coord::new(roll(rng, side) as i32, roll(rng, side) as i32);
        let carver = MazeCarver::new(&mut topology, start, rng)?;
        let carved = carver.run(&mut topology, rng, progress)?;
        debug!(
            start = ?carved.start,
            end = ?carved.end,
            groups = carved.groups.group_count(),
            "carved spanning tree"
        );

        let zones = carved.groups.collapse(progress)?;
        let chain = KeyDistributor::new(&mut topology, carved.start, carved.end)
            .distribute(rng, progress)?;

        finish_goal(&mut topology, carved.end)?;
        let map = MapData::from_parts(topology, carved.start, carved.end, zones);

        progress.report("Verifying key chain".to_string());
        audit_map(&map)?;

        info!(
            grid_side = side,
            locks = chain.links.len(),
            zones = map.zone_count(),
            fingerprint = map.fingerprint(),
            "map generated"
        );
        Ok((map, chain))
    }
}

fn fill_grid<R, P>(
    side: usize,
    rng: &mut R,
    progress: &mut P,
) -> Result<GridTopology, InvariantViolation>
where
    R: Rng + ?Sized,
    P: ProgressSink + ?Sized,
{
    progress.report("Creating data structures...".to_string());
    let mut topology = GridTopology::new(side);
    let total = side * side;
    for row in 0..side {
        progress.report(format!("Creating map node {} of {total}", row * side + 1));
        for column in 0..side {
            topology.add_cell(Cell::random(Coord::new(row as i32, column as i32), rng))?;
        }
    }
    Ok(topology)
}

/// The goal room holds the crown, no enemies, and is visible from the outset.
fn finish_goal(topology: &mut GridTopology, end: Coord) -> Result<(), InvariantViolation> {
    let cell = topology.cell_mut(end).ok_or(InvariantViolation::MissingCell { at: end })?;
    cell.visible = true;
    let room = cell.room_mut().ok_or(InvariantViolation::MalformedEnd { at: end })?;
    room.enemies.clear();
    room.items.push(Item::Crown);
    Ok(())
}
