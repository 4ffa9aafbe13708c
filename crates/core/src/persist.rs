//! Flat, serializable form of a finished map and its JSON file storage.
//!
//! The flat form is a row-major cell grid, an edge list keyed by endpoint
//! pairs, the start and goal, and the zone table. Locks keep their `KeyId`s, so
//! a restored map pairs the same keys with the same locks.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::content::{Cell, Connection};
use crate::error::{InvariantViolation, RestoreError};
use crate::map::MapData;
use crate::mapgen::{MAX_GRID_SIDE, MIN_GRID_SIDE, ZoneTable};
use crate::topology::GridTopology;
use crate::types::{Coord, Direction, KeyId};

pub const FLAT_FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FlatConnection {
    pub a: Coord,
    pub b: Coord,
    pub connection: Connection,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FlatMap {
    pub format_version: u32,
    pub grid_side: usize,
    pub cells: Vec<Cell>,
    pub connections: Vec<FlatConnection>,
    pub start: Coord,
    pub end: Coord,
    pub zones: Vec<Vec<usize>>,
    pub zone_count: usize,
}

impl FlatMap {
    pub fn write_atomic(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;

        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, path)?;

        Ok(())
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

impl MapData {
    pub fn to_flat(&self) -> FlatMap {
        FlatMap {
            format_version: FLAT_FORMAT_VERSION,
            grid_side: self.side(),
            cells: self.topology().cells().cloned().collect(),
            connections: self
                .edges()
                .into_iter()
                .map(|([a, b], connection)| FlatConnection { a, b, connection: *connection })
                .collect(),
            start: self.start(),
            end: self.end(),
            zones: self.zones().rows().map(<[usize]>::to_vec).collect(),
            zone_count: self.zone_count(),
        }
    }

    /// Rebuilds a map from its flat form. Structure is checked; gameplay
    /// state such as picked-up keys is taken as found.
    pub fn from_flat(flat: FlatMap) -> Result<Self, RestoreError> {
        if flat.format_version != FLAT_FORMAT_VERSION {
            return Err(RestoreError::FormatVersion { found: flat.format_version });
        }
        let side = flat.grid_side;
        if !(MIN_GRID_SIDE..=MAX_GRID_SIDE).contains(&side) {
            return Err(RestoreError::GridSide { side, min: MIN_GRID_SIDE, max: MAX_GRID_SIDE });
        }
        if flat.cells.len() != side * side {
            return Err(RestoreError::CellCount { expected: side * side, found: flat.cells.len() });
        }

        let mut topology = GridTopology::new(side);
        for (slot, cell) in flat.cells.into_iter().enumerate() {
            let expected = Coord::new((slot / side) as i32, (slot % side) as i32);
            if cell.coord != expected {
                return Err(RestoreError::MisplacedCell { slot, found: cell.coord });
            }
            topology.add_cell(cell)?;
        }

        let mut lock_keys: Vec<KeyId> = Vec::new();
        for FlatConnection { a, b, connection } in flat.connections {
            if Direction::between(a, b).is_none() {
                return Err(InvariantViolation::NotAdjacent { a, b }.into());
            }
            if let Some(key) = connection.key() {
                if lock_keys.contains(&key) {
                    return Err(InvariantViolation::DuplicateKey { key }.into());
                }
                lock_keys.push(key);
            }
            topology.add_connection(a, b, connection)?;
        }

        for at in [flat.start, flat.end] {
            if !topology.contains(at) {
                return Err(InvariantViolation::MissingCell { at }.into());
            }
        }

        let zones = ZoneTable::from_rows(flat.zones, flat.zone_count)?;
        if zones.side() != side {
            return Err(RestoreError::ZoneTableShape { side });
        }

        Ok(MapData::from_parts(topology, flat.start, flat.end, zones))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::generate_map;

    #[test]
    fn flat_form_survives_json() {
        let map = generate_map(31, 5).expect("generates");
        let flat = map.to_flat();
        let json = serde_json::to_string(&flat).expect("serializes");
        let decoded: FlatMap = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(flat, decoded);
    }

    #[test]
    fn edges_are_listed_once_in_endpoint_order() {
        let map = generate_map(8, 4).expect("generates");
        let flat = map.to_flat();
        assert_eq!(flat.connections.len(), 15);
        assert!(flat.connections.iter().all(|edge| edge.a < edge.b));
        assert!(
            flat.connections.windows(2).all(|pair| (pair[0].a, pair[0].b) < (pair[1].a, pair[1].b))
        );
    }

    #[test]
    fn rejects_unknown_format_versions() {
        let mut flat = generate_map(2, 3).expect("generates").to_flat();
        flat.format_version = 99;
        assert!(matches!(MapData::from_flat(flat), Err(RestoreError::FormatVersion { found: 99 })));
    }

    #[test]
    fn rejects_cells_out_of_place() {
        let mut flat = generate_map(2, 3).expect("generates").to_flat();
        flat.cells.swap(0, 1);
        assert!(matches!(
            MapData::from_flat(flat),
            Err(RestoreError::MisplacedCell { slot: 0, found }) if found == Coord::new(0, 1)
        ));
    }

    #[test]
    fn rejects_a_key_shared_by_two_locks() {
        let mut flat = generate_map(14, 6).expect("generates").to_flat();
        let locked: Vec<usize> = flat
            .connections
            .iter()
            .enumerate()
            .filter(|(_, edge)| edge.connection.is_locked())
            .map(|(index, _)| index)
            .collect();
        let first_key = flat.connections[locked[0]].connection.lock.map(|lock| lock.key);
        let unlocked = flat
            .connections
            .iter()
            .position(|edge| edge.connection.lock.is_none())
            .expect("most connections are unlocked");
        flat.connections[unlocked].connection =
            flat.connections[locked[0]].connection;

        let result = MapData::from_flat(flat);
        assert!(matches!(
            result,
            Err(RestoreError::Topology(InvariantViolation::DuplicateKey { key }))
                if Some(key) == first_key
        ));
    }

    #[test]
    fn rejects_parallel_edges() {
        let mut flat = generate_map(6, 3).expect("generates").to_flat();
        let duplicate = flat.connections[0].clone();
        flat.connections.push(FlatConnection { a: duplicate.b, b: duplicate.a, ..duplicate });
        assert!(matches!(
            MapData::from_flat(flat),
            Err(RestoreError::Topology(InvariantViolation::ParallelConnection { .. }))
        ));
    }

    #[test]
    fn rejects_grid_sides_outside_the_supported_range() {
        for side in [0, 2, MAX_GRID_SIDE + 1, 1 << 33, usize::MAX] {
            let mut flat = generate_map(5, 5).expect("generates").to_flat();
            flat.grid_side = side;
            assert!(matches!(
                MapData::from_flat(flat),
                Err(RestoreError::GridSide { side: found, .. }) if found == side
            ));
        }
    }

    #[test]
    fn rejects_connections_between_distant_cells() {
        let mut flat = generate_map(9, 4).expect("generates").to_flat();
        let edge = flat.connections.remove(0);
        flat.connections.push(FlatConnection { a: Coord::new(0, 0), b: Coord::new(2, 2), ..edge });
        assert!(matches!(
            MapData::from_flat(flat),
            Err(RestoreError::Topology(InvariantViolation::NotAdjacent { a, b }))
                if a == Coord::new(0, 0) && b == Coord::new(2, 2)
        ));
    }
}
