//! The finished map aggregate handed to gameplay, rendering and persistence.

use xxhash_rust::xxh3::xxh3_64;

use crate::content::{Cell, CellKind, Connection, ConnectionKind, Enemy, Item, Room};
use crate::mapgen::ZoneTable;
use crate::topology::GridTopology;
use crate::types::{ConnectionId, Coord, KeyId};

/// A generated maze: cell graph, start and goal, and the zone table.
///
/// Structure is fixed once generation finishes. Room contents, visibility and
/// connection lock state stay mutable for gameplay.
#[derive(Clone, Debug)]
pub struct MapData {
    topology: GridTopology,
    start: Coord,
    end: Coord,
    zones: ZoneTable,
}

impl MapData {
    pub(crate) fn from_parts(
        topology: GridTopology,
        start: Coord,
        end: Coord,
        zones: ZoneTable,
    ) -> Self {
        Self { topology, start, end, zones }
    }

    pub fn side(&self) -> usize {
        self.topology.side()
    }

    pub fn topology(&self) -> &GridTopology {
        &self.topology
    }

    pub fn get(&self, row: i32, column: i32) -> Option<&Cell> {
        self.topology.get(row, column)
    }

    pub fn cell(&self, at: Coord) -> Option<&Cell> {
        self.topology.cell(at)
    }

    pub fn start(&self) -> Coord {
        self.start
    }

    pub fn end(&self) -> Coord {
        self.end
    }

    pub fn zones(&self) -> &ZoneTable {
        &self.zones
    }

    pub fn zone_of(&self, at: Coord) -> Option<usize> {
        self.zones.zone_of(at)
    }

    pub fn zone_count(&self) -> usize {
        self.zones.count()
    }

    pub fn neighbors(&self, at: Coord) -> impl Iterator<Item = Coord> + '_ {
        self.topology.neighbors(at)
    }

    pub fn degree(&self, at: Coord) -> usize {
        self.topology.degree(at)
    }

    pub fn connection_between(&self, a: Coord, b: Coord) -> Option<&Connection> {
        self.topology.connection_between(a, b)
    }

    pub fn incident_connections(&self, at: Coord) -> &[ConnectionId] {
        self.topology.incident_connections(at)
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.topology.connection(id)
    }

    pub fn endpoints(&self, id: ConnectionId) -> Option<[Coord; 2]> {
        self.topology.endpoints(id)
    }

    pub fn room_mut(&mut self, at: Coord) -> Option<&mut Room> {
        self.topology.cell_mut(at).and_then(Cell::room_mut)
    }

    pub fn connection_mut(&mut self, id: ConnectionId) -> Option<&mut Connection> {
        self.topology.connection_mut(id)
    }

    /// Returns false when there is no cell at `at`.
    pub fn set_visible(&mut self, at: Coord, visible: bool) -> bool {
        match self.topology.cell_mut(at) {
            Some(cell) => {
                cell.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Room currently holding the key with this id, if it is still on the map.
    pub fn key_location(&self, key: KeyId) -> Option<Coord> {
        self.topology
            .cells()
            .find(|cell| cell.room().is_some_and(|room| room.keys().any(|held| held.id == key)))
            .map(|cell| cell.coord)
    }

    pub fn locked_connections(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.topology
            .connections()
            .filter(|(_, _, connection)| connection.is_locked())
            .map(|(id, _, _)| id)
    }

    /// Cells with a single connection, row-major, start and goal included.
    pub fn leaves(&self) -> Vec<Coord> {
        self.topology
            .cells()
            .map(|cell| cell.coord)
            .filter(|&at| self.topology.degree(at) == 1)
            .collect()
    }

    /// Edge list keyed by endpoint pairs, each pair ordered, sorted.
    pub fn edges(&self) -> Vec<([Coord; 2], &Connection)> {
        let mut edges: Vec<_> = self
            .topology
            .connections()
            .map(|(_, [a, b], connection)| (if a <= b { [a, b] } else { [b, a] }, connection))
            .collect();
        edges.sort_by_key(|(ends, _)| *ends);
        edges
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend((self.side() as u32).to_le_bytes());
        push_coord(&mut bytes, self.start);
        push_coord(&mut bytes, self.end);

        bytes.extend((self.topology.cell_count() as u32).to_le_bytes());
        for cell in self.topology.cells() {
            push_cell(&mut bytes, cell);
        }

        let edges = self.edges();
        bytes.extend((edges.len() as u32).to_le_bytes());
        for ([a, b], connection) in edges {
            push_coord(&mut bytes, a);
            push_coord(&mut bytes, b);
            push_connection(&mut bytes, connection);
        }

        bytes.extend((self.zones.count() as u32).to_le_bytes());
        for row in self.zones.rows() {
            for &zone in row {
                bytes.extend((zone as u32).to_le_bytes());
            }
        }
        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }
}

fn push_coord(bytes: &mut Vec<u8>, at: Coord) {
    bytes.extend(at.row.to_le_bytes());
    bytes.extend(at.column.to_le_bytes());
}

fn push_cell(bytes: &mut Vec<u8>, cell: &Cell) {
    push_coord(bytes, cell.coord);
    bytes.push(cell.surface.floor as u8);
    bytes.push(cell.surface.walls as u8);
    bytes.push(cell.surface.lighting as u8);
    bytes.push(u8::from(cell.visible));
    match &cell.kind {
        CellKind::Passage => bytes.push(0),
        CellKind::Room(room) => {
            bytes.push(1);
            bytes.extend((room.enemies.len() as u32).to_le_bytes());
            for enemy in &room.enemies {
                push_enemy(bytes, enemy);
            }
            bytes.extend((room.items.len() as u32).to_le_bytes());
            for item in &room.items {
                match item {
                    Item::Key(key) => {
                        bytes.push(0);
                        bytes.extend(key.id.0.to_le_bytes());
                        bytes.push(key.size as u8);
                        bytes.push(key.material as u8);
                        bytes.push(key.quality as u8);
                    }
                    Item::Crown => bytes.push(1),
                    Item::HealthChest => bytes.push(2),
                }
            }
        }
    }
}

fn push_enemy(bytes: &mut Vec<u8>, enemy: &Enemy) {
    bytes.push(enemy.family as u8);
    bytes.push(enemy.tier as u8);
    match enemy.gear {
        Some(gear) => {
            bytes.push(1);
            bytes.push(gear.weapon as u8);
            bytes.push(gear.armour as u8);
        }
        None => bytes.push(0),
    }
}

fn push_connection(bytes: &mut Vec<u8>, connection: &Connection) {
    match connection.kind {
        ConnectionKind::Opening(style) => bytes.extend([0, style as u8]),
        ConnectionKind::Door(material) => bytes.extend([1, material as u8]),
        ConnectionKind::Gate(material) => bytes.extend([2, material as u8]),
    }
    bytes.push(connection.size as u8);
    bytes.push(u8::from(connection.is_open));
    match connection.lock {
        Some(lock) => {
            bytes.push(1);
            bytes.extend(lock.key.0.to_le_bytes());
            bytes.push(u8::from(lock.engaged));
        }
        None => bytes.push(0),
    }
}
