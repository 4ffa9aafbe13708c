//! Simple undirected grid graph: cells in a row-major arena, connections in a
//! slot map keyed by stable ids.
//!
//! Replacing a cell or a connection swaps the value in place, so ids and
//! incidence lists never change identity underneath callers.

use std::collections::VecDeque;
use std::mem;

use slotmap::SlotMap;

use crate::content::{Cell, Connection};
use crate::error::InvariantViolation;
use crate::types::{ConnectionId, Coord, Direction};

#[derive(Clone, Debug, PartialEq, Eq)]
struct Link {
    ends: [Coord; 2],
    connection: Connection,
}

impl Link {
    fn other(&self, at: Coord) -> Coord {
        if self.ends[0] == at { self.ends[1] } else { self.ends[0] }
    }

    fn joins(&self, a: Coord, b: Coord) -> bool {
        (self.ends[0] == a && self.ends[1] == b) || (self.ends[0] == b && self.ends[1] == a)
    }
}

#[derive(Clone, Debug)]
pub struct GridTopology {
    side: usize,
    cells: Vec<Option<Cell>>,
    incident: Vec<Vec<ConnectionId>>,
    links: SlotMap<ConnectionId, Link>,
}

impl GridTopology {
    pub fn new(side: usize) -> Self {
        let slots = side * side;
        Self {
            side,
            cells: vec![None; slots],
            incident: vec![Vec::new(); slots],
            links: SlotMap::with_key(),
        }
    }

    pub fn side(&self) -> usize {
        self.side
    }

    fn slot(&self, at: Coord) -> Option<usize> {
        let side = self.side as i32;
        if at.row < 0 || at.column < 0 || at.row >= side || at.column >= side {
            return None;
        }
        Some(at.row as usize * self.side + at.column as usize)
    }

    fn occupied_slot(&self, at: Coord) -> Result<usize, InvariantViolation> {
        self.slot(at)
            .filter(|&slot| self.cells[slot].is_some())
            .ok_or(InvariantViolation::MissingCell { at })
    }

    /// Bounds-checked lookup; out of range and empty positions both yield `None`.
    pub fn get(&self, row: i32, column: i32) -> Option<&Cell> {
        self.cell(Coord::new(row, column))
    }

    pub fn cell(&self, at: Coord) -> Option<&Cell> {
        self.slot(at).and_then(|slot| self.cells[slot].as_ref())
    }

    pub fn cell_mut(&mut self, at: Coord) -> Option<&mut Cell> {
        self.slot(at).and_then(|slot| self.cells[slot].as_mut())
    }

    pub fn contains(&self, at: Coord) -> bool {
        self.cell(at).is_some()
    }

    pub fn add_cell(&mut self, cell: Cell) -> Result<(), InvariantViolation> {
        let at = cell.coord;
        let slot = self.slot(at).ok_or(InvariantViolation::OutOfBounds { at, side: self.side })?;
        if self.cells[slot].is_some() {
            return Err(InvariantViolation::CellOccupied { at });
        }
        self.cells[slot] = Some(cell);
        Ok(())
    }

    /// Removes a cell together with every connection touching it.
    pub fn remove_cell(&mut self, at: Coord) -> Result<Cell, InvariantViolation> {
        let slot = self.occupied_slot(at)?;
        for id in self.incident[slot].clone() {
            self.remove_connection(id)?;
        }
        self.cells[slot].take().ok_or(InvariantViolation::MissingCell { at })
    }

    pub fn add_connection(
        &mut self,
        a: Coord,
        b: Coord,
        connection: Connection,
    ) -> Result<ConnectionId, InvariantViolation> {
        if a == b {
            return Err(InvariantViolation::SelfLoop { at: a });
        }
        let slot_a = self.occupied_slot(a)?;
        let slot_b = self.occupied_slot(b)?;
        if self.connection_id_between(a, b).is_some() {
            return Err(InvariantViolation::ParallelConnection { a, b });
        }

        let id = self.links.insert(Link { ends: [a, b], connection });
        self.incident[slot_a].push(id);
        self.incident[slot_b].push(id);
        Ok(id)
    }

    pub fn remove_connection(
        &mut self,
        id: ConnectionId,
    ) -> Result<Connection, InvariantViolation> {
        let link = self.links.remove(id).ok_or(InvariantViolation::UnknownConnection)?;
        for end in link.ends {
            if let Some(slot) = self.slot(end) {
                self.incident[slot].retain(|&incident| incident != id);
            }
        }
        Ok(link.connection)
    }

    /// Cells joined to `at` by a connection, in connection creation order.
    pub fn neighbors(&self, at: Coord) -> impl Iterator<Item = Coord> + '_ {
        self.incident_connections(at)
            .iter()
            .filter_map(move |&id| self.links.get(id).map(|link| link.other(at)))
    }

    pub fn degree(&self, at: Coord) -> usize {
        self.incident_connections(at).len()
    }

    pub fn incident_connections(&self, at: Coord) -> &[ConnectionId] {
        match self.slot(at) {
            Some(slot) => &self.incident[slot],
            None => &[],
        }
    }

    pub fn connection_id_between(&self, a: Coord, b: Coord) -> Option<ConnectionId> {
        self.incident_connections(a)
            .iter()
            .copied()
            .find(|&id| self.links.get(id).is_some_and(|link| link.joins(a, b)))
    }

    pub fn connection_between(&self, a: Coord, b: Coord) -> Option<&Connection> {
        self.connection_id_between(a, b).and_then(|id| self.connection(id))
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.links.get(id).map(|link| &link.connection)
    }

    pub fn connection_mut(&mut self, id: ConnectionId) -> Option<&mut Connection> {
        self.links.get_mut(id).map(|link| &mut link.connection)
    }

    pub fn endpoints(&self, id: ConnectionId) -> Option<[Coord; 2]> {
        self.links.get(id).map(|link| link.ends)
    }

    /// The far end of `id` as seen from `at`.
    pub fn opposite(&self, id: ConnectionId, at: Coord) -> Option<Coord> {
        self.links.get(id).filter(|link| link.ends.contains(&at)).map(|link| link.other(at))
    }

    /// Swaps the cell stored at `at` for `replacement`, keeping every incident
    /// connection attached. Nothing changes on error.
    pub fn replace_cell(
        &mut self,
        at: Coord,
        replacement: Cell,
    ) -> Result<Cell, InvariantViolation> {
        if replacement.coord != at {
            return Err(InvariantViolation::CoordinateMismatch {
                expected: at,
                found: replacement.coord,
            });
        }
        let slot = self.occupied_slot(at)?;
        self.cells[slot].replace(replacement).ok_or(InvariantViolation::MissingCell { at })
    }

    /// Swaps the connection value behind `id`; endpoints are untouched.
    pub fn replace_connection(
        &mut self,
        id: ConnectionId,
        replacement: Connection,
    ) -> Result<Connection, InvariantViolation> {
        let link = self.links.get_mut(id).ok_or(InvariantViolation::UnknownConnection)?;
        Ok(mem::replace(&mut link.connection, replacement))
    }

    /// Present cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().flatten()
    }

    pub fn connections(&self) -> impl Iterator<Item = (ConnectionId, [Coord; 2], &Connection)> {
        self.links.iter().map(|(id, link)| (id, link.ends, &link.connection))
    }

    pub fn cell_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    pub fn connection_count(&self) -> usize {
        self.links.len()
    }

    /// Existing cells orthogonally adjacent to `at`, in north, east, south,
    /// west order, whether or not they are connected to it.
    pub fn grid_neighbors(&self, at: Coord) -> impl Iterator<Item = Coord> + '_ {
        Direction::ALL
            .into_iter()
            .map(move |direction| at.step(direction))
            .filter(|&next| self.contains(next))
    }

    pub fn is_connected(&self) -> bool {
        let Some(first) = self.cells().next().map(|cell| cell.coord) else {
            return true;
        };
        let mut seen = vec![false; self.cells.len()];
        let mut queue = VecDeque::from([first]);
        let mut reached = 0;
        while let Some(at) = queue.pop_front() {
            let Some(slot) = self.slot(at) else { continue };
            if seen[slot] {
                continue;
            }
            seen[slot] = true;
            reached += 1;
            queue.extend(self.neighbors(at));
        }
        reached == self.cell_count()
    }
}
