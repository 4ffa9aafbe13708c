//! Randomised depth-first carving of a spanning tree over a filled grid.

use rand_chacha::rand_core::Rng;
use tracing::trace;

use super::groups::{GroupId, GroupManager};
use super::seed::roll;
use crate::content::{Cell, Connection};
use crate::error::InvariantViolation;
use crate::progress::ProgressSink;
use crate::topology::GridTopology;
use crate::types::Coord;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum CarveState {
    Exploring,
    Backtracking,
    Done,
}

pub(super) struct CarveOutcome {
    pub(super) start: Coord,
    pub(super) end: Coord,
    pub(super) groups: GroupManager,
}

pub(super) struct MazeCarver {
    stack: Vec<Coord>,
    state: CarveState,
    groups: GroupManager,
    current: GroupId,
    start: Coord,
    end: Option<Coord>,
    promoted: Vec<bool>,
    side: usize,
}

impl MazeCarver {
    /// Claims `start` for the root group and turns it into an empty room.
    pub(super) fn new<R: Rng + ?Sized>(
        topology: &mut GridTopology,
        start: Coord,
        rng: &mut R,
    ) -> Result<Self, InvariantViolation> {
        let side = topology.side();
        topology.replace_cell(start, Cell::empty_room(start, rng))?;

        let mut groups = GroupManager::new(side);
        let current = groups.new_group(None);
        groups.claim(current, start)?;

        let mut promoted = vec![false; side * side];
        promoted[start.row as usize * side + start.column as usize] = true;

        Ok(Self {
            stack: vec![start],
            state: CarveState::Exploring,
            groups,
            current,
            start,
            end: None,
            promoted,
            side,
        })
    }

    pub(super) fn state(&self) -> CarveState {
        self.state
    }

    pub(super) fn end(&self) -> Option<Coord> {
        self.end
    }

    /// Pops one cell and either extends the maze from it or retires it.
    pub(super) fn step<R: Rng + ?Sized, P: ProgressSink + ?Sized>(
        &mut self,
        topology: &mut GridTopology,
        rng: &mut R,
        progress: &mut P,
    ) -> Result<CarveState, InvariantViolation> {
        let Some(at) = self.stack.pop() else {
            self.state = CarveState::Done;
            return Ok(self.state);
        };

        let open: Vec<Coord> =
            topology.grid_neighbors(at).filter(|&next| !self.groups.contains(next)).collect();
        if open.is_empty() {
            self.retire(at, topology, rng, progress)?;
            self.state = CarveState::Backtracking;
            return Ok(self.state);
        }

        self.stack.push(at);
        let next = open[roll(rng, open.len())];
        topology.add_connection(at, next, Connection::random_unlocked(rng))?;
        self.groups.claim(self.current, next)?;
        self.stack.push(next);
        self.state = CarveState::Exploring;
        Ok(self.state)
    }

    fn retire<R: Rng + ?Sized, P: ProgressSink + ?Sized>(
        &mut self,
        at: Coord,
        topology: &mut GridTopology,
        rng: &mut R,
        progress: &mut P,
    ) -> Result<(), InvariantViolation> {
        if self.end.is_none() && at != self.start {
            trace!(row = at.row, column = at.column, "first dead end becomes the goal");
            self.end = Some(at);
        }

        let slot = at.row as usize * self.side + at.column as usize;
        if topology.degree(at) == 1 && !self.promoted[slot] {
            let replacement = if self.end == Some(at) {
                Cell::empty_room(at, rng)
            } else {
                Cell::random_room(at, rng)
            };
            topology.replace_cell(at, replacement)?;
            self.promoted[slot] = true;
        }

        if self.state == CarveState::Exploring {
            let parent = self.groups.group_of(at).ok_or(InvariantViolation::Unzoned { at })?;
            self.current = self.groups.new_group(Some(parent));
            progress.report(format!(
                "Generating maze structure...({}/{})",
                self.groups.claimed(),
                self.side * self.side
            ));
        }
        Ok(())
    }

    pub(super) fn run<R: Rng + ?Sized, P: ProgressSink + ?Sized>(
        mut self,
        topology: &mut GridTopology,
        rng: &mut R,
        progress: &mut P,
    ) -> Result<CarveOutcome, InvariantViolation> {
        while self.step(topology, rng, progress)? != CarveState::Done {}
        let end = self.end().ok_or(InvariantViolation::NoDeadEnd)?;
        Ok(CarveOutcome { start: self.start, end, groups: self.groups })
    }
}
