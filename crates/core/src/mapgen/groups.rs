//! Traversal groups recorded while carving, and their collapse into a flat
//! per-cell zone table for the renderer.

use std::mem;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{InvariantViolation, RestoreError};
use crate::progress::ProgressSink;
use crate::types::Coord;

/// Groups with fewer members than this are folded into an ancestor.
pub const MIN_ZONE_SIZE: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(super) struct GroupId(usize);

#[derive(Clone, Debug)]
struct TraversalGroup {
    members: Vec<Coord>,
    parent: Option<GroupId>,
    depth: usize,
    sealed: bool,
}

/// Build-time bookkeeping of which traversal group claimed each cell.
#[derive(Clone, Debug)]
pub(super) struct GroupManager {
    side: usize,
    groups: Vec<TraversalGroup>,
    owner: Vec<Option<GroupId>>,
    claimed: usize,
}

impl GroupManager {
    pub(super) fn new(side: usize) -> Self {
        Self { side, groups: Vec::new(), owner: vec![None; side * side], claimed: 0 }
    }

    fn slot(&self, at: Coord) -> Option<usize> {
        let side = self.side as i32;
        (at.row >= 0 && at.column >= 0 && at.row < side && at.column < side)
            .then(|| at.row as usize * self.side + at.column as usize)
    }

    /// Opens a group under `parent`, sealing whichever group was in progress.
    pub(super) fn new_group(&mut self, parent: Option<GroupId>) -> GroupId {
        if let Some(previous) = self.groups.last_mut() {
            previous.sealed = true;
        }
        let depth = parent.map_or(0, |GroupId(index)| self.groups[index].depth + 1);
        self.groups.push(TraversalGroup { members: Vec::new(), parent, depth, sealed: false });
        GroupId(self.groups.len() - 1)
    }

    pub(super) fn claim(&mut self, group: GroupId, at: Coord) -> Result<(), InvariantViolation> {
        let slot = self.slot(at).ok_or(InvariantViolation::OutOfBounds { at, side: self.side })?;
        if self.owner[slot].is_some() {
            return Err(InvariantViolation::ClaimedTwice { at });
        }
        let entry = &mut self.groups[group.0];
        if entry.sealed {
            return Err(InvariantViolation::SealedGroup { group: group.0, at });
        }
        entry.members.push(at);
        self.owner[slot] = Some(group);
        self.claimed += 1;
        Ok(())
    }

    pub(super) fn contains(&self, at: Coord) -> bool {
        self.group_of(at).is_some()
    }

    pub(super) fn group_of(&self, at: Coord) -> Option<GroupId> {
        self.slot(at).and_then(|slot| self.owner[slot])
    }

    pub(super) fn claimed(&self) -> usize {
        self.claimed
    }

    pub(super) fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Folds undersized groups into their nearest surviving ancestor, shallowest
    /// first, and numbers the survivors densely in that order.
    pub(super) fn collapse<P: ProgressSink + ?Sized>(
        self,
        progress: &mut P,
    ) -> Result<ZoneTable, InvariantViolation> {
        let Self { side, mut groups, owner, .. } = self;
        let total = groups.len();

        let mut order: Vec<usize> = (0..total).collect();
        order.sort_by_key(|&index| groups[index].depth);

        let mut absorbed_into: Vec<Option<usize>> = vec![None; total];
        let survivor = |absorbed_into: &[Option<usize>], mut index: usize| {
            while let Some(next) = absorbed_into[index] {
                index = next;
            }
            index
        };

        for (processed, &index) in order.iter().enumerate() {
            progress.report(format!("Grouping nodes... ({}/{total})", processed + 1));
            let Some(GroupId(parent)) = groups[index].parent else { continue };
            if groups[index].members.len() >= MIN_ZONE_SIZE {
                continue;
            }
            let target = survivor(&absorbed_into, parent);
            let members = mem::take(&mut groups[index].members);
            groups[target].members.extend(members);
            absorbed_into[index] = Some(target);
        }

        let mut zone_of_group = vec![0; total];
        let mut count = 0;
        for &index in &order {
            if absorbed_into[index].is_none() {
                zone_of_group[index] = count;
                count += 1;
            }
        }

        let mut zones = Vec::with_capacity(side * side);
        for (slot, owner) in owner.iter().enumerate() {
            let at = Coord::new((slot / side) as i32, (slot % side) as i32);
            let GroupId(group) = owner.ok_or(InvariantViolation::Unzoned { at })?;
            zones.push(zone_of_group[survivor(&absorbed_into, group)]);
        }

        debug!(groups = total, zones = count, "collapsed traversal groups");
        Ok(ZoneTable { side, zones, count })
    }
}

/// Final zone id of every cell, row-major. Purely presentational.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZoneTable {
    side: usize,
    zones: Vec<usize>,
    count: usize,
}

impl ZoneTable {
    /// Checks shape and range; used when rebuilding a map from its flat form.
    pub fn from_rows(rows: Vec<Vec<usize>>, count: usize) -> Result<Self, RestoreError> {
        let side = rows.len();
        if rows.iter().any(|row| row.len() != side) {
            return Err(RestoreError::ZoneTableShape { side });
        }
        let zones: Vec<usize> = rows.into_iter().flatten().collect();
        if let Some(&zone) = zones.iter().find(|&&zone| zone >= count) {
            return Err(InvariantViolation::ZoneOutOfRange { zone, count }.into());
        }
        Ok(Self { side, zones, count })
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn zone_of(&self, at: Coord) -> Option<usize> {
        let side = self.side as i32;
        if at.row < 0 || at.column < 0 || at.row >= side || at.column >= side {
            return None;
        }
        self.zones.get(at.row as usize * self.side + at.column as usize).copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[usize]> {
        self.zones.chunks(self.side.max(1))
    }

    pub fn zone_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.count];
        for &zone in &self.zones {
            if let Some(size) = sizes.get_mut(zone) {
                *size += 1;
            }
        }
        sizes
    }
}
