//! Threads a lock and key chain across the dead ends of a carved maze.
//!
//! The goal's only connection is locked first. Its key goes into a random leaf
//! room, that leaf's connection is locked in turn, and its key goes into the
//! next leaf, picked as the second farthest of the remaining pool. The last
//! leaf of the chain is left open, so the player starts the chain there.

use rand_chacha::rand_core::Rng;
use tracing::{debug, warn};

use super::seed::roll;
use crate::content::{Cell, Connection, EncounterTier, Enemy, Item, Key, Room};
use crate::error::InvariantViolation;
use crate::progress::ProgressSink;
use crate::topology::GridTopology;
use crate::types::{ConnectionId, Coord, KeyId};

/// One lock of the chain and the room holding its key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainLink {
    pub key: KeyId,
    pub lock: ConnectionId,
    pub holder: Coord,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyChain {
    /// Ordered from the goal's lock outwards.
    pub links: Vec<ChainLink>,
    pub pool_size: usize,
}

pub(super) struct KeyDistributor<'a> {
    topology: &'a mut GridTopology,
    start: Coord,
    end: Coord,
    next_key: u32,
}

impl<'a> KeyDistributor<'a> {
    pub(super) fn new(topology: &'a mut GridTopology, start: Coord, end: Coord) -> Self {
        Self { topology, start, end, next_key: 0 }
    }

    /// Dead ends other than the start and goal, row-major.
    pub(super) fn leaf_pool(&self) -> Result<Vec<Coord>, InvariantViolation> {
        let mut pool = Vec::new();
        for cell in self.topology.cells() {
            let at = cell.coord;
            if self.topology.degree(at) >= 2 || at == self.start || at == self.end {
                continue;
            }
            if !cell.is_room() {
                return Err(InvariantViolation::LeafNotRoom { at });
            }
            pool.push(at);
        }
        Ok(pool)
    }

    pub(super) fn distribute<R: Rng + ?Sized, P: ProgressSink + ?Sized>(
        mut self,
        rng: &mut R,
        progress: &mut P,
    ) -> Result<KeyChain, InvariantViolation> {
        progress.report("Finding tree leaves".to_string());
        let mut pool = self.leaf_pool()?;
        let pool_size = pool.len();
        let mut chain = KeyChain { links: Vec::new(), pool_size };

        let (mut key, mut lock) = self.lock_edge_of(self.end, rng)?;

        if pool.is_empty() {
            warn!(
                row = self.start.row,
                column = self.start.column,
                "no spare dead ends; the goal key is left in the start room"
            );
            self.place_key(self.start, key, rng)?;
            chain.links.push(ChainLink { key, lock, holder: self.start });
            return Ok(chain);
        }

        let mut current = Some(pool.swap_remove(roll(rng, pool.len())));
        while let Some(leaf) = current {
            let placed = chain.links.len() + 1;
            progress.report(format!("Distributing locks and keys... ({placed}/{pool_size})"));

            let tier = EncounterTier::for_chain_position(placed, pool_size);
            let room = self.room_mut(leaf)?;
            room.enemies.clear();
            room.enemies.push(Enemy::random(tier, rng));
            self.place_key(leaf, key, rng)?;
            chain.links.push(ChainLink { key, lock, holder: leaf });

            current = take_second_farthest(&mut pool, leaf);
            if current.is_some() {
                (key, lock) = self.lock_edge_of(leaf, rng)?;
            }
        }

        debug!(locks = chain.links.len(), pool = pool_size, "distributed key chain");
        Ok(chain)
    }

    fn room_mut(&mut self, at: Coord) -> Result<&mut Room, InvariantViolation> {
        self.topology
            .cell_mut(at)
            .and_then(Cell::room_mut)
            .ok_or(InvariantViolation::LeafNotRoom { at })
    }

    fn place_key<R: Rng + ?Sized>(
        &mut self,
        at: Coord,
        key: KeyId,
        rng: &mut R,
    ) -> Result<(), InvariantViolation> {
        let item = Item::Key(Key::random(key, rng));
        self.room_mut(at)?.items.push(item);
        Ok(())
    }

    /// Replaces the first connection of `at` with a freshly locked one.
    fn lock_edge_of<R: Rng + ?Sized>(
        &mut self,
        at: Coord,
        rng: &mut R,
    ) -> Result<(KeyId, ConnectionId), InvariantViolation> {
        let id = *self
            .topology
            .incident_connections(at)
            .first()
            .ok_or(InvariantViolation::MissingConnection { at })?;
        let key = KeyId(self.next_key);
        self.next_key += 1;
        self.topology.replace_connection(id, Connection::random_locked(key, rng))?;
        Ok((key, id))
    }
}

/// Ranks the pool by distance from `from`, farthest first with ties going to
/// the lower coordinate, and removes the runner-up (or the only entry).
fn take_second_farthest(pool: &mut Vec<Coord>, from: Coord) -> Option<Coord> {
    let ranks_before = |a: Coord, b: Coord| {
        let (da, db) = (a.distance_squared(from), b.distance_squared(from));
        da > db || (da == db && a < b)
    };

    let mut first: Option<usize> = None;
    let mut second: Option<usize> = None;
    for (index, &candidate) in pool.iter().enumerate() {
        match first {
            Some(best) if !ranks_before(candidate, pool[best]) => {
                if second.is_none_or(|runner| ranks_before(candidate, pool[runner])) {
                    second = Some(index);
                }
            }
            _ => {
                second = first;
                first = Some(index);
            }
        }
    }

    let chosen = second.or(first)?;
    Some(pool.swap_remove(chosen))
}

#[cfg(test)]
mod tests {
    use rand_chacha::ChaCha8Rng;
    use rand_chacha::rand_core::SeedableRng;

    use super::*;
    use crate::progress::Silent;

    #[test]
    fn second_farthest_wins_and_ties_go_to_the_lower_coordinate() {
        let from = Coord::new(0, 0);
        let mut pool = vec![Coord::new(1, 1), Coord::new(4, 4), Coord::new(0, 3), Coord::new(3, 0)];
        assert_eq!(take_second_farthest(&mut pool, from), Some(Coord::new(0, 3)));
        assert_eq!(take_second_farthest(&mut pool, from), Some(Coord::new(3, 0)));
        assert_eq!(take_second_farthest(&mut pool, from), Some(Coord::new(1, 1)));
        assert_eq!(take_second_farthest(&mut pool, from), Some(Coord::new(4, 4)));
        assert_eq!(take_second_farthest(&mut pool, from), None);
    }

    /// Hand-carved 3x3 tree with start (0,1), goal (2,2) and two spare leaves.
    fn two_leaf_maze(rng: &mut ChaCha8Rng) -> GridTopology {
        let start = Coord::new(0, 1);
        let end = Coord::new(2, 2);
        let leaves = [Coord::new(0, 0), Coord::new(2, 1)];

        let mut topology = GridTopology::new(3);
        for row in 0..3 {
            for column in 0..3 {
                let at = Coord::new(row, column);
                let cell = if at == start || at == end {
                    Cell::empty_room(at, rng)
                } else if leaves.contains(&at) {
                    Cell::random_room(at, rng)
                } else {
                    Cell::passage(at, rng)
                };
                topology.add_cell(cell).expect("free slot");
            }
        }
        let edges = [
            ((0, 1), (0, 2)),
            ((0, 2), (1, 2)),
            ((1, 2), (1, 1)),
            ((1, 1), (1, 0)),
            ((1, 0), (2, 0)),
            ((2, 0), (2, 1)),
            ((1, 2), (2, 2)),
            ((1, 0), (0, 0)),
        ];
        for ((ar, ac), (br, bc)) in edges {
            let connection = Connection::random_unlocked(rng);
            topology
                .add_connection(Coord::new(ar, ac), Coord::new(br, bc), connection)
                .expect("tree edge");
        }
        topology
    }

    #[test]
    fn two_spare_leaves_get_two_locks_and_two_keys() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let mut topology = two_leaf_maze(&mut rng);
        let start = Coord::new(0, 1);
        let end = Coord::new(2, 2);

        let distributor = KeyDistributor::new(&mut topology, start, end);
        assert_eq!(distributor.leaf_pool(), Ok(vec![Coord::new(0, 0), Coord::new(2, 1)]));
        let mut messages = Vec::new();
        let chain = distributor.distribute(&mut rng, &mut messages).expect("distribute");

        assert_eq!(chain.pool_size, 2);
        assert_eq!(chain.links.len(), 2);
        let locked =
            topology.connections().filter(|(_, _, connection)| connection.is_locked()).count();
        assert_eq!(locked, 2);

        let placed_keys: Vec<KeyId> = topology
            .cells()
            .filter_map(Cell::room)
            .flat_map(|room| room.keys().map(|key| key.id))
            .collect();
        assert_eq!(placed_keys.len(), 2);

        let goal_lock =
            topology.connection_between(end, Coord::new(1, 2)).and_then(Connection::key);
        assert_eq!(goal_lock, Some(KeyId(0)));
        assert_eq!(chain.links[0].key, KeyId(0));

        let first = chain.links[0].holder;
        let second = chain.links[1].holder;
        assert_ne!(first, second);
        let first_lock = topology.incident_connections(first)[0];
        assert_eq!(topology.connection(first_lock).and_then(Connection::key), Some(KeyId(1)));
        let last_lock = topology.incident_connections(second)[0];
        assert!(topology.connection(last_lock).is_some_and(|connection| !connection.is_locked()));

        let tiers: Vec<_> = [first, second]
            .iter()
            .map(|&at| topology.cell(at).and_then(Cell::room).map(|room| room.enemies.clone()))
            .collect();
        assert_eq!(tiers[0].as_ref().map(|enemies| enemies[0].tier), Some(EncounterTier::MiniBoss));
        assert_eq!(tiers[1].as_ref().map(|enemies| enemies[0].tier), Some(EncounterTier::Boss));
        assert!(tiers.iter().flatten().all(|enemies| enemies.len() == 1));

        assert_eq!(
            messages,
            vec![
                "Finding tree leaves".to_string(),
                "Distributing locks and keys... (1/2)".to_string(),
                "Distributing locks and keys... (2/2)".to_string(),
            ]
        );
    }

    #[test]
    fn empty_pool_leaves_the_goal_key_at_the_start() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut topology = GridTopology::new(3);
        let line = [Coord::new(0, 0), Coord::new(0, 1), Coord::new(0, 2)];
        for at in line {
            topology.add_cell(Cell::empty_room(at, &mut rng)).expect("free slot");
        }
        for pair in line.windows(2) {
            topology
                .add_connection(pair[0], pair[1], Connection::random_unlocked(&mut rng))
                .expect("edge");
        }

        let chain = KeyDistributor::new(&mut topology, line[0], line[2])
            .distribute(&mut rng, &mut Silent)
            .expect("distribute");
        assert_eq!(chain.pool_size, 0);
        assert_eq!(chain.links, vec![ChainLink {
            key: KeyId(0),
            lock: chain.links[0].lock,
            holder: line[0],
        }]);
        let start_room = topology.cell(line[0]).and_then(Cell::room).expect("room");
        assert_eq!(start_room.keys().map(|key| key.id).collect::<Vec<_>>(), vec![KeyId(0)]);
    }

    #[test]
    fn passage_in_the_pool_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut topology = GridTopology::new(3);
        let line = [Coord::new(1, 0), Coord::new(1, 1), Coord::new(1, 2), Coord::new(2, 2)];
        for at in line {
            topology.add_cell(Cell::passage(at, &mut rng)).expect("free slot");
        }
        topology
            .add_connection(line[0], line[1], Connection::random_unlocked(&mut rng))
            .expect("edge");
        topology
            .add_connection(line[1], line[2], Connection::random_unlocked(&mut rng))
            .expect("edge");
        topology
            .add_connection(line[1], line[3], Connection::random_unlocked(&mut rng))
            .expect("edge");

        let distributor = KeyDistributor::new(&mut topology, line[0], line[2]);
        assert_eq!(distributor.leaf_pool(), Err(InvariantViolation::LeafNotRoom { at: line[3] }));
    }
}
