//! Structural checks run on every finished map, generated or restored.

use std::collections::{BTreeMap, VecDeque};

use super::groups::MIN_ZONE_SIZE;
use crate::content::{Cell, Item};
use crate::error::InvariantViolation;
use crate::map::MapData;
use crate::types::{ConnectionId, Coord, Direction, KeyId};

/// Verifies the spanning tree, leaf rooms, the goal room, lock and key
/// pairing, zone coverage, and that the goal can be reached from the start by
/// collecting keys along the way.
pub fn audit_map(map: &MapData) -> Result<(), InvariantViolation> {
    check_tree(map)?;
    check_rooms(map)?;
    check_keys(map)?;
    check_zones(map)?;
    check_reachable(map)
}

fn check_tree(map: &MapData) -> Result<(), InvariantViolation> {
    let topology = map.topology();
    let side = map.side();
    for row in 0..side as i32 {
        for column in 0..side as i32 {
            if topology.get(row, column).is_none() {
                return Err(InvariantViolation::MissingCell { at: Coord::new(row, column) });
            }
        }
    }

    for (_, [a, b], _) in topology.connections() {
        if Direction::between(a, b).is_none() {
            return Err(InvariantViolation::NotAdjacent { a, b });
        }
    }

    let cells = topology.cell_count();
    let connections = topology.connection_count();
    if connections + 1 != cells || !topology.is_connected() {
        return Err(InvariantViolation::NotSpanningTree { cells, connections });
    }
    if map.start() == map.end() {
        return Err(InvariantViolation::StartIsEnd { at: map.start() });
    }
    Ok(())
}

fn check_rooms(map: &MapData) -> Result<(), InvariantViolation> {
    let end = map.end();
    let goal = map.cell(end).and_then(Cell::room);
    if !goal.is_some_and(|room| room.has_crown() && room.enemies.is_empty()) {
        return Err(InvariantViolation::MalformedEnd { at: end });
    }
    if !map.cell(map.start()).is_some_and(Cell::is_room) {
        return Err(InvariantViolation::LeafNotRoom { at: map.start() });
    }
    for at in map.leaves() {
        if !map.cell(at).is_some_and(Cell::is_room) {
            return Err(InvariantViolation::LeafNotRoom { at });
        }
    }
    Ok(())
}

fn check_keys(map: &MapData) -> Result<(), InvariantViolation> {
    let mut locks: BTreeMap<KeyId, ConnectionId> = BTreeMap::new();
    for (id, _, connection) in map.topology().connections() {
        if let Some(lock) = connection.lock {
            if locks.insert(lock.key, id).is_some() {
                return Err(InvariantViolation::DuplicateKey { key: lock.key });
            }
        }
    }

    let mut placed: BTreeMap<KeyId, Coord> = BTreeMap::new();
    for cell in map.topology().cells() {
        for item in cell.room().map(|room| room.items.as_slice()).unwrap_or_default() {
            if let Item::Key(key) = item {
                if placed.insert(key.id, cell.coord).is_some() {
                    return Err(InvariantViolation::DuplicateKey { key: key.id });
                }
            }
        }
    }

    if let Some(&key) = locks.keys().find(|key| !placed.contains_key(key)) {
        return Err(InvariantViolation::KeyNotPlaced { key });
    }
    if let Some(&key) = placed.keys().find(|key| !locks.contains_key(key)) {
        return Err(InvariantViolation::OrphanKey { key });
    }
    Ok(())
}

fn check_zones(map: &MapData) -> Result<(), InvariantViolation> {
    let zones = map.zones();
    for cell in map.topology().cells() {
        let zone = zones.zone_of(cell.coord).ok_or(InvariantViolation::Unzoned { at: cell.coord })?;
        if zone >= zones.count() {
            return Err(InvariantViolation::ZoneOutOfRange { zone, count: zones.count() });
        }
    }
    // Zone 0 is the root group and may stay small.
    for (zone, &size) in zones.zone_sizes().iter().enumerate().skip(1) {
        if size < MIN_ZONE_SIZE {
            return Err(InvariantViolation::UndersizedZone { zone, size });
        }
    }
    Ok(())
}

/// Walks from the start picking up every key found, opening a locked
/// connection once its key is in hand, until nothing new is reachable.
fn check_reachable(map: &MapData) -> Result<(), InvariantViolation> {
    let side = map.side();
    let slot = |at: Coord| at.row as usize * side + at.column as usize;

    let mut visited = vec![false; side * side];
    let mut held: Vec<KeyId> = Vec::new();
    let mut blocked: Vec<(ConnectionId, Coord)> = Vec::new();
    let mut queue = VecDeque::from([map.start()]);

    loop {
        while let Some(at) = queue.pop_front() {
            if visited[slot(at)] {
                continue;
            }
            visited[slot(at)] = true;
            if let Some(room) = map.cell(at).and_then(Cell::room) {
                held.extend(room.keys().map(|key| key.id));
            }
            for &id in map.incident_connections(at) {
                let Some(next) = map.topology().opposite(id, at) else { continue };
                if visited[slot(next)] {
                    continue;
                }
                match map.connection(id) {
                    Some(connection) if connection.can_pass(&held) => queue.push_back(next),
                    Some(_) => blocked.push((id, next)),
                    None => return Err(InvariantViolation::UnknownConnection),
                }
            }
        }

        let (ready, waiting): (Vec<_>, Vec<_>) = blocked.into_iter().partition(|&(id, _)| {
            map.connection(id).is_some_and(|connection| connection.can_pass(&held))
        });
        blocked = waiting;
        if ready.is_empty() {
            break;
        }
        queue.extend(ready.into_iter().map(|(_, next)| next));
    }

    if visited[slot(map.end())] {
        Ok(())
    } else {
        Err(InvariantViolation::UnreachableEnd { at: map.end() })
    }
}
