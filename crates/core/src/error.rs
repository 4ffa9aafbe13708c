//! Error types for map generation and map restoration.

use thiserror::Error;

use crate::types::{Coord, KeyId};

/// A broken structural guarantee. Fatal to the generation attempt that raised it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("cell {at:?} cannot connect to itself")]
    SelfLoop { at: Coord },

    #[error("cells {a:?} and {b:?} are already connected")]
    ParallelConnection { a: Coord, b: Coord },

    #[error("cells {a:?} and {b:?} are not grid neighbours")]
    NotAdjacent { a: Coord, b: Coord },

    #[error("no cell at {at:?}")]
    MissingCell { at: Coord },

    #[error("a cell already occupies {at:?}")]
    CellOccupied { at: Coord },

    #[error("{at:?} lies outside a {side}x{side} grid")]
    OutOfBounds { at: Coord, side: usize },

    #[error("replacement for {expected:?} is addressed at {found:?}")]
    CoordinateMismatch { expected: Coord, found: Coord },

    #[error("connection is not part of this map")]
    UnknownConnection,

    #[error("cell {at:?} has no incident connection")]
    MissingConnection { at: Coord },

    #[error("cell {at:?} was claimed by two traversal groups")]
    ClaimedTwice { at: Coord },

    #[error("traversal group {group} is sealed and cannot take {at:?}")]
    SealedGroup { group: usize, at: Coord },

    #[error("cell {at:?} was never assigned a zone")]
    Unzoned { at: Coord },

    #[error("carving finished without reaching a dead end")]
    NoDeadEnd,

    #[error("leaf {at:?} is not a room")]
    LeafNotRoom { at: Coord },

    #[error("end cell {at:?} is not a well-formed goal room")]
    MalformedEnd { at: Coord },

    #[error("start and end both sit at {at:?}")]
    StartIsEnd { at: Coord },

    #[error("expected a spanning tree of {cells} cells but found {connections} connections")]
    NotSpanningTree { cells: usize, connections: usize },

    #[error("lock for {key:?} has no key placed on the map")]
    KeyNotPlaced { key: KeyId },

    #[error("{key:?} appears more than once")]
    DuplicateKey { key: KeyId },

    #[error("{key:?} does not open any connection")]
    OrphanKey { key: KeyId },

    #[error("zone {zone} is outside the {count} zones of the map")]
    ZoneOutOfRange { zone: usize, count: usize },

    #[error("zone {zone} holds only {size} cells")]
    UndersizedZone { zone: usize, size: usize },

    #[error("end cell {at:?} cannot be reached from the start")]
    UnreachableEnd { at: Coord },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("invalid configuration for grid side {grid_side}: {reason}")]
    InvalidConfiguration { grid_side: usize, reason: String },

    #[error(transparent)]
    InvariantViolation(#[from] InvariantViolation),
}

/// Rejection of a flat map representation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RestoreError {
    #[error("unsupported flat map format version {found}")]
    FormatVersion { found: u32 },

    #[error("grid side {side} is outside {min}..={max}")]
    GridSide { side: usize, min: usize, max: usize },

    #[error("expected {expected} cells but found {found}")]
    CellCount { expected: usize, found: usize },

    #[error("cell at slot {slot} is addressed at {found:?}")]
    MisplacedCell { slot: usize, found: Coord },

    #[error("zone table is not {side}x{side}")]
    ZoneTableShape { side: usize },

    #[error(transparent)]
    Topology(#[from] InvariantViolation),
}
