pub mod content;
pub mod error;
pub mod map;
pub mod mapgen;
pub mod persist;
pub mod progress;
pub mod topology;
pub mod types;

pub use content::{Cell, CellKind, Connection, ConnectionKind, Item, Key, Lock, Room};
pub use error::{GenerationError, InvariantViolation, RestoreError};
pub use map::MapData;
pub use mapgen::{MapGenerator, ZoneTable, audit_map, generate_map};
pub use persist::{FlatConnection, FlatMap};
pub use progress::ProgressSink;
pub use topology::GridTopology;
pub use types::*;
