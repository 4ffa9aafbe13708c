use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct ConnectionId;
}

/// Grid address of a cell. Rows grow southwards, columns eastwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: i32,
    pub column: i32,
}

impl Coord {
    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    pub fn step(self, direction: Direction) -> Self {
        let (row_offset, column_offset) = direction.offset();
        Self { row: self.row + row_offset, column: self.column + column_offset }
    }

    pub fn distance_squared(self, other: Self) -> u64 {
        let rows = u64::from(self.row.abs_diff(other.row));
        let columns = u64::from(self.column.abs_diff(other.column));
        rows * rows + columns * columns
    }

    pub fn distance(self, other: Self) -> f64 {
        (self.distance_squared(other) as f64).sqrt()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];

    pub fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (-1, 0),
            Self::East => (0, 1),
            Self::South => (1, 0),
            Self::West => (0, -1),
        }
    }

    /// Direction of `to` as seen from `from`, if the two are grid-adjacent.
    pub fn between(from: Coord, to: Coord) -> Option<Self> {
        Self::ALL.into_iter().find(|&direction| from.step(direction) == to)
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }
}

/// Identity of a key item. A lock refers to its key by this id only, so the
/// key can change hands without the lock noticing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct KeyId(pub u32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn between_finds_only_cardinal_neighbours() {
        let origin = Coord::new(2, 2);
        assert_eq!(Direction::between(origin, Coord::new(1, 2)), Some(Direction::North));
        assert_eq!(Direction::between(origin, Coord::new(2, 3)), Some(Direction::East));
        assert_eq!(Direction::between(origin, Coord::new(3, 3)), None);
        assert_eq!(Direction::between(origin, origin), None);
    }

    #[test]
    fn euclidean_distance_agrees_with_squared_distance() {
        let a = Coord::new(0, 0);
        let b = Coord::new(3, 4);
        assert_eq!(a.distance_squared(b), 25);
        assert!((a.distance(b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stepping_there_and_back_returns_home() {
        let origin = Coord::new(5, 5);
        for direction in Direction::ALL {
            assert_eq!(origin.step(direction).step(direction.opposite()), origin);
        }
    }
}
