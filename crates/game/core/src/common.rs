//! Shared geometric primitives used by the board and the actors.
//!
//! The grid uses screen coordinates: `x` grows east, `y` grows south,
//! so north is `y - 1`.

use strum::EnumIter;

/// Index of an actor in the engine's actor table.
///
/// Backrefs (tile occupancy, pushed-by, shot-by) use ids instead of
/// references so state stays plainly copyable and borrow-friendly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorId(pub u8);

impl ActorId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl core::fmt::Display for ActorId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// Position on the board grid.
///
/// Signed so that out-of-bounds neighbors of cell (0, 0) remain
/// representable; the board synthesizes edge tiles for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Neighbor cell one step in the given direction.
    #[must_use]
    pub fn step(self, direction: Orientation) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Cell `count` steps in the given direction.
    #[must_use]
    pub fn step_by(self, direction: Orientation, count: i32) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx * count, self.y + dy * count)
    }
}

/// Cardinal facing on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    North,
    East,
    South,
    West,
}

/// Lookup tables instead of per-call match chains; the resolvers hit
/// these on every step of every beam and belt.
const OPPOSITE: [Orientation; 4] = [
    Orientation::South,
    Orientation::West,
    Orientation::North,
    Orientation::East,
];

const LEFT: [Orientation; 4] = [
    Orientation::West,
    Orientation::North,
    Orientation::East,
    Orientation::South,
];

const RIGHT: [Orientation; 4] = [
    Orientation::East,
    Orientation::South,
    Orientation::West,
    Orientation::North,
];

const DELTA: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

impl Orientation {
    pub const ALL: [Orientation; 4] = [
        Orientation::North,
        Orientation::East,
        Orientation::South,
        Orientation::West,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Self {
        OPPOSITE[self as usize]
    }

    #[inline]
    #[must_use]
    pub const fn left(self) -> Self {
        LEFT[self as usize]
    }

    #[inline]
    #[must_use]
    pub const fn right(self) -> Self {
        RIGHT[self as usize]
    }

    /// Unit step for this direction as `(dx, dy)`.
    #[inline]
    pub const fn delta(self) -> (i32, i32) {
        DELTA[self as usize]
    }

    #[must_use]
    pub const fn rotated(self, rotation: Rotation) -> Self {
        match rotation {
            Rotation::None => self,
            Rotation::Left => self.left(),
            Rotation::Right => self.right(),
        }
    }
}

/// Rotation applied to an actor, e.g. by a gear or a curved belt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rotation {
    #[default]
    None,
    Left,
    Right,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_tables_are_consistent() {
        for o in Orientation::ALL {
            assert_eq!(o.left().right(), o);
            assert_eq!(o.opposite().opposite(), o);
            assert_eq!(o.left().left(), o.opposite());
        }
    }

    #[test]
    fn step_uses_screen_coordinates() {
        let pos = Position::new(3, 3);
        assert_eq!(pos.step(Orientation::North), Position::new(3, 2));
        assert_eq!(pos.step(Orientation::South), Position::new(3, 4));
        assert_eq!(pos.step(Orientation::East), Position::new(4, 3));
        assert_eq!(pos.step(Orientation::West), Position::new(2, 3));
        assert_eq!(pos.step_by(Orientation::West, 2), Position::new(1, 3));
    }
}
