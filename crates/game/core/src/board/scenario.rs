//! Scenario description: placed sub-boards plus the special points the
//! game modes care about.
//!
//! Scenario files are parsed elsewhere; the engine consumes this already
//! resolved in-memory form. Sub-board tiles arrive pre-rotated, the
//! rotation tag is kept as metadata only.

use crate::common::{Orientation, Position};

use super::tile::Tile;

/// Quarter-turn rotation a sub-board was placed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoardRotation {
    #[default]
    None,
    Quarter,
    Half,
    ThreeQuarter,
}

/// One rectangular tile grid placed into the scenario.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubBoard {
    pub name: String,
    /// Offset of the top-left tile in scenario coordinates.
    pub grid_position: Position,
    pub width: i32,
    pub height: i32,
    pub rotation: BoardRotation,
    /// Row-major tiles, `width * height` entries.
    pub tiles: Vec<Tile>,
}

impl SubBoard {
    /// Tile at local coordinates, if inside this sub-board.
    pub fn tile(&self, local_x: i32, local_y: i32) -> Option<&Tile> {
        if local_x < 0 || local_y < 0 || local_x >= self.width || local_y >= self.height {
            return None;
        }
        self.tiles.get((local_y * self.width + local_x) as usize)
    }
}

/// Numbered point of interest (starting point or flag).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpecialPoint {
    pub number: u8,
    pub position: Position,
}

/// A complete playfield.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scenario {
    pub name: String,
    /// Bounding size in tiles; sub-boards may leave gaps, which read as
    /// edge tiles.
    pub width: i32,
    pub height: i32,
    pub boards: Vec<SubBoard>,
    /// Race starting points, ordered by number.
    pub starting_points: Vec<SpecialPoint>,
    /// Deathmatch starting points, ordered by number.
    pub starting_points_deathmatch: Vec<SpecialPoint>,
    /// Flags to visit in hunt-the-flag mode, ordered by number.
    pub flags: Vec<SpecialPoint>,
    /// Where the flag spawns in king-of-the-flag mode.
    pub king_of_flag_point: Position,
    /// The hill tile in king-of-the-hill mode.
    pub king_of_hill_point: Position,
    pub start_orientation: Orientation,
    pub max_players: u8,
}

impl Scenario {
    /// Starting point for the given participant number (1-based).
    pub fn starting_point(&self, number: u8, deathmatch: bool) -> Option<Position> {
        let points = if deathmatch {
            &self.starting_points_deathmatch
        } else {
            &self.starting_points
        };
        points
            .iter()
            .find(|p| p.number == number)
            .map(|p| p.position)
    }
}
