//! Tile model: floor kinds, wall kinds and per-phase activity masks.
//!
//! A tile owns one floor and four walls. Board elements that only work in
//! some register phases (pushers, lasers, auto pits, fire walls) carry a
//! [`PhaseMask`] with one bit per phase.

use bitflags::bitflags;
use strum::EnumIter;

use crate::common::{Orientation, Rotation};
use crate::config::GameConfig;

bitflags! {
    /// Register phases in which a board element is active.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct PhaseMask: u8 {
        const PHASE_1 = 1 << 0;
        const PHASE_2 = 1 << 1;
        const PHASE_3 = 1 << 2;
        const PHASE_4 = 1 << 3;
        const PHASE_5 = 1 << 4;
    }
}

impl PhaseMask {
    pub const ALL_PHASES: PhaseMask = PhaseMask::all();

    /// Whether the element works in the given phase (1-based).
    pub fn contains_phase(self, phase: u8) -> bool {
        debug_assert!((1..=GameConfig::PHASES_PER_ROUND).contains(&phase));
        self.bits() & (1 << (phase - 1)) != 0
    }
}

impl Default for PhaseMask {
    fn default() -> Self {
        PhaseMask::all()
    }
}

/// Floor of a tile.
///
/// Belt floors combine with the tile alignment to define their transport
/// direction, see [`Tile::belt_direction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FloorKind {
    #[default]
    Normal,
    /// Outside the playable area; robots fall here.
    Edge,
    Pit,
    WaterPit,
    HazardPit,
    /// Pit with a trap door, deadly in phases where the floor is inactive.
    AutoPit,
    Belt1Straight,
    Belt1CurveLeft,
    Belt1CurveRight,
    Belt1TLeft,
    Belt1TRight,
    Belt1TBoth,
    Belt2Straight,
    Belt2CurveLeft,
    Belt2CurveRight,
    Belt2TLeft,
    Belt2TRight,
    Belt2TBoth,
    /// Straight 1x belt that also counts as water.
    WaterDrain,
    GearLeft,
    GearRight,
    Repair,
    /// Repair site that also hands out an option in the full board game.
    RepairOptions,
    Water,
    Oil,
    Hazard,
    Randomizer,
    Teleporter,
}

impl FloorKind {
    /// Belt speed, `None` for non-belt floors.
    pub fn belt_speed(self) -> Option<u8> {
        use FloorKind::*;
        match self {
            Belt2Straight | Belt2CurveLeft | Belt2CurveRight | Belt2TLeft | Belt2TRight
            | Belt2TBoth => Some(2),
            Belt1Straight | Belt1CurveLeft | Belt1CurveRight | Belt1TLeft | Belt1TRight
            | Belt1TBoth | WaterDrain => Some(1),
            _ => None,
        }
    }

    pub fn is_belt(self) -> bool {
        self.belt_speed().is_some()
    }

    pub fn is_express_belt(self) -> bool {
        self.belt_speed() == Some(2)
    }

    fn is_curve_left(self) -> bool {
        matches!(self, FloorKind::Belt1CurveLeft | FloorKind::Belt2CurveLeft)
    }

    fn is_curve_right(self) -> bool {
        matches!(self, FloorKind::Belt1CurveRight | FloorKind::Belt2CurveRight)
    }

    fn is_t_left(self) -> bool {
        matches!(self, FloorKind::Belt1TLeft | FloorKind::Belt2TLeft)
    }

    fn is_t_right(self) -> bool {
        matches!(self, FloorKind::Belt1TRight | FloorKind::Belt2TRight)
    }

    fn is_t_both(self) -> bool {
        matches!(self, FloorKind::Belt1TBoth | FloorKind::Belt2TBoth)
    }

    /// Open pits, excluding the phase-dependent auto pit.
    pub fn is_pit(self) -> bool {
        matches!(
            self,
            FloorKind::Pit | FloorKind::WaterPit | FloorKind::HazardPit
        )
    }

    /// Floors that sap movement force at the start of a card move.
    pub fn slows_movement(self) -> bool {
        matches!(
            self,
            FloorKind::Water | FloorKind::WaterDrain | FloorKind::Oil
        )
    }

    pub fn is_repair(self) -> bool {
        matches!(self, FloorKind::Repair | FloorKind::RepairOptions)
    }
}

/// Wall on one side of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WallKind {
    #[default]
    None,
    Standard,
    /// Pushes the robot away in active phases; deals 1 damage when the
    /// push is blocked.
    Pusher,
    /// Deadly in active phases. Blocks movement like a wall.
    Crusher,
    /// Deadly in active phases, without the blocking wall.
    CrusherNoWall,
    Laser1,
    Laser2,
    Laser3,
    /// Damages robots entering the tile in active phases.
    Fire,
    /// Passable with movement force 2 or more.
    Ramp,
    /// Robots can leave across it but fall down behind it.
    Edge,
}

impl WallKind {
    /// Damage dealt by a wall laser of this kind.
    pub fn laser_damage(self) -> Option<u8> {
        match self {
            WallKind::Laser1 => Some(1),
            WallKind::Laser2 => Some(2),
            WallKind::Laser3 => Some(3),
            _ => None,
        }
    }

    pub fn is_crusher(self) -> bool {
        matches!(self, WallKind::Crusher | WallKind::CrusherNoWall)
    }
}

/// One board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tile {
    pub floor: FloorKind,
    /// Alignment of the floor element, meaningful for belts.
    pub alignment: Orientation,
    pub floor_active: PhaseMask,
    walls: [WallKind; 4],
    wall_active: [PhaseMask; 4],
}

impl Default for Tile {
    fn default() -> Self {
        Self::new(FloorKind::Normal, Orientation::North)
    }
}

impl Tile {
    pub fn new(floor: FloorKind, alignment: Orientation) -> Self {
        Self {
            floor,
            alignment,
            floor_active: PhaseMask::ALL_PHASES,
            walls: [WallKind::None; 4],
            wall_active: [PhaseMask::ALL_PHASES; 4],
        }
    }

    /// Synthesized tile for cells outside every sub-board.
    pub fn edge() -> Self {
        Self::new(FloorKind::Edge, Orientation::North)
    }

    #[must_use]
    pub fn with_wall(mut self, side: Orientation, wall: WallKind) -> Self {
        self.walls[side.index()] = wall;
        self
    }

    #[must_use]
    pub fn with_wall_phases(mut self, side: Orientation, wall: WallKind, active: PhaseMask) -> Self {
        self.walls[side.index()] = wall;
        self.wall_active[side.index()] = active;
        self
    }

    #[must_use]
    pub fn with_floor_phases(mut self, active: PhaseMask) -> Self {
        self.floor_active = active;
        self
    }

    pub fn wall(&self, side: Orientation) -> WallKind {
        self.walls[side.index()]
    }

    pub fn wall_phases(&self, side: Orientation) -> PhaseMask {
        self.wall_active[side.index()]
    }

    pub fn wall_active_in(&self, side: Orientation, phase: u8) -> bool {
        self.wall_active[side.index()].contains_phase(phase)
    }

    pub fn floor_active_in(&self, phase: u8) -> bool {
        self.floor_active.contains_phase(phase)
    }

    /// Transport direction of this belt floor, `None` for other floors.
    ///
    /// Straight and T-junction belts carry along their alignment, curves
    /// carry around the corner, the two-armed junction carries against
    /// its alignment.
    pub fn belt_direction(&self) -> Option<Orientation> {
        let floor = self.floor;
        if !floor.is_belt() {
            return None;
        }
        let direction = if floor.is_curve_right() {
            self.alignment.right()
        } else if floor.is_curve_left() {
            self.alignment.left()
        } else if floor.is_t_both() {
            self.alignment.opposite()
        } else {
            self.alignment
        };
        Some(direction)
    }

    /// Rotation applied to a robot carried onto this tile while moving in
    /// `arrival_direction`.
    ///
    /// `express_only` restricts the rotation to 2x belts, used by the
    /// express-belt pass.
    pub fn belt_rotation(&self, arrival_direction: Orientation, express_only: bool) -> Rotation {
        let floor = self.floor;
        if express_only && !floor.is_express_belt() {
            return Rotation::None;
        }
        if floor.is_curve_right() {
            Rotation::Right
        } else if floor.is_curve_left() {
            Rotation::Left
        } else if floor.is_t_right() {
            if arrival_direction == self.alignment.left() {
                Rotation::Right
            } else {
                Rotation::None
            }
        } else if floor.is_t_left() {
            if arrival_direction == self.alignment.right() {
                Rotation::Left
            } else {
                Rotation::None
            }
        } else if floor.is_t_both() {
            if arrival_direction == self.alignment.right() {
                Rotation::Right
            } else if arrival_direction == self.alignment.left() {
                Rotation::Left
            } else {
                Rotation::None
            }
        } else {
            Rotation::None
        }
    }
}
