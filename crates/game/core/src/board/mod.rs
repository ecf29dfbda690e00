//! Board spatial model: tiles, scenarios and the lookup/occupancy manager.

pub mod manager;
pub mod scenario;
pub mod tile;

pub use manager::{BoardManager, Laser, MoveCheck, ScenarioError};
pub use scenario::{BoardRotation, Scenario, SpecialPoint, SubBoard};
pub use tile::{FloorKind, PhaseMask, Tile, WallKind};
