//! Per-player snapshot handed to clients.
//!
//! The engine owns the live state; clients get a flat copy they can show
//! without holding a borrow across their own event loop.

use crate::cards::GameCard;
use crate::common::{ActorId, Orientation, Position};
use crate::config::GameConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Participant {
    pub id: ActorId,
    pub name: String,
    pub position: Option<Position>,
    pub direction: Orientation,
    pub damage: u8,
    pub lives: u8,
    pub kills: u16,
    pub deaths: u16,
    pub suicides: u16,
    pub next_flag_goal: u8,
    pub king_points: u16,
    pub has_flag: bool,
    pub powered_down: bool,
    pub is_virtual: bool,
    pub destroyed: bool,
    pub archive_marker: Position,
    /// Cards still in the deal slots.
    pub dealt_cards: Vec<GameCard>,
    /// Program registers 1 to 5.
    pub program: [Option<GameCard>; GameConfig::PROGRAM_SIZE as usize],
    /// Registers kept across rounds due to damage.
    pub locked_slots: [bool; GameConfig::PROGRAM_SIZE as usize],
}
