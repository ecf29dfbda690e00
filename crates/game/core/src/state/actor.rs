//! Per-robot state.

use crate::common::{ActorId, Orientation, Position};

/// Mutable state of one robot in the actor table.
///
/// `position` is `None` while the robot is off the board (destroyed,
/// waiting for resurrection). Backrefs are [`ActorId`]s; the table owner
/// resolves them.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorState {
    pub position: Option<Position>,
    pub direction: Orientation,
    pub damage: u8,
    pub lives: u8,
    /// Where the robot respawns; repair sites and flags re-anchor it.
    pub archive_marker: Position,
    /// Next flag to visit in hunt-the-flag mode, 1-based.
    pub next_flag_goal: u8,
    pub kills: u16,
    pub deaths: u16,
    pub suicides: u16,
    pub powered_down: bool,
    /// Virtual robots share tiles and neither push nor get pushed.
    pub is_virtual: bool,
    pub destroyed: bool,
    /// Doomed but still animating; finished when the stage barrier
    /// releases.
    pub falling: bool,
    /// Carrying the flag in king-of-the-flag mode.
    pub has_flag: bool,
    pub king_points: u16,
    pub pushed_by: Option<ActorId>,
    pub shot_by: Option<ActorId>,
}

impl ActorState {
    pub fn new(position: Position, direction: Orientation, lives: u8) -> Self {
        Self {
            position: Some(position),
            direction,
            damage: 0,
            lives,
            archive_marker: position,
            next_flag_goal: 1,
            kills: 0,
            deaths: 0,
            suicides: 0,
            powered_down: false,
            is_virtual: false,
            destroyed: false,
            falling: false,
            has_flag: false,
            king_points: 0,
            pushed_by: None,
            shot_by: None,
        }
    }

    /// On the board and acting.
    pub fn is_active(&self) -> bool {
        !self.destroyed && self.position.is_some()
    }

    /// Destroyed with no lives left.
    pub fn is_dead(&self) -> bool {
        self.destroyed && self.lives == 0
    }
}
