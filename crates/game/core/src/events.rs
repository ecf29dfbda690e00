//! Typed domain events.
//!
//! The engine appends events to an ordered queue while it resolves; the
//! embedder drains the queue after every input and fans the events out
//! (animation, mirrors, logging). Nothing in the core blocks on a
//! listener.

use arrayvec::ArrayVec;

use crate::cards::GameCard;
use crate::common::{ActorId, Orientation, Position};
use crate::config::{GameConfig, GameMode};

/// Why a robot took damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DamageReason {
    Laser,
    Hazard,
    Falling,
    Pusher,
    Crusher,
    Flame,
}

/// Board element group a stage animation shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoardEffect {
    CardMoves,
    ExpressBelts,
    AllBelts,
    Gears,
    Lasers,
    Pushers,
    Crushers,
}

/// Pose of one actor after a change, for animation strips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorPose {
    pub actor: ActorId,
    pub position: Position,
    pub direction: Orientation,
}

/// All poses that changed while one program card resolved. A push chain
/// can move at most every robot in the game.
pub type CardMoveStep = ArrayVec<ActorPose, { GameConfig::MAX_PLAYERS as usize }>;

/// Ordered domain events emitted by the engine.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GameEvent {
    GameStarted {
        mode: GameMode,
        players: u8,
    },
    CardsDealt {
        actor: ActorId,
        count: u8,
    },
    ProgrammingStarted,
    ProgramAccepted {
        actor: ActorId,
    },
    PowerDownAnnounced {
        actor: ActorId,
        announced: bool,
    },
    PhaseChanged {
        phase: u8,
    },
    ActorMoved {
        actor: ActorId,
        position: Position,
        direction: Orientation,
    },
    ActorRotated {
        actor: ActorId,
        direction: Orientation,
    },
    ActorDamaged {
        actor: ActorId,
        reason: DamageReason,
        damage: u8,
    },
    ActorRepaired {
        actor: ActorId,
        damage: u8,
    },
    ActorFalling {
        actor: ActorId,
    },
    ActorDestroyed {
        actor: ActorId,
        position: Position,
    },
    /// Out of lives; this robot will not come back.
    ActorDead {
        actor: ActorId,
    },
    ActorResurrected {
        actor: ActorId,
        position: Position,
        direction: Orientation,
    },
    ShotFired {
        shooter: ActorId,
        target: Position,
    },
    ProgramCardReplaced {
        actor: ActorId,
        phase: u8,
        card: GameCard,
    },
    ArchiveMarkerMoved {
        actor: ActorId,
        position: Position,
    },
    FlagGoalChanged {
        actor: ActorId,
        next_flag: u8,
    },
    KingFlagPickedUp {
        actor: ActorId,
    },
    KingFlagDropped {
        position: Position,
    },
    KingPointsChanged {
        actor: ActorId,
        points: u16,
    },
    /// Per-card animation strip for the card-move stage.
    CardMovesResolved {
        phase: u8,
        steps: Vec<CardMoveStep>,
    },
    /// A stage finished resolving; presentation should animate it and
    /// every participant must acknowledge before the round continues.
    StageResolved {
        effect: BoardEffect,
        phase: u8,
    },
    RoundFinished,
    GameOver {
        winner: Option<ActorId>,
    },
}
