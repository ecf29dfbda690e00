//! Deterministic robot-race rules shared across clients.
//!
//! `rally-core` holds the canonical round resolution: the board spatial
//! model, program cards, the per-phase element resolvers and the round
//! state machine. Everything here is pure and synchronous; all state
//! mutation flows through [`engine::GameEngine`], which suspends whenever
//! it needs player input and reports everything it did as typed
//! [`events::GameEvent`]s. Async orchestration, transports and UIs live
//! in supporting crates built on the types re-exported here.
pub mod board;
pub mod cards;
pub mod common;
pub mod config;
pub mod engine;
pub mod events;
pub mod participant;
pub mod rng;
pub mod state;

pub use board::{
    BoardManager, BoardRotation, FloorKind, Laser, MoveCheck, PhaseMask, Scenario, ScenarioError,
    SpecialPoint, SubBoard, Tile, WallKind,
};
pub use cards::{CardDeck, CardKind, CardStock, DeckError, GameCard};
pub use common::{ActorId, Orientation, Position, Rotation};
pub use config::{GameConfig, GameMode, GameSettings, StartPosition};
pub use engine::{EngineError, EngineStatus, GameEngine, Stage};
pub use events::{ActorPose, BoardEffect, CardMoveStep, DamageReason, GameEvent};
pub use participant::Participant;
pub use state::{ActorState, MoveOutcome, World};
