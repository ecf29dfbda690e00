//! Program cards: kinds, priorities, the dealing stock and per-robot decks.

pub mod deck;
pub mod stock;

pub use deck::{CardDeck, DeckError};
pub use stock::CardStock;

use strum::EnumIter;

/// What a program card does when executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CardKind {
    UTurn,
    TurnLeft,
    TurnRight,
    Backward,
    Forward1,
    Forward2,
    Forward3,
}

/// One program card. Priority decides execution order within a phase;
/// lower priorities act first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameCard {
    pub kind: CardKind,
    pub priority: u16,
}

impl GameCard {
    pub const fn new(kind: CardKind, priority: u16) -> Self {
        Self { kind, priority }
    }
}
