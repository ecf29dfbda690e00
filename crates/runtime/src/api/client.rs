//! Asynchronous abstraction for sourcing player decisions.
//!
//! Session users plug in [`Client`] implementations so a game can run
//! with human input, scripted fixtures, or bot policies.

use async_trait::async_trait;

use rally_core::{GameCard, Orientation, Participant, Position, Stage};

use super::errors::Result;

/// Decision source for one robot.
///
/// The session calls into the client whenever the engine suspends for
/// this robot: programming, animation pacing and resurrection placement.
#[async_trait]
pub trait Client: Send + Sync {
    /// Pick the cards for the open program registers, in register order.
    ///
    /// `participant` carries the dealt cards and the current register
    /// locks; the returned vector must contain exactly one card per open
    /// register, all taken from `participant.dealt_cards`.
    async fn choose_program(&mut self, participant: &Participant) -> Result<Vec<GameCard>>;

    /// Whether to announce a power down for the next round.
    async fn announce_power_down(&mut self, _participant: &Participant) -> Result<bool> {
        Ok(false)
    }

    /// A stage resolved; return once it has been presented.
    async fn stage_shown(&mut self, _stage: Stage, _phase: u8) -> Result<()> {
        Ok(())
    }

    /// Pick the tile to come back on.
    async fn choose_resurrection_point(&mut self, options: &[Position]) -> Result<Position>;

    /// Pick the facing to come back with.
    async fn choose_resurrection_orientation(
        &mut self,
        options: &[Orientation],
    ) -> Result<Orientation>;
}

/// Fixture client that always takes the first legal choice.
///
/// Useful for tests and as a stand-in for disconnected players.
pub struct AutoClient;

#[async_trait]
impl Client for AutoClient {
    async fn choose_program(&mut self, participant: &Participant) -> Result<Vec<GameCard>> {
        let open = participant
            .locked_slots
            .iter()
            .filter(|locked| !**locked)
            .count();
        Ok(participant.dealt_cards.iter().take(open).copied().collect())
    }

    async fn choose_resurrection_point(&mut self, options: &[Position]) -> Result<Position> {
        Ok(options[0])
    }

    async fn choose_resurrection_orientation(
        &mut self,
        options: &[Orientation],
    ) -> Result<Orientation> {
        Ok(options[0])
    }
}
