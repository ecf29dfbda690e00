//! Session orchestration.
//!
//! A [`Session`] owns one [`GameEngine`] plus a [`Client`] per robot and
//! pumps the engine forward: whenever the engine suspends for input, the
//! session asks the matching client, feeds the answer back and republishes
//! the resulting events on the bus.

use rally_core::{ActorId, BoardManager, EngineStatus, GameEngine, GameSettings};

use crate::api::{Client, Result, RuntimeError};
use crate::events::EventBus;

/// What a single [`Session::step`] call left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The engine consumed input and may need more.
    Running,
    /// The game ended; `None` means everybody lost.
    Finished(Option<ActorId>),
}

/// One running game with its decision sources.
pub struct Session {
    engine: GameEngine,
    clients: Vec<Box<dyn Client>>,
    bus: EventBus,
}

impl Session {
    pub fn new(board: BoardManager, settings: GameSettings, seed: u64) -> Self {
        Self {
            engine: GameEngine::new(board, settings, seed),
            clients: Vec::new(),
            bus: EventBus::new(),
        }
    }

    /// Register a player and the client that answers for them.
    pub fn join(&mut self, name: impl Into<String>, client: Box<dyn Client>) -> Result<ActorId> {
        let id = self.engine.add_player(name)?;
        self.clients.push(client);
        Ok(id)
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    /// Resolve the engine's current suspension with client input.
    pub async fn step(&mut self) -> Result<SessionState> {
        let state = match self.engine.status() {
            EngineStatus::Lobby => {
                if self.clients.is_empty() {
                    return Err(RuntimeError::NoClients);
                }
                self.engine.start()?;
                SessionState::Running
            }
            EngineStatus::Programming { waiting_for } => {
                for id in waiting_for {
                    self.program_one(id).await?;
                }
                SessionState::Running
            }
            EngineStatus::AnimatingStage { stage, waiting_for } => {
                let phase = self.engine.world().phase;
                for id in waiting_for {
                    self.clients[id.index()].stage_shown(stage, phase).await?;
                    self.engine.acknowledge(id)?;
                }
                SessionState::Running
            }
            EngineStatus::ChoosingResurrectionPoint { actor, options } => {
                let position = self.clients[actor.index()]
                    .choose_resurrection_point(&options)
                    .await?;
                self.engine.choose_resurrection_point(actor, position)?;
                SessionState::Running
            }
            EngineStatus::ChoosingResurrectionOrientation { actor, options, .. } => {
                let direction = self.clients[actor.index()]
                    .choose_resurrection_orientation(&options)
                    .await?;
                self.engine
                    .choose_resurrection_orientation(actor, direction)?;
                SessionState::Running
            }
            EngineStatus::Finished { winner } => SessionState::Finished(winner),
        };
        self.publish_pending();
        Ok(state)
    }

    /// Drive the game to its end.
    pub async fn run(&mut self) -> Result<Option<ActorId>> {
        loop {
            if let SessionState::Finished(winner) = self.step().await? {
                return Ok(winner);
            }
        }
    }

    async fn program_one(&mut self, id: ActorId) -> Result<()> {
        let participant = self.engine.participant(id)?;
        let client = &mut self.clients[id.index()];
        if client.announce_power_down(&participant).await? {
            self.engine.announce_power_down(id, true)?;
        }
        let cards = client.choose_program(&participant).await?;
        self.engine.submit_program(id, &cards)?;
        Ok(())
    }

    fn publish_pending(&mut self) {
        for event in self.engine.drain_events() {
            if tracing::enabled!(tracing::Level::DEBUG) {
                let json = serde_json::to_string(&event).unwrap_or_default();
                tracing::debug!(target: "session", event = %json);
            }
            self.bus.publish(event);
        }
    }
}
