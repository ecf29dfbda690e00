//! Unified error types surfaced by the runtime API.
//!
//! Wraps engine rejections and client failures so sessions can bubble
//! them up with consistent context.

use thiserror::Error;

use rally_core::{ActorId, EngineError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("no clients joined the session")]
    NoClients,

    #[error("session is not running")]
    NotRunning,

    #[error("client for {actor} failed: {message}")]
    Client { actor: ActorId, message: String },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl RuntimeError {
    pub fn client(actor: ActorId, message: impl Into<String>) -> Self {
        Self::Client {
            actor,
            message: message.into(),
        }
    }
}
