//! Async session layer on top of the pure rules engine.
//!
//! `rally-core` resolves rounds deterministically but stops at every
//! point that needs player input. This crate supplies the plumbing
//! around it: a [`Client`] trait for sourcing decisions, a [`Session`]
//! that pumps the engine with those decisions, and a topic-based
//! [`EventBus`] that fans the engine's events out to whatever wants to
//! watch the game.

pub mod api;
pub mod events;
pub mod session;

pub use api::{AutoClient, Client, Result, RuntimeError};
pub use events::{EventBus, Topic};
pub use session::{Session, SessionState};
