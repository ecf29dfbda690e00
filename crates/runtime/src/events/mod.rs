//! Topic-based event bus for session events.
//!
//! The core engine reports everything through its ordered event queue;
//! the session republishes those events here so UIs, recorders and
//! mirrors can subscribe to just the topics they need.

mod bus;

pub use bus::{EventBus, Topic};
