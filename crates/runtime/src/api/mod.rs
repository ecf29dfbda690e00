//! Types downstream clients interact with.

mod client;
mod errors;

pub use client::{AutoClient, Client};
pub use errors::{Result, RuntimeError};
