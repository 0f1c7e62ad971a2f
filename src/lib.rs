//! Mirrors a web music player into an always-on-top floating surface and
//! relays the floating surface's controls back to the player.

pub mod channel;
pub mod config;
pub mod dom;
pub mod engine;
pub mod error;
pub mod locator;
pub mod media;
pub mod projector;
pub mod state_machine;
pub mod surface;
pub mod toolbar;
pub mod utils;
pub mod window_manager;

#[cfg(test)]
mod tests;

pub use channel::{Command, CommandChannel, CommandClient, CommandResponse};
pub use config::PipConfig;
pub use engine::PipEngine;
pub use error::PipError;
pub use state_machine::SessionState;
pub use window_manager::FloatingWindowManager;
