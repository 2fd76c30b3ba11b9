//! Playground state management
//!
//! This module provides:
//! - `PlaygroundState`: the active session configuration, presets, selection,
//!   instructions and credential, with pure transitions
//! - `Intent`: every transition as a message
//! - `Playground`: the owner that persists presets and notifies observers

mod intent;
mod playground;
mod state;

pub use intent::Intent;
pub use playground::Playground;
pub use state::{ConnectionStatus, PlaygroundState, StateSnapshot};
