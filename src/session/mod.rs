//! Realtime session configuration
//!
//! This module provides:
//! - `SessionConfig`, the immutable snapshot of tunable session parameters
//! - `Limits`, the numeric ranges accepted by the hosted realtime API
//! - `ConnectionParams`, the payload handed to the realtime session at connect time

mod config;
mod limits;
mod realtime;

pub use config::{MaxOutputTokens, SessionConfig, SessionField};
pub use limits::{Bounds, Limits};
pub use realtime::{ConnectionParams, RealtimeConnector, TurnDetectionOptions};
