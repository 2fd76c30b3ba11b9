//! HTTP API for configuration front ends
//!
//! This module provides a REST API over the playground state:
//! - GET /catalog - Enumerated options for every session field
//! - GET /state - Current configuration, presets and selection
//! - PUT /session/:field - Change one session field
//! - PUT /instructions, PUT /credential, POST /session/reset
//! - GET/POST /presets, POST /presets/:id/apply, PUT/DELETE /presets/:id
//! - GET /presets/:id/export, POST /presets/import - Share tokens
//! - GET /connection - Participant metadata for the voice agent
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
