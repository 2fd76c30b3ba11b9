use crate::playground::Playground;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for HTTP handlers
///
/// The playground has a single writer at a time; the lock serializes requests.
#[derive(Clone)]
pub struct AppState {
    pub playground: Arc<RwLock<Playground>>,
}

impl AppState {
    pub fn new(playground: Playground) -> Self {
        Self {
            playground: Arc::new(RwLock::new(playground)),
        }
    }
}
