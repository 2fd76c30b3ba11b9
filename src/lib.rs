pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
pub mod playground;
pub mod preset;
pub mod session;

pub use catalog::{Modalities, Model, OptionSet, TranscriptionModel, TurnDetectionType, Voice};
pub use config::Config;
pub use error::{PlaygroundError, Result};
pub use http::{create_router, AppState};
pub use playground::{ConnectionStatus, Intent, Playground, PlaygroundState, StateSnapshot};
pub use preset::{JsonFileStorage, MemoryStorage, Preset, PresetStorage, PresetStore};
pub use session::{ConnectionParams, Limits, MaxOutputTokens, RealtimeConnector, SessionConfig, SessionField};
