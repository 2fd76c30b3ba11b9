//! Preset management
//!
//! This module provides:
//! - Built-in presets compiled into the binary
//! - `PresetStore`: save, select, overwrite and remove user presets
//! - Share tokens for exporting and importing presets
//! - `PresetStorage` implementations for persisting user presets

mod builtin;
mod preset;
mod storage;
mod store;
pub mod token;

pub use builtin::{builtin_presets, DEFAULT_PRESET_ID};
pub use preset::{Preset, PresetOrigin};
pub use storage::{JsonFileStorage, MemoryStorage, PresetStorage};
pub use store::PresetStore;
