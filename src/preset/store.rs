use super::builtin::DEFAULT_PRESET_ID;
use super::preset::{Preset, PresetOrigin};
use super::token;
use crate::error::{PlaygroundError, Result};
use crate::session::{Limits, SessionConfig};
use std::sync::Arc;
use tracing::debug;

/// Built-in presets plus the user's saved presets, in insertion order
///
/// Every mutating method validates first and only then touches the list, so an
/// `Err` never leaves the store half-updated. User preset names are unique
/// (case-insensitive, ignoring surrounding whitespace) across built-in and user
/// presets; a collision is rejected with `DuplicateName`.
#[derive(Debug, Clone, PartialEq)]
pub struct PresetStore {
    builtins: Arc<Vec<Preset>>,
    user: Vec<Preset>,
}

impl PresetStore {
    /// `builtins` must contain the default preset
    pub fn new(builtins: Vec<Preset>) -> Result<Self> {
        if !builtins.iter().any(|p| p.id == DEFAULT_PRESET_ID) {
            return Err(PlaygroundError::PresetNotFound(DEFAULT_PRESET_ID.to_string()));
        }
        Ok(Self {
            builtins: Arc::new(builtins),
            user: Vec::new(),
        })
    }

    pub fn builtins(&self) -> &[Preset] {
        &self.builtins
    }

    pub fn user_presets(&self) -> &[Preset] {
        &self.user
    }

    /// Built-ins first, then user presets
    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.builtins.iter().chain(self.user.iter())
    }

    pub fn default_preset(&self) -> &Preset {
        self.builtins
            .iter()
            .find(|p| p.id == DEFAULT_PRESET_ID)
            .unwrap_or(&self.builtins[0])
    }

    pub fn is_builtin(&self, id: &str) -> bool {
        self.builtins.iter().any(|p| p.id == id)
    }

    pub fn select(&self, id: &str) -> Result<&Preset> {
        self.iter()
            .find(|p| p.id == id)
            .ok_or_else(|| PlaygroundError::PresetNotFound(id.to_string()))
    }

    /// Snapshot `session_config` and `instructions` under a fresh identifier
    pub fn save(
        &mut self,
        name: &str,
        session_config: SessionConfig,
        instructions: &str,
    ) -> Result<Preset> {
        let name = self.check_name(name)?;
        let preset = Preset::user(name, session_config, instructions);
        debug!("Saving preset {} ({})", preset.name, preset.id);
        self.user.push(preset.clone());
        Ok(preset)
    }

    /// Add a preset that was built elsewhere (e.g. decoded from a share token)
    pub fn insert(&mut self, preset: Preset) -> Result<Preset> {
        if self.iter().any(|p| p.id == preset.id) {
            return Err(PlaygroundError::DuplicateId(preset.id));
        }
        let name = self.check_name(&preset.name)?;
        let preset = Preset {
            name,
            origin: PresetOrigin::User,
            ..preset
        };
        self.user.push(preset.clone());
        Ok(preset)
    }

    /// Replace a user preset's configuration and instructions, keeping its id and name
    pub fn overwrite(
        &mut self,
        id: &str,
        session_config: SessionConfig,
        instructions: &str,
    ) -> Result<Preset> {
        if self.is_builtin(id) {
            return Err(PlaygroundError::ProtectedPreset(id.to_string()));
        }
        let slot = self
            .user
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| PlaygroundError::PresetNotFound(id.to_string()))?;

        *slot = Preset {
            session_config,
            instructions: instructions.to_string(),
            ..slot.clone()
        };
        Ok(slot.clone())
    }

    pub fn remove(&mut self, id: &str) -> Result<Preset> {
        if self.is_builtin(id) {
            return Err(PlaygroundError::ProtectedPreset(id.to_string()));
        }
        let index = self
            .user
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| PlaygroundError::PresetNotFound(id.to_string()))?;
        Ok(self.user.remove(index))
    }

    /// Encode a preset as a share token
    pub fn export(&self, id: &str) -> Result<String> {
        token::encode(self.select(id)?)
    }

    /// Decode a share token into a new user preset; the store is not modified
    pub fn import(&self, token: &str, limits: &Limits) -> Result<Preset> {
        token::decode(token, limits)
    }

    /// `name` if no preset uses it yet, otherwise `name (2)`, `name (3)`, ...
    pub fn unique_name(&self, name: &str) -> String {
        let base = name.trim();
        let mut candidate = base.to_string();
        let mut n = 2;
        while self.name_taken(&candidate) {
            candidate = format!("{} ({})", base, n);
            n += 1;
        }
        candidate
    }

    fn name_taken(&self, name: &str) -> bool {
        let key = name.trim().to_lowercase();
        self.iter().any(|p| p.name.trim().to_lowercase() == key)
    }

    fn check_name(&self, name: &str) -> Result<String> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(PlaygroundError::invalid("name", "preset name must not be empty"));
        }
        if self.name_taken(trimmed) {
            return Err(PlaygroundError::DuplicateName(trimmed.to_string()));
        }
        Ok(trimmed.to_string())
    }
}
