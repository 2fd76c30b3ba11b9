use crate::error::{PlaygroundError, Result};
use crate::preset::{Preset, PresetStore, DEFAULT_PRESET_ID};
use crate::session::{ConnectionParams, Limits, SessionConfig, SessionField};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

const IMPORTED_PRESET_NAME: &str = "Imported preset";

/// Outcome of the last attempt to open the hosted realtime session
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Failed(String),
}

/// Everything a configuration UI shows and edits
///
/// Transitions take `&self` and return a new state; a failed transition returns
/// the error and leaves `self` untouched. The selected preset id records where the
/// configuration came from; editing a field afterwards keeps the selection.
#[derive(Clone, PartialEq)]
pub struct PlaygroundState {
    session_config: SessionConfig,
    presets: PresetStore,
    selected_preset_id: Option<String>,
    instructions: String,
    credential: Option<String>,
    connection: ConnectionStatus,
    limits: Arc<Limits>,
}

impl fmt::Debug for PlaygroundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaygroundState")
            .field("session_config", &self.session_config)
            .field("selected_preset_id", &self.selected_preset_id)
            .field("user_presets", &self.presets.user_presets().len())
            .field("instructions", &self.instructions)
            .field("credential", &self.credential.as_ref().map(|_| "[REDACTED]"))
            .field("connection", &self.connection)
            .finish()
    }
}

impl PlaygroundState {
    /// Initial state: the default built-in preset applied and selected
    pub fn new(presets: PresetStore, limits: Arc<Limits>) -> Self {
        let default = presets.default_preset().clone();
        Self {
            session_config: default.session_config,
            selected_preset_id: Some(default.id),
            instructions: default.instructions,
            presets,
            credential: None,
            connection: ConnectionStatus::Disconnected,
            limits,
        }
    }

    pub fn session_config(&self) -> &SessionConfig {
        &self.session_config
    }

    pub fn presets(&self) -> &PresetStore {
        &self.presets
    }

    pub fn user_presets(&self) -> &[Preset] {
        self.presets.user_presets()
    }

    pub fn selected_preset_id(&self) -> Option<&str> {
        self.selected_preset_id.as_deref()
    }

    pub fn selected_preset(&self) -> Option<&Preset> {
        self.selected_preset_id
            .as_deref()
            .and_then(|id| self.presets.select(id).ok())
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    pub fn connection(&self) -> &ConnectionStatus {
        &self.connection
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Whether the live configuration has drifted from the selected preset
    pub fn is_modified(&self) -> bool {
        self.selected_preset()
            .map(|p| !p.matches(&self.session_config, &self.instructions))
            .unwrap_or(false)
    }

    pub fn set_field(&self, field: SessionField, value: &str) -> Result<Self> {
        let session_config = self
            .session_config
            .clone()
            .with_field(field, value, &self.limits)?;
        Ok(Self {
            session_config,
            ..self.clone()
        })
    }

    pub fn set_instructions(&self, instructions: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
            ..self.clone()
        }
    }

    pub fn apply_preset(&self, id: &str) -> Result<Self> {
        let preset = self.presets.select(id)?;
        Ok(Self {
            session_config: preset.session_config.clone(),
            instructions: preset.instructions.clone(),
            selected_preset_id: Some(preset.id.clone()),
            ..self.clone()
        })
    }

    /// Apply the default built-in preset
    pub fn reset_to_default(&self) -> Self {
        let default = self.presets.default_preset();
        Self {
            session_config: default.session_config.clone(),
            instructions: default.instructions.clone(),
            selected_preset_id: Some(default.id.clone()),
            ..self.clone()
        }
    }

    pub fn save_current_as_preset(&self, name: &str) -> Result<(Self, Preset)> {
        let mut presets = self.presets.clone();
        let preset = presets.save(name, self.session_config.clone(), &self.instructions)?;
        let next = Self {
            presets,
            selected_preset_id: Some(preset.id.clone()),
            ..self.clone()
        };
        Ok((next, preset))
    }

    /// Write the live configuration back into the selected user preset
    pub fn overwrite_selected_preset(&self) -> Result<(Self, Preset)> {
        let id = self
            .selected_preset_id
            .as_deref()
            .ok_or_else(|| PlaygroundError::PresetNotFound("(no preset selected)".to_string()))?;
        self.overwrite_preset(id)
    }

    /// Write the live configuration into user preset `id` and select it
    pub fn overwrite_preset(&self, id: &str) -> Result<(Self, Preset)> {
        let mut presets = self.presets.clone();
        let preset = presets.overwrite(id, self.session_config.clone(), &self.instructions)?;
        let next = Self {
            presets,
            selected_preset_id: Some(preset.id.clone()),
            ..self.clone()
        };
        Ok((next, preset))
    }

    /// Removing the selected preset moves the selection to the default preset;
    /// the live configuration is kept.
    pub fn remove_preset(&self, id: &str) -> Result<Self> {
        let mut presets = self.presets.clone();
        presets.remove(id)?;
        let selected_preset_id = if self.selected_preset_id.as_deref() == Some(id) {
            Some(DEFAULT_PRESET_ID.to_string())
        } else {
            self.selected_preset_id.clone()
        };
        Ok(Self {
            presets,
            selected_preset_id,
            ..self.clone()
        })
    }

    pub fn export_preset(&self, id: &str) -> Result<String> {
        self.presets.export(id)
    }

    /// Decode a share token, add it to the user presets and apply it
    ///
    /// A name already in use gets a numeric suffix instead of failing the import,
    /// and a blank name is replaced with `Imported preset`.
    pub fn import_preset(&self, token: &str) -> Result<(Self, Preset)> {
        let decoded = self.presets.import(token, &self.limits)?;
        let name = if decoded.name.trim().is_empty() {
            IMPORTED_PRESET_NAME
        } else {
            decoded.name.as_str()
        };
        let name = self.presets.unique_name(name);
        let mut presets = self.presets.clone();
        let preset = presets.insert(Preset { name, ..decoded })?;
        let next = Self {
            session_config: preset.session_config.clone(),
            instructions: preset.instructions.clone(),
            selected_preset_id: Some(preset.id.clone()),
            presets,
            ..self.clone()
        };
        Ok((next, preset))
    }

    /// Store or clear the API key. Its validity is only known once the hosted
    /// session accepts or rejects it.
    pub fn set_credential(&self, credential: Option<String>) -> Self {
        Self {
            credential,
            ..self.clone()
        }
    }

    pub fn set_connection_status(&self, connection: ConnectionStatus) -> Self {
        Self {
            connection,
            ..self.clone()
        }
    }

    /// Parameters for the hosted session; requires a non-empty credential
    pub fn connection_params(&self) -> Result<ConnectionParams> {
        let api_key = self
            .credential
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| PlaygroundError::Connection("OpenAI API key is required".to_string()))?;
        Ok(ConnectionParams::new(
            api_key,
            self.instructions.clone(),
            self.session_config.clone(),
        ))
    }

    /// Serializable view for UIs; the credential is reduced to a presence flag
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            session_config: self.session_config.clone(),
            instructions: self.instructions.clone(),
            selected_preset_id: self.selected_preset_id.clone(),
            presets: self.presets.iter().cloned().collect(),
            modified: self.is_modified(),
            has_credential: self.credential.is_some(),
            connection: self.connection.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    pub session_config: SessionConfig,
    pub instructions: String,
    pub selected_preset_id: Option<String>,
    pub presets: Vec<Preset>,
    pub modified: bool,
    pub has_credential: bool,
    pub connection: ConnectionStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::builtin_presets;

    fn initial() -> PlaygroundState {
        let limits = Limits::default();
        let presets = PresetStore::new(builtin_presets(&limits).unwrap()).unwrap();
        PlaygroundState::new(presets, Arc::new(limits))
    }

    #[test]
    fn test_modified_tracks_drift_from_selected_preset() {
        let state = initial();
        assert!(!state.is_modified());

        let edited = state.set_field(SessionField::Voice, "echo").unwrap();
        assert!(edited.is_modified());

        let back = edited.set_field(SessionField::Voice, "alloy").unwrap();
        assert!(!back.is_modified());
    }

    #[test]
    fn test_debug_redacts_credential() {
        let state = initial().set_credential(Some("sk-live-123".to_string()));
        let debug = format!("{:?}", state);
        assert!(!debug.contains("sk-live-123"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_empty_credential_is_distinct_from_unset() {
        let state = initial().set_credential(Some(String::new()));
        assert_eq!(state.credential(), Some(""));
        assert!(state.snapshot().has_credential);
        assert!(matches!(
            state.connection_params(),
            Err(PlaygroundError::Connection(_))
        ));
    }

    #[test]
    fn test_overwrite_builtin_selection_is_protected() {
        let state = initial();
        let err = state.overwrite_selected_preset().unwrap_err();
        assert_eq!(err, PlaygroundError::ProtectedPreset(DEFAULT_PRESET_ID.to_string()));
    }
}
