use super::state::PlaygroundState;
use crate::error::Result;
use crate::preset::Preset;
use crate::session::SessionField;
use serde::Deserialize;
use std::fmt;

/// A user action against the playground state
#[derive(Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    SetField { field: SessionField, value: String },
    SetInstructions { instructions: String },
    ApplyPreset { id: String },
    SaveCurrentAsPreset { name: String },
    OverwriteSelectedPreset,
    RemovePreset { id: String },
    ImportPreset { token: String },
    ResetToDefault,
    SetCredential { credential: Option<String> },
}

impl fmt::Debug for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetField { field, value } => write!(f, "SetField({} = {:?})", field, value),
            Self::SetInstructions { instructions } => {
                write!(f, "SetInstructions({} chars)", instructions.chars().count())
            }
            Self::ApplyPreset { id } => write!(f, "ApplyPreset({})", id),
            Self::SaveCurrentAsPreset { name } => write!(f, "SaveCurrentAsPreset({:?})", name),
            Self::OverwriteSelectedPreset => f.write_str("OverwriteSelectedPreset"),
            Self::RemovePreset { id } => write!(f, "RemovePreset({})", id),
            Self::ImportPreset { .. } => f.write_str("ImportPreset"),
            Self::ResetToDefault => f.write_str("ResetToDefault"),
            Self::SetCredential { credential } => {
                let state = if credential.is_some() { "set" } else { "cleared" };
                write!(f, "SetCredential({})", state)
            }
        }
    }
}

impl Intent {
    /// Derive the next state; returns the preset created or rewritten, if any
    pub fn apply(&self, state: &PlaygroundState) -> Result<(PlaygroundState, Option<Preset>)> {
        match self {
            Self::SetField { field, value } => Ok((state.set_field(*field, value)?, None)),
            Self::SetInstructions { instructions } => {
                Ok((state.set_instructions(instructions.clone()), None))
            }
            Self::ApplyPreset { id } => Ok((state.apply_preset(id)?, None)),
            Self::SaveCurrentAsPreset { name } => {
                let (next, preset) = state.save_current_as_preset(name)?;
                Ok((next, Some(preset)))
            }
            Self::OverwriteSelectedPreset => {
                let (next, preset) = state.overwrite_selected_preset()?;
                Ok((next, Some(preset)))
            }
            Self::RemovePreset { id } => Ok((state.remove_preset(id)?, None)),
            Self::ImportPreset { token } => {
                let (next, preset) = state.import_preset(token)?;
                Ok((next, Some(preset)))
            }
            Self::ResetToDefault => Ok((state.reset_to_default(), None)),
            Self::SetCredential { credential } => Ok((state.set_credential(credential.clone()), None)),
        }
    }
}
