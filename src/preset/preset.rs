use crate::session::SessionConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a preset comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetOrigin {
    /// Compiled in; cannot be removed or overwritten
    BuiltIn,
    /// Saved or imported by the user
    User,
}

/// A named snapshot of a session configuration plus instructions
///
/// The embedded configuration is a copy: editing the live configuration never
/// changes a saved preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub session_config: SessionConfig,
    pub instructions: String,
    pub origin: PresetOrigin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Preset {
    /// Create a user preset with a freshly allocated identifier
    pub fn user(
        name: impl Into<String>,
        session_config: SessionConfig,
        instructions: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            description: None,
            session_config,
            instructions: instructions.into(),
            origin: PresetOrigin::User,
            created_at: Some(Utc::now()),
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.origin == PresetOrigin::BuiltIn
    }

    /// Whether this preset holds exactly the given configuration and instructions
    pub fn matches(&self, session_config: &SessionConfig, instructions: &str) -> bool {
        self.session_config == *session_config && self.instructions == instructions
    }
}
