use thiserror::Error;

/// Errors surfaced by catalog lookups, configuration edits and preset management.
///
/// Every variant is recoverable: a failed transition leaves the playground state
/// exactly as it was before the attempt.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaygroundError {
    #[error("Unknown {axis} option: {value:?}")]
    UnknownOption { axis: &'static str, value: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidConfiguration { field: &'static str, reason: String },

    #[error("Preset not found: {0}")]
    PresetNotFound(String),

    #[error("A preset named {0:?} already exists")]
    DuplicateName(String),

    #[error("A preset with id {0} already exists")]
    DuplicateId(String),

    #[error("Preset {0} is built-in and cannot be changed or removed")]
    ProtectedPreset(String),

    #[error("Malformed preset token: {0}")]
    MalformedToken(String),

    #[error("Preset storage error: {0}")]
    Storage(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

impl PlaygroundError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlaygroundError>;
