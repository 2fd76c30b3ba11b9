use super::config::{MaxOutputTokens, SessionConfig};
use super::limits::Limits;
use crate::catalog::{Modalities, Model, OptionSet, TranscriptionModel, TurnDetectionType, Voice};
use crate::error::{PlaygroundError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

// Fallbacks applied by the voice agent when participant metadata omits a key
const AGENT_DEFAULT_TEMPERATURE: f64 = 0.8;
const AGENT_DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2048;
const AGENT_DEFAULT_VAD_THRESHOLD: f64 = 0.5;
const AGENT_DEFAULT_PREFIX_PADDING_MS: u32 = 200;
const AGENT_DEFAULT_SILENCE_DURATION_MS: u32 = 300;

/// Turn detection payload as the hosted realtime API expects it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnDetectionOptions {
    ServerVad {
        #[serde(default = "default_threshold")]
        threshold: f64,
        #[serde(default = "default_prefix_padding_ms")]
        prefix_padding_ms: u32,
        #[serde(default = "default_silence_duration_ms")]
        silence_duration_ms: u32,
    },
    None,
}

fn default_threshold() -> f64 {
    AGENT_DEFAULT_VAD_THRESHOLD
}

fn default_prefix_padding_ms() -> u32 {
    AGENT_DEFAULT_PREFIX_PADDING_MS
}

fn default_silence_duration_ms() -> u32 {
    AGENT_DEFAULT_SILENCE_DURATION_MS
}

impl TurnDetectionOptions {
    pub fn from_config(config: &SessionConfig) -> Self {
        match config.turn_detection() {
            TurnDetectionType::ServerVad => Self::ServerVad {
                threshold: config.vad_threshold(),
                prefix_padding_ms: config.vad_prefix_padding_ms(),
                silence_duration_ms: config.vad_silence_duration_ms(),
            },
            TurnDetectionType::Manual => Self::None,
        }
    }
}

/// Participant metadata exchanged with the voice agent
///
/// Every value travels as a string; `turn_detection` is itself a JSON document.
#[derive(Default, Serialize, Deserialize)]
struct ParticipantMetadata {
    #[serde(default)]
    openai_api_key: String,
    #[serde(default)]
    instructions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    transcription_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    voice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    temperature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    modalities: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    turn_detection: Option<String>,
}

/// Everything the hosted realtime session needs at connection time
#[derive(Clone, PartialEq)]
pub struct ConnectionParams {
    pub api_key: String,
    pub instructions: String,
    pub session: SessionConfig,
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("api_key", &"[REDACTED]")
            .field("instructions", &self.instructions)
            .field("session", &self.session)
            .finish()
    }
}

impl ConnectionParams {
    pub fn new(
        api_key: impl Into<String>,
        instructions: impl Into<String>,
        session: SessionConfig,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            instructions: instructions.into(),
            session,
        }
    }

    pub fn turn_detection(&self) -> TurnDetectionOptions {
        TurnDetectionOptions::from_config(&self.session)
    }

    /// Channel list for the `modalities` session parameter
    pub fn modalities(&self) -> &'static [&'static str] {
        self.session.modalities().channels()
    }

    /// Whether a live session must be updated to match `other`
    ///
    /// The API key is not part of the comparison.
    pub fn changes_from(&self, other: &ConnectionParams) -> bool {
        self.instructions != other.instructions || self.session != other.session
    }

    /// Render the participant metadata JSON read by the voice agent
    pub fn to_metadata(&self) -> Result<String> {
        let turn_detection = serde_json::to_string(&self.turn_detection())
            .map_err(|e| PlaygroundError::invalid("turn_detection", e.to_string()))?;

        let metadata = ParticipantMetadata {
            openai_api_key: self.api_key.clone(),
            instructions: self.instructions.clone(),
            model: Some(self.session.model().id().to_string()),
            transcription_model: Some(self.session.transcription_model().id().to_string()),
            voice: Some(self.session.voice().id().to_string()),
            temperature: Some(self.session.temperature().to_string()),
            max_output_tokens: Some(self.session.max_output_tokens().to_string()),
            modalities: Some(self.session.modalities().id().to_string()),
            turn_detection: Some(turn_detection),
        };

        serde_json::to_string(&metadata)
            .map_err(|e| PlaygroundError::invalid("metadata", e.to_string()))
    }

    /// Parse participant metadata the way the voice agent does
    ///
    /// Missing keys take the agent's fallbacks (voice `alloy`, temperature 0.8,
    /// 2048 max output tokens, server VAD with threshold 0.5, 200 ms prefix padding
    /// and 300 ms silence). Identifiers outside the catalog are rejected.
    pub fn from_metadata(json: &str, limits: &Limits) -> Result<Self> {
        let metadata: ParticipantMetadata = serde_json::from_str(json)
            .map_err(|e| PlaygroundError::invalid("metadata", e.to_string()))?;

        let mut session = SessionConfig::default();

        if let Some(model) = non_empty(&metadata.model) {
            session = session.with_model(Model::lookup(model)?);
        }
        if let Some(model) = non_empty(&metadata.transcription_model) {
            session = session.with_transcription_model(TranscriptionModel::lookup(model)?);
        }
        if let Some(modalities) = non_empty(&metadata.modalities) {
            session = session.with_modalities(Modalities::lookup(modalities)?);
        }

        let voice = match non_empty(&metadata.voice) {
            Some(voice) => Voice::lookup(voice)?,
            None => Voice::Alloy,
        };
        session = session.with_voice(voice);

        let temperature = match non_empty(&metadata.temperature) {
            Some(t) => t.trim().parse().map_err(|_| {
                PlaygroundError::invalid("temperature", format!("{:?} is not a valid number", t))
            })?,
            None => AGENT_DEFAULT_TEMPERATURE,
        };
        session = session.with_temperature(temperature, limits)?;

        let max_output_tokens = match non_empty(&metadata.max_output_tokens) {
            Some(tokens) => tokens.parse()?,
            None => MaxOutputTokens::Bounded(AGENT_DEFAULT_MAX_OUTPUT_TOKENS),
        };
        session = session.with_max_output_tokens(max_output_tokens, limits)?;

        let turn_detection = match non_empty(&metadata.turn_detection) {
            Some(raw) => serde_json::from_str(raw)
                .map_err(|e| PlaygroundError::invalid("turn_detection", e.to_string()))?,
            None => TurnDetectionOptions::ServerVad {
                threshold: AGENT_DEFAULT_VAD_THRESHOLD,
                prefix_padding_ms: AGENT_DEFAULT_PREFIX_PADDING_MS,
                silence_duration_ms: AGENT_DEFAULT_SILENCE_DURATION_MS,
            },
        };
        session = match turn_detection {
            TurnDetectionOptions::ServerVad {
                threshold,
                prefix_padding_ms,
                silence_duration_ms,
            } => session
                .with_turn_detection(TurnDetectionType::ServerVad)
                .with_vad_threshold(threshold, limits)?
                .with_vad_prefix_padding_ms(prefix_padding_ms, limits)?
                .with_vad_silence_duration_ms(silence_duration_ms, limits)?,
            TurnDetectionOptions::None => session.with_turn_detection(TurnDetectionType::Manual),
        };

        Ok(Self {
            api_key: metadata.openai_api_key,
            instructions: metadata.instructions,
            session,
        })
    }
}

/// Hosted realtime session, reached at connection time
///
/// Implementations own the network call. Rejected credentials and unreachable
/// endpoints come back as an opaque error.
#[async_trait::async_trait]
pub trait RealtimeConnector: Send + Sync {
    async fn connect(&self, params: &ConnectionParams) -> anyhow::Result<()>;
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
