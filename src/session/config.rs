use super::limits::Limits;
use crate::catalog::{Modalities, Model, OptionSet, TranscriptionModel, TurnDetectionType, Voice};
use crate::error::{PlaygroundError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Upper bound on tokens per response, or no bound at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaxOutputTokens {
    Bounded(u32),
    /// Serialized as `"inf"`, matching the hosted API
    #[default]
    Unbounded,
}

impl fmt::Display for MaxOutputTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(n) => write!(f, "{}", n),
            Self::Unbounded => f.write_str("inf"),
        }
    }
}

impl FromStr for MaxOutputTokens {
    type Err = PlaygroundError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s == "inf" {
            return Ok(Self::Unbounded);
        }
        s.parse::<u32>().map(Self::Bounded).map_err(|_| {
            PlaygroundError::invalid(
                "max_output_tokens",
                format!("expected a positive integer or \"inf\", got {:?}", s),
            )
        })
    }
}

impl Serialize for MaxOutputTokens {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Bounded(n) => serializer.serialize_u32(*n),
            Self::Unbounded => serializer.serialize_str("inf"),
        }
    }
}

impl<'de> Deserialize<'de> for MaxOutputTokens {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Count(u32),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Count(n) => Ok(Self::Bounded(n)),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Names of the editable session fields, as used by UIs and the HTTP API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionField {
    Model,
    TranscriptionModel,
    TurnDetection,
    Modalities,
    Voice,
    Temperature,
    MaxOutputTokens,
    VadThreshold,
    VadSilenceDurationMs,
    VadPrefixPaddingMs,
}

impl SessionField {
    pub const ALL: &'static [SessionField] = &[
        Self::Model,
        Self::TranscriptionModel,
        Self::TurnDetection,
        Self::Modalities,
        Self::Voice,
        Self::Temperature,
        Self::MaxOutputTokens,
        Self::VadThreshold,
        Self::VadSilenceDurationMs,
        Self::VadPrefixPaddingMs,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::TranscriptionModel => "transcription_model",
            Self::TurnDetection => "turn_detection",
            Self::Modalities => "modalities",
            Self::Voice => "voice",
            Self::Temperature => "temperature",
            Self::MaxOutputTokens => "max_output_tokens",
            Self::VadThreshold => "vad_threshold",
            Self::VadSilenceDurationMs => "vad_silence_duration_ms",
            Self::VadPrefixPaddingMs => "vad_prefix_padding_ms",
        }
    }
}

impl fmt::Display for SessionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SessionField {
    type Err = PlaygroundError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.name() == s)
            .ok_or_else(|| PlaygroundError::UnknownOption {
                axis: "session field",
                value: s.to_string(),
            })
    }
}

/// Tunable parameters of one realtime conversation session
///
/// An immutable value: every `with_*` call consumes the snapshot and returns a new
/// one, or an error naming the offending field. Two snapshots can be compared with
/// `==` to tell whether the live configuration still matches a preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    model: Model,
    transcription_model: TranscriptionModel,
    turn_detection: TurnDetectionType,
    modalities: Modalities,
    voice: Voice,
    temperature: f64,
    max_output_tokens: MaxOutputTokens,
    vad_threshold: f64,
    vad_silence_duration_ms: u32,
    vad_prefix_padding_ms: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model: Model::default(),
            transcription_model: TranscriptionModel::default(),
            turn_detection: TurnDetectionType::default(),
            modalities: Modalities::default(),
            voice: Voice::default(),
            temperature: 1.0,
            max_output_tokens: MaxOutputTokens::Unbounded,
            vad_threshold: 0.5,
            vad_silence_duration_ms: 200,
            vad_prefix_padding_ms: 300,
        }
    }
}

impl SessionConfig {
    pub fn model(&self) -> Model {
        self.model
    }

    pub fn transcription_model(&self) -> TranscriptionModel {
        self.transcription_model
    }

    pub fn turn_detection(&self) -> TurnDetectionType {
        self.turn_detection
    }

    pub fn modalities(&self) -> Modalities {
        self.modalities
    }

    pub fn voice(&self) -> Voice {
        self.voice
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn max_output_tokens(&self) -> MaxOutputTokens {
        self.max_output_tokens
    }

    pub fn vad_threshold(&self) -> f64 {
        self.vad_threshold
    }

    pub fn vad_silence_duration_ms(&self) -> u32 {
        self.vad_silence_duration_ms
    }

    pub fn vad_prefix_padding_ms(&self) -> u32 {
        self.vad_prefix_padding_ms
    }

    pub fn with_model(self, model: Model) -> Self {
        Self { model, ..self }
    }

    pub fn with_transcription_model(self, transcription_model: TranscriptionModel) -> Self {
        Self {
            transcription_model,
            ..self
        }
    }

    /// VAD fields are kept when switching away from a VAD strategy, so switching
    /// back restores the previous tuning.
    pub fn with_turn_detection(self, turn_detection: TurnDetectionType) -> Self {
        Self {
            turn_detection,
            ..self
        }
    }

    pub fn with_modalities(self, modalities: Modalities) -> Self {
        Self { modalities, ..self }
    }

    pub fn with_voice(self, voice: Voice) -> Self {
        Self { voice, ..self }
    }

    pub fn with_temperature(self, temperature: f64, limits: &Limits) -> Result<Self> {
        let temperature = limits.temperature.check("temperature", temperature)?;
        Ok(Self {
            temperature,
            ..self
        })
    }

    pub fn with_max_output_tokens(
        self,
        max_output_tokens: MaxOutputTokens,
        limits: &Limits,
    ) -> Result<Self> {
        if let MaxOutputTokens::Bounded(n) = max_output_tokens {
            limits.max_output_tokens.check("max_output_tokens", n)?;
        }
        Ok(Self {
            max_output_tokens,
            ..self
        })
    }

    pub fn with_vad_threshold(self, vad_threshold: f64, limits: &Limits) -> Result<Self> {
        let vad_threshold = limits.vad_threshold.check("vad_threshold", vad_threshold)?;
        Ok(Self {
            vad_threshold,
            ..self
        })
    }

    pub fn with_vad_silence_duration_ms(self, ms: u32, limits: &Limits) -> Result<Self> {
        let vad_silence_duration_ms = limits
            .vad_silence_duration_ms
            .check("vad_silence_duration_ms", ms)?;
        Ok(Self {
            vad_silence_duration_ms,
            ..self
        })
    }

    pub fn with_vad_prefix_padding_ms(self, ms: u32, limits: &Limits) -> Result<Self> {
        let vad_prefix_padding_ms = limits
            .vad_prefix_padding_ms
            .check("vad_prefix_padding_ms", ms)?;
        Ok(Self {
            vad_prefix_padding_ms,
            ..self
        })
    }

    /// Set a field from its textual form (UI and HTTP boundary)
    ///
    /// Enumerated fields fail with `UnknownOption`, numeric fields with
    /// `InvalidConfiguration`.
    pub fn with_field(self, field: SessionField, value: &str, limits: &Limits) -> Result<Self> {
        match field {
            SessionField::Model => Ok(self.with_model(Model::lookup(value)?)),
            SessionField::TranscriptionModel => {
                Ok(self.with_transcription_model(TranscriptionModel::lookup(value)?))
            }
            SessionField::TurnDetection => {
                Ok(self.with_turn_detection(TurnDetectionType::lookup(value)?))
            }
            SessionField::Modalities => Ok(self.with_modalities(Modalities::lookup(value)?)),
            SessionField::Voice => Ok(self.with_voice(Voice::lookup(value)?)),
            SessionField::Temperature => {
                let temperature = parse_number(field, value)?;
                self.with_temperature(temperature, limits)
            }
            SessionField::MaxOutputTokens => self.with_max_output_tokens(value.parse()?, limits),
            SessionField::VadThreshold => {
                let threshold = parse_number(field, value)?;
                self.with_vad_threshold(threshold, limits)
            }
            SessionField::VadSilenceDurationMs => {
                let ms = parse_number(field, value)?;
                self.with_vad_silence_duration_ms(ms, limits)
            }
            SessionField::VadPrefixPaddingMs => {
                let ms = parse_number(field, value)?;
                self.with_vad_prefix_padding_ms(ms, limits)
            }
        }
    }

    /// Textual form of a field, the inverse of [`SessionConfig::with_field`]
    pub fn field(&self, field: SessionField) -> String {
        match field {
            SessionField::Model => self.model.id().to_string(),
            SessionField::TranscriptionModel => self.transcription_model.id().to_string(),
            SessionField::TurnDetection => self.turn_detection.id().to_string(),
            SessionField::Modalities => self.modalities.id().to_string(),
            SessionField::Voice => self.voice.id().to_string(),
            SessionField::Temperature => self.temperature.to_string(),
            SessionField::MaxOutputTokens => self.max_output_tokens.to_string(),
            SessionField::VadThreshold => self.vad_threshold.to_string(),
            SessionField::VadSilenceDurationMs => self.vad_silence_duration_ms.to_string(),
            SessionField::VadPrefixPaddingMs => self.vad_prefix_padding_ms.to_string(),
        }
    }

    /// Re-check a snapshot that did not come through the setters (storage, tokens)
    pub fn validate(&self, limits: &Limits) -> Result<()> {
        limits.temperature.check("temperature", self.temperature)?;
        if let MaxOutputTokens::Bounded(n) = self.max_output_tokens {
            limits.max_output_tokens.check("max_output_tokens", n)?;
        }
        limits
            .vad_threshold
            .check("vad_threshold", self.vad_threshold)?;
        limits
            .vad_silence_duration_ms
            .check("vad_silence_duration_ms", self.vad_silence_duration_ms)?;
        limits
            .vad_prefix_padding_ms
            .check("vad_prefix_padding_ms", self.vad_prefix_padding_ms)?;
        Ok(())
    }
}

fn parse_number<T: FromStr>(field: SessionField, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        PlaygroundError::invalid(field.name(), format!("{:?} is not a valid number", value))
    })
}
