//! Share tokens
//!
//! A token is `pv1.` followed by URL-safe, unpadded base64 of a JSON document that
//! carries the catalog version, name, description, instructions and session
//! configuration. Credentials are never part of a token.
//!
//! Decoding checks structure first (`MalformedToken`), then every enumerated value
//! against the current catalog (`UnknownOption`), then numeric limits
//! (`InvalidConfiguration`).

use super::preset::Preset;
use crate::catalog::{
    Modalities, Model, OptionSet, TranscriptionModel, TurnDetectionType, Voice, CATALOG_VERSION,
};
use crate::error::{PlaygroundError, Result};
use crate::session::{Limits, MaxOutputTokens, SessionConfig};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

const TOKEN_PREFIX: &str = "pv1.";

#[derive(Serialize, Deserialize)]
struct SharedPreset {
    version: u32,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    instructions: String,
    session_config: SharedConfig,
}

/// Enumerated fields stay plain strings here so that an unknown identifier
/// surfaces as `UnknownOption` rather than a generic parse failure.
#[derive(Serialize, Deserialize)]
struct SharedConfig {
    model: String,
    transcription_model: String,
    turn_detection: String,
    modalities: String,
    voice: String,
    temperature: f64,
    max_output_tokens: MaxOutputTokens,
    vad_threshold: f64,
    vad_silence_duration_ms: u32,
    vad_prefix_padding_ms: u32,
}

impl SharedConfig {
    fn from_config(config: &SessionConfig) -> Self {
        Self {
            model: config.model().id().to_string(),
            transcription_model: config.transcription_model().id().to_string(),
            turn_detection: config.turn_detection().id().to_string(),
            modalities: config.modalities().id().to_string(),
            voice: config.voice().id().to_string(),
            temperature: config.temperature(),
            max_output_tokens: config.max_output_tokens(),
            vad_threshold: config.vad_threshold(),
            vad_silence_duration_ms: config.vad_silence_duration_ms(),
            vad_prefix_padding_ms: config.vad_prefix_padding_ms(),
        }
    }

    fn into_config(self, limits: &Limits) -> Result<SessionConfig> {
        SessionConfig::default()
            .with_model(Model::lookup(&self.model)?)
            .with_transcription_model(TranscriptionModel::lookup(&self.transcription_model)?)
            .with_turn_detection(TurnDetectionType::lookup(&self.turn_detection)?)
            .with_modalities(Modalities::lookup(&self.modalities)?)
            .with_voice(Voice::lookup(&self.voice)?)
            .with_temperature(self.temperature, limits)?
            .with_max_output_tokens(self.max_output_tokens, limits)?
            .with_vad_threshold(self.vad_threshold, limits)?
            .with_vad_silence_duration_ms(self.vad_silence_duration_ms, limits)?
            .with_vad_prefix_padding_ms(self.vad_prefix_padding_ms, limits)
    }
}

pub fn encode(preset: &Preset) -> Result<String> {
    let shared = SharedPreset {
        version: CATALOG_VERSION,
        name: preset.name.clone(),
        description: preset.description.clone(),
        instructions: preset.instructions.clone(),
        session_config: SharedConfig::from_config(&preset.session_config),
    };
    let json = serde_json::to_vec(&shared)
        .map_err(|e| PlaygroundError::MalformedToken(format!("encoding preset: {}", e)))?;
    Ok(format!("{}{}", TOKEN_PREFIX, URL_SAFE_NO_PAD.encode(json)))
}

/// Decode a token into a new user preset with a fresh identifier
pub fn decode(token: &str, limits: &Limits) -> Result<Preset> {
    let body = token
        .trim()
        .strip_prefix(TOKEN_PREFIX)
        .ok_or_else(|| PlaygroundError::MalformedToken("unrecognized token format".to_string()))?;

    let json = URL_SAFE_NO_PAD
        .decode(body)
        .map_err(|e| PlaygroundError::MalformedToken(format!("invalid base64: {}", e)))?;

    let shared: SharedPreset = serde_json::from_slice(&json)
        .map_err(|e| PlaygroundError::MalformedToken(format!("invalid payload: {}", e)))?;

    if shared.version != CATALOG_VERSION {
        return Err(PlaygroundError::MalformedToken(format!(
            "token was created for catalog version {}, expected {}",
            shared.version, CATALOG_VERSION
        )));
    }

    let session_config = shared.session_config.into_config(limits)?;
    let mut preset = Preset::user(shared.name, session_config, shared.instructions);
    preset.description = shared.description;
    Ok(preset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_raw(value: serde_json::Value) -> String {
        format!("{}{}", TOKEN_PREFIX, URL_SAFE_NO_PAD.encode(value.to_string()))
    }

    fn payload(voice: &str, version: u32) -> serde_json::Value {
        serde_json::json!({
            "version": version,
            "name": "Shared",
            "instructions": "Hello",
            "session_config": {
                "model": "gpt-4o-realtime-preview-2024-12-17",
                "transcription_model": "whisper-1",
                "turn_detection": "server_vad",
                "modalities": "text_and_audio",
                "voice": voice,
                "temperature": 0.9,
                "max_output_tokens": "inf",
                "vad_threshold": 0.5,
                "vad_silence_duration_ms": 200,
                "vad_prefix_padding_ms": 300
            }
        })
    }

    #[test]
    fn test_token_is_url_safe() {
        let preset = Preset::user("Q&A / fast?", SessionConfig::default(), "+++///???");
        let token = encode(&preset).unwrap();
        assert!(token.starts_with(TOKEN_PREFIX));
        assert!(token[TOKEN_PREFIX.len()..]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_decode_valid_payload() {
        let preset = decode(&encode_raw(payload("coral", CATALOG_VERSION)), &Limits::default()).unwrap();
        assert_eq!(preset.name, "Shared");
        assert_eq!(preset.session_config.voice(), Voice::Coral);
        assert_eq!(preset.session_config.temperature(), 0.9);
    }

    #[test]
    fn test_unknown_voice_is_unknown_option() {
        let err = decode(&encode_raw(payload("robot", CATALOG_VERSION)), &Limits::default()).unwrap_err();
        assert_eq!(
            err,
            PlaygroundError::UnknownOption {
                axis: "voice",
                value: "robot".to_string()
            }
        );
    }

    #[test]
    fn test_stale_catalog_version_rejected() {
        let err = decode(&encode_raw(payload("alloy", 0)), &Limits::default()).unwrap_err();
        assert!(matches!(err, PlaygroundError::MalformedToken(_)));
    }

    #[test]
    fn test_structural_garbage_rejected() {
        let limits = Limits::default();
        for token in ["", "hello", "pv1.", "pv1.!!!!", "pv2.e30", "pv1.e30"] {
            let err = decode(token, &limits).unwrap_err();
            assert!(
                matches!(err, PlaygroundError::MalformedToken(_)),
                "{token:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_out_of_range_value_rejected() {
        let mut value = payload("alloy", CATALOG_VERSION);
        value["session_config"]["temperature"] = serde_json::json!(3.0);
        let err = decode(&encode_raw(value), &Limits::default()).unwrap_err();
        assert!(matches!(
            err,
            PlaygroundError::InvalidConfiguration { field: "temperature", .. }
        ));
    }
}
