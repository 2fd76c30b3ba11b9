use crate::error::{PlaygroundError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Inclusive numeric range accepted for one configuration field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy + Display> Bounds<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// NaN never satisfies either comparison, so it is always rejected
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn check(&self, field: &'static str, value: T) -> Result<T> {
        if self.contains(value) {
            Ok(value)
        } else {
            Err(PlaygroundError::invalid(
                field,
                format!("{} is outside [{}, {}]", value, self.min, self.max),
            ))
        }
    }
}

/// Validity ranges imposed by the hosted realtime API
///
/// These come from the API documentation, not from this crate, so they can be
/// overridden from the `[limits]` table of the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Sampling temperature (API range: 0.6 to 1.2)
    pub temperature: Bounds<f64>,

    /// Bounded max output tokens (API range: 1 to 4096, or "inf")
    pub max_output_tokens: Bounds<u32>,

    /// VAD activation threshold
    pub vad_threshold: Bounds<f64>,

    /// Silence needed before the turn ends, in milliseconds
    pub vad_silence_duration_ms: Bounds<u32>,

    /// Audio kept before detected speech, in milliseconds
    pub vad_prefix_padding_ms: Bounds<u32>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            temperature: Bounds::new(0.6, 1.2),
            max_output_tokens: Bounds::new(1, 4096),
            vad_threshold: Bounds::new(0.0, 1.0),
            vad_silence_duration_ms: Bounds::new(0, 10_000),
            vad_prefix_padding_ms: Bounds::new(0, 10_000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_inclusive() {
        let limits = Limits::default();
        assert!(limits.temperature.contains(0.6));
        assert!(limits.temperature.contains(1.2));
        assert!(!limits.temperature.contains(1.21));
        assert!(!limits.vad_threshold.contains(f64::NAN));
    }

    #[test]
    fn test_check_names_field() {
        let err = Limits::default()
            .vad_threshold
            .check("vad_threshold", 1.5)
            .unwrap_err();
        match err {
            PlaygroundError::InvalidConfiguration { field, reason } => {
                assert_eq!(field, "vad_threshold");
                assert!(reason.contains("1.5"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let limits: Limits =
            serde_json::from_str(r#"{"temperature": {"min": 0.0, "max": 2.0}}"#).unwrap();
        assert_eq!(limits.temperature, Bounds::new(0.0, 2.0));
        assert_eq!(limits.max_output_tokens, Limits::default().max_output_tokens);
    }
}
