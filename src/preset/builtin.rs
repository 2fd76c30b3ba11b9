use super::preset::{Preset, PresetOrigin};
use crate::catalog::{Modalities, TurnDetectionType, Voice};
use crate::error::Result;
use crate::session::{Limits, SessionConfig};

/// Preset selected at startup and after the selected user preset is removed
pub const DEFAULT_PRESET_ID: &str = "portfolio-AI";

const PORTFOLIO_INSTRUCTIONS: &str = "\
You are a voice assistant for a venture portfolio. You answer questions about the \
companies in the portfolio: what they do, their industry domains, valuations and \
recent fundraising, and how well they align with the Collaborative Fund thesis and \
the personal investment thesis. Use the portfolio tools for every factual answer and \
say so when a company or figure is not in the data. Keep spoken answers short, lead \
with the number or the name the user asked for, and offer to go deeper.";

const SCREENER_INSTRUCTIONS: &str = "\
You help screen portfolio companies quickly. Answer in one or two sentences. When \
asked to compare or rank companies, give the ranking first and the reasoning only \
if asked. Never speculate beyond the portfolio data.";

const TEXT_ANALYST_INSTRUCTIONS: &str = "\
You are a written portfolio analyst. Reply in structured text with short headings \
and bullet points. Include valuation figures with their as-of dates and cite the \
source article when the data has one.";

/// The compiled-in preset catalog, validated against `limits`
///
/// Fails if the configured limits exclude a value one of the built-ins uses.
pub fn builtin_presets(limits: &Limits) -> Result<Vec<Preset>> {
    let screener = SessionConfig::default()
        .with_voice(Voice::Ash)
        .with_vad_threshold(0.3, limits)?
        .with_vad_silence_duration_ms(500, limits)?;

    let text_analyst = SessionConfig::default()
        .with_modalities(Modalities::TextOnly)
        .with_turn_detection(TurnDetectionType::Manual);

    let default_config = SessionConfig::default();
    default_config.validate(limits)?;

    Ok(vec![
        builtin(
            DEFAULT_PRESET_ID,
            "Portfolio AI",
            "Conversational analyst for the portfolio dataset",
            default_config,
            PORTFOLIO_INSTRUCTIONS,
        ),
        builtin(
            "deal-screener",
            "Deal Screener",
            "Terse answers with a more sensitive voice activity detector",
            screener,
            SCREENER_INSTRUCTIONS,
        ),
        builtin(
            "text-analyst",
            "Text Analyst",
            "Text-only responses without automatic turn detection",
            text_analyst,
            TEXT_ANALYST_INSTRUCTIONS,
        ),
    ])
}

fn builtin(
    id: &str,
    name: &str,
    description: &str,
    session_config: SessionConfig,
    instructions: &str,
) -> Preset {
    Preset {
        id: id.to_string(),
        name: name.to_string(),
        description: Some(description.to_string()),
        session_config,
        instructions: instructions.to_string(),
        origin: PresetOrigin::BuiltIn,
        created_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlaygroundError;
    use crate::session::Bounds;

    #[test]
    fn test_default_preset_comes_first() {
        let presets = builtin_presets(&Limits::default()).unwrap();
        assert_eq!(presets[0].id, DEFAULT_PRESET_ID);
        assert!(presets.iter().all(Preset::is_builtin));
        assert_eq!(presets[0].session_config, SessionConfig::default());
    }

    #[test]
    fn test_restrictive_limits_reject_builtins() {
        let limits = Limits {
            vad_threshold: Bounds::new(0.4, 1.0),
            ..Limits::default()
        };
        let err = builtin_presets(&limits).unwrap_err();
        assert!(matches!(
            err,
            PlaygroundError::InvalidConfiguration { field: "vad_threshold", .. }
        ));
    }
}
