option_set! {
    /// Realtime conversation model
    pub enum Model: "model" {
        #[default]
        Gpt4oRealtime => ("gpt-4o-realtime-preview-2024-12-17", "GPT-4o Realtime"),
        Gpt4oMiniRealtime => ("gpt-4o-mini-realtime-preview-2024-12-17", "GPT-4o mini Realtime"),
        Gpt4oRealtimeOctober => ("gpt-4o-realtime-preview-2024-10-01", "GPT-4o Realtime (2024-10-01)"),
    }
}

option_set! {
    /// Model used to transcribe the user's speech
    pub enum TranscriptionModel: "transcription model" {
        #[default]
        Whisper1 => ("whisper-1", "Whisper"),
    }
}

option_set! {
    /// Strategy the hosted API uses to decide when the user has finished speaking
    pub enum TurnDetectionType: "turn detection" {
        #[default]
        ServerVad => ("server_vad", "Server VAD"),
        Manual => ("none", "None"),
    }
}

option_set! {
    /// Input/output channels enabled for the session
    pub enum Modalities: "modalities" {
        #[default]
        TextAndAudio => ("text_and_audio", "Text and audio"),
        TextOnly => ("text_only", "Text only"),
    }
}

option_set! {
    pub enum Voice: "voice" {
        #[default]
        Alloy => ("alloy", "Alloy"),
        Ash => ("ash", "Ash"),
        Ballad => ("ballad", "Ballad"),
        Coral => ("coral", "Coral"),
        Echo => ("echo", "Echo"),
        Sage => ("sage", "Sage"),
        Shimmer => ("shimmer", "Shimmer"),
        Verse => ("verse", "Verse"),
    }
}

impl TurnDetectionType {
    /// Whether the VAD tuning fields (threshold, silence, prefix padding) apply
    pub fn is_vad(&self) -> bool {
        matches!(self, Self::ServerVad)
    }
}

impl Modalities {
    /// Channel list sent to the hosted API
    pub fn channels(&self) -> &'static [&'static str] {
        match self {
            Self::TextAndAudio => &["text", "audio"],
            Self::TextOnly => &["text"],
        }
    }

    /// Inverse of [`Modalities::channels`]
    pub fn from_channels<S: AsRef<str>>(channels: &[S]) -> Option<Self> {
        let channels: Vec<&str> = channels.iter().map(AsRef::as_ref).collect();
        match channels.as_slice() {
            ["text", "audio"] | ["audio", "text"] => Some(Self::TextAndAudio),
            ["text"] => Some(Self::TextOnly),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modalities_channels() {
        assert_eq!(Modalities::TextAndAudio.channels(), &["text", "audio"]);
        assert_eq!(
            Modalities::from_channels(&["audio", "text"]),
            Some(Modalities::TextAndAudio)
        );
        assert_eq!(Modalities::from_channels(&["audio"]), None);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Voice::default(), Voice::Alloy);
        assert_eq!(TurnDetectionType::default(), TurnDetectionType::ServerVad);
        assert!(TurnDetectionType::default().is_vad());
        assert!(!TurnDetectionType::Manual.is_vad());
    }
}
