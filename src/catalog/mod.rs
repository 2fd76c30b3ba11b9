//! Enumerated option sets
//!
//! Every tunable axis of a realtime session (model, transcription model, turn
//! detection, modalities, voice) is a closed enum. Identifiers are the wire values
//! the hosted API expects; anything outside the catalog is rejected with
//! [`PlaygroundError::UnknownOption`], never coerced to a default.

use crate::error::{PlaygroundError, Result};
use serde::Serialize;

/// Bumped whenever an identifier is removed or renamed, so stale share tokens
/// can be detected.
pub const CATALOG_VERSION: u32 = 1;

/// A closed catalog of identifiers for one configuration axis
pub trait OptionSet: Copy + Sized + 'static {
    /// Axis name used in error messages (e.g. "voice")
    const AXIS: &'static str;

    /// Every valid option, in display order
    const ALL: &'static [Self];

    /// Wire identifier
    fn id(&self) -> &'static str;

    /// Human-readable label
    fn label(&self) -> &'static str;

    /// Look up an option by its wire identifier
    fn lookup(id: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|option| option.id() == id)
            .ok_or_else(|| PlaygroundError::UnknownOption {
                axis: Self::AXIS,
                value: id.to_string(),
            })
    }

    /// Ordered (id, label) listing for this axis
    fn entries() -> Vec<CatalogEntry> {
        Self::ALL
            .iter()
            .map(|option| CatalogEntry {
                id: option.id(),
                label: option.label(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub label: &'static str,
}

/// Full catalog, as served to configuration UIs
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub version: u32,
    pub models: Vec<CatalogEntry>,
    pub transcription_models: Vec<CatalogEntry>,
    pub turn_detection: Vec<CatalogEntry>,
    pub modalities: Vec<CatalogEntry>,
    pub voices: Vec<CatalogEntry>,
}

pub fn describe() -> Catalog {
    Catalog {
        version: CATALOG_VERSION,
        models: Model::entries(),
        transcription_models: TranscriptionModel::entries(),
        turn_detection: TurnDetectionType::entries(),
        modalities: Modalities::entries(),
        voices: Voice::entries(),
    }
}

/// Declares a closed option enum together with its [`OptionSet`], `Display`,
/// `FromStr` and serde impls. Serialization uses the wire identifier.
macro_rules! option_set {
    (
        $(#[$meta:meta])*
        pub enum $name:ident : $axis:literal {
            $( $(#[$vmeta:meta])* $variant:ident => ($id:literal, $label:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $crate::catalog::OptionSet for $name {
            const AXIS: &'static str = $axis;
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn id(&self) -> &'static str {
                match self {
                    $(Self::$variant => $id),+
                }
            }

            fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::catalog::OptionSet::id(self))
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::PlaygroundError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                <Self as $crate::catalog::OptionSet>::lookup(s)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str($crate::catalog::OptionSet::id(self))
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let id = <String as serde::Deserialize>::deserialize(deserializer)?;
                <Self as $crate::catalog::OptionSet>::lookup(&id).map_err(serde::de::Error::custom)
            }
        }
    };
}

mod axes;

pub use axes::{Modalities, Model, TranscriptionModel, TurnDetectionType, Voice};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_every_catalog_entry() {
        for voice in Voice::ALL {
            assert_eq!(Voice::lookup(voice.id()).unwrap(), *voice);
        }
        for model in Model::ALL {
            assert_eq!(model.id().parse::<Model>().unwrap(), *model);
        }
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let err = Voice::lookup("Alloy").unwrap_err();
        assert_eq!(
            err,
            PlaygroundError::UnknownOption {
                axis: "voice",
                value: "Alloy".to_string()
            }
        );
    }

    #[test]
    fn test_describe_lists_all_axes() {
        let catalog = describe();
        assert_eq!(catalog.version, CATALOG_VERSION);
        assert_eq!(catalog.voices.len(), Voice::ALL.len());
        assert_eq!(catalog.turn_detection[0].id, "server_vad");
        assert_eq!(catalog.modalities[1].id, "text_only");
    }

    #[test]
    fn test_serde_uses_wire_identifier() {
        let json = serde_json::to_string(&Modalities::TextOnly).unwrap();
        assert_eq!(json, "\"text_only\"");

        let parsed: TurnDetectionType = serde_json::from_str("\"none\"").unwrap();
        assert_eq!(parsed, TurnDetectionType::Manual);

        assert!(serde_json::from_str::<Voice>("\"robot\"").is_err());
    }
}
