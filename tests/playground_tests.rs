// Integration tests for the playground state and its owner
//
// These tests walk through the configuration flows a UI drives: editing fields,
// applying and saving presets, sharing presets, and handing the configuration
// to the realtime session.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use portfolio_voice::preset::DEFAULT_PRESET_ID;
use portfolio_voice::{
    ConnectionParams, ConnectionStatus, Intent, JsonFileStorage, Limits, MemoryStorage,
    Playground, PlaygroundError, Preset, PresetStorage, RealtimeConnector, SessionField,
    TurnDetectionType, Voice,
};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn new_playground() -> Playground {
    Playground::new(Limits::default(), Box::new(MemoryStorage::new())).unwrap()
}

/// Storage that loads nothing and refuses every write
struct FailingStorage;

impl PresetStorage for FailingStorage {
    fn load(&self) -> Result<Vec<Preset>> {
        Ok(Vec::new())
    }

    fn store(&self, _presets: &[Preset]) -> Result<()> {
        Err(anyhow!("disk full"))
    }
}

/// Records the parameters it was asked to connect with
#[derive(Default)]
struct RecordingConnector {
    seen: Mutex<Vec<ConnectionParams>>,
}

#[async_trait]
impl RealtimeConnector for RecordingConnector {
    async fn connect(&self, params: &ConnectionParams) -> Result<()> {
        self.seen.lock().unwrap().push(params.clone());
        Ok(())
    }
}

struct RejectingConnector;

#[async_trait]
impl RealtimeConnector for RejectingConnector {
    async fn connect(&self, _params: &ConnectionParams) -> Result<()> {
        Err(anyhow!("invalid api key"))
    }
}

#[test]
fn test_initial_state() {
    let playground = new_playground();
    let state = playground.state();

    assert_eq!(state.session_config().temperature(), 1.0);
    assert_eq!(state.session_config().voice(), Voice::Alloy);
    assert_eq!(state.session_config().turn_detection(), TurnDetectionType::ServerVad);
    assert_eq!(state.selected_preset_id(), Some(DEFAULT_PRESET_ID));
    assert_eq!(state.instructions(), state.presets().default_preset().instructions);
    assert!(state.credential().is_none());
    assert_eq!(*state.connection(), ConnectionStatus::Disconnected);
    assert!(!state.is_modified());
}

#[test]
fn test_invalid_temperature_leaves_state_unchanged() {
    let mut playground = new_playground();
    let before = playground.state().clone();

    let err = playground
        .set_field(SessionField::Temperature, "2.5")
        .unwrap_err();

    assert!(matches!(err, PlaygroundError::InvalidConfiguration { field: "temperature", .. }));
    assert_eq!(*playground.state(), before);
}

#[test]
fn test_unknown_voice_leaves_state_unchanged() {
    let mut playground = new_playground();
    let before = playground.state().clone();

    let err = playground.set_field(SessionField::Voice, "robot").unwrap_err();

    assert!(matches!(err, PlaygroundError::UnknownOption { axis: "voice", .. }));
    assert_eq!(*playground.state(), before);
}

#[test]
fn test_edit_keeps_preset_selection() {
    let mut playground = new_playground();
    playground.apply_preset("deal-screener").unwrap();
    assert_eq!(playground.state().session_config().vad_threshold(), 0.3);

    playground.set_field(SessionField::VadThreshold, "0.5").unwrap();

    let state = playground.state();
    assert_eq!(state.session_config().vad_threshold(), 0.5);
    assert_eq!(state.selected_preset_id(), Some("deal-screener"));
    assert!(state.is_modified());
}

#[test]
fn test_apply_preset_is_idempotent() {
    let mut playground = new_playground();
    playground.apply_preset("text-analyst").unwrap();
    let once = playground.state().clone();

    playground.apply_preset("text-analyst").unwrap();
    assert_eq!(*playground.state(), once);
}

#[test]
fn test_apply_unknown_preset() {
    let mut playground = new_playground();
    let before = playground.state().clone();

    assert_eq!(
        playground.apply_preset("missing").unwrap_err(),
        PlaygroundError::PresetNotFound("missing".to_string())
    );
    assert_eq!(*playground.state(), before);
}

#[test]
fn test_save_current_as_preset() {
    let mut playground = new_playground();
    playground.set_field(SessionField::Voice, "sage").unwrap();

    let preset = playground.save_current_as_preset("My Config").unwrap();

    let state = playground.state();
    assert_eq!(preset.name, "My Config");
    assert_eq!(preset.session_config.voice(), Voice::Sage);
    assert_eq!(state.selected_preset_id(), Some(preset.id.as_str()));
    assert_eq!(state.user_presets().len(), 1);
    assert!(!state.is_modified());

    // The saved preset is a snapshot, not a live view
    playground.set_field(SessionField::Voice, "coral").unwrap();
    let saved = playground.state().presets().select(&preset.id).unwrap();
    assert_eq!(saved.session_config.voice(), Voice::Sage);
}

#[test]
fn test_save_duplicate_name_leaves_state_unchanged() {
    let mut playground = new_playground();
    playground.save_current_as_preset("My Config").unwrap();
    let before = playground.state().clone();

    let err = playground.save_current_as_preset("my config").unwrap_err();

    assert!(matches!(err, PlaygroundError::DuplicateName(_)));
    assert_eq!(*playground.state(), before);
}

#[test]
fn test_remove_selected_preset_falls_back_to_default() {
    let mut playground = new_playground();
    playground.set_field(SessionField::Voice, "echo").unwrap();
    let preset = playground.save_current_as_preset("Echo").unwrap();

    playground.remove_preset(&preset.id).unwrap();

    let state = playground.state();
    assert!(state.user_presets().is_empty());
    assert_eq!(state.selected_preset_id(), Some(DEFAULT_PRESET_ID));
    // The live configuration is kept
    assert_eq!(state.session_config().voice(), Voice::Echo);
}

#[test]
fn test_remove_unselected_preset_keeps_selection() {
    let mut playground = new_playground();
    let first = playground.save_current_as_preset("First").unwrap();
    playground.apply_preset("deal-screener").unwrap();

    playground.remove_preset(&first.id).unwrap();

    assert_eq!(playground.state().selected_preset_id(), Some("deal-screener"));
}

#[test]
fn test_remove_builtin_is_protected() {
    let mut playground = new_playground();
    let before = playground.state().clone();

    assert_eq!(
        playground.remove_preset(DEFAULT_PRESET_ID).unwrap_err(),
        PlaygroundError::ProtectedPreset(DEFAULT_PRESET_ID.to_string())
    );
    assert_eq!(*playground.state(), before);
}

#[test]
fn test_overwrite_preset() {
    let mut playground = new_playground();
    let preset = playground.save_current_as_preset("Desk").unwrap();
    playground.set_field(SessionField::Temperature, "0.8").unwrap();
    assert!(playground.state().is_modified());

    let updated = playground
        .dispatch(Intent::OverwriteSelectedPreset)
        .unwrap()
        .unwrap();

    assert_eq!(updated.id, preset.id);
    assert_eq!(updated.session_config.temperature(), 0.8);
    assert!(!playground.state().is_modified());
}

#[test]
fn test_reset_to_default() {
    let mut playground = new_playground();
    playground.apply_preset("text-analyst").unwrap();
    playground
        .dispatch(Intent::SetInstructions {
            instructions: "Only numbers.".to_string(),
        })
        .unwrap();
    assert!(playground.state().is_modified());

    playground.dispatch(Intent::ResetToDefault).unwrap();

    let state = playground.state();
    assert_eq!(state.selected_preset_id(), Some(DEFAULT_PRESET_ID));
    assert!(!state.is_modified());
}

#[test]
fn test_export_then_import_applies_preset() {
    let mut playground = new_playground();
    playground.set_field(SessionField::Voice, "ballad").unwrap();
    let preset = playground.save_current_as_preset("Ballad").unwrap();
    let token = playground.export_preset(&preset.id).unwrap();

    // Import into a fresh playground, as a colleague would
    let mut other = new_playground();
    let imported = other.import_preset(&token).unwrap();

    let state = other.state();
    assert_eq!(imported.name, "Ballad");
    assert_eq!(imported.session_config, preset.session_config);
    assert_eq!(state.selected_preset_id(), Some(imported.id.as_str()));
    assert_eq!(state.session_config().voice(), Voice::Ballad);
}

#[test]
fn test_import_with_taken_name_is_renamed() {
    let mut playground = new_playground();
    let preset = playground.save_current_as_preset("Mine").unwrap();
    let token = playground.export_preset(&preset.id).unwrap();

    let first = playground.import_preset(&token).unwrap();
    let second = playground.import_preset(&token).unwrap();

    assert_eq!(first.name, "Mine (2)");
    assert_eq!(second.name, "Mine (3)");
    assert_eq!(first.session_config, preset.session_config);
    assert_eq!(playground.state().user_presets().len(), 3);
    assert_eq!(playground.state().selected_preset_id(), Some(second.id.as_str()));
}

#[test]
fn test_import_builtin_token() {
    let mut playground = new_playground();
    let token = playground.export_preset("deal-screener").unwrap();

    let imported = playground.import_preset(&token).unwrap();

    assert_eq!(imported.name, "Deal Screener (2)");
    assert!(!imported.is_builtin());
    assert_eq!(playground.state().session_config().voice(), Voice::Ash);
}

#[test]
fn test_import_blank_name_gets_default_name() {
    let mut playground = new_playground();
    let token = playground.export_preset("text-analyst").unwrap();
    let json = URL_SAFE_NO_PAD.decode(&token["pv1.".len()..]).unwrap();
    let mut payload: serde_json::Value = serde_json::from_slice(&json).unwrap();
    payload["name"] = serde_json::json!("   ");
    let blank = format!("pv1.{}", URL_SAFE_NO_PAD.encode(payload.to_string()));

    let first = playground.import_preset(&blank).unwrap();
    let second = playground.import_preset(&blank).unwrap();

    assert_eq!(first.name, "Imported preset");
    assert_eq!(second.name, "Imported preset (2)");
    assert_eq!(playground.state().user_presets().len(), 2);
}

#[test]
fn test_import_malformed_token() {
    let mut playground = new_playground();
    let before = playground.state().clone();

    let err = playground.import_preset("pv1.not-a-token").unwrap_err();

    assert!(matches!(err, PlaygroundError::MalformedToken(_)));
    assert_eq!(*playground.state(), before);
}

#[test]
fn test_storage_failure_leaves_state_unchanged() {
    let mut playground = Playground::new(Limits::default(), Box::new(FailingStorage)).unwrap();
    let before = playground.state().clone();

    let err = playground.save_current_as_preset("Doomed").unwrap_err();

    assert!(matches!(err, PlaygroundError::Storage(_)));
    assert_eq!(*playground.state(), before);

    // Edits that do not touch presets still work
    playground.set_field(SessionField::Voice, "echo").unwrap();
}

#[test]
fn test_presets_survive_restart() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("presets.json");

    let saved = {
        let mut playground =
            Playground::new(Limits::default(), Box::new(JsonFileStorage::new(&path)))?;
        playground.set_field(SessionField::Voice, "shimmer")?;
        playground.save_current_as_preset("Shimmer")?
    };

    let playground = Playground::new(Limits::default(), Box::new(JsonFileStorage::new(&path)))?;
    let state = playground.state();

    assert_eq!(state.user_presets(), &[saved]);
    // Startup always selects the default preset
    assert_eq!(state.selected_preset_id(), Some(DEFAULT_PRESET_ID));
    Ok(())
}

#[test]
fn test_stored_presets_outside_limits_are_skipped() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("presets.json");

    {
        let mut playground =
            Playground::new(Limits::default(), Box::new(JsonFileStorage::new(&path)))?;
        playground.set_field(SessionField::Temperature, "1.2")?;
        playground.save_current_as_preset("Hot")?;
        playground.set_field(SessionField::Temperature, "0.9")?;
        playground.save_current_as_preset("Warm")?;
    }

    let mut limits = Limits::default();
    limits.temperature.max = 1.0;
    let playground = Playground::new(limits, Box::new(JsonFileStorage::new(&path)))?;

    let names: Vec<&str> = playground
        .state()
        .user_presets()
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec!["Warm"]);
    Ok(())
}

#[test]
fn test_subscribers_see_committed_state() {
    let mut playground = new_playground();
    let mut rx = playground.subscribe();
    assert!(!rx.has_changed().unwrap());

    playground.set_field(SessionField::Voice, "verse").unwrap();

    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().session_config().voice(), Voice::Verse);

    // Rejected transitions do not notify
    let _ = playground.set_field(SessionField::Voice, "robot");
    assert!(!rx.has_changed().unwrap());
}

#[test]
fn test_snapshot_hides_credential() {
    let mut playground = new_playground();
    playground
        .set_credential(Some("sk-test-secret".to_string()))
        .unwrap();

    let snapshot = playground.state().snapshot();
    assert!(snapshot.has_credential);

    let json = serde_json::to_string(&snapshot).unwrap();
    assert!(!json.contains("sk-test-secret"));
    assert!(!format!("{:?}", playground.state()).contains("sk-test-secret"));
}

#[test]
fn test_intent_dispatch_from_json() {
    let mut playground = new_playground();
    let intent: Intent =
        serde_json::from_str(r#"{"type":"set_field","field":"temperature","value":"0.7"}"#)
            .unwrap();

    playground.dispatch(intent).unwrap();
    assert_eq!(playground.state().session_config().temperature(), 0.7);

    let intent: Intent = serde_json::from_str(r#"{"type":"apply_preset","id":"deal-screener"}"#)
        .unwrap();
    playground.dispatch(intent).unwrap();
    assert_eq!(playground.state().selected_preset_id(), Some("deal-screener"));
}

#[tokio::test]
async fn test_connect_requires_credential() {
    let mut playground = new_playground();
    let connector = RecordingConnector::default();

    let err = playground.connect(&connector).await.unwrap_err();

    assert_eq!(
        err,
        PlaygroundError::Connection("OpenAI API key is required".to_string())
    );
    assert_eq!(*playground.state().connection(), ConnectionStatus::Disconnected);
    assert!(connector.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_connect_passes_live_configuration() {
    let mut playground = new_playground();
    playground.set_credential(Some("sk-test".to_string())).unwrap();
    playground.set_field(SessionField::Voice, "coral").unwrap();
    let connector = RecordingConnector::default();

    playground.connect(&connector).await.unwrap();

    assert_eq!(*playground.state().connection(), ConnectionStatus::Connected);
    let seen = connector.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].api_key, "sk-test");
    assert_eq!(seen[0].session.voice(), Voice::Coral);
    assert_eq!(seen[0].instructions, playground.state().instructions());
}

#[tokio::test]
async fn test_connect_failure_is_reported() {
    let mut playground = new_playground();
    playground.set_credential(Some("sk-bad".to_string())).unwrap();

    let err = playground.connect(&RejectingConnector).await.unwrap_err();

    assert!(matches!(err, PlaygroundError::Connection(ref reason) if reason.contains("invalid api key")));
    assert!(matches!(
        playground.state().connection(),
        ConnectionStatus::Failed(_)
    ));

    playground.disconnect();
    assert_eq!(*playground.state().connection(), ConnectionStatus::Disconnected);
}

#[tokio::test]
async fn test_playground_shared_across_tasks() {
    let playground = Arc::new(tokio::sync::RwLock::new(new_playground()));

    let mut handles = Vec::new();
    for voice in ["ash", "echo", "sage"] {
        let playground = playground.clone();
        handles.push(tokio::spawn(async move {
            playground
                .write()
                .await
                .set_field(SessionField::Voice, voice)
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let voice = playground.read().await.state().session_config().voice();
    assert!(matches!(voice, Voice::Ash | Voice::Echo | Voice::Sage));
}
