use super::intent::Intent;
use super::state::{ConnectionStatus, PlaygroundState};
use crate::error::{PlaygroundError, Result};
use crate::preset::{builtin_presets, Preset, PresetStorage, PresetStore};
use crate::session::{ConnectionParams, Limits, RealtimeConnector, SessionField};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Single owner of the playground state
///
/// All changes go through here. Changes to the user preset list are written to
/// storage before they are committed; if storage fails, the state is unchanged.
/// Observers get the new state through a watch channel after every commit.
///
/// Not internally synchronized: hosts that share it across tasks wrap it in a
/// lock (see `http::AppState`).
pub struct Playground {
    state: PlaygroundState,
    storage: Box<dyn PresetStorage>,
    notifier: watch::Sender<PlaygroundState>,
}

impl Playground {
    /// Build the initial state from the compiled-in presets plus whatever
    /// `storage` holds. Stored presets that fail validation are skipped.
    pub fn new(limits: Limits, storage: Box<dyn PresetStorage>) -> Result<Self> {
        let mut presets = PresetStore::new(builtin_presets(&limits)?)?;

        let stored = storage.load().map_err(storage_error)?;
        for preset in stored {
            let name = preset.name.clone();
            let restored = preset
                .session_config
                .validate(&limits)
                .and_then(|_| presets.insert(preset));
            if let Err(e) = restored {
                warn!("Skipping stored preset {:?}: {}", name, e);
            }
        }

        info!(
            "Playground ready with {} built-in and {} user presets",
            presets.builtins().len(),
            presets.user_presets().len()
        );

        let state = PlaygroundState::new(presets, Arc::new(limits));
        let (notifier, _) = watch::channel(state.clone());

        Ok(Self {
            state,
            storage,
            notifier,
        })
    }

    pub fn state(&self) -> &PlaygroundState {
        &self.state
    }

    /// Receive every committed state
    pub fn subscribe(&self) -> watch::Receiver<PlaygroundState> {
        self.notifier.subscribe()
    }

    /// Apply an intent; returns the preset created or rewritten, if any
    pub fn dispatch(&mut self, intent: Intent) -> Result<Option<Preset>> {
        let description = format!("{:?}", intent);
        self.transition(&description, |state| intent.apply(state))
    }

    pub fn set_field(&mut self, field: SessionField, value: &str) -> Result<()> {
        self.transition("set_field", |state| Ok((state.set_field(field, value)?, ())))
    }

    pub fn apply_preset(&mut self, id: &str) -> Result<()> {
        self.transition("apply_preset", |state| Ok((state.apply_preset(id)?, ())))
    }

    pub fn save_current_as_preset(&mut self, name: &str) -> Result<Preset> {
        self.transition("save_current_as_preset", |state| {
            state.save_current_as_preset(name)
        })
    }

    pub fn overwrite_preset(&mut self, id: &str) -> Result<Preset> {
        self.transition("overwrite_preset", |state| state.overwrite_preset(id))
    }

    pub fn remove_preset(&mut self, id: &str) -> Result<()> {
        self.transition("remove_preset", |state| Ok((state.remove_preset(id)?, ())))
    }

    pub fn import_preset(&mut self, token: &str) -> Result<Preset> {
        self.transition("import_preset", |state| state.import_preset(token))
    }

    pub fn set_credential(&mut self, credential: Option<String>) -> Result<()> {
        self.transition("set_credential", |state| Ok((state.set_credential(credential), ())))
    }

    pub fn export_preset(&self, id: &str) -> Result<String> {
        self.state.export_preset(id)
    }

    pub fn connection_params(&self) -> Result<ConnectionParams> {
        self.state.connection_params()
    }

    /// Open the hosted realtime session with the current configuration
    ///
    /// A missing credential fails before anything changes. Otherwise the
    /// connection status moves to `Connecting` and then to `Connected` or
    /// `Failed`.
    pub async fn connect(&mut self, connector: &dyn RealtimeConnector) -> Result<()> {
        let params = self.state.connection_params()?;

        info!(
            "Connecting realtime session (model={}, voice={}, turn_detection={})",
            params.session.model(),
            params.session.voice(),
            params.session.turn_detection()
        );
        self.set_connection(ConnectionStatus::Connecting);

        match connector.connect(&params).await {
            Ok(()) => {
                info!("Realtime session connected");
                self.set_connection(ConnectionStatus::Connected);
                Ok(())
            }
            Err(e) => {
                let reason = format!("{:#}", e);
                error!("Realtime session failed to connect: {}", reason);
                self.set_connection(ConnectionStatus::Failed(reason.clone()));
                Err(PlaygroundError::Connection(reason))
            }
        }
    }

    pub fn disconnect(&mut self) {
        self.set_connection(ConnectionStatus::Disconnected);
    }

    fn set_connection(&mut self, status: ConnectionStatus) {
        self.state = self.state.set_connection_status(status);
        self.notifier.send_replace(self.state.clone());
    }

    fn transition<T, F>(&mut self, description: &str, f: F) -> Result<T>
    where
        F: FnOnce(&PlaygroundState) -> Result<(PlaygroundState, T)>,
    {
        let (next, output) = f(&self.state).map_err(|e| {
            warn!("Rejected {}: {}", description, e);
            e
        })?;
        self.commit(next)?;
        info!("Applied {}", description);
        Ok(output)
    }

    fn commit(&mut self, next: PlaygroundState) -> Result<()> {
        if next.user_presets() != self.state.user_presets() {
            self.storage.store(next.user_presets()).map_err(|e| {
                error!("Failed to persist presets: {:#}", e);
                storage_error(e)
            })?;
        }
        self.state = next;
        self.notifier.send_replace(self.state.clone());
        Ok(())
    }
}

fn storage_error(e: anyhow::Error) -> PlaygroundError {
    PlaygroundError::Storage(format!("{:#}", e))
}
