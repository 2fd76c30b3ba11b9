use super::state::AppState;
use crate::catalog;
use crate::error::PlaygroundError;
use crate::playground::{Intent, StateSnapshot};
use crate::preset::Preset;
use crate::session::SessionField;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SetFieldRequest {
    /// Catalog id or number, exactly as a UI control would send it
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct SetInstructionsRequest {
    pub instructions: String,
}

#[derive(Deserialize)]
pub struct SetCredentialRequest {
    /// `null` clears the stored key
    pub credential: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SavePresetRequest {
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TokenBody {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct PresetResponse {
    pub preset: Preset,
    pub state: StateSnapshot,
}

#[derive(Debug, Serialize)]
pub struct ConnectionResponse {
    /// Participant metadata understood by the voice agent
    pub metadata: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl PlaygroundError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::PresetNotFound(_) => StatusCode::NOT_FOUND,
            Self::DuplicateName(_) | Self::DuplicateId(_) => StatusCode::CONFLICT,
            Self::ProtectedPreset(_) => StatusCode::FORBIDDEN,
            Self::UnknownOption { .. } | Self::InvalidConfiguration { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::MalformedToken(_) => StatusCode::BAD_REQUEST,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Connection(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for PlaygroundError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /catalog
/// Every selectable option, per axis
pub async fn get_catalog() -> impl IntoResponse {
    (StatusCode::OK, Json(catalog::describe()))
}

/// GET /state
pub async fn get_state(State(state): State<AppState>) -> impl IntoResponse {
    let playground = state.playground.read().await;
    (StatusCode::OK, Json(playground.state().snapshot()))
}

/// PUT /session/:field
/// Change one session field
pub async fn set_field(
    State(state): State<AppState>,
    Path(field): Path<String>,
    Json(req): Json<SetFieldRequest>,
) -> Response {
    let field: SessionField = match field.parse() {
        Ok(field) => field,
        Err(e) => return e.into_response(),
    };

    info!("Setting {} to {:?}", field, req.value);

    let mut playground = state.playground.write().await;
    match playground.set_field(field, &req.value) {
        Ok(()) => (StatusCode::OK, Json(playground.state().snapshot())).into_response(),
        Err(e) => e.into_response(),
    }
}

/// PUT /instructions
pub async fn set_instructions(
    State(state): State<AppState>,
    Json(req): Json<SetInstructionsRequest>,
) -> Response {
    let mut playground = state.playground.write().await;
    let intent = Intent::SetInstructions {
        instructions: req.instructions,
    };
    match playground.dispatch(intent) {
        Ok(_) => (StatusCode::OK, Json(playground.state().snapshot())).into_response(),
        Err(e) => e.into_response(),
    }
}

/// PUT /credential
/// Store or clear the API key; the response only says whether one is set
pub async fn set_credential(
    State(state): State<AppState>,
    Json(req): Json<SetCredentialRequest>,
) -> Response {
    let mut playground = state.playground.write().await;
    match playground.set_credential(req.credential) {
        Ok(()) => (StatusCode::OK, Json(playground.state().snapshot())).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /session/reset
/// Apply the default preset
pub async fn reset_session(State(state): State<AppState>) -> Response {
    let mut playground = state.playground.write().await;
    match playground.dispatch(Intent::ResetToDefault) {
        Ok(_) => (StatusCode::OK, Json(playground.state().snapshot())).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /presets
/// Built-in presets followed by user presets
pub async fn list_presets(State(state): State<AppState>) -> impl IntoResponse {
    let playground = state.playground.read().await;
    let presets: Vec<Preset> = playground.state().presets().iter().cloned().collect();
    (StatusCode::OK, Json(presets))
}

/// POST /presets
/// Save the live configuration as a new user preset
pub async fn save_preset(
    State(state): State<AppState>,
    Json(req): Json<SavePresetRequest>,
) -> Response {
    info!("Saving preset {:?}", req.name);

    let mut playground = state.playground.write().await;
    match playground.save_current_as_preset(&req.name) {
        Ok(preset) => (
            StatusCode::CREATED,
            Json(PresetResponse {
                preset,
                state: playground.state().snapshot(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to save preset {:?}: {}", req.name, e);
            e.into_response()
        }
    }
}

/// POST /presets/import
/// Decode a share token into a new user preset and apply it
pub async fn import_preset(
    State(state): State<AppState>,
    Json(req): Json<TokenBody>,
) -> Response {
    let mut playground = state.playground.write().await;
    match playground.import_preset(&req.token) {
        Ok(preset) => {
            info!("Imported preset {} ({:?})", preset.id, preset.name);
            (
                StatusCode::CREATED,
                Json(PresetResponse {
                    preset,
                    state: playground.state().snapshot(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to import preset: {}", e);
            e.into_response()
        }
    }
}

/// PUT /presets/:preset_id
/// Write the live configuration into an existing user preset
pub async fn overwrite_preset(
    State(state): State<AppState>,
    Path(preset_id): Path<String>,
) -> Response {
    let mut playground = state.playground.write().await;
    match playground.overwrite_preset(&preset_id) {
        Ok(preset) => (
            StatusCode::OK,
            Json(PresetResponse {
                preset,
                state: playground.state().snapshot(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to overwrite preset {}: {}", preset_id, e);
            e.into_response()
        }
    }
}

/// DELETE /presets/:preset_id
pub async fn remove_preset(
    State(state): State<AppState>,
    Path(preset_id): Path<String>,
) -> Response {
    let mut playground = state.playground.write().await;
    match playground.remove_preset(&preset_id) {
        Ok(()) => {
            info!("Removed preset {}", preset_id);
            (StatusCode::OK, Json(playground.state().snapshot())).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// POST /presets/:preset_id/apply
pub async fn apply_preset(
    State(state): State<AppState>,
    Path(preset_id): Path<String>,
) -> Response {
    let mut playground = state.playground.write().await;
    match playground.apply_preset(&preset_id) {
        Ok(()) => (StatusCode::OK, Json(playground.state().snapshot())).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /presets/:preset_id/export
/// Share token for one preset
pub async fn export_preset(
    State(state): State<AppState>,
    Path(preset_id): Path<String>,
) -> Response {
    let playground = state.playground.read().await;
    match playground.export_preset(&preset_id) {
        Ok(token) => (StatusCode::OK, Json(TokenBody { token })).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /connection
/// Participant metadata for the voice agent, built from the live configuration.
/// This is the hand-off to whoever starts the session, so it carries the key;
/// nothing here logs it.
pub async fn get_connection(State(state): State<AppState>) -> Response {
    let playground = state.playground.read().await;
    let params = match playground.connection_params() {
        Ok(params) => params,
        // Only a missing key can fail here; that is the caller's problem, not
        // the upstream's.
        Err(PlaygroundError::Connection(reason)) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse { error: reason }),
            )
                .into_response()
        }
        Err(e) => return e.into_response(),
    };

    match params.to_metadata() {
        Ok(metadata) => (StatusCode::OK, Json(ConnectionResponse { metadata })).into_response(),
        Err(e) => {
            error!("Failed to build participant metadata: {}", e);
            e.into_response()
        }
    }
}
