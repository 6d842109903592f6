// src/api/personas.rs

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::api::error::{ApiError, ApiResult, IntoApiError, IntoApiErrorOption};
use crate::persona::{prompt::compose_system_prompt, NewPersona, Persona};
use crate::state::AppState;

/// POST /api/personas
///
/// The system prompt is derived from the payload exactly once, here, and
/// stored with the record.
pub async fn create_persona(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<serde_json::Value>,
) -> ApiResult<Json<Persona>> {
    let new: NewPersona = serde_json::from_value(payload)
        .map_err(|e| ApiError::bad_request(format!("Invalid persona payload: {e}")))?;
    new.validate().map_err(ApiError::bad_request)?;

    let system_prompt = compose_system_prompt(&new);
    let persona = state
        .storage
        .create_persona(new, system_prompt)
        .await
        .into_api_error("Failed to create persona")?;

    info!(persona_id = %persona.id, name = %persona.name, "Created persona");
    Ok(Json(persona))
}

/// GET /api/personas/all
pub async fn list_personas(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Persona>>> {
    let personas = state
        .storage
        .list_personas()
        .await
        .into_api_error("Failed to fetch personas")?;
    Ok(Json(personas))
}

/// GET /api/personas/{id}
pub async fn get_persona(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Persona>> {
    let persona = state
        .storage
        .get_persona(&id)
        .await
        .into_api_error("Failed to fetch persona")?
        .ok_or_not_found("Persona not found")?;
    Ok(Json(persona))
}

/// GET /api/users/{user_id}/personas
pub async fn personas_by_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<Persona>>> {
    let personas = state
        .storage
        .personas_by_user(&user_id)
        .await
        .into_api_error("Failed to fetch personas")?;
    Ok(Json(personas))
}
