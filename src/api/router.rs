// src/api/router.rs
// HTTP router composition for the REST API; nested under /api in main.rs

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

use super::conversations::{
    conversations_by_persona, create_conversation, get_conversation, send_message,
};
use super::personas::{create_persona, get_persona, list_personas, personas_by_user};
use crate::state::AppState;

pub fn api_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health
        .route("/health", get(health_handler))
        // Personas
        .route("/personas", post(create_persona))
        .route("/personas/all", get(list_personas))
        .route("/personas/{id}", get(get_persona))
        .route("/personas/{id}/conversations", get(conversations_by_persona))
        .route("/users/{user_id}/personas", get(personas_by_user))
        // Conversations
        .route("/conversations", post(create_conversation))
        .route("/conversations/{id}", get(get_conversation))
        .route("/conversations/{id}/messages", post(send_message))
        .with_state(state)
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
