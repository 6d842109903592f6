// src/api/conversations.rs

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::api::error::{ApiError, ApiResult, IntoApiError, IntoApiErrorOption};
use crate::chat::ChatError;
use crate::conversation::{ChatMessage, Conversation, NewConversation};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub message: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub message: ChatMessage,
    pub conversation: Conversation,
}

/// POST /api/conversations
pub async fn create_conversation(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<serde_json::Value>,
) -> ApiResult<Json<Conversation>> {
    let new: NewConversation = serde_json::from_value(payload)
        .map_err(|e| ApiError::bad_request(format!("Invalid conversation payload: {e}")))?;

    let conversation = state
        .storage
        .create_conversation(new)
        .await
        .into_api_error("Failed to create conversation")?;

    info!(
        conversation_id = %conversation.id,
        persona_id = %conversation.persona_id,
        "Created conversation"
    );
    Ok(Json(conversation))
}

/// GET /api/conversations/{id}
pub async fn get_conversation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Conversation>> {
    let conversation = state
        .storage
        .get_conversation(&id)
        .await
        .into_api_error("Failed to fetch conversation")?
        .ok_or_not_found("Conversation not found")?;
    Ok(Json(conversation))
}

/// GET /api/personas/{id}/conversations
pub async fn conversations_by_persona(
    State(state): State<Arc<AppState>>,
    Path(persona_id): Path<String>,
) -> ApiResult<Json<Vec<Conversation>>> {
    let conversations = state
        .storage
        .conversations_by_persona(&persona_id)
        .await
        .into_api_error("Failed to fetch conversations")?;
    Ok(Json(conversations))
}

/// POST /api/conversations/{id}/messages
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<serde_json::Value>,
) -> ApiResult<Json<SendMessageResponse>> {
    let request: SendMessageRequest = serde_json::from_value(payload)
        .map_err(|e| ApiError::bad_request(format!("Invalid message payload: {e}")))?;
    let message = match request.message.as_deref().map(str::trim) {
        Some(message) if !message.is_empty() => message.to_string(),
        _ => return Err(ApiError::bad_request("Message is required")),
    };

    match state.chat.send_message(&id, &message).await {
        Ok(reply) => Ok(Json(SendMessageResponse {
            message: reply.message,
            conversation: reply.conversation,
        })),
        Err(ChatError::ConversationNotFound) => Err(ApiError::not_found("Conversation not found")),
        Err(ChatError::PersonaNotFound) => Err(ApiError::not_found("Persona not found")),
        Err(e) => {
            error!(conversation_id = %id, error = %e, "Chat turn failed");
            Err(ApiError::internal("Failed to process message"))
        }
    }
}
