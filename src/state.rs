// src/state.rs
// Shared application state: one store instance and one chat service,
// constructed at startup and injected into every handler.

use std::sync::Arc;

use crate::chat::{ChatService, ContextConfig};
use crate::llm::CompletionGateway;
use crate::storage::Storage;

pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub chat: ChatService,
}

impl AppState {
    pub fn new(
        storage: Arc<dyn Storage>,
        gateway: Arc<dyn CompletionGateway>,
        context: ContextConfig,
    ) -> Self {
        let chat = ChatService::new(storage.clone(), gateway, context);
        Self { storage, chat }
    }
}
