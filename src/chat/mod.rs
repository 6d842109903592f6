// src/chat/mod.rs

pub mod context;
pub mod service;

pub use context::ContextConfig;
pub use service::{ChatError, ChatService, TurnReply};
