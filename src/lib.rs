// src/lib.rs

pub mod api;
pub mod chat;
pub mod config;
pub mod conversation;
pub mod llm;
pub mod persona;
pub mod state;
pub mod storage;
