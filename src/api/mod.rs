// src/api/mod.rs

pub mod conversations;
pub mod error;
pub mod personas;
pub mod router;

pub use router::api_router;
