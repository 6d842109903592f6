// src/config.rs
// All runtime settings come from the environment (with a .env file as a
// convenience); defaults cover everything except the completion credential.

use once_cell::sync::Lazy;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct LumiConfig {
    // ── Completion service
    pub completion_api_key: String,
    pub completion_base_url: String,
    pub chat_model: String,
    pub chat_max_tokens: u32,
    pub chat_temperature: f32,
    pub summary_model: String,
    pub summary_max_tokens: u32,
    pub summary_temperature: f32,

    // ── Conversation context
    pub summarize_threshold: usize,
    pub context_window_messages: usize,

    // ── Storage
    pub storage_backend: String,
    pub database_url: String,
    pub sqlite_max_connections: u32,

    // ── Server
    pub host: String,
    pub port: u16,
    pub cors_origin: String,

    // ── Logging
    pub log_level: String,
}

fn env_var_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

impl LumiConfig {
    pub fn from_env() -> Self {
        // Not an error when absent; plain environment variables still apply.
        let _ = dotenvy::dotenv();

        Self {
            completion_api_key: env_var_or("GROQ_API_KEY", String::new()),
            completion_base_url: env_var_or(
                "LUMI_COMPLETION_BASE_URL",
                "https://api.groq.com/openai/v1".to_string(),
            ),
            chat_model: env_var_or("LUMI_CHAT_MODEL", "llama-3.1-8b-instant".to_string()),
            chat_max_tokens: env_var_or("LUMI_CHAT_MAX_TOKENS", 500),
            chat_temperature: env_var_or("LUMI_CHAT_TEMPERATURE", 0.8),
            summary_model: env_var_or("LUMI_SUMMARY_MODEL", "llama-3.1-8b-instant".to_string()),
            summary_max_tokens: env_var_or("LUMI_SUMMARY_MAX_TOKENS", 200),
            summary_temperature: env_var_or("LUMI_SUMMARY_TEMPERATURE", 0.3),
            summarize_threshold: env_var_or("LUMI_SUMMARIZE_THRESHOLD", 10),
            context_window_messages: env_var_or("LUMI_CONTEXT_WINDOW_MESSAGES", 10),
            storage_backend: env_var_or("LUMI_STORAGE_BACKEND", "memory".to_string()),
            database_url: env_var_or("DATABASE_URL", "sqlite:./lumi.db".to_string()),
            sqlite_max_connections: env_var_or("SQLITE_MAX_CONNECTIONS", 10),
            host: env_var_or("LUMI_HOST", "0.0.0.0".to_string()),
            port: env_var_or("LUMI_PORT", 3000),
            cors_origin: env_var_or("LUMI_CORS_ORIGIN", "http://localhost:3000".to_string()),
            log_level: env_var_or("LUMI_LOG_LEVEL", "info".to_string()),
        }
    }

    /// Server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// Global config instance - loaded once at startup
pub static CONFIG: Lazy<LumiConfig> = Lazy::new(LumiConfig::from_env);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_or_falls_back_on_missing_or_bad_values() {
        std::env::remove_var("LUMI_TEST_UNSET");
        assert_eq!(env_var_or("LUMI_TEST_UNSET", 42usize), 42);

        std::env::set_var("LUMI_TEST_GARBAGE", "not-a-number");
        assert_eq!(env_var_or("LUMI_TEST_GARBAGE", 7usize), 7);
        std::env::remove_var("LUMI_TEST_GARBAGE");
    }
}
