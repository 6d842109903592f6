// src/main.rs

use std::str::FromStr;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use sqlx::sqlite::SqlitePoolOptions;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use lumi_backend::api::api_router;
use lumi_backend::chat::ContextConfig;
use lumi_backend::config::CONFIG;
use lumi_backend::llm::{CompletionClient, CompletionGateway};
use lumi_backend::state::AppState;
use lumi_backend::storage::{MemoryStorage, SqliteStorage, Storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::from_str(&CONFIG.log_level).unwrap_or(Level::INFO))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Lumi backend");
    info!("Chat model: {}", CONFIG.chat_model);
    info!(
        "Context: window={} messages, summarize threshold={}",
        CONFIG.context_window_messages, CONFIG.summarize_threshold
    );

    let storage: Arc<dyn Storage> = match CONFIG.storage_backend.as_str() {
        "sqlite" => {
            info!("Storage backend: sqlite ({})", CONFIG.database_url);
            let pool = SqlitePoolOptions::new()
                .max_connections(CONFIG.sqlite_max_connections)
                .connect(&CONFIG.database_url)
                .await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            Arc::new(SqliteStorage::new(pool))
        }
        _ => {
            info!("Storage backend: in-memory");
            Arc::new(MemoryStorage::new())
        }
    };

    let gateway: Arc<dyn CompletionGateway> = match CompletionClient::from_config(&CONFIG) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Completion gateway configuration error: {e}");
            return Err(e);
        }
    };

    let state = Arc::new(AppState::new(
        storage,
        gateway,
        ContextConfig::from_config(&CONFIG),
    ));

    let cors = CorsLayer::new()
        .allow_origin(CONFIG.cors_origin.parse::<HeaderValue>()?)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .nest("/api", api_router(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let bind_address = CONFIG.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app).await?;
    Ok(())
}
