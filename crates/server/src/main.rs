use anyhow::Error as AnyhowError;
use assistant::{Assistant, LlmConfig, SqliteTaskStore};
use db::DBService;
use server::{AppState, routes};
use sqlx::Error as SqlxError;
use std::sync::Arc;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, prelude::*};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Sqlx(#[from] SqlxError),
    #[error(transparent)]
    Other(#[from] AnyhowError),
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // Load environment variables from `.env` if present so local development
    // picks up API keys without exporting them by hand.
    dotenv::dotenv().ok();

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let filter_string = format!(
        "warn,server={level},assistant={level},db={level}",
        level = log_level
    );
    let env_filter =
        EnvFilter::try_new(&filter_string).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(env_filter))
        .init();

    let db = DBService::from_env().await?;

    let config = LlmConfig::from_env();
    let provider = config.build();
    if !provider.is_configured() {
        tracing::warn!(
            provider = %config.provider,
            "completion provider has no credentials; free-form messages will use the fixed fallback reply"
        );
    }

    let store = Arc::new(SqliteTaskStore::new(db.pool.clone()));
    let assistant = Assistant::new(store, provider);

    let app = routes::router(AppState::new(db, assistant));

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3000);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    tracing::info!("listening on http://{host}:{port}");

    axum::serve(listener, app).await?;
    Ok(())
}
