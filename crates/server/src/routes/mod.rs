use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;

use crate::AppState;

pub mod assistant;
pub mod health;
pub mod tasks;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health::health_check))
        .merge(assistant::router())
        .merge(tasks::router())
        .with_state(state);

    Router::new().nest("/api", api).layer(CorsLayer::permissive())
}
