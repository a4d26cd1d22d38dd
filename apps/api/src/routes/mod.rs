pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::portfolio::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/themes", get(handlers::handle_list_themes))
        .route("/api/v1/resumes/extract", post(handlers::handle_extract))
        .route("/api/v1/portfolio/generate", post(handlers::handle_generate))
        .route("/api/v1/portfolio/download", post(handlers::handle_download))
        .layer(upload_limit)
        .with_state(state)
}
