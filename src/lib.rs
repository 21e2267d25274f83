pub mod api;
pub mod config;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::AppConfig;
use crate::services::upload_service::UploadService;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;

/// Process-wide state, built once in `main` and shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub upload_service: Arc<UploadService>,
    pub config: AppConfig,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::handlers::form::render_form))
        .route(
            "/upload",
            post(api::handlers::upload::upload_file)
                .layer(DefaultBodyLimit::max(state.config.upload_body_limit())),
        )
        .with_state(state)
}
