pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::state::AppState;
use crate::uploads::{handlers::handle_upload, MAX_UPLOAD_BYTES};
use crate::validation::handlers;

/// Headroom for multipart boundaries and the text parts next to the file.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let upload_dir = state.uploads.dir().to_path_buf();

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/uploads",
            post(handle_upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD)),
        )
        .route(
            "/api/submissions",
            get(handlers::handle_list).post(handlers::handle_submit),
        )
        .route("/api/submissions/:id", get(handlers::handle_get))
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .with_state(state)
}
