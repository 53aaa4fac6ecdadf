use axum::{Router, extract::DefaultBodyLimit, routing::get};

use crate::AppState;
use crate::handlers;

/// Create gateway routes
pub fn file_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::index))
        .route("/docs", get(handlers::docs))
        // Health check
        .route("/health", get(handlers::health))
        // Wildcards never match an empty tail, so the base directory gets its own route
        .route(
            "/file/",
            get(handlers::get_root)
                .post(handlers::upload_root)
                .patch(handlers::update_root)
                .delete(handlers::delete_root),
        )
        .route(
            "/file/{*path}",
            get(handlers::get_path)
                .post(handlers::upload_file)
                .patch(handlers::update_file)
                .delete(handlers::delete_file),
        )
}

/// Routes with the upload body limit applied and state attached
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.body_limit();

    file_routes()
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
