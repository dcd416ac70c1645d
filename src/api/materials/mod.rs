mod handlers;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::core::{config::Settings, state::AppState};

/// The body limit admits a full batch; per-file size and file count are
/// enforced while the multipart stream is read.
pub(crate) fn router(settings: &Settings) -> Router<AppState> {
    let body_limit = usize::try_from(settings.upload().max_request_bytes()).unwrap_or(usize::MAX);

    Router::new()
        .route("/uploads", post(handlers::start_upload))
        .route(
            "/uploads/current",
            get(handlers::current_upload).delete(handlers::discard_upload),
        )
        .route("/uploads/current/close", post(handlers::close_result))
        .layer(DefaultBodyLimit::max(body_limit))
}
