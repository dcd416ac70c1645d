mod handlers;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/tests", get(handlers::list_tests))
        .route("/tests/:test_id/start", post(handlers::start_test))
        .route("/session", get(handlers::current_session).delete(handlers::reset_session))
        .route("/session/answers/:question_id", put(handlers::set_answer))
        .route("/session/submit", post(handlers::submit_session))
}
