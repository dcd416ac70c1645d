use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::metrics::SESSIONS_STARTED;
use crate::core::state::AppState;
use crate::schemas::practice::{AnswerRequest, PracticeTestSummary, SessionView};
use crate::services::practice_session::SessionError;
use crate::tasks::evaluation::schedule_evaluation;

pub(super) async fn list_tests(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Json<Vec<PracticeTestSummary>> {
    Json(state.catalog().tests().iter().map(PracticeTestSummary::from_test).collect())
}

pub(super) async fn start_test(
    Path(test_id): Path<u32>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let test = state
        .catalog()
        .find(test_id)
        .ok_or_else(|| ApiError::NotFound(format!("Practice test {test_id} not found")))?;

    let view = state
        .practice()
        .with_slot(&user.id, |slot| {
            if slot.cancel_pending() {
                tracing::debug!(user_id = %user.id, "Cancelled pending evaluation for replaced session");
            }
            let session = slot.desk.select_test(test);
            SessionView::from_session(Some(session))
        })
        .await;

    metrics::counter!(SESSIONS_STARTED).increment(1);
    tracing::info!(user_id = %user.id, test_id, "Practice session started");

    Ok((StatusCode::CREATED, Json(view)))
}

pub(super) async fn current_session(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Json<SessionView> {
    let view = state
        .practice()
        .with_existing(&user.id, |slot| SessionView::from_session(slot.desk.session()))
        .await
        .unwrap_or_else(SessionView::selecting);
    Json(view)
}

pub(super) async fn set_answer(
    Path(question_id): Path<u32>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<AnswerRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let view = state
        .practice()
        .with_existing(&user.id, |slot| -> Result<SessionView, SessionError> {
            slot.desk.set_answer(question_id, payload.text)?;
            Ok(SessionView::from_session(slot.desk.session()))
        })
        .await
        .unwrap_or(Err(SessionError::NoActiveSession))
        .map_err(map_session_error)?;

    Ok(Json(view))
}

pub(super) async fn submit_session(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let desks = state.practice().clone();
    let shutdown = state.shutdown().clone();
    let user_id = user.id.clone();

    let (session_id, view) = state
        .practice()
        .with_existing(&user.id, move |slot| -> Result<_, SessionError> {
            let session_id = slot.desk.submit()?;
            let delay = slot.desk.draw_evaluation_delay();
            let task = schedule_evaluation(desks, &shutdown, user_id, session_id, delay);
            slot.schedule(task);
            Ok((session_id, SessionView::from_session(slot.desk.session())))
        })
        .await
        .unwrap_or(Err(SessionError::NoActiveSession))
        .map_err(map_session_error)?;

    tracing::info!(user_id = %user.id, session_id = %session_id, "Practice session submitted");

    Ok((StatusCode::ACCEPTED, Json(view)))
}

/// Returns to the test list. Pending evaluation, if any, is cancelled.
pub(super) async fn reset_session(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> StatusCode {
    let discarded = state
        .practice()
        .with_existing(&user.id, |slot| {
            slot.cancel_pending();
            slot.desk.reset()
        })
        .await
        .unwrap_or(false);

    if discarded {
        tracing::info!(user_id = %user.id, "Practice session discarded");
    }
    StatusCode::NO_CONTENT
}

fn map_session_error(err: SessionError) -> ApiError {
    match err {
        SessionError::UnknownQuestion(_) => ApiError::NotFound(err.to_string()),
        SessionError::NoActiveSession
        | SessionError::InvalidTransition { .. }
        | SessionError::StaleEvaluation => ApiError::Conflict(err.to_string()),
    }
}
