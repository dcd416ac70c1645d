use std::time::Duration;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::core::metrics::EVALUATIONS;
use crate::repositories::desks::PracticeDesks;
use crate::tasks::staging::{pause, StagedTask};

/// Schedules the simulated evaluation of `session_id` after `delay`.
///
/// The stage re-checks the session id under the desk lock, so a session that
/// was reset or replaced while waiting is left untouched.
pub(crate) fn schedule_evaluation(
    desks: PracticeDesks,
    shutdown: &CancellationToken,
    user_id: String,
    session_id: Uuid,
    delay: Duration,
) -> StagedTask {
    StagedTask::spawn(shutdown, move |token| async move {
        tracing::debug!(
            user_id = %user_id,
            session_id = %session_id,
            delay_ms = delay.as_millis() as u64,
            "Practice evaluation scheduled"
        );

        if !pause(&token, delay).await {
            tracing::debug!(user_id = %user_id, session_id = %session_id, "Practice evaluation cancelled");
            metrics::counter!(EVALUATIONS, "outcome" => "cancelled").increment(1);
            return;
        }

        let outcome = desks
            .with_existing(&user_id, |slot| {
                slot.desk.complete_evaluation(session_id).map(|result| result.total_score)
            })
            .await;

        match outcome {
            Some(Ok(total_score)) => {
                tracing::info!(
                    user_id = %user_id,
                    session_id = %session_id,
                    total_score,
                    "Practice session scored"
                );
                metrics::counter!(EVALUATIONS, "outcome" => "scored").increment(1);
            }
            Some(Err(err)) => {
                tracing::debug!(
                    user_id = %user_id,
                    session_id = %session_id,
                    error = %err,
                    "Dropping stale practice evaluation"
                );
                metrics::counter!(EVALUATIONS, "outcome" => "stale").increment(1);
            }
            None => {
                tracing::warn!(user_id = %user_id, session_id = %session_id, "Practice desk vanished before evaluation");
                metrics::counter!(EVALUATIONS, "outcome" => "stale").increment(1);
            }
        }
    })
}
