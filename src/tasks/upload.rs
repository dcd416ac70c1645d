use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::core::config::UploadSettings;
use crate::core::metrics::UPLOAD_BATCHES;
use crate::repositories::desks::UploadDesks;
use crate::services::upload_pipeline::{UploadDesk, UploadError, FULL_PROGRESS};
use crate::tasks::staging::{pause, StagedTask};

#[derive(Debug)]
enum Interrupted {
    Cancelled,
    Rejected(UploadError),
}

impl From<UploadError> for Interrupted {
    fn from(err: UploadError) -> Self {
        Self::Rejected(err)
    }
}

/// Drives one batch through upload ticks, the analysis delay, the canned
/// result, and the delayed return to idle. Each stage runs under the desk
/// lock and is rejected if the batch is no longer current.
pub(crate) fn schedule_upload(
    desks: UploadDesks,
    shutdown: &CancellationToken,
    user_id: String,
    batch_id: Uuid,
    timings: UploadSettings,
) -> StagedTask {
    StagedTask::spawn(shutdown, move |token| async move {
        match run_batch(&desks, &token, &user_id, batch_id, &timings).await {
            Ok(()) => {
                metrics::counter!(UPLOAD_BATCHES, "outcome" => "resulted").increment(1);
            }
            Err(Interrupted::Cancelled) => {
                tracing::debug!(user_id = %user_id, batch_id = %batch_id, "Upload batch cancelled");
                metrics::counter!(UPLOAD_BATCHES, "outcome" => "cancelled").increment(1);
            }
            Err(Interrupted::Rejected(err)) => {
                tracing::debug!(
                    user_id = %user_id,
                    batch_id = %batch_id,
                    error = %err,
                    "Upload stage rejected"
                );
                metrics::counter!(UPLOAD_BATCHES, "outcome" => "stale").increment(1);
            }
        }
    })
}

async fn run_batch(
    desks: &UploadDesks,
    token: &CancellationToken,
    user_id: &str,
    batch_id: Uuid,
    timings: &UploadSettings,
) -> Result<(), Interrupted> {
    loop {
        wait(token, timings.tick).await?;
        let progress = stage(desks, user_id, |desk| {
            let step = desk.draw_step();
            desk.advance(batch_id, step)
        })
        .await?;
        tracing::trace!(batch_id = %batch_id, progress, "Upload progress");
        if progress >= FULL_PROGRESS {
            break;
        }
    }

    wait(token, timings.analysis_start_delay).await?;
    stage(desks, user_id, |desk| desk.begin_analysis(batch_id)).await?;
    tracing::info!(user_id = %user_id, batch_id = %batch_id, "Upload analysis started");

    wait(token, timings.analysis_duration).await?;
    let grade = stage(desks, user_id, |desk| {
        desk.resolve(batch_id).map(|graded| graded.evaluation.grade)
    })
    .await?;
    tracing::info!(user_id = %user_id, batch_id = %batch_id, grade, "Upload evaluation ready");

    wait(token, timings.result_clear_delay).await?;
    stage(desks, user_id, |desk| desk.settle(batch_id)).await?;
    tracing::debug!(user_id = %user_id, batch_id = %batch_id, "Upload desk settled");
    Ok(())
}

async fn wait(token: &CancellationToken, duration: std::time::Duration) -> Result<(), Interrupted> {
    if pause(token, duration).await {
        Ok(())
    } else {
        Err(Interrupted::Cancelled)
    }
}

async fn stage<T>(
    desks: &UploadDesks,
    user_id: &str,
    f: impl FnOnce(&mut UploadDesk) -> Result<T, UploadError>,
) -> Result<T, Interrupted> {
    desks
        .with_existing(user_id, |slot| f(&mut slot.desk))
        .await
        .unwrap_or(Err(UploadError::StaleBatch))
        .map_err(Interrupted::from)
}
