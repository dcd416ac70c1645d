use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::validation::validate_material_upload;
use crate::core::state::AppState;
use crate::schemas::materials::UploadView;
use crate::services::upload_pipeline::{
    FileRef, StartOutcome, UploadError, UploadKind, UploadMetadata,
};
use crate::tasks::upload::schedule_upload;

/// Starts an upload batch from a multipart form.
///
/// File parts are named `files` (or `files[]`). Their bytes are counted
/// against the per-file limit and then dropped; only name, size and declared
/// type travel into the batch. Text parts `student_name`, `student_class`,
/// `subject` and `kind` carry the metadata.
pub(super) async fn start_upload(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadView>), ApiError> {
    let upload_settings = state.settings().upload();
    let max_bytes = upload_settings.max_upload_bytes();

    let mut files = Vec::new();
    let mut metadata = UploadMetadata::default();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Invalid multipart data".to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "files" | "files[]" => {
                if files.len() >= upload_settings.max_files_per_batch {
                    return Err(ApiError::BadRequest(format!(
                        "At most {} files can be uploaded at once",
                        upload_settings.max_files_per_batch
                    )));
                }
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .filter(|s| !s.trim().is_empty())
                    .ok_or_else(|| ApiError::BadRequest("File name is required".to_string()))?;
                let content_type = field.content_type().map(|s| s.to_string());
                validate_material_upload(
                    &filename,
                    content_type.as_deref(),
                    &upload_settings.allowed_extensions,
                )?;

                let mut size_bytes = 0u64;
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|_| ApiError::BadRequest("Failed to read file".to_string()))?
                {
                    size_bytes += chunk.len() as u64;
                    if size_bytes > max_bytes {
                        return Err(ApiError::PayloadTooLarge(format!(
                            "File '{filename}' exceeds {}MB limit",
                            upload_settings.max_upload_size_mb
                        )));
                    }
                }
                files.push(FileRef { name: filename, size_bytes, content_type });
            }
            "student_name" => metadata.student_name = read_text(field, &name).await?,
            "student_class" => metadata.student_class = read_text(field, &name).await?,
            "subject" => metadata.subject = read_text(field, &name).await?,
            "kind" => {
                let value = read_text(field, &name).await?;
                if !value.is_empty() {
                    metadata.kind = UploadKind::parse(&value).ok_or_else(|| {
                        ApiError::UnprocessableEntity(format!("Unknown upload kind '{value}'"))
                    })?;
                }
            }
            _ => {}
        }
    }

    let file_count = files.len();
    let kind = metadata.kind;
    let desks = state.uploads().clone();
    let shutdown = state.shutdown().clone();
    let timings = upload_settings.clone();
    let user_id = user.id.clone();

    let (outcome, view) = state
        .uploads()
        .with_slot(&user.id, move |slot| -> Result<_, UploadError> {
            let outcome = slot.desk.start(files, metadata)?;
            if let StartOutcome::Started(batch_id) = outcome {
                let task = schedule_upload(desks, &shutdown, user_id, batch_id, timings);
                slot.schedule(task);
            }
            Ok((outcome, UploadView::from_desk(&slot.desk)))
        })
        .await
        .map_err(map_upload_error)?;

    match outcome {
        StartOutcome::Started(batch_id) => {
            tracing::info!(
                user_id = %user.id,
                batch_id = %batch_id,
                files = file_count,
                kind = kind.as_str(),
                "Upload batch started"
            );
            Ok((StatusCode::ACCEPTED, Json(view)))
        }
        StartOutcome::NothingToUpload => Ok((StatusCode::OK, Json(view))),
    }
}

pub(super) async fn current_upload(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Json<UploadView> {
    let view = state
        .uploads()
        .with_existing(&user.id, |slot| UploadView::from_desk(&slot.desk))
        .await
        .unwrap_or_else(UploadView::idle);
    Json(view)
}

pub(super) async fn close_result(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<UploadView>, ApiError> {
    let view = state
        .uploads()
        .with_existing(&user.id, |slot| -> Result<UploadView, UploadError> {
            slot.desk.close()?;
            slot.cancel_pending();
            Ok(UploadView::from_desk(&slot.desk))
        })
        .await
        .unwrap_or_else(|| Ok(UploadView::idle()))
        .map_err(map_upload_error)?;

    Ok(Json(view))
}

pub(super) async fn discard_upload(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> StatusCode {
    let discarded = state
        .uploads()
        .with_existing(&user.id, |slot| {
            slot.cancel_pending();
            slot.desk.discard()
        })
        .await
        .unwrap_or(false);

    if discarded {
        tracing::info!(user_id = %user.id, "Upload batch discarded");
    }
    StatusCode::NO_CONTENT
}

async fn read_text(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map(|value| value.trim().to_string())
        .map_err(|_| ApiError::BadRequest(format!("Invalid value for {name}")))
}

fn map_upload_error(err: UploadError) -> ApiError {
    match err {
        UploadError::MissingField(_) => ApiError::UnprocessableEntity(err.to_string()),
        UploadError::Busy(_) | UploadError::InvalidTransition { .. } | UploadError::StaleBatch => {
            ApiError::Conflict(err.to_string())
        }
    }
}
