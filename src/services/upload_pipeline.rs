use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::core::config::UploadSettings;
use crate::core::time::now_utc;
use crate::services::canned_evaluations::{self, CannedEvaluation};

pub(crate) const FULL_PROGRESS: u8 = 100;

/// Opaque description of an uploaded file. Contents are never inspected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct FileRef {
    pub(crate) name: String,
    pub(crate) size_bytes: u64,
    pub(crate) content_type: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum UploadKind {
    QuestionPaper,
    #[default]
    AnswerSheet,
}

impl UploadKind {
    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "question_paper" | "question" => Some(Self::QuestionPaper),
            "answer_sheet" | "answer" => Some(Self::AnswerSheet),
            _ => None,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::QuestionPaper => "question_paper",
            Self::AnswerSheet => "answer_sheet",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct UploadMetadata {
    pub(crate) student_name: String,
    pub(crate) student_class: String,
    pub(crate) subject: String,
    pub(crate) kind: UploadKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UploadStatus {
    Idle,
    Uploading { progress: u8 },
    Analyzing,
    Resulted,
}

impl UploadStatus {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Uploading { .. } => "uploading",
            Self::Analyzing => "analyzing",
            Self::Resulted => "resulted",
        }
    }

    pub(crate) fn progress(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Uploading { progress } => progress,
            Self::Analyzing | Self::Resulted => FULL_PROGRESS,
        }
    }

    fn is_in_flight(self) -> bool {
        matches!(self, Self::Uploading { .. } | Self::Analyzing)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct UploadBatch {
    pub(crate) id: Uuid,
    pub(crate) files: Vec<FileRef>,
    pub(crate) metadata: UploadMetadata,
    pub(crate) started_at: OffsetDateTime,
}

/// A canned evaluation merged with the metadata the batch was started with.
#[derive(Debug, Clone)]
pub(crate) struct GradedUpload {
    pub(crate) batch_id: Uuid,
    pub(crate) evaluation: CannedEvaluation,
    pub(crate) metadata: UploadMetadata,
    pub(crate) graded_at: OffsetDateTime,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum UploadError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("an upload is already {}", .0.as_str())]
    Busy(UploadStatus),
    #[error("cannot {action} while upload is {}", .status.as_str())]
    InvalidTransition { action: &'static str, status: UploadStatus },
    #[error("stage no longer matches the current batch")]
    StaleBatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StartOutcome {
    Started(Uuid),
    NothingToUpload,
}

/// One user's upload pipeline: `Idle → Uploading → Analyzing → Resulted`.
///
/// Every stage after `start` is driven by a scheduled continuation that
/// presents the batch id it was spawned for; a mismatched id means the batch
/// was discarded or replaced and the stage is rejected as `StaleBatch`.
#[derive(Debug)]
pub(crate) struct UploadDesk {
    status: UploadStatus,
    batch: Option<UploadBatch>,
    result: Option<GradedUpload>,
    step_range: (u8, u8),
    rng: StdRng,
}

impl UploadDesk {
    pub(crate) fn new(settings: &UploadSettings, rng: StdRng) -> Self {
        Self {
            status: UploadStatus::Idle,
            batch: None,
            result: None,
            step_range: (settings.step_min, settings.step_max),
            rng,
        }
    }

    pub(crate) fn status(&self) -> UploadStatus {
        self.status
    }

    pub(crate) fn batch(&self) -> Option<&UploadBatch> {
        self.batch.as_ref()
    }

    pub(crate) fn result(&self) -> Option<&GradedUpload> {
        self.result.as_ref()
    }

    /// An empty file list is a no-op. Otherwise the student name is required.
    /// Starting over a shown result replaces it.
    pub(crate) fn start(
        &mut self,
        files: Vec<FileRef>,
        metadata: UploadMetadata,
    ) -> Result<StartOutcome, UploadError> {
        if self.status.is_in_flight() {
            return Err(UploadError::Busy(self.status));
        }
        if files.is_empty() {
            return Ok(StartOutcome::NothingToUpload);
        }
        if metadata.student_name.trim().is_empty() {
            return Err(UploadError::MissingField("student_name"));
        }

        let batch = UploadBatch { id: Uuid::new_v4(), files, metadata, started_at: now_utc() };
        let batch_id = batch.id;
        self.batch = Some(batch);
        self.result = None;
        self.status = UploadStatus::Uploading { progress: 0 };
        Ok(StartOutcome::Started(batch_id))
    }

    pub(crate) fn draw_step(&mut self) -> u8 {
        let (min, max) = self.step_range;
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    /// Adds `step` to the progress, saturating at 100. Returns the new value.
    pub(crate) fn advance(&mut self, batch_id: Uuid, step: u8) -> Result<u8, UploadError> {
        self.ensure_batch(batch_id)?;
        let UploadStatus::Uploading { progress } = self.status else {
            return Err(UploadError::InvalidTransition { action: "advance", status: self.status });
        };

        let next = progress.saturating_add(step).min(FULL_PROGRESS);
        self.status = UploadStatus::Uploading { progress: next };
        Ok(next)
    }

    pub(crate) fn begin_analysis(&mut self, batch_id: Uuid) -> Result<(), UploadError> {
        self.ensure_batch(batch_id)?;
        if self.status != (UploadStatus::Uploading { progress: FULL_PROGRESS }) {
            return Err(UploadError::InvalidTransition {
                action: "begin analysis",
                status: self.status,
            });
        }
        self.status = UploadStatus::Analyzing;
        Ok(())
    }

    /// Picks a canned evaluation and merges the batch metadata into it.
    pub(crate) fn resolve(&mut self, batch_id: Uuid) -> Result<&GradedUpload, UploadError> {
        let metadata = self.ensure_batch(batch_id)?.metadata.clone();
        if self.status != UploadStatus::Analyzing {
            return Err(UploadError::InvalidTransition { action: "resolve", status: self.status });
        }

        let evaluation = *canned_evaluations::pick(&mut self.rng);
        self.status = UploadStatus::Resulted;
        Ok(self.result.insert(GradedUpload {
            batch_id,
            evaluation,
            metadata,
            graded_at: now_utc(),
        }))
    }

    /// Returns a resulted desk to `Idle` with an empty file list and zero
    /// progress. The result stays visible until `close`.
    pub(crate) fn settle(&mut self, batch_id: Uuid) -> Result<(), UploadError> {
        if self.status != UploadStatus::Resulted {
            return Err(UploadError::StaleBatch);
        }
        self.ensure_batch(batch_id)?;
        self.status = UploadStatus::Idle;
        self.batch = None;
        Ok(())
    }

    /// Dismisses the shown result. On a resulted desk that has not settled
    /// yet this also drops the batch. Closing with nothing shown is a no-op.
    pub(crate) fn close(&mut self) -> Result<(), UploadError> {
        match self.status {
            UploadStatus::Idle | UploadStatus::Resulted => {
                self.reset();
                Ok(())
            }
            status => Err(UploadError::InvalidTransition { action: "close result", status }),
        }
    }

    /// Abandons whatever is in progress or shown. Returns whether anything was
    /// dropped.
    pub(crate) fn discard(&mut self) -> bool {
        let had_any =
            self.batch.is_some() || self.result.is_some() || self.status != UploadStatus::Idle;
        self.reset();
        had_any
    }

    fn reset(&mut self) {
        self.status = UploadStatus::Idle;
        self.batch = None;
        self.result = None;
    }

    fn ensure_batch(&self, batch_id: Uuid) -> Result<&UploadBatch, UploadError> {
        self.batch.as_ref().filter(|batch| batch.id == batch_id).ok_or(UploadError::StaleBatch)
    }
}
