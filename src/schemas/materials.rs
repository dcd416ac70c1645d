use serde::Serialize;

use crate::core::time::format_offset;
use crate::services::upload_pipeline::{FileRef, GradedUpload, UploadDesk, UploadKind};

#[derive(Debug, Serialize)]
pub(crate) struct GradedUploadView {
    pub(crate) batch_id: String,
    pub(crate) total_marks: u32,
    pub(crate) max_marks: u32,
    pub(crate) percentage: u32,
    pub(crate) grade: &'static str,
    pub(crate) feedback: &'static str,
    pub(crate) strengths: Vec<&'static str>,
    pub(crate) improvements: Vec<&'static str>,
    pub(crate) student_name: String,
    pub(crate) student_class: String,
    pub(crate) subject: String,
    pub(crate) kind: UploadKind,
    pub(crate) graded_at: String,
}

impl GradedUploadView {
    fn from_graded(graded: &GradedUpload) -> Self {
        let evaluation = &graded.evaluation;
        Self {
            batch_id: graded.batch_id.to_string(),
            total_marks: evaluation.total_marks,
            max_marks: evaluation.max_marks,
            percentage: evaluation.percentage(),
            grade: evaluation.grade,
            feedback: evaluation.feedback,
            strengths: evaluation.strengths.to_vec(),
            improvements: evaluation.improvements.to_vec(),
            student_name: graded.metadata.student_name.clone(),
            student_class: graded.metadata.student_class.clone(),
            subject: graded.metadata.subject.clone(),
            kind: graded.metadata.kind,
            graded_at: format_offset(graded.graded_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct UploadView {
    pub(crate) status: &'static str,
    pub(crate) progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) batch_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) kind: Option<UploadKind>,
    pub(crate) files: Vec<FileRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) started_at: Option<String>,
    pub(crate) result: Option<GradedUploadView>,
}

impl UploadView {
    pub(crate) fn idle() -> Self {
        Self {
            status: "idle",
            progress: 0,
            batch_id: None,
            kind: None,
            files: Vec::new(),
            started_at: None,
            result: None,
        }
    }

    pub(crate) fn from_desk(desk: &UploadDesk) -> Self {
        let status = desk.status();
        let batch = desk.batch();
        Self {
            status: status.as_str(),
            progress: status.progress(),
            batch_id: batch.map(|batch| batch.id.to_string()),
            kind: batch.map(|batch| batch.metadata.kind),
            files: batch.map(|batch| batch.files.clone()).unwrap_or_default(),
            started_at: batch.map(|batch| format_offset(batch.started_at)),
            result: desk.result().map(GradedUploadView::from_graded),
        }
    }
}
