use serde::{Deserialize, Serialize};

use crate::core::time::format_offset;
use crate::services::practice_session::PracticeSession;
use crate::services::question_bank::PracticeTest;

#[derive(Debug, Serialize)]
pub(crate) struct PracticeTestSummary {
    pub(crate) id: u32,
    pub(crate) subject: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) question_count: usize,
}

impl PracticeTestSummary {
    pub(crate) fn from_test(test: &PracticeTest) -> Self {
        Self {
            id: test.id,
            subject: test.subject.clone(),
            title: test.title.clone(),
            description: test.description.clone(),
            question_count: test.questions.len(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnswerRequest {
    #[serde(default)]
    pub(crate) text: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionView {
    pub(crate) id: u32,
    pub(crate) text: String,
    pub(crate) answer: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScoredAnswerView {
    pub(crate) question_id: u32,
    pub(crate) score: u8,
    pub(crate) feedback: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct EvaluationView {
    pub(crate) total_score: u8,
    pub(crate) per_question: Vec<ScoredAnswerView>,
}

/// Snapshot of the practice desk. With no active session only `status`
/// (`"selecting"`) is populated.
#[derive(Debug, Serialize)]
pub(crate) struct SessionView {
    pub(crate) status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) test_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) title: Option<String>,
    pub(crate) questions: Vec<QuestionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) started_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) submitted_at: Option<String>,
    pub(crate) result: Option<EvaluationView>,
}

impl SessionView {
    pub(crate) fn selecting() -> Self {
        Self {
            status: "selecting",
            session_id: None,
            test_id: None,
            subject: None,
            title: None,
            questions: Vec::new(),
            started_at: None,
            submitted_at: None,
            result: None,
        }
    }

    pub(crate) fn from_session(session: Option<&PracticeSession>) -> Self {
        let Some(session) = session else {
            return Self::selecting();
        };

        let questions = session
            .questions
            .iter()
            .map(|question| QuestionView {
                id: question.id,
                text: question.text.clone(),
                answer: session.answers.get(&question.id).cloned().unwrap_or_default(),
            })
            .collect();
        let result = session.result.as_ref().map(|result| EvaluationView {
            total_score: result.total_score,
            per_question: session
                .questions
                .iter()
                .filter_map(|question| {
                    result.per_question.get(&question.id).map(|scored| ScoredAnswerView {
                        question_id: question.id,
                        score: scored.score,
                        feedback: scored.feedback.clone(),
                    })
                })
                .collect(),
        });

        Self {
            status: session.status.as_str(),
            session_id: Some(session.id.to_string()),
            test_id: Some(session.test_id),
            subject: Some(session.subject.clone()),
            title: Some(session.title.clone()),
            questions,
            started_at: Some(format_offset(session.started_at)),
            submitted_at: session.submitted_at.map(format_offset),
            result,
        }
    }
}
