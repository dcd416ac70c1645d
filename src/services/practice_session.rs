use std::collections::HashMap;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::core::config::PracticeSettings;
use crate::core::time::now_utc;
use crate::services::question_bank::{PracticeTest, Question};
use crate::services::sampler::sample_questions;
use crate::services::scoring::{evaluate, EvaluationResult};
use crate::services::usage_history::UsageHistory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionStatus {
    Answering,
    Evaluating,
    Scored,
}

impl SessionStatus {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Answering => "answering",
            Self::Evaluating => "evaluating",
            Self::Scored => "scored",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum SessionError {
    #[error("no active practice session")]
    NoActiveSession,
    #[error("question {0} is not part of this session")]
    UnknownQuestion(u32),
    #[error("cannot {action} while session is {}", .status.as_str())]
    InvalidTransition { action: &'static str, status: SessionStatus },
    #[error("evaluation no longer matches the active session")]
    StaleEvaluation,
}

#[derive(Debug, Clone)]
pub(crate) struct PracticeSession {
    pub(crate) id: Uuid,
    pub(crate) test_id: u32,
    pub(crate) subject: String,
    pub(crate) title: String,
    pub(crate) questions: Vec<Question>,
    pub(crate) answers: HashMap<u32, String>,
    pub(crate) status: SessionStatus,
    pub(crate) result: Option<EvaluationResult>,
    pub(crate) started_at: OffsetDateTime,
    pub(crate) submitted_at: Option<OffsetDateTime>,
}

impl PracticeSession {
    fn new(test: &PracticeTest, questions: Vec<Question>) -> Self {
        Self {
            id: Uuid::new_v4(),
            test_id: test.id,
            subject: test.subject.clone(),
            title: test.title.clone(),
            questions,
            answers: HashMap::new(),
            status: SessionStatus::Answering,
            result: None,
            started_at: now_utc(),
            submitted_at: None,
        }
    }

    fn ensure_status(&self, action: &'static str, expected: SessionStatus) -> Result<(), SessionError> {
        if self.status != expected {
            return Err(SessionError::InvalidTransition { action, status: self.status });
        }
        Ok(())
    }

    fn set_answer(&mut self, question_id: u32, text: String) -> Result<(), SessionError> {
        self.ensure_status("edit answers", SessionStatus::Answering)?;
        if !self.questions.iter().any(|question| question.id == question_id) {
            return Err(SessionError::UnknownQuestion(question_id));
        }
        self.answers.insert(question_id, text);
        Ok(())
    }

    fn submit(&mut self) -> Result<(), SessionError> {
        self.ensure_status("submit", SessionStatus::Answering)?;
        self.status = SessionStatus::Evaluating;
        self.submitted_at = Some(now_utc());
        Ok(())
    }
}

/// One user's practice workspace: the active session (if any) plus the
/// usage history that every new session is sampled against.
#[derive(Debug)]
pub(crate) struct PracticeDesk {
    history: UsageHistory,
    questions_per_session: usize,
    evaluation_delay: (Duration, Duration),
    rng: StdRng,
    session: Option<PracticeSession>,
}

impl PracticeDesk {
    pub(crate) fn new(history: UsageHistory, settings: &PracticeSettings, rng: StdRng) -> Self {
        Self {
            history,
            questions_per_session: settings.questions_per_session,
            evaluation_delay: (settings.evaluation_delay_min, settings.evaluation_delay_max),
            rng,
            session: None,
        }
    }

    pub(crate) fn session(&self) -> Option<&PracticeSession> {
        self.session.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn history(&self) -> &UsageHistory {
        &self.history
    }

    /// Starts a fresh session on `test`, replacing whatever was active.
    /// The served question ids are appended to the usage history.
    pub(crate) fn select_test(&mut self, test: &PracticeTest) -> &PracticeSession {
        let used = self.history.used_ids(test.id);
        let questions =
            sample_questions(&test.questions, &used, self.questions_per_session, &mut self.rng);
        self.history.record(test, questions.iter().map(|question| question.id));

        tracing::debug!(
            test_id = test.id,
            served = self.history.served_count(test.id),
            pool_size = test.questions.len(),
            "Practice questions sampled"
        );

        self.session.insert(PracticeSession::new(test, questions))
    }

    pub(crate) fn set_answer(&mut self, question_id: u32, text: String) -> Result<(), SessionError> {
        self.session
            .as_mut()
            .ok_or(SessionError::NoActiveSession)?
            .set_answer(question_id, text)
    }

    /// Moves the session to `Evaluating` and returns its id, which the
    /// scheduled evaluation must present when it completes.
    pub(crate) fn submit(&mut self) -> Result<Uuid, SessionError> {
        let session = self.session.as_mut().ok_or(SessionError::NoActiveSession)?;
        session.submit()?;
        Ok(session.id)
    }

    /// Uniform draw from the configured evaluation delay window.
    pub(crate) fn draw_evaluation_delay(&mut self) -> Duration {
        let (min, max) = self.evaluation_delay;
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    /// Scores the session submitted as `session_id`. Fails with
    /// `StaleEvaluation` when that session was reset or replaced meanwhile.
    pub(crate) fn complete_evaluation(
        &mut self,
        session_id: Uuid,
    ) -> Result<&EvaluationResult, SessionError> {
        let session = match self.session.as_mut() {
            Some(session) if session.id == session_id => session,
            _ => return Err(SessionError::StaleEvaluation),
        };
        if session.status != SessionStatus::Evaluating {
            return Err(SessionError::StaleEvaluation);
        }

        let result = evaluate(&session.questions, &session.answers, &mut self.rng);
        session.status = SessionStatus::Scored;
        Ok(session.result.insert(result))
    }

    /// Drops the active session. Returns whether one existed.
    pub(crate) fn reset(&mut self) -> bool {
        self.session.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::services::question_bank::PracticeCatalog;

    fn desk(seed: u64) -> PracticeDesk {
        PracticeDesk::new(
            UsageHistory::new(),
            &PracticeSettings::default(),
            StdRng::seed_from_u64(seed),
        )
    }

    fn algorithms() -> PracticeTest {
        PracticeCatalog::builtin().find(1).cloned().expect("algorithms pool")
    }

    #[test]
    fn select_test_samples_two_distinct_questions() {
        let mut desk = desk(1);
        let test = algorithms();

        let session = desk.select_test(&test);

        assert_eq!(session.status, SessionStatus::Answering);
        assert_eq!(session.questions.len(), 2);
        assert_ne!(session.questions[0].id, session.questions[1].id);
        assert!(session.questions.iter().all(|question| (1..=4).contains(&question.id)));
        assert!(session.answers.is_empty());
        assert_eq!(desk.history().served_count(1), 2);
    }

    #[test]
    fn second_session_gets_unseen_questions() {
        let mut desk = desk(2);
        let test = algorithms();

        let first = desk.select_test(&test).questions.clone();
        let second = desk.select_test(&test).questions.clone();

        assert!(second.iter().all(|question| !first.contains(question)));
        assert_eq!(desk.history().served_count(1), 4);

        let third = desk.select_test(&test);
        assert_eq!(third.questions.len(), 2);
        assert_eq!(desk.history().served_count(1), 4);
    }

    #[test]
    fn answers_upsert_while_answering() {
        let mut desk = desk(3);
        let ids = desk.select_test(&algorithms()).questions.iter().map(|q| q.id).collect::<Vec<_>>();

        desk.set_answer(ids[0], "draft".into()).expect("first write");
        desk.set_answer(ids[0], String::new()).expect("overwrite with empty");

        let session = desk.session().expect("active session");
        assert_eq!(session.answers.get(&ids[0]).map(String::as_str), Some(""));
    }

    #[test]
    fn answer_for_unselected_question_is_rejected() {
        let mut desk = desk(4);
        let selected = desk.select_test(&algorithms()).questions.iter().map(|q| q.id).collect::<Vec<_>>();
        let outsider = (1..=4).find(|id| !selected.contains(id)).expect("unselected id");

        assert_eq!(
            desk.set_answer(outsider, "text".into()),
            Err(SessionError::UnknownQuestion(outsider))
        );
    }

    #[test]
    fn submit_without_session_is_rejected() {
        let mut desk = desk(5);
        assert_eq!(desk.submit(), Err(SessionError::NoActiveSession));
        assert_eq!(desk.set_answer(1, "x".into()), Err(SessionError::NoActiveSession));
    }

    #[test]
    fn full_lifecycle_scores_and_locks_answers() {
        let mut desk = desk(6);
        let ids = desk.select_test(&algorithms()).questions.iter().map(|q| q.id).collect::<Vec<_>>();
        desk.set_answer(ids[1], "x".repeat(120)).expect("answer");

        let session_id = desk.submit().expect("submit");
        assert_eq!(desk.session().map(|s| s.status), Some(SessionStatus::Evaluating));
        assert_eq!(
            desk.set_answer(ids[0], "late".into()),
            Err(SessionError::InvalidTransition {
                action: "edit answers",
                status: SessionStatus::Evaluating
            })
        );

        let total = desk.complete_evaluation(session_id).expect("evaluation").total_score;
        assert!((35..=50).contains(&total));

        let session = desk.session().expect("session");
        assert_eq!(session.status, SessionStatus::Scored);
        assert_eq!(session.result.as_ref().map(|r| r.per_question[&ids[0]].score), Some(0));
        assert!(matches!(
            desk.set_answer(ids[0], "again".into()),
            Err(SessionError::InvalidTransition { status: SessionStatus::Scored, .. })
        ));
        assert!(matches!(desk.submit(), Err(SessionError::InvalidTransition { .. })));
    }

    #[test]
    fn evaluation_for_replaced_session_is_stale() {
        let mut desk = desk(7);
        let test = algorithms();
        desk.select_test(&test);
        let old_id = desk.submit().expect("submit");

        assert!(desk.reset());
        assert_eq!(desk.complete_evaluation(old_id), Err(SessionError::StaleEvaluation));

        desk.select_test(&test);
        assert_eq!(desk.complete_evaluation(old_id), Err(SessionError::StaleEvaluation));
        assert_eq!(desk.session().map(|s| s.status), Some(SessionStatus::Answering));
    }

    #[test]
    fn evaluation_runs_once() {
        let mut desk = desk(8);
        desk.select_test(&algorithms());
        let session_id = desk.submit().expect("submit");

        desk.complete_evaluation(session_id).expect("first completion");
        assert_eq!(desk.complete_evaluation(session_id), Err(SessionError::StaleEvaluation));
    }

    #[test]
    fn evaluation_delay_stays_in_window() {
        let mut desk = desk(9);
        for _ in 0..100 {
            let delay = desk.draw_evaluation_delay();
            assert!(delay >= Duration::from_millis(5_000));
            assert!(delay <= Duration::from_millis(8_000));
        }
    }

    #[test]
    fn reset_without_session_reports_nothing() {
        let mut desk = desk(10);
        assert!(!desk.reset());
    }
}
