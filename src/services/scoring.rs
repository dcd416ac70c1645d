use std::collections::{BTreeMap, HashMap};

use rand::Rng;
use serde::Serialize;

use crate::services::question_bank::Question;

const MEDIUM_TIER_MIN_CHARS: usize = 50;
const LONG_TIER_MIN_CHARS: usize = 100;

const SHORT_TIER_CAP: u8 = 40;
const MEDIUM_TIER_CAP: u8 = 70;
const LONG_TIER_MIN_SCORE: u8 = 70;
const LONG_TIER_MAX_SCORE: u8 = 100;

const NO_ANSWER_FEEDBACK: &str =
    "No answer provided. Please submit a response to receive a score.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LengthTier {
    Empty,
    Short,
    Medium,
    Long,
}

impl LengthTier {
    /// Length is counted in Unicode scalar values, not bytes.
    pub(crate) fn classify(answer: &str) -> (Self, usize) {
        let len = answer.chars().count();
        let tier = match len {
            0 => Self::Empty,
            n if n < MEDIUM_TIER_MIN_CHARS => Self::Short,
            n if n < LONG_TIER_MIN_CHARS => Self::Medium,
            _ => Self::Long,
        };
        (tier, len)
    }

    /// The first question in every pool gets its own feedback wording.
    fn feedback(self, question_id: u32) -> &'static str {
        let lead_question = question_id == 1;
        match (self, lead_question) {
            (Self::Empty, _) => NO_ANSWER_FEEDBACK,
            (Self::Short, true) => {
                "Your response is too brief. Provide a detailed explanation with an example."
            }
            (Self::Short, false) => "This answer is incomplete. Expand with more specific details.",
            (Self::Medium, true) => {
                "Moderate attempt. Include a concrete example to improve your explanation."
            }
            (Self::Medium, false) => {
                "Partially addressed. Add further elaboration to strengthen your response."
            }
            (Self::Long, true) => "Excellent work! Enhance it with a real-world algorithm example.",
            (Self::Long, false) => {
                "Strong answer! Consider including practical use cases for clarity."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct AnswerScore {
    pub(crate) score: u8,
    pub(crate) feedback: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct EvaluationResult {
    pub(crate) per_question: BTreeMap<u32, AnswerScore>,
    pub(crate) total_score: u8,
}

/// Scores one free-text answer by length alone.
///
/// Only the long tier consumes randomness: its score is drawn uniformly from
/// 70..=100 using the supplied source.
pub(crate) fn score_answer<R>(answer: &str, question_id: u32, rng: &mut R) -> AnswerScore
where
    R: Rng + ?Sized,
{
    let (tier, len) = LengthTier::classify(answer);
    let score = match tier {
        LengthTier::Empty => 0,
        LengthTier::Short => short_tier_score(len),
        LengthTier::Medium => medium_tier_score(len),
        LengthTier::Long => rng.gen_range(LONG_TIER_MIN_SCORE..=LONG_TIER_MAX_SCORE),
    };

    AnswerScore { score, feedback: tier.feedback(question_id).to_string() }
}

fn short_tier_score(len: usize) -> u8 {
    let scaled = len * usize::from(SHORT_TIER_CAP) / MEDIUM_TIER_MIN_CHARS;
    scaled.min(usize::from(SHORT_TIER_CAP)) as u8
}

fn medium_tier_score(len: usize) -> u8 {
    let span = usize::from(MEDIUM_TIER_CAP - SHORT_TIER_CAP);
    let scaled = usize::from(SHORT_TIER_CAP)
        + (len - MEDIUM_TIER_MIN_CHARS) * span / (LONG_TIER_MIN_CHARS - MEDIUM_TIER_MIN_CHARS);
    scaled.min(usize::from(MEDIUM_TIER_CAP)) as u8
}

/// Mean of the sub-scores rounded half up. An empty session totals 0.
pub(crate) fn session_total<I>(scores: I) -> u8
where
    I: IntoIterator<Item = u8>,
{
    let (sum, count) =
        scores.into_iter().fold((0u32, 0u32), |(sum, count), score| (sum + u32::from(score), count + 1));
    if count == 0 {
        return 0;
    }
    ((2 * sum + count) / (2 * count)) as u8
}

/// Scores every selected question. Questions with no stored answer are
/// scored as empty answers.
pub(crate) fn evaluate<R>(
    questions: &[Question],
    answers: &HashMap<u32, String>,
    rng: &mut R,
) -> EvaluationResult
where
    R: Rng + ?Sized,
{
    let per_question = questions
        .iter()
        .map(|question| {
            let answer = answers.get(&question.id).map(String::as_str).unwrap_or("");
            (question.id, score_answer(answer, question.id, rng))
        })
        .collect::<BTreeMap<_, _>>();
    let total_score = session_total(per_question.values().map(|scored| scored.score));

    EvaluationResult { per_question, total_score }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn text(len: usize) -> String {
        "a".repeat(len)
    }

    fn score(len: usize) -> u8 {
        score_answer(&text(len), 2, &mut StdRng::seed_from_u64(0)).score
    }

    #[test]
    fn empty_answer_scores_zero_with_fixed_feedback() {
        let mut rng = StdRng::seed_from_u64(1);
        for question_id in [1, 2] {
            let scored = score_answer("", question_id, &mut rng);
            assert_eq!(scored.score, 0);
            assert_eq!(scored.feedback, NO_ANSWER_FEEDBACK);
        }
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(score(0), 0);
        assert_eq!(score(1), 0);
        assert_eq!(score(25), 20);
        assert_eq!(score(49), 39);
        assert_eq!(score(50), 40);
        assert_eq!(score(75), 55);
        assert_eq!(score(99), 69);

        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..200 {
            let scored = score_answer(&text(100), 3, &mut rng).score;
            assert!((70..=100).contains(&scored));
        }
    }

    #[test]
    fn deterministic_tiers_are_monotonic() {
        let mut previous = 0;
        for len in 0..LONG_TIER_MIN_CHARS {
            let current = score(len);
            assert!(current >= previous, "len {len}: {current} < {previous}");
            previous = current;
        }
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let answer = "é".repeat(49);
        assert_eq!(answer.len(), 98);
        let (tier, len) = LengthTier::classify(&answer);
        assert_eq!(tier, LengthTier::Short);
        assert_eq!(len, 49);
    }

    #[test]
    fn feedback_depends_on_lead_question() {
        let mut rng = StdRng::seed_from_u64(2);
        for len in [10, 60, 150] {
            let lead = score_answer(&text(len), 1, &mut rng).feedback;
            let other = score_answer(&text(len), 3, &mut rng).feedback;
            assert_ne!(lead, other, "len {len}");
        }
        assert_eq!(
            score_answer(&text(10), 4, &mut rng).feedback,
            "This answer is incomplete. Expand with more specific details."
        );
        assert_eq!(
            score_answer(&text(150), 1, &mut rng).feedback,
            "Excellent work! Enhance it with a real-world algorithm example."
        );
    }

    #[test]
    fn long_tier_reaches_both_ends() {
        let mut rng = StdRng::seed_from_u64(11);
        let scores = (0..2000).map(|_| score_answer(&text(120), 2, &mut rng).score).collect::<Vec<_>>();
        assert!(scores.contains(&70));
        assert!(scores.contains(&100));
    }

    #[test]
    fn total_rounds_mean_half_up() {
        assert_eq!(session_total([40, 70]), 55);
        assert_eq!(session_total([0, 71]), 36);
        assert_eq!(session_total([0, 70]), 35);
        assert_eq!(session_total([100]), 100);
        assert_eq!(session_total(std::iter::empty()), 0);
    }

    #[test]
    fn evaluate_scores_missing_answers_as_empty() {
        let questions = vec![
            Question { id: 1, text: "first".into() },
            Question { id: 3, text: "third".into() },
        ];
        let answers = HashMap::from([(3, text(120))]);
        let mut rng = StdRng::seed_from_u64(9);

        let result = evaluate(&questions, &answers, &mut rng);

        assert_eq!(result.per_question.len(), 2);
        assert_eq!(result.per_question[&1].score, 0);
        let long = result.per_question[&3].score;
        assert!((70..=100).contains(&long));
        assert!((35..=50).contains(&result.total_score));
        assert_eq!(result.total_score, session_total([0, long]));
    }
}
