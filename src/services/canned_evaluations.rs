use rand::Rng;

/// A pre-authored grading outcome for an uploaded answer sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CannedEvaluation {
    pub(crate) total_marks: u32,
    pub(crate) max_marks: u32,
    pub(crate) grade: &'static str,
    pub(crate) feedback: &'static str,
    pub(crate) strengths: &'static [&'static str],
    pub(crate) improvements: &'static [&'static str],
}

impl CannedEvaluation {
    /// Percentage of `max_marks`, rounded to the nearest integer.
    pub(crate) fn percentage(&self) -> u32 {
        if self.max_marks == 0 {
            return 0;
        }
        (self.total_marks * 200 + self.max_marks) / (self.max_marks * 2)
    }
}

pub(crate) fn table() -> &'static [CannedEvaluation] {
    CANNED_EVALUATIONS
}

/// Uniform pick from the table.
pub(crate) fn pick<R>(rng: &mut R) -> &'static CannedEvaluation
where
    R: Rng + ?Sized,
{
    let records = table();
    &records[rng.gen_range(0..records.len())]
}

const CANNED_EVALUATIONS: &[CannedEvaluation] = &[
    CannedEvaluation {
        total_marks: 85,
        max_marks: 100,
        grade: "A",
        feedback: "Excellent understanding of core concepts. Strong analytical skills demonstrated throughout.",
        strengths: &["Clear explanations", "Good use of examples", "Logical structure"],
        improvements: &["Could expand on theoretical foundations"],
    },
    CannedEvaluation {
        total_marks: 92,
        max_marks: 100,
        grade: "A+",
        feedback: "Outstanding performance with comprehensive answers and innovative thinking.",
        strengths: &["Exceptional depth", "Creative problem-solving", "Perfect formatting"],
        improvements: &["Minor grammatical errors"],
    },
    CannedEvaluation {
        total_marks: 78,
        max_marks: 100,
        grade: "B+",
        feedback: "Good grasp of fundamentals with room for deeper analysis in complex topics.",
        strengths: &["Clear methodology", "Good examples", "Neat presentation"],
        improvements: &["Need more detailed explanations", "Could improve time management"],
    },
    CannedEvaluation {
        total_marks: 88,
        max_marks: 100,
        grade: "A",
        feedback: "Strong performance with well-structured answers and good critical thinking.",
        strengths: &["Excellent organization", "Strong reasoning", "Good use of diagrams"],
        improvements: &["Could include more recent research"],
    },
    CannedEvaluation {
        total_marks: 73,
        max_marks: 100,
        grade: "B",
        feedback: "Solid understanding with consistent effort across all questions.",
        strengths: &["Consistent quality", "Good effort", "Clear handwriting"],
        improvements: &["Need deeper analysis", "Work on conclusion writing"],
    },
    CannedEvaluation {
        total_marks: 95,
        max_marks: 100,
        grade: "A+",
        feedback: "Exceptional work demonstrating mastery of subject matter and excellent presentation.",
        strengths: &["Perfect structure", "Innovative approach", "Comprehensive coverage"],
        improvements: &["Already at excellent level"],
    },
    CannedEvaluation {
        total_marks: 52,
        max_marks: 100,
        grade: "D+",
        feedback: "Basic understanding evident but requires significant improvement in key concepts and application.",
        strengths: &["Attempted all questions", "Clear handwriting", "Good effort shown"],
        improvements: &[
            "Study fundamental concepts thoroughly",
            "Practice problem-solving techniques",
            "Focus on time management",
            "Seek additional help from instructor",
        ],
    },
    CannedEvaluation {
        total_marks: 45,
        max_marks: 100,
        grade: "D",
        feedback: "Limited understanding of course material. Answers lack depth and accuracy in most areas.",
        strengths: &["Neat presentation", "Completed the exam"],
        improvements: &[
            "Review all course materials",
            "Practice past papers extensively",
            "Focus on basic concepts first",
            "Attend tutoring sessions",
            "Improve study habits",
        ],
    },
    CannedEvaluation {
        total_marks: 38,
        max_marks: 100,
        grade: "F",
        feedback: "Significant gaps in understanding. Failed to demonstrate minimum competency in required areas.",
        strengths: &["Showed up for exam"],
        improvements: &[
            "Retake foundational courses",
            "Develop consistent study schedule",
            "Use additional learning resources",
            "Meet with academic advisor",
            "Consider supplemental instruction",
        ],
    },
    CannedEvaluation {
        total_marks: 29,
        max_marks: 100,
        grade: "F",
        feedback: "Major deficiencies across all topics. Immediate intervention required to address learning gaps.",
        strengths: &["Attempted the examination"],
        improvements: &[
            "Complete course remediation",
            "Focus on basic principles",
            "Utilize all available academic support",
            "Reassess study methods",
            "Consider retaking the course",
        ],
    },
    CannedEvaluation {
        total_marks: 48,
        max_marks: 100,
        grade: "D",
        feedback: "Marginal performance with some understanding but critical weaknesses in application and analysis.",
        strengths: &["Shows potential", "Good attendance record", "Asks questions in class"],
        improvements: &[
            "Strengthen problem-solving skills",
            "Practice analytical thinking",
            "Review homework assignments",
            "Form study groups",
            "Use office hours effectively",
        ],
    },
    CannedEvaluation {
        total_marks: 55,
        max_marks: 100,
        grade: "D+",
        feedback: "Below average performance but shows glimpses of understanding in certain areas.",
        strengths: &[
            "Good effort on practical questions",
            "Organized answers",
            "Shows improvement from midterm",
        ],
        improvements: &[
            "Focus on theoretical foundations",
            "Practice more complex problems",
            "Improve exam technique",
            "Review feedback from previous assignments",
        ],
    },
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn table_records_are_well_formed() {
        assert_eq!(table().len(), 12);
        for record in table() {
            assert_eq!(record.max_marks, 100);
            assert!(record.total_marks <= record.max_marks);
            assert!(!record.grade.is_empty());
            assert!(!record.strengths.is_empty());
            assert!(!record.improvements.is_empty());
        }
    }

    #[test]
    fn pick_covers_whole_table() {
        let mut rng = StdRng::seed_from_u64(21);
        let picked = (0..500).map(|_| pick(&mut rng).total_marks).collect::<HashSet<_>>();
        let all = table().iter().map(|record| record.total_marks).collect::<HashSet<_>>();
        assert_eq!(picked, all);
    }

    #[test]
    fn percentage_rounds() {
        let record = CannedEvaluation { total_marks: 1, max_marks: 3, ..table()[0] };
        assert_eq!(record.percentage(), 33);
        let record = CannedEvaluation { total_marks: 2, max_marks: 3, ..table()[0] };
        assert_eq!(record.percentage(), 67);
        assert_eq!(table()[1].percentage(), 92);
    }
}
