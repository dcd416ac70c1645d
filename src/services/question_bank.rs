use serde::Serialize;

/// One candidate question. Ids are local to the pool that owns them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct Question {
    pub(crate) id: u32,
    pub(crate) text: String,
}

/// A subject's fixed question pool plus the card shown in the test list.
#[derive(Debug, Clone)]
pub(crate) struct PracticeTest {
    pub(crate) id: u32,
    pub(crate) subject: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) questions: Vec<Question>,
}

impl PracticeTest {
    pub(crate) fn contains_question(&self, question_id: u32) -> bool {
        self.questions.iter().any(|question| question.id == question_id)
    }
}

/// Immutable set of practice tests for the lifetime of the process.
#[derive(Debug, Clone)]
pub(crate) struct PracticeCatalog {
    tests: Vec<PracticeTest>,
}

impl PracticeCatalog {
    pub(crate) fn new(tests: Vec<PracticeTest>) -> Self {
        Self { tests }
    }

    pub(crate) fn builtin() -> Self {
        Self::new(
            BUILTIN_TESTS
                .iter()
                .map(|(id, subject, title, description, questions)| PracticeTest {
                    id: *id,
                    subject: subject.to_string(),
                    title: title.to_string(),
                    description: description.to_string(),
                    questions: questions
                        .iter()
                        .enumerate()
                        .map(|(index, text)| Question {
                            id: index as u32 + 1,
                            text: text.to_string(),
                        })
                        .collect(),
                })
                .collect(),
        )
    }

    pub(crate) fn tests(&self) -> &[PracticeTest] {
        &self.tests
    }

    pub(crate) fn find(&self, test_id: u32) -> Option<&PracticeTest> {
        self.tests.iter().find(|test| test.id == test_id)
    }
}

type BuiltinTest = (u32, &'static str, &'static str, &'static str, [&'static str; 4]);

const BUILTIN_TESTS: &[BuiltinTest] = &[
    (
        1,
        "Algorithms",
        "Algorithm Fundamentals",
        "Practice core concepts in algorithm design and analysis.",
        [
            "Explain the concept of time complexity in algorithms with an example.",
            "Describe how a binary search algorithm works and its advantages.",
            "Discuss the trade-offs between iterative and recursive approaches in algorithm design.",
            "Explain the role of dynamic programming in solving optimization problems.",
        ],
    ),
    (
        2,
        "Data Structures",
        "Data Structures Basics",
        "Explore fundamental data structures and their applications.",
        [
            "Describe the differences between arrays and linked lists.",
            "Explain how a binary tree is used in real-world applications.",
            "Discuss the advantages of using a hash table for data storage.",
            "Explain the concept of a stack and its use in function call management.",
        ],
    ),
    (
        3,
        "English Literature",
        "Essay Writing",
        "Improve your essay writing skills with structured response practice.",
        [
            "Write a short essay (100-150 words) about the importance of reading.",
            "Analyze the main character in a book you recently read.",
            "Discuss the impact of symbolism in a novel of your choice.",
            "Explain how narrative structure affects a story's impact.",
        ],
    ),
    (
        4,
        "Physics",
        "Mechanics Fundamentals",
        "Test your understanding of basic mechanics principles.",
        [
            "Explain Newton's First Law of Motion with an example.",
            "Describe the difference between speed and velocity.",
            "Discuss the concept of momentum and its conservation.",
            "Explain how friction affects motion in real-world scenarios.",
        ],
    ),
    (
        5,
        "Chemistry",
        "Chemical Reactions",
        "Practice identifying and balancing chemical equations.",
        [
            "Explain what a catalyst does in a chemical reaction.",
            "Describe the difference between exothermic and endothermic reactions.",
            "Discuss the role of activation energy in chemical reactions.",
            "Explain how Le Chatelier's Principle applies to chemical equilibrium.",
        ],
    ),
    (
        6,
        "History",
        "World War II",
        "Test your knowledge of key events and figures from World War II.",
        [
            "Explain the significance of the D-Day invasion.",
            "Describe the impact of World War II on civilian life.",
            "Discuss the role of propaganda during World War II.",
            "Explain the consequences of the Yalta Conference.",
        ],
    ),
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn builtin_catalog_has_six_pools_of_four() {
        let catalog = PracticeCatalog::builtin();
        assert_eq!(catalog.tests().len(), 6);
        for test in catalog.tests() {
            assert_eq!(test.questions.len(), 4, "pool {}", test.subject);
            let ids = test.questions.iter().map(|question| question.id).collect::<HashSet<_>>();
            assert_eq!(ids, HashSet::from([1, 2, 3, 4]));
        }
    }

    #[test]
    fn find_by_id() {
        let catalog = PracticeCatalog::builtin();
        assert_eq!(catalog.find(1).map(|test| test.subject.as_str()), Some("Algorithms"));
        assert_eq!(catalog.find(6).map(|test| test.title.as_str()), Some("World War II"));
        assert!(catalog.find(7).is_none());
    }

    #[test]
    fn contains_question_checks_pool_ids() {
        let catalog = PracticeCatalog::builtin();
        let test = catalog.find(2).expect("data structures");
        assert!(test.contains_question(4));
        assert!(!test.contains_question(5));
    }
}
