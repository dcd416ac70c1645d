use std::collections::{HashMap, HashSet};

use crate::services::question_bank::PracticeTest;

/// Question ids already served, per practice test. Append-only.
#[derive(Debug, Clone, Default)]
pub(crate) struct UsageHistory {
    served: HashMap<u32, HashSet<u32>>,
}

impl UsageHistory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn used_ids(&self, test_id: u32) -> HashSet<u32> {
        self.served.get(&test_id).cloned().unwrap_or_default()
    }

    /// Records served ids. Ids that are not part of the test's pool are
    /// ignored, which keeps each entry bounded by the pool size.
    pub(crate) fn record<I>(&mut self, test: &PracticeTest, question_ids: I)
    where
        I: IntoIterator<Item = u32>,
    {
        let entry = self.served.entry(test.id).or_default();
        for question_id in question_ids {
            if test.contains_question(question_id) {
                entry.insert(question_id);
            }
        }
    }

    pub(crate) fn served_count(&self, test_id: u32) -> usize {
        self.served.get(&test_id).map(HashSet::len).unwrap_or(0)
    }
}
