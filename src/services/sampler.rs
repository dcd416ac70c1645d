use std::collections::HashSet;

use rand::Rng;

use crate::services::question_bank::Question;

/// Picks `count` questions for a new session.
///
/// Unseen questions are preferred. When fewer than `count` remain unseen the
/// whole pool is resampled, so a question may come back before every other one
/// has been shown. Returns `min(count, pool.len())` distinct questions; never
/// fails. Does not touch the usage history, callers record the result.
pub(crate) fn sample_questions<R>(
    pool: &[Question],
    used_ids: &HashSet<u32>,
    count: usize,
    rng: &mut R,
) -> Vec<Question>
where
    R: Rng + ?Sized,
{
    let available =
        pool.iter().filter(|question| !used_ids.contains(&question.id)).collect::<Vec<_>>();

    let candidates = if available.len() >= count {
        available
    } else {
        tracing::debug!(
            unseen = available.len(),
            requested = count,
            pool_size = pool.len(),
            "Question pool nearly exhausted, resampling from full pool"
        );
        pool.iter().collect()
    };

    draw_without_replacement(candidates, count, rng).into_iter().cloned().collect()
}

/// Partial Fisher–Yates: the first `count` slots end up holding a uniform
/// sample without replacement, in random order.
fn draw_without_replacement<T, R>(mut items: Vec<T>, count: usize, rng: &mut R) -> Vec<T>
where
    R: Rng + ?Sized,
{
    let take = count.min(items.len());
    for slot in 0..take {
        let pick = rng.gen_range(slot..items.len());
        items.swap(slot, pick);
    }
    items.truncate(take);
    items
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn pool(size: u32) -> Vec<Question> {
        (1..=size).map(|id| Question { id, text: format!("Question {id}") }).collect()
    }

    fn ids(questions: &[Question]) -> Vec<u32> {
        questions.iter().map(|question| question.id).collect()
    }

    #[test]
    fn prefers_unseen_questions() {
        let pool = pool(4);
        let used = HashSet::from([1, 2]);

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = sample_questions(&pool, &used, 2, &mut rng);
            let mut picked_ids = ids(&picked);
            picked_ids.sort_unstable();
            assert_eq!(picked_ids, vec![3, 4], "seed {seed}");
        }
    }

    #[test]
    fn returns_distinct_ids_outside_history() {
        let pool = pool(10);
        let used = HashSet::from([2, 5, 7]);

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = ids(&sample_questions(&pool, &used, 4, &mut rng));
            let unique = picked.iter().copied().collect::<HashSet<_>>();
            assert_eq!(picked.len(), 4);
            assert_eq!(unique.len(), 4);
            assert!(picked.iter().all(|id| !used.contains(id)));
        }
    }

    #[test]
    fn falls_back_to_full_pool_when_too_few_unseen() {
        let pool = pool(4);
        let used = HashSet::from([1, 2, 3]);
        let mut saw_used_id = false;

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = ids(&sample_questions(&pool, &used, 2, &mut rng));
            assert_eq!(picked.len(), 2);
            assert_ne!(picked[0], picked[1]);
            saw_used_id |= picked.iter().any(|id| used.contains(id));
        }

        assert!(saw_used_id, "fallback should draw from the whole pool");
    }

    #[test]
    fn exhausted_history_resamples_whole_pool() {
        let pool = pool(4);
        let used = HashSet::from([1, 2, 3, 4]);
        let mut rng = StdRng::seed_from_u64(7);

        let picked = sample_questions(&pool, &used, 2, &mut rng);
        assert_eq!(picked.len(), 2);
    }

    #[test]
    fn small_pool_degrades_to_pool_size() {
        let pool = pool(1);
        let mut rng = StdRng::seed_from_u64(1);

        let picked = sample_questions(&pool, &HashSet::new(), 2, &mut rng);
        assert_eq!(ids(&picked), vec![1]);

        let empty = sample_questions(&[], &HashSet::new(), 2, &mut rng);
        assert!(empty.is_empty());
    }

    #[test]
    fn same_seed_same_selection() {
        let pool = pool(8);
        let first = sample_questions(&pool, &HashSet::new(), 3, &mut StdRng::seed_from_u64(99));
        let second = sample_questions(&pool, &HashSet::new(), 3, &mut StdRng::seed_from_u64(99));
        assert_eq!(first, second);
    }

    #[test]
    fn every_question_can_be_drawn() {
        let pool = pool(4);
        let mut seen = HashSet::new();
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..200 {
            seen.extend(ids(&sample_questions(&pool, &HashSet::new(), 2, &mut rng)));
        }

        assert_eq!(seen, HashSet::from([1, 2, 3, 4]));
    }
}
