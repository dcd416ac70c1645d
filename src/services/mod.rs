pub(crate) mod canned_evaluations;
pub(crate) mod practice_session;
pub(crate) mod question_bank;
pub(crate) mod sampler;
pub(crate) mod scoring;
pub(crate) mod upload_pipeline;
pub(crate) mod usage_history;

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Random source for one desk. With a configured seed every desk gets its own
/// reproducible stream; otherwise it is seeded from OS entropy.
pub(crate) fn seeded_rng(seed: Option<u64>, stream: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(stream)),
        None => StdRng::from_entropy(),
    }
}
