//! Splitting trials into independently seeded chunks.
//!
//! The split depends only on the number of trials and the master seed, never on the number of
//! threads, so parallel results are reproducible on any machine.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Maximum number of chunks that trials are split into.
const MAX_CHUNKS: usize = 64;

/// A share of the trials, with a seed for its generator.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Chunk {
    pub trials: usize,
    pub seed: u64,
}

/// Splits trials into at most [`MAX_CHUNKS`] chunks as evenly as possible.
pub(crate) fn chunks(trials: usize, seed: u64) -> Vec<Chunk> {
    let n = trials.min(MAX_CHUNKS);
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);

    (0..n)
        .map(|i| Chunk {
            trials: trials / n + usize::from(i < trials % n),
            seed: rng.random(),
        })
        .collect()
}

/// Draws independent master seeds for `n` configurations from a single seed.
pub(crate) fn seeds(n: usize, seed: u64) -> Vec<u64> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);

    (0..n).map(|_| rng.random()).collect()
}
