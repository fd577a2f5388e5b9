//! Reproducible random index sequences.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// Fixed seed so that Monte-Carlo baselines are identical between runs and
// comparable across test machines.
const SHUFFLE_SEED: u64 = 987_654_312;

/// Produces uniformly random permutations of a fixed index range from a
/// seeded generator. Consecutive calls advance the generator, so a sequence
/// of permutations is random with respect to each other but the stream as a
/// whole is deterministic.
pub struct SampleIndexSequence {
    rng: ChaCha8Rng,
    min_idx: usize,
    max_idx: usize,
}

impl SampleIndexSequence {
    pub fn new(min_idx_inclusive: usize, max_idx_inclusive: usize) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(SHUFFLE_SEED),
            min_idx: min_idx_inclusive,
            max_idx: max_idx_inclusive,
        }
    }

    /// Returns the full index range in uniformly random order
    /// (Fisher-Yates shuffle).
    pub fn random_sequence(&mut self) -> Vec<usize> {
        let n = self.max_idx - self.min_idx + 1;
        let mut idx: Vec<usize> = (self.min_idx..=self.max_idx).collect();
        for i in (2..=n).rev() {
            let j = self.rng.random_range(0..i);
            idx.swap(i - 1, j);
        }
        idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_permutation() {
        let mut sampler = SampleIndexSequence::new(0, 9);
        let mut seq = sampler.random_sequence();
        seq.sort_unstable();
        assert_eq!(seq, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_sequence_is_reproducible() {
        let mut a = SampleIndexSequence::new(0, 99);
        let mut b = SampleIndexSequence::new(0, 99);
        assert_eq!(a.random_sequence(), b.random_sequence());
        assert_eq!(a.random_sequence(), b.random_sequence());
    }

    #[test]
    fn test_consecutive_sequences_differ() {
        let mut sampler = SampleIndexSequence::new(0, 99);
        assert_ne!(sampler.random_sequence(), sampler.random_sequence());
    }

    #[test]
    fn test_single_element_range() {
        let mut sampler = SampleIndexSequence::new(3, 3);
        assert_eq!(sampler.random_sequence(), vec![3]);
    }
}
