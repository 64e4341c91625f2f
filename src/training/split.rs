//! Deterministic train/test splitting.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Sample indices for the two partitions of a split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n_samples` with a seeded generator and cut off the test
/// partition. Same seed, same split — retraining runs are reproducible.
pub fn train_test_split(n_samples: usize, test_fraction: f32, seed: u64) -> SplitIndices {
    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((n_samples as f64) * (test_fraction as f64)).round() as usize;
    let n_test = n_test.min(n_samples);
    let test = indices.split_off(n_samples - n_test);

    SplitIndices {
        train: indices,
        test,
    }
}
