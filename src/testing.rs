//! Synthetic diamond data for tests.
//!
//! Prices follow a smooth, noiseless function of the attributes: log-price is
//! linear in carat with additive quality bumps, so both model families can
//! fit the data well and test assertions on metrics stay meaningful.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::data::vocab::{CLARITY, COLOR, CUT};
use crate::data::Record;

/// Deterministic synthetic records for a given seed.
pub fn synthetic_records(n: usize, seed: u64) -> Vec<Record> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let carat: f32 = rng.gen_range(0.2..2.5);
            let cut_idx = rng.gen_range(0..CUT.len());
            let color_idx = rng.gen_range(0..COLOR.len());
            let clarity_idx = rng.gen_range(0..CLARITY.len());

            let log_price = 6.0
                + 1.2 * carat
                + 0.06 * cut_idx as f32
                + 0.05 * (COLOR.len() - 1 - color_idx) as f32
                + 0.04 * clarity_idx as f32;

            // Rough physical proportions of a round brilliant.
            let x = 6.4 * carat.cbrt();
            Record {
                carat,
                cut: CUT.values()[cut_idx].to_string(),
                color: COLOR.values()[color_idx].to_string(),
                clarity: CLARITY.values()[clarity_idx].to_string(),
                depth: rng.gen_range(58.0..64.0),
                table: rng.gen_range(53.0..60.0),
                price: Some(log_price.exp()),
                x,
                y: x * 1.01,
                z: x * 0.62,
            }
        })
        .collect()
}
