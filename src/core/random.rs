//! Bounded random durations.
//!
//! Durations are drawn with a two-step modulo: reduce a non-negative sample
//! into the span `high - low`, shift by `low`, then reduce again by `high`.
//! Remainders truncate toward zero, so a negative span behaves like its
//! absolute value and the trailing reduction can fold `low + x` back below
//! `low` whenever it reaches `high`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Apply the two-step modulo to a raw non-negative `sample`.
///
/// A range with an empty span or a zero upper bound has no defined result
/// and collapses to 0.
pub fn draw_with(low: i64, high: i64, sample: i64) -> i64 {
    let span = high.wrapping_sub(low);
    if span == 0 || high == 0 {
        return 0;
    }
    low.wrapping_add(sample % span) % high
}

/// Draw from `[low, high)` using a fresh non-negative sample from `rng`
pub fn draw<R: Rng>(rng: &mut R, low: i64, high: i64) -> i64 {
    let sample = i64::from(rng.gen_range(0..=i32::MAX));
    draw_with(low, high, sample)
}

/// Seeded RNG when a seed is given, entropy otherwise
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
