//! Seeded pseudo-random sequences for reproducible world generation.
//!
//! # Algorithm
//!
//! A [`Seed`] is reduced to a 32-bit starting state:
//!
//! - text seeds run a rolling hash over their UTF-16 code units
//!   (`hash = hash * 31 + unit`, wrapped to a signed 32-bit integer), then
//!   take the absolute value;
//! - numeric seeds are reduced modulo `2^32` (Euclidean, so negative seeds
//!   land in range).
//!
//! The sequence itself is a linear congruential generator with multiplier
//! `1664525`, increment `1013904223`, and modulus `2^32`. Each draw advances
//! the state and returns `state / 2^32`, a float in `[0, 1)`.
//!
//! # Determinism
//!
//! The output depends only on the seed and the number of draws. All
//! arithmetic is exact integer wrapping arithmetic followed by one exact
//! `u32 -> f64` conversion and a division by a power of two, so sequences
//! match across platforms and across the browser host.

use serde::{Deserialize, Serialize};

/// LCG multiplier.
const MULTIPLIER: u32 = 1_664_525;
/// LCG increment.
const INCREMENT: u32 = 1_013_904_223;
/// `2^32` as a float, the LCG modulus.
const MODULUS: f64 = 4_294_967_296.0;
/// `2^32` as an integer, for reducing numeric seeds.
const MODULUS_I64: i64 = 4_294_967_296;

/// Seed for a [`SeededSequence`]: either text (typically a zone id) or a
/// number.
///
/// Deserializes from either a YAML/JSON string or an integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Seed {
    /// A numeric seed, reduced modulo `2^32`.
    Number(i64),
    /// A text seed, reduced by a rolling hash.
    Text(String),
}

impl Seed {
    /// Reduce the seed to the generator's initial 32-bit state.
    pub fn initial_state(&self) -> u32 {
        match self {
            Self::Number(n) => u32::try_from(n.rem_euclid(MODULUS_I64)).unwrap_or(0),
            Self::Text(text) => hash_text(text),
        }
    }
}

impl Default for Seed {
    fn default() -> Self {
        Self::Number(0)
    }
}

impl From<&str> for Seed {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Seed {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<i64> for Seed {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<u32> for Seed {
    fn from(n: u32) -> Self {
        Self::Number(i64::from(n))
    }
}

impl core::fmt::Display for Seed {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(text) => write!(f, "{text}"),
        }
    }
}

/// Rolling 31-multiplier hash over UTF-16 code units, wrapped to `i32`.
fn hash_text(text: &str) -> u32 {
    let mut hash: i32 = 0;
    for unit in text.encode_utf16() {
        hash = hash.wrapping_mul(31).wrapping_add(i32::from(unit));
    }
    hash.unsigned_abs()
}

/// A reproducible pseudo-random sequence of floats in `[0, 1)`.
///
/// The generator owns its state exclusively. Two instances built from the
/// same [`Seed`] yield identical sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededSequence {
    state: u32,
}

impl SeededSequence {
    /// Create a generator from a seed.
    pub fn new(seed: &Seed) -> Self {
        Self {
            state: seed.initial_state(),
        }
    }

    /// Create a generator from a raw 32-bit state.
    pub const fn from_state(state: u32) -> Self {
        Self { state }
    }

    /// Current internal state.
    pub const fn state(&self) -> u32 {
        self.state
    }

    /// Advance the generator and return a float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT);
        f64::from(self.state) / MODULUS
    }

    /// Draw a float uniformly from `[min, max)`.
    pub fn next_range(&mut self, min: f64, max: f64) -> f64 {
        let t = self.next_f64();
        min + t * (max - min)
    }

    /// Draw an integer uniformly from `[min, max]` (both inclusive).
    ///
    /// If `max < min` the result is always `min`.
    pub fn next_int(&mut self, min: u32, max: u32) -> u32 {
        let span = max.saturating_sub(min).saturating_add(1);
        let t = self.next_f64();
        // t < 1, so floor(t * span) < span and fits in u32.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let offset = (t * f64::from(span)).floor() as u32;
        min.saturating_add(offset.min(span.saturating_sub(1)))
    }

    /// Pick an element uniformly. Returns `None` for an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        let t = self.next_f64();
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let index = (t * items.len() as f64).floor() as usize;
        items.get(index)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        for seed in [Seed::from("abc123"), Seed::from(42_i64), Seed::from("")] {
            let mut a = SeededSequence::new(&seed);
            let mut b = SeededSequence::new(&seed);
            for _ in 0..500 {
                assert_eq!(a.next_f64(), b.next_f64());
            }
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = SeededSequence::new(&Seed::from("meadow"));
        let mut b = SeededSequence::new(&Seed::from("marsh"));
        let same = (0..100).filter(|_| a.next_f64() == b.next_f64()).count();
        assert!(same < 100);
    }

    #[test]
    fn values_in_unit_interval() {
        let mut seq = SeededSequence::new(&Seed::from("range"));
        for _ in 0..10_000 {
            let v = seq.next_f64();
            assert!((0.0..1.0).contains(&v), "{v} out of range");
        }
    }

    #[test]
    fn text_hash_matches_reference() {
        // "a" = 97; "ab" = 97 * 31 + 98 = 3105.
        assert_eq!(Seed::from("a").initial_state(), 97);
        assert_eq!(Seed::from("ab").initial_state(), 3105);
        assert_eq!(Seed::from("").initial_state(), 0);
    }

    #[test]
    fn text_hash_wraps_and_takes_absolute_value() {
        // Long inputs overflow i32; the state must still be a valid u32
        // equal to |wrapped hash|.
        let text = "the quick brown fox jumps over the lazy dog";
        let mut expected: i32 = 0;
        for unit in text.encode_utf16() {
            expected = expected.wrapping_mul(31).wrapping_add(i32::from(unit));
        }
        assert_eq!(Seed::from(text).initial_state(), expected.unsigned_abs());
    }

    #[test]
    fn numeric_seed_reduced_mod_2_32() {
        assert_eq!(Seed::from(5_i64).initial_state(), 5);
        assert_eq!(Seed::from(4_294_967_301_i64).initial_state(), 5);
        assert_eq!(Seed::from(-1_i64).initial_state(), u32::MAX);
    }

    #[test]
    fn first_draw_matches_lcg() {
        let mut seq = SeededSequence::from_state(0);
        let v = seq.next_f64();
        assert_eq!(seq.state(), 1_013_904_223);
        assert_eq!(v, 1_013_904_223.0 / 4_294_967_296.0);
        let v2 = seq.next_f64();
        let expected = 1_013_904_223_u32
            .wrapping_mul(1_664_525)
            .wrapping_add(1_013_904_223);
        assert_eq!(v2, f64::from(expected) / 4_294_967_296.0);
    }

    #[test]
    fn next_int_stays_inclusive() {
        let mut seq = SeededSequence::new(&Seed::from("ints"));
        let mut seen_min = false;
        let mut seen_max = false;
        for _ in 0..2_000 {
            let v = seq.next_int(20, 39);
            assert!((20..=39).contains(&v));
            seen_min |= v == 20;
            seen_max |= v == 39;
        }
        assert!(seen_min && seen_max);
    }

    #[test]
    fn next_int_degenerate_range() {
        let mut seq = SeededSequence::new(&Seed::from(1_i64));
        assert_eq!(seq.next_int(7, 7), 7);
        assert_eq!(seq.next_int(9, 3), 9);
    }

    #[test]
    fn pick_handles_empty() {
        let mut seq = SeededSequence::new(&Seed::default());
        let empty: [u8; 0] = [];
        assert!(seq.pick(&empty).is_none());
        let items = ["a", "b", "c"];
        assert!(seq.pick(&items).is_some());
    }

    #[test]
    fn seed_deserializes_untagged() {
        let n: Seed = serde_json::from_str("7").unwrap();
        let t: Seed = serde_json::from_str("\"zone\"").unwrap();
        assert_eq!(n, Seed::Number(7));
        assert_eq!(t, Seed::Text("zone".to_owned()));
    }
}
