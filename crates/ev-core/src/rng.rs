//! Deterministic simulation RNG and the uniform-draw interface agents use.
//!
//! # Determinism strategy
//!
//! The whole run shares one `SimRng`, seeded from `SimConfig::seed`.  Because
//! activations are strictly sequential (see `ev-sim`), the sequence of draws
//! is fixed by the seed and the scheduler's same-tick ordering.  Replaying
//! a run with the same seed, layout, and `TieBreak` reproduces every move.
//!
//! Agents never touch the concrete generator.  They ask a [`UniformSource`]
//! for "one index out of `n`", which lets tests inject a scripted source.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── UniformSource ─────────────────────────────────────────────────────────────

/// A source of uniform draws over `0..n`.
pub trait UniformSource {
    /// Draw an index uniformly from `0..n`.
    ///
    /// Returns `None` when `n == 0`; implementations must not consume
    /// randomness in that case.
    fn pick_index(&mut self, n: usize) -> Option<usize>;
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Simulation-level RNG shared by all agents.
///
/// Used only in single-threaded contexts; the simulator hands out
/// `&mut SimRng` to one activation at a time.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive a child `SimRng` with a different seed offset, for
    /// seeding auxiliary generators (e.g. setup-time placement) without
    /// perturbing the movement stream.
    pub fn child(&mut self, offset: u64) -> SimRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        SimRng(SmallRng::seed_from_u64(child_seed))
    }

    /// Shuffle a mutable slice in-place (Fisher-Yates).
    #[inline]
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.0);
    }
}

impl UniformSource for SimRng {
    #[inline]
    fn pick_index(&mut self, n: usize) -> Option<usize> {
        if n == 0 {
            return None;
        }
        Some(self.0.gen_range(0..n))
    }
}
