//! Simulation time model and run configuration.
//!
//! # Design
//!
//! Time is a monotonically increasing integer `Tick`.  An agent's movement
//! rate is expressed purely as how many ticks it waits between activations,
//! so no wall-clock mapping is needed.  Integer ticks keep all scheduling
//! arithmetic exact and comparisons O(1).

use std::fmt;

use crate::{CoreError, CoreResult};

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`, saturating at `u64::MAX`.
    ///
    /// A saturated tick lies past any configured `end_tick`, so whatever is
    /// scheduled there never fires.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0.saturating_add(n))
    }

    /// Ticks elapsed from `earlier` to `self`.
    ///
    /// # Panics
    /// Panics in debug mode if `earlier > self`.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0 - earlier.0
    }

    /// The next tick.
    #[inline]
    pub fn next(self) -> Tick {
        self.offset(1)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        self.offset(rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── TieBreak ──────────────────────────────────────────────────────────────────

/// Order in which agents due at the same tick are activated.
///
/// The order is observable: two pedestrians contending for one doorway on the
/// same tick are resolved in favor of whoever is activated first.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TieBreak {
    /// Registration order: whoever was scheduled first runs first.
    #[default]
    Insertion,
    /// Ascending `AgentId`, registration order as secondary key.
    AgentOrder,
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
///
/// Typically built in code or loaded from JSON by the application crate and
/// passed to the simulation builder.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Total ticks to simulate (exclusive upper bound).
    pub total_ticks: u64,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Emit an occupancy snapshot every N ticks.  0 disables snapshots.
    pub output_interval_ticks: u64,

    /// Same-tick activation order.
    pub tie_break: TieBreak,

    /// Stop `Sim::run` early once every pedestrian has departed.
    pub stop_when_evacuated: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            total_ticks:           10_000,
            seed:                  0,
            output_interval_ticks: 1,
            tie_break:             TieBreak::Insertion,
            stop_when_evacuated:   true,
        }
    }
}

impl SimConfig {
    /// The tick at which the simulation ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    /// Reject configurations that cannot produce a meaningful run.
    pub fn validate(&self) -> CoreResult<()> {
        if self.total_ticks == 0 {
            return Err(CoreError::Config("total_ticks must be at least 1".into()));
        }
        Ok(())
    }
}
