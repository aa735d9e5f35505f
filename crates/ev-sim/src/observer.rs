//! Simulation observer trait for progress reporting and data collection.

use ev_core::{AgentId, Tick};

use crate::{Activation, World};

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.  The world is only ever lent read-only.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter;
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, tick: Tick, activations: usize, world: &World) {
///         println!("{tick}: {activations} activations, {} inside", world.live_count());
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any activation.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called after each activation with what the agent did.
    fn on_activation(&mut self, _tick: Tick, _agent: AgentId, _outcome: &Activation) {}

    /// Called at the end of each tick.
    ///
    /// `activations` is the number of agents activated this tick.
    fn on_tick_end(&mut self, _tick: Tick, _activations: usize, _world: &World) {}

    /// Called at snapshot intervals (every `config.output_interval_ticks`
    /// ticks) with the full occupancy state.
    fn on_snapshot(&mut self, _tick: Tick, _world: &World) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick, _world: &World) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
