//! The `Activate` trait (one scheduled invocation of an agent) and what it
//! reports back.

use ev_core::{AgentId, Tick, TileRef, UniformSource};
use ev_schedule::Scheduler;

use crate::{SimResult, World};

/// Mutable simulation state lent to one activation.
///
/// The simulator builds a fresh context for every popped entry, so an agent
/// has exclusive access to the world, the scheduler, and the random source for
/// the duration of its activation and nobody else runs meanwhile.
pub struct StepContext<'a> {
    /// Tick being processed.
    pub tick: Tick,

    pub world: &'a mut World,

    /// Agents re-register themselves here.
    pub scheduler: &'a mut Scheduler,

    /// Shared, seeded random source.  The only randomness an agent may use.
    pub rng: &'a mut dyn UniformSource,
}

/// Result of one activation, reported to observers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activation {
    /// Stepped to a new tile (same space or through a linked exit).
    Moved { from: TileRef, to: TileRef, next: Tick },

    /// Standing on a linked exit whose entrance is occupied.
    Blocked { at: TileRef, next: Tick },

    /// Interior tile with no free neighbor of lower or equal cost.
    Stayed { at: TileRef, next: Tick },

    /// Left the simulation through an unlinked exit.
    Departed { from: TileRef },
}

impl Activation {
    /// The tick the agent registered for next, or `None` after departure.
    pub fn next_wake(&self) -> Option<Tick> {
        match *self {
            Activation::Moved { next, .. }
            | Activation::Blocked { next, .. }
            | Activation::Stayed { next, .. } => Some(next),
            Activation::Departed { .. } => None,
        }
    }

    /// Where the agent stands after the activation, or `None` after departure.
    pub fn position(&self) -> Option<TileRef> {
        match *self {
            Activation::Moved { to, .. } => Some(to),
            Activation::Blocked { at, .. } | Activation::Stayed { at, .. } => Some(at),
            Activation::Departed { .. } => None,
        }
    }
}

/// An entity the scheduler can activate.
///
/// [`Pedestrian`][crate::Pedestrian] is the implementation shipped here; any
/// other agent kind plugs into [`Sim`][crate::Sim] the same way.
///
/// Implementations must leave the world consistent before returning and are
/// responsible for their own re-registration through `ctx.scheduler`.
pub trait Activate {
    fn activate(&mut self, id: AgentId, ctx: &mut StepContext<'_>) -> SimResult<Activation>;
}
