//! The pedestrian: descends the floor field, queues at doorways, and leaves
//! through terminal exits.

use ev_core::{AgentId, Tick, TileRef};
use ev_schedule::ScheduleHandle;
use log::{debug, trace};

use crate::{Activate, Activation, SimError, SimResult, StepContext};

/// Ticks to wait before the next activation when standing on a tile of
/// `cost`: `max(1, 1 + floor(cost))`.
///
/// Pedestrians near an exit are activated more often, which stands in for
/// faster local walking speed.  Costs beyond `u64` range saturate, and the
/// wake tick saturates with them, so such a pedestrian is simply never
/// activated again.
#[inline]
pub fn reschedule_delay(cost: f64) -> u64 {
    (1.0 + cost.floor()).max(1.0) as u64
}

/// A pedestrian agent.
///
/// While live it occupies exactly the tile at [`at`](Self::at); once departed
/// it holds no tile and no registration.
#[derive(Clone, Debug)]
pub struct Pedestrian {
    at:       TileRef,
    handle:   Option<ScheduleHandle>,
    departed: bool,
}

impl Pedestrian {
    /// A pedestrian standing on `at` (the caller places it in the world).
    pub fn new(at: TileRef) -> Self {
        Self { at, handle: None, departed: false }
    }

    /// Current tile, or the exit it left through once departed.
    #[inline]
    pub fn at(&self) -> TileRef {
        self.at
    }

    /// The pending registration, if any.
    #[inline]
    pub fn handle(&self) -> Option<ScheduleHandle> {
        self.handle
    }

    #[inline]
    pub fn has_departed(&self) -> bool {
        self.departed
    }

    pub(crate) fn set_handle(&mut self, handle: ScheduleHandle) {
        self.handle = Some(handle);
    }

    /// Register the next activation from the tile now occupied.
    fn reschedule(&mut self, id: AgentId, ctx: &mut StepContext<'_>) -> SimResult<Tick> {
        let cost = ctx.world.tile(self.at)?.cost();
        let next = ctx.tick + reschedule_delay(cost);
        self.handle = Some(ctx.scheduler.schedule_once(next, id)?);
        Ok(next)
    }

    fn step_to(&mut self, id: AgentId, to: TileRef, ctx: &mut StepContext<'_>) -> SimResult<Activation> {
        let from = self.at;
        ctx.world.relocate(id, from, to)?;
        self.at = to;
        let next = self.reschedule(id, ctx)?;
        trace!("{id} {from} -> {to}, next {next}");
        Ok(Activation::Moved { from, to, next })
    }
}

impl Activate for Pedestrian {
    fn activate(&mut self, id: AgentId, ctx: &mut StepContext<'_>) -> SimResult<Activation> {
        if self.departed {
            return Err(SimError::Departed(id));
        }
        let (is_exit, cost) = {
            let here = ctx.world.tile(self.at)?;
            (here.is_exit(), here.cost())
        };

        // ── Exit tile: leave, queue, or pass through ──────────────────────
        if is_exit {
            let Some(entrance) = ctx.world.exit_link(self.at)? else {
                ctx.world.depart(id, self.at)?;
                // The one-shot that woke us has already been retired.
                self.handle = None;
                self.departed = true;
                debug!("{id} departed via {} at {}", self.at, ctx.tick);
                return Ok(Activation::Departed { from: self.at });
            };

            if ctx.world.occupant(entrance)?.is_some() {
                let next = self.reschedule(id, ctx)?;
                trace!("{id} blocked at {} by occupied {entrance}", self.at);
                return Ok(Activation::Blocked { at: self.at, next });
            }
            return self.step_to(id, entrance, ctx);
        }

        // ── Interior tile: descend the floor field ────────────────────────
        let candidates: Vec<TileRef> = ctx
            .world
            .space(self.at.space)?
            .neighbors(self.at.pos)?
            .filter(|n| n.is_free() && n.cost() <= cost)
            .map(|n| n.at())
            .collect();

        match ctx.rng.pick_index(candidates.len()) {
            Some(i) => self.step_to(id, candidates[i], ctx),
            None => {
                let next = self.reschedule(id, ctx)?;
                Ok(Activation::Stayed { at: self.at, next })
            }
        }
    }
}
