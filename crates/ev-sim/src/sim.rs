//! The `Sim` struct and its tick loop.

use ev_core::{AgentId, SimConfig, SimRng, Tick};
use ev_schedule::Scheduler;
use log::info;

use crate::{Activate, Pedestrian, SimError, SimObserver, SimResult, StepContext, World};

/// The main simulation runner.
///
/// `Sim<A>` owns the world, the scheduler, the agent arena (indexed by
/// `AgentId`), and the shared random source.  Each tick it pops the agents
/// due at that tick one at a time, in the scheduler's `TieBreak` order, and
/// activates them to completion.
///
/// Create pedestrian simulations via [`SimBuilder`][crate::SimBuilder], or
/// assemble any agent kind with [`Sim::new`].
pub struct Sim<A: Activate = Pedestrian> {
    /// Global configuration (total ticks, seed, tie-break, …).
    pub config: SimConfig,

    /// The tick that will be processed next.
    pub now: Tick,

    pub world: World,

    pub scheduler: Scheduler,

    /// Agents indexed by `AgentId`.  Departed agents stay in place so ids
    /// remain stable.
    pub agents: Vec<A>,

    /// Shared random source seeded from `config.seed`.
    pub rng: SimRng,
}

impl<A: Activate> Sim<A> {
    /// Assemble a simulation from parts.  Agents must already be placed in
    /// `world` and registered with `scheduler`.
    pub fn new(config: SimConfig, world: World, scheduler: Scheduler, agents: Vec<A>) -> SimResult<Self> {
        config.validate()?;
        Ok(Self {
            rng: SimRng::new(config.seed),
            now: Tick::ZERO,
            config,
            world,
            scheduler,
            agents,
        })
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Run from the current tick to `config.end_tick()`, or until everyone
    /// has left when `config.stop_when_evacuated` is set.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        info!(
            "run start: {} agents in {} spaces, seed {}",
            self.world.live_count(),
            self.world.spaces().len(),
            self.config.seed
        );
        while self.now < self.config.end_tick() {
            if self.config.stop_when_evacuated && self.world.is_evacuated() {
                break;
            }
            self.step(observer)?;
        }
        observer.on_sim_end(self.now, &self.world);
        info!(
            "run end at {}: {} departed, {} still inside",
            self.now,
            self.world.departed_count(),
            self.world.live_count()
        );
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step(observer)?;
        }
        Ok(())
    }

    /// Process the current tick and advance.  Returns the number of
    /// activations.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<usize> {
        let now = self.now;
        observer.on_tick_start(now);
        let activations = self.process_tick(now, observer)?;
        observer.on_tick_end(now, activations, &self.world);
        if self.config.output_interval_ticks > 0
            && now.0 % self.config.output_interval_ticks == 0
        {
            observer.on_snapshot(now, &self.world);
        }
        self.now = now.next();
        Ok(activations)
    }

    #[inline]
    pub fn live_count(&self) -> usize {
        self.world.live_count()
    }

    #[inline]
    pub fn departed_count(&self) -> usize {
        self.world.departed_count()
    }

    #[inline]
    pub fn is_evacuated(&self) -> bool {
        self.world.is_evacuated()
    }

    pub fn agent(&self, id: AgentId) -> SimResult<&A> {
        self.agents.get(id.index()).ok_or(SimError::UnknownAgent(id))
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn process_tick<O: SimObserver>(&mut self, now: Tick, observer: &mut O) -> SimResult<usize> {
        let mut activations = 0;

        // Pop one entry at a time: an activation may cancel or add entries
        // for this same tick, and the next pop must see that.
        while let Some((_, id)) = self.scheduler.pop_due(now) {
            let agent = self
                .agents
                .get_mut(id.index())
                .ok_or(SimError::UnknownAgent(id))?;
            let mut ctx = StepContext {
                tick:      now,
                world:     &mut self.world,
                scheduler: &mut self.scheduler,
                rng:       &mut self.rng,
            };
            let outcome = agent.activate(id, &mut ctx)?;
            observer.on_activation(now, id, &outcome);
            activations += 1;
        }

        Ok(activations)
    }
}
