//! Fluent builder for constructing a pedestrian [`Sim`].

use ev_core::{AgentId, SimConfig, Tick, TileRef};
use ev_grid::{GridError, Space};
use ev_schedule::Scheduler;

use crate::{Pedestrian, Sim, SimError, SimResult, World};

/// Fluent builder for [`Sim<Pedestrian>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: total ticks, seed, tie-break
/// - `Vec<Space>`: built spaces, indexed by `SpaceId`
///
/// # Optional inputs
///
/// | Method                   | Effect                                        |
/// |--------------------------|-----------------------------------------------|
/// | `.link(exit, entrance)`  | Link an exit tile to an entrance tile         |
/// | `.pedestrian(at, wake)`  | Place a pedestrian and register its first activation |
/// | `.pedestrians(it, wake)` | Same, for many tiles                          |
///
/// Pedestrians receive `AgentId`s in the order they are added.  With the
/// default `TieBreak::Insertion` that is also the order in which pedestrians
/// sharing a first wake tick are activated.
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config, vec![room, hall])
///     .link(room_door, hall_entrance)
///     .pedestrians(start_tiles, Tick(0))
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder {
    config:     SimConfig,
    spaces:     Vec<Space>,
    links:      Vec<(TileRef, TileRef)>,
    placements: Vec<(TileRef, Tick)>,
}

impl SimBuilder {
    pub fn new(config: SimConfig, spaces: Vec<Space>) -> Self {
        Self {
            config,
            spaces,
            links:      Vec::new(),
            placements: Vec::new(),
        }
    }

    /// Link the exit tile `exit` to `entrance`.  Exits left unlinked are
    /// departure points.
    pub fn link(mut self, exit: TileRef, entrance: TileRef) -> Self {
        self.links.push((exit, entrance));
        self
    }

    /// Place a pedestrian on `at`, first activated at `first_wake`.
    pub fn pedestrian(mut self, at: TileRef, first_wake: Tick) -> Self {
        self.placements.push((at, first_wake));
        self
    }

    /// Place one pedestrian on each tile of `tiles`, all first activated at
    /// `first_wake`.
    pub fn pedestrians(mut self, tiles: impl IntoIterator<Item = TileRef>, first_wake: Tick) -> Self {
        self.placements.extend(tiles.into_iter().map(|t| (t, first_wake)));
        self
    }

    /// Apply links, validate the topology, place every pedestrian, register
    /// first activations, and return a ready-to-run [`Sim`].
    ///
    /// # Errors
    ///
    /// - [`GridError::NotAnExit`] / [`GridError::DanglingLink`] for bad links.
    /// - [`GridError::OccupancyViolation`] if two pedestrians share a tile.
    /// - [`SimError::Config`] for an invalid configuration.
    pub fn build(mut self) -> SimResult<Sim<Pedestrian>> {
        self.config.validate()?;

        // ── Topology ──────────────────────────────────────────────────────
        for (exit, entrance) in self.links {
            self.spaces
                .get_mut(exit.space.index())
                .ok_or(GridError::UnknownSpace(exit.space))?
                .link_exit(exit.pos, entrance)?;
        }
        let mut world = World::new(self.spaces)?;

        // ── Placement and first registrations ─────────────────────────────
        let mut scheduler = Scheduler::new(self.config.tie_break);
        let mut agents = Vec::with_capacity(self.placements.len());
        for (i, (at, first_wake)) in self.placements.into_iter().enumerate() {
            let id = AgentId::try_from(i).map_err(|_| SimError::TooManyAgents(i + 1))?;
            world.place(id, at)?;
            let mut ped = Pedestrian::new(at);
            ped.set_handle(scheduler.schedule_once(first_wake, id)?);
            agents.push(ped);
        }

        Sim::new(self.config, world, scheduler, agents)
    }
}
