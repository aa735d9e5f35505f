//! `World`: every space plus the set of pedestrians still inside.

use ev_core::{AgentId, SpaceId, TileRef};
use ev_grid::{GridError, Space, Tile, validate_links};

use crate::{SimError, SimResult};

#[cfg(feature = "fx-hash")]
type AgentSet = rustc_hash::FxHashSet<AgentId>;
#[cfg(not(feature = "fx-hash"))]
type AgentSet = std::collections::HashSet<AgentId>;

/// All spaces of the simulation and the live-agent set.
///
/// Occupancy changes go through [`place`](Self::place),
/// [`relocate`](Self::relocate), and [`depart`](Self::depart), which keep the
/// tiles and the live set consistent:
///
/// - every live agent occupies exactly one tile, and that tile records it;
/// - `live_count() + departed_count() == initial_count()`.
pub struct World {
    spaces:   Vec<Space>,
    live:     AgentSet,
    departed: usize,
    initial:  usize,
}

impl World {
    /// Wrap fully built and linked spaces.
    ///
    /// # Errors
    ///
    /// [`GridError::DanglingLink`] (or `Shape`) from
    /// [`validate_links`]: a link that does not resolve is a setup defect
    /// and is reported here, never mid-run.
    pub fn new(spaces: Vec<Space>) -> SimResult<Self> {
        validate_links(&spaces)?;
        Ok(Self {
            spaces,
            live:     AgentSet::default(),
            departed: 0,
            initial:  0,
        })
    }

    // ── Read-only queries ─────────────────────────────────────────────────

    pub fn spaces(&self) -> &[Space] {
        &self.spaces
    }

    pub fn space(&self, id: SpaceId) -> SimResult<&Space> {
        self.spaces
            .get(id.index())
            .ok_or(SimError::Grid(GridError::UnknownSpace(id)))
    }

    pub fn tile(&self, at: TileRef) -> SimResult<&Tile> {
        Ok(self.space(at.space)?.tile(at.pos)?)
    }

    /// Who stands on `at`, if anyone.
    pub fn occupant(&self, at: TileRef) -> SimResult<Option<AgentId>> {
        Ok(self.tile(at)?.occupant())
    }

    /// Where the exit at `at` leads; `None` means departure.
    pub fn exit_link(&self, at: TileRef) -> SimResult<Option<TileRef>> {
        Ok(self.space(at.space)?.exit_link(at.pos))
    }

    /// Every occupied tile in the world, space by space, row-major.
    pub fn occupancy(&self) -> impl Iterator<Item = (TileRef, AgentId)> + '_ {
        self.spaces.iter().flat_map(|s| {
            let id = s.id();
            s.occupied_tiles().map(move |(pos, a)| (TileRef::new(id, pos), a))
        })
    }

    #[inline]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    #[inline]
    pub fn departed_count(&self) -> usize {
        self.departed
    }

    /// Number of agents ever placed.
    #[inline]
    pub fn initial_count(&self) -> usize {
        self.initial
    }

    #[inline]
    pub fn is_live(&self, agent: AgentId) -> bool {
        self.live.contains(&agent)
    }

    /// `true` once every placed agent has departed.
    #[inline]
    pub fn is_evacuated(&self) -> bool {
        self.live.is_empty()
    }

    /// Live agents in ascending id order.
    pub fn live_agents(&self) -> Vec<AgentId> {
        let mut v: Vec<_> = self.live.iter().copied().collect();
        v.sort_unstable();
        v
    }

    // ── Occupancy mutation ────────────────────────────────────────────────

    fn tile_mut(&mut self, at: TileRef) -> SimResult<&mut Tile> {
        let space = self
            .spaces
            .get_mut(at.space.index())
            .ok_or(GridError::UnknownSpace(at.space))?;
        Ok(space.tile_mut(at.pos)?)
    }

    /// Put a new agent on `at` and add it to the live set (setup only).
    pub fn place(&mut self, agent: AgentId, at: TileRef) -> SimResult<()> {
        if self.live.contains(&agent) {
            return Err(SimError::DuplicateAgent(agent));
        }
        self.tile_mut(at)?.add_occupant(agent)?;
        self.live.insert(agent);
        self.initial += 1;
        Ok(())
    }

    /// Move `agent` from `from` to `to`, possibly across spaces.
    ///
    /// Both ends are checked before anything changes, so on error the world
    /// is untouched; on success the remove/add pair has been applied.
    pub fn relocate(&mut self, agent: AgentId, from: TileRef, to: TileRef) -> SimResult<()> {
        if let Some(occupant) = self.occupant(to)? {
            return Err(GridError::OccupancyViolation { at: to, occupant, incoming: agent }.into());
        }
        if self.occupant(from)? != Some(agent) {
            return Err(GridError::NotOccupied { at: from, agent }.into());
        }
        self.tile_mut(from)?.remove_occupant(agent)?;
        self.tile_mut(to)?.add_occupant(agent)?;
        Ok(())
    }

    /// Remove `agent` from `from` and from the live set, permanently.
    pub fn depart(&mut self, agent: AgentId, from: TileRef) -> SimResult<()> {
        if !self.live.contains(&agent) {
            return Err(SimError::NotLive(agent));
        }
        self.tile_mut(from)?.remove_occupant(agent)?;
        self.live.remove(&agent);
        self.departed += 1;
        Ok(())
    }
}
