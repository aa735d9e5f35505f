//! A single grid cell.

use ev_core::{AgentId, TileRef};

use crate::{GridError, GridResult};

/// One cell of a [`Space`][crate::Space].
///
/// `cost` and `exit` are fixed when the space is built.  Only the occupant
/// slot changes during a run, and only through
/// [`add_occupant`](Self::add_occupant) / [`remove_occupant`](Self::remove_occupant).
#[derive(Clone, Debug)]
pub struct Tile {
    at:       TileRef,
    cost:     f64,
    exit:     bool,
    occupant: Option<AgentId>,
}

impl Tile {
    pub(crate) fn new(at: TileRef, cost: f64, exit: bool) -> Self {
        Self { at, cost, exit, occupant: None }
    }

    /// World-wide address of this tile.
    #[inline]
    pub fn at(&self) -> TileRef {
        self.at
    }

    /// Floor-field value: approximate distance to the nearest usable exit.
    #[inline]
    pub fn cost(&self) -> f64 {
        self.cost
    }

    #[inline]
    pub fn is_exit(&self) -> bool {
        self.exit
    }

    #[inline]
    pub fn occupant(&self) -> Option<AgentId> {
        self.occupant
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        self.occupant.is_none()
    }

    /// Record `agent` as this tile's occupant.
    ///
    /// # Errors
    ///
    /// [`GridError::OccupancyViolation`] if the tile is already occupied
    /// (even by `agent` itself).
    pub fn add_occupant(&mut self, agent: AgentId) -> GridResult<()> {
        if let Some(occupant) = self.occupant {
            return Err(GridError::OccupancyViolation {
                at: self.at,
                occupant,
                incoming: agent,
            });
        }
        self.occupant = Some(agent);
        Ok(())
    }

    /// Clear the occupant slot, which must currently hold `agent`.
    ///
    /// # Errors
    ///
    /// [`GridError::NotOccupied`] if the tile is empty or holds someone else.
    pub fn remove_occupant(&mut self, agent: AgentId) -> GridResult<()> {
        if self.occupant != Some(agent) {
            return Err(GridError::NotOccupied { at: self.at, agent });
        }
        self.occupant = None;
        Ok(())
    }
}
