//! Grid-subsystem error type.
//!
//! None of these are retryable.  Occupancy errors mean the movement protocol
//! broke an invariant; link and shape errors mean the layout handed to the
//! simulator is defective.

use thiserror::Error;

use ev_core::{AgentId, SpaceId, TilePos, TileRef};

/// Errors produced by `ev-grid`.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("tile {at} already holds {occupant}; cannot place {incoming}")]
    OccupancyViolation {
        at:       TileRef,
        occupant: AgentId,
        incoming: AgentId,
    },

    #[error("tile {at} does not record {agent} as its occupant")]
    NotOccupied { at: TileRef, agent: AgentId },

    #[error("exit {from} links to {to}, which does not exist")]
    DanglingLink { from: TileRef, to: TileRef },

    #[error("tile {0} is not an exit and cannot carry a link")]
    NotAnExit(TileRef),

    #[error("position {pos} is outside {space}")]
    OutOfBounds { space: SpaceId, pos: TilePos },

    #[error("space {0} not found")]
    UnknownSpace(SpaceId),

    #[error("tile {pos} has invalid cost {cost}: costs must be finite and non-negative")]
    InvalidCost { pos: TilePos, cost: f64 },

    #[error("layout shape error: {0}")]
    Shape(String),

    #[error("layout parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type GridResult<T> = Result<T, GridError>;
