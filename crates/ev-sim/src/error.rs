use ev_core::{AgentId, CoreError};
use ev_grid::GridError;
use ev_schedule::ScheduleError;
use thiserror::Error;

/// Every variant is fatal: it reflects a defective layout or a broken
/// invariant, and aborts the run.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("grid error: {0}")]
    Grid(#[from] GridError),

    #[error("schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("agent {0} does not exist")]
    UnknownAgent(AgentId),

    #[error("agent {0} is not in the live set")]
    NotLive(AgentId),

    #[error("agent {0} is already placed in the world")]
    DuplicateAgent(AgentId),

    #[error("agent {0} was activated after departing")]
    Departed(AgentId),

    #[error("{0} agents exceed the AgentId range")]
    TooManyAgents(usize),
}

pub type SimResult<T> = Result<T, SimError>;
