use thiserror::Error;

use ev_core::Tick;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("repeating registration needs an interval of at least 1 tick")]
    ZeroInterval,

    #[error("cannot schedule at {at}: the scheduler has already reached {now}")]
    InPast { at: Tick, now: Tick },
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
