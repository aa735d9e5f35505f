//! `ev-schedule`: the discrete-event queue that drives activations.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`scheduler`] | `Scheduler` (`BTreeMap<Tick, VecDeque<..>>`), `ScheduleHandle` |
//! | [`error`]     | `ScheduleError`, `ScheduleResult<T>`                      |
//!
//! # Event model (summary)
//!
//! ```text
//! schedule_once(t, a)           → a fires once at t
//! schedule_repeating(t, k, a)   → a fires at t, t+k, t+2k, … until cancelled
//! cancel(h)                     → h never fires again
//! pop_due(now)                  → next (handle, agent) due at `now`, in TieBreak order
//! ```
//!
//! Only registered agents are touched each tick: the queue maps future ticks
//! to the agents due then, so idle ticks cost nothing.

pub mod error;
pub mod scheduler;


pub use error::{ScheduleError, ScheduleResult};
pub use scheduler::{ScheduleHandle, Scheduler};
