//! `ev-sim`: world state, the pedestrian movement protocol, and the tick loop.
//!
//! # Activation loop
//!
//! ```text
//! for tick in 0..config.total_ticks (or until everyone has left):
//!   while scheduler has an entry due at tick (in TieBreak order):
//!     agent.activate(ctx)          # reads tiles, mutates occupancy,
//!                                  # re-registers itself or departs
//!     observer.on_activation(..)
//!   observer.on_tick_end(..)
//! ```
//!
//! Activations never overlap: each one runs to completion before the next
//! entry is popped, which is what keeps the one-occupant-per-tile invariant
//! safe without locks.
//!
//! # Pedestrian branches
//!
//! | Tile                          | Action                                  |
//! |-------------------------------|-----------------------------------------|
//! | exit, no link                 | leave tile and world; never rescheduled |
//! | exit, linked, entrance taken  | wait                                    |
//! | exit, linked, entrance free   | step through to the entrance            |
//! | interior                      | step to a random free neighbor with cost ≤ current, else wait |
//!
//! Every branch except departure re-registers at
//! `tick + max(1, 1 + floor(cost))`, using the tile occupied afterwards.
//!
//! # Cargo features
//!
//! | Feature   | Effect                                                 |
//! |-----------|--------------------------------------------------------|
//! | `fx-hash` | Uses `FxHashSet` for the live-agent set.               |
//! | `serde`   | Propagates serde derives to the `ev-*` types.          |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use ev_core::{SimConfig, SpaceId, Tick, TilePos, TileRef};
//! use ev_sim::{NoopObserver, SimBuilder};
//!
//! let mut sim = SimBuilder::new(config, spaces)
//!     .pedestrian(TileRef::new(SpaceId(0), TilePos::new(0, 0)), Tick(0))
//!     .build()?;
//! sim.run(&mut NoopObserver)?;
//! assert!(sim.is_evacuated());
//! ```

pub mod activate;
pub mod builder;
pub mod error;
pub mod observer;
pub mod pedestrian;
pub mod sim;
pub mod world;

#[cfg(test)]
mod tests;

pub use activate::{Activate, Activation, StepContext};
pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use pedestrian::{Pedestrian, reschedule_delay};
pub use sim::Sim;
pub use world::World;
