//! `ev-core`: foundational types for the `rust_evac` evacuation simulator.
//!
//! This crate is a dependency of every other `ev-*` crate.  It intentionally
//! has no `ev-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `SpaceId`, `TilePos`, `TileRef`            |
//! | [`time`]        | `Tick`, `SimConfig`, `TieBreak`                       |
//! | [`rng`]         | `SimRng` (shared, seeded), `UniformSource`            |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use ids::{AgentId, SpaceId, TilePos, TileRef};
pub use rng::{SimRng, UniformSource};
pub use time::{SimConfig, TieBreak, Tick};
