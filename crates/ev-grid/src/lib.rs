//! `ev-grid`: tiles, spaces, and the exit → entrance topology.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`tile`]    | `Tile`: cost, exit flag, single-occupant slot               |
//! | [`space`]   | `Space` (dense tile arena + exit links), `SpaceBuilder`     |
//! | [`links`]   | `validate_links`: cross-space link checking                 |
//! | [`loader`]  | `load_space_csv`, `load_space_reader`, `load_links_reader`  |
//! | [`error`]   | `GridError`, `GridResult<T>`                                |
//!
//! # Occupancy model
//!
//! Each tile holds an `Option<AgentId>`.  [`Tile::add_occupant`] and
//! [`Tile::remove_occupant`] are the only ways to change it; both fail
//! loudly instead of silently overwriting, so a tile can never be observed
//! with two occupants.

pub mod error;
pub mod links;
pub mod loader;
pub mod space;
pub mod tile;


pub use error::{GridError, GridResult};
pub use links::validate_links;
pub use loader::{load_links_reader, load_space_csv, load_space_reader};
pub use space::{Space, SpaceBuilder};
pub use tile::Tile;
