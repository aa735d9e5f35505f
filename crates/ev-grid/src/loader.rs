//! CSV layout loader.
//!
//! # Space format
//!
//! One row per tile.  Every `(x, y)` cell of the grid must appear exactly
//! once; the grid size is inferred from the largest coordinates.
//!
//! ```csv
//! x,y,cost,exit
//! 0,0,2.0,0
//! 1,0,1.0,0
//! 2,0,0.0,1
//! ```
//!
//! **`exit`** accepts `0`/`1`/`true`/`false` (blank means `false`).
//!
//! # Link format
//!
//! One row per exit link.  Exits without a row are departure points.
//!
//! ```csv
//! from_space,from_x,from_y,to_space,to_x,to_y
//! 0,4,2,1,0,2
//! ```

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use ev_core::{SpaceId, TilePos, TileRef};

use crate::{GridError, GridResult, Space, SpaceBuilder};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct TileRecord {
    x:    u32,
    y:    u32,
    cost: f64,
    exit: String,
}

#[derive(Deserialize)]
struct LinkRecord {
    from_space: u16,
    from_x:     u32,
    from_y:     u32,
    to_space:   u16,
    to_x:       u32,
    to_y:       u32,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load one space from a CSV file.
pub fn load_space_csv(path: &Path, id: SpaceId) -> GridResult<Space> {
    let file = std::fs::File::open(path)?;
    load_space_reader(file, id)
}

/// Like [`load_space_csv`] but accepts any `Read` source.
///
/// Useful for testing (pass a `std::io::Cursor`) or embedding layouts as
/// string constants.
pub fn load_space_reader<R: Read>(reader: R, id: SpaceId) -> GridResult<Space> {
    // ── Parse CSV rows ────────────────────────────────────────────────────
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rows: Vec<(TilePos, f64, bool)> = Vec::new();
    for result in csv_reader.deserialize::<TileRecord>() {
        let r = result.map_err(|e| GridError::Parse(e.to_string()))?;
        rows.push((TilePos::new(r.x, r.y), r.cost, parse_flag(&r.exit)?));
    }

    // ── Infer shape and check coverage ────────────────────────────────────
    let extent = |c: u32| {
        c.checked_add(1)
            .ok_or_else(|| GridError::Shape(format!("{id}: coordinate {c} out of range")))
    };
    let mut width = 0;
    let mut height = 0;
    for (p, ..) in &rows {
        width = width.max(extent(p.x)?);
        height = height.max(extent(p.y)?);
    }
    let cells = (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| GridError::Shape(format!("{id}: {width}x{height} grid is too large")))?;
    if rows.len() != cells {
        return Err(GridError::Shape(format!(
            "{id}: {} tile rows for a {width}x{height} grid",
            rows.len()
        )));
    }

    let mut seen = vec![false; cells];
    let mut b = SpaceBuilder::new(id, width, height);
    for (pos, cost, exit) in rows {
        let i = pos.y as usize * width as usize + pos.x as usize;
        if std::mem::replace(&mut seen[i], true) {
            return Err(GridError::Shape(format!("{id}: tile {pos} listed twice")));
        }
        b.set_cost(pos, cost)?;
        if exit {
            b.mark_exit(pos)?;
        }
    }

    let space = b.build()?;
    log::debug!(
        "loaded {id}: {width}x{height}, {} exits",
        space.exits().count()
    );
    Ok(space)
}

/// Read exit links from CSV and attach them to `spaces`.
///
/// Targets are not resolved here; call
/// [`validate_links`][crate::validate_links] afterwards.
pub fn load_links_reader<R: Read>(reader: R, spaces: &mut [Space]) -> GridResult<usize> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut count = 0;
    for result in csv_reader.deserialize::<LinkRecord>() {
        let r = result.map_err(|e| GridError::Parse(e.to_string()))?;
        let from_space = SpaceId(r.from_space);
        let to = TileRef::new(SpaceId(r.to_space), TilePos::new(r.to_x, r.to_y));
        spaces
            .get_mut(from_space.index())
            .ok_or(GridError::UnknownSpace(from_space))?
            .link_exit(TilePos::new(r.from_x, r.from_y), to)?;
        count += 1;
    }
    Ok(count)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_flag(s: &str) -> GridResult<bool> {
    match s.trim() {
        "" | "0" | "false" => Ok(false),
        "1" | "true" => Ok(true),
        other => Err(GridError::Parse(format!(
            "invalid exit flag {other:?}: expected 0, 1, true, or false"
        ))),
    }
}
