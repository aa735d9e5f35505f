//! A room or floor: a dense tile grid plus links out of its exit tiles.
//!
//! # Data layout
//!
//! Tiles live in one row-major `Vec<Tile>`; the tile at `(x, y)` sits at
//! index `y * width + x`.  Occupancy is an `Option<AgentId>` inside each
//! tile, so the grid is the only place an agent's location is recorded on
//! the tile side and there are no shared per-tile collections to alias.
//!
//! Exit links are sparse (`HashMap<TilePos, TileRef>`): only linked exits
//! have an entry.  An exit tile with no entry is a departure point.

use std::collections::HashMap;

use ev_core::{AgentId, SpaceId, TilePos, TileRef};

use crate::{GridError, GridResult, Tile};

/// King-move offsets in row-major scan order.
///
/// The order is part of the determinism contract: a uniform draw over the
/// eligible neighbors selects by index into this sequence.
const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1,  0),          (1,  0),
    (-1,  1), (0,  1), (1,  1),
];

// ── Space ─────────────────────────────────────────────────────────────────────

/// A connected grid of tiles.
///
/// Do not construct directly; use [`SpaceBuilder`] or the CSV loader.
/// Topology (costs, exit flags, links) is fixed once built.
#[derive(Clone, Debug)]
pub struct Space {
    id:         SpaceId,
    width:      u32,
    height:     u32,
    tiles:      Vec<Tile>,
    exit_links: HashMap<TilePos, TileRef>,
}

impl Space {
    // ── Dimensions ────────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> SpaceId {
        self.id
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of tiles (`width * height`).
    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[inline]
    pub fn contains(&self, pos: TilePos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    // ── Tile access ───────────────────────────────────────────────────────

    #[inline]
    fn slot(&self, pos: TilePos) -> GridResult<usize> {
        if !self.contains(pos) {
            return Err(GridError::OutOfBounds { space: self.id, pos });
        }
        Ok(pos.y as usize * self.width as usize + pos.x as usize)
    }

    pub fn tile(&self, pos: TilePos) -> GridResult<&Tile> {
        let i = self.slot(pos)?;
        Ok(&self.tiles[i])
    }

    /// Mutable tile access.  Only occupancy can be changed through it.
    pub fn tile_mut(&mut self, pos: TilePos) -> GridResult<&mut Tile> {
        let i = self.slot(pos)?;
        Ok(&mut self.tiles[i])
    }

    /// All tiles in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.tiles.iter()
    }

    /// Read-only view of current occupancy: `(position, occupant)` for every
    /// occupied tile, in row-major order.
    pub fn occupied_tiles(&self) -> impl Iterator<Item = (TilePos, AgentId)> + '_ {
        self.tiles
            .iter()
            .filter_map(|t| t.occupant().map(|a| (t.at().pos, a)))
    }

    pub fn occupant_count(&self) -> usize {
        self.tiles.iter().filter(|t| !t.is_free()).count()
    }

    // ── Neighbor queries ──────────────────────────────────────────────────

    /// Tiles at Chebyshev distance exactly 1 from `pos`, clipped to the grid.
    ///
    /// Yields at most 8 tiles, never `pos` itself, in row-major order.
    pub fn neighbors(&self, pos: TilePos) -> GridResult<impl Iterator<Item = &Tile> + '_> {
        self.slot(pos)?;
        let (w, h) = (self.width as i64, self.height as i64);
        Ok(NEIGHBOR_OFFSETS.iter().filter_map(move |&(dx, dy)| {
            let nx = pos.x as i64 + dx;
            let ny = pos.y as i64 + dy;
            if nx < 0 || ny < 0 || nx >= w || ny >= h {
                return None;
            }
            Some(&self.tiles[(ny * w + nx) as usize])
        }))
    }

    // ── Exit links ────────────────────────────────────────────────────────

    /// Where stepping through the exit at `pos` leads.
    ///
    /// `None` means the exit leaves the simulation (or `pos` has no link).
    #[inline]
    pub fn exit_link(&self, pos: TilePos) -> Option<TileRef> {
        self.exit_links.get(&pos).copied()
    }

    /// All `(exit, entrance)` pairs, sorted by exit position.
    pub fn exit_links(&self) -> Vec<(TilePos, TileRef)> {
        let mut links: Vec<_> = self.exit_links.iter().map(|(&p, &t)| (p, t)).collect();
        links.sort_unstable();
        links
    }

    /// Positions of every exit tile, row-major.
    pub fn exits(&self) -> impl Iterator<Item = TilePos> + '_ {
        self.tiles.iter().filter(|t| t.is_exit()).map(|t| t.at().pos)
    }

    /// Link the exit at `from` to `to` (setup only).
    ///
    /// The target is not resolved here; run [`validate_links`][crate::validate_links]
    /// over the complete set of spaces once all links are in place.
    ///
    /// # Errors
    ///
    /// [`GridError::OutOfBounds`] or [`GridError::NotAnExit`] if `from` is not
    /// an exit tile of this space.
    pub fn link_exit(&mut self, from: TilePos, to: TileRef) -> GridResult<()> {
        let tile = self.tile(from)?;
        if !tile.is_exit() {
            return Err(GridError::NotAnExit(tile.at()));
        }
        self.exit_links.insert(from, to);
        Ok(())
    }
}

// ── SpaceBuilder ──────────────────────────────────────────────────────────────

/// Construct a [`Space`] incrementally, then call [`build`](Self::build).
///
/// Every tile starts at cost `0.0`, not an exit.
///
/// # Example
///
/// ```
/// use ev_core::{SpaceId, TilePos};
/// use ev_grid::SpaceBuilder;
///
/// // 1×3 corridor draining to the right.
/// let mut b = SpaceBuilder::from_rows(SpaceId(0), &[vec![2.0, 1.0, 0.0]]).unwrap();
/// b.mark_exit(TilePos::new(2, 0)).unwrap();
/// let space = b.build().unwrap();
/// assert_eq!(space.len(), 3);
/// assert_eq!(space.exits().count(), 1);
/// ```
pub struct SpaceBuilder {
    id:     SpaceId,
    width:  u32,
    height: u32,
    costs:  Vec<f64>,
    exits:  Vec<bool>,
    links:  Vec<(TilePos, TileRef)>,
}

impl SpaceBuilder {
    pub fn new(id: SpaceId, width: u32, height: u32) -> Self {
        let n = width as usize * height as usize;
        Self {
            id,
            width,
            height,
            costs: vec![0.0; n],
            exits: vec![false; n],
            links: Vec::new(),
        }
    }

    /// Start from a cost matrix given as rows (`rows[y][x]`).
    ///
    /// # Errors
    ///
    /// [`GridError::Shape`] if the rows are empty or ragged.
    pub fn from_rows(id: SpaceId, rows: &[Vec<f64>]) -> GridResult<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if height == 0 || width == 0 {
            return Err(GridError::Shape("cost matrix is empty".into()));
        }
        if let Some((y, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(GridError::Shape(format!(
                "row {y} has {} cells, expected {width}",
                row.len()
            )));
        }
        let (w, h) = (dim(width)?, dim(height)?);
        let mut b = Self::new(id, w, h);
        b.costs = rows.iter().flatten().copied().collect();
        Ok(b)
    }

    fn slot(&self, pos: TilePos) -> GridResult<usize> {
        if pos.x >= self.width || pos.y >= self.height {
            return Err(GridError::OutOfBounds { space: self.id, pos });
        }
        Ok(pos.y as usize * self.width as usize + pos.x as usize)
    }

    pub fn set_cost(&mut self, pos: TilePos, cost: f64) -> GridResult<&mut Self> {
        let i = self.slot(pos)?;
        self.costs[i] = cost;
        Ok(self)
    }

    pub fn mark_exit(&mut self, pos: TilePos) -> GridResult<&mut Self> {
        let i = self.slot(pos)?;
        self.exits[i] = true;
        Ok(self)
    }

    /// Link the exit at `from` to an entrance tile (possibly in another space).
    ///
    /// `from` must be marked as an exit by the time [`build`](Self::build)
    /// runs.
    pub fn link_exit(&mut self, from: TilePos, to: TileRef) -> GridResult<&mut Self> {
        self.slot(from)?;
        self.links.push((from, to));
        Ok(self)
    }

    /// Validate costs and links and produce the space.
    ///
    /// # Errors
    ///
    /// - [`GridError::Shape`] for a zero-sized grid.
    /// - [`GridError::InvalidCost`] for a negative or non-finite cost.
    /// - [`GridError::NotAnExit`] for a link whose source is not an exit.
    pub fn build(self) -> GridResult<Space> {
        let id = self.id;
        if self.width == 0 || self.height == 0 {
            return Err(GridError::Shape(format!("{id} has zero width or height")));
        }
        let width = self.width as usize;
        let mut tiles = Vec::with_capacity(self.costs.len());
        for (i, (&cost, &exit)) in self.costs.iter().zip(&self.exits).enumerate() {
            let pos = TilePos::new((i % width) as u32, (i / width) as u32);
            if !cost.is_finite() || cost < 0.0 {
                return Err(GridError::InvalidCost { pos, cost });
            }
            tiles.push(Tile::new(TileRef::new(id, pos), cost, exit));
        }

        let mut space = Space {
            id,
            width: self.width,
            height: self.height,
            tiles,
            exit_links: HashMap::with_capacity(self.links.len()),
        };
        for (from, to) in self.links {
            space.link_exit(from, to)?;
        }
        Ok(space)
    }
}

fn dim(n: usize) -> GridResult<u32> {
    u32::try_from(n).map_err(|_| GridError::Shape(format!("dimension {n} exceeds u32")))
}
