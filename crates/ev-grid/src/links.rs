//! Cross-space link validation.

use ev_core::TileRef;

use crate::{GridError, GridResult, Space};

/// Check that `spaces` is indexed by `SpaceId` and that every exit link lands
/// on a real tile.
///
/// Run once at setup, after all spaces are built and linked.  A link that
/// passes here stays valid for the whole run because topology never changes.
///
/// # Errors
///
/// - [`GridError::Shape`] if `spaces[i].id() != SpaceId(i)`.
/// - [`GridError::DanglingLink`] if a target space or tile does not exist.
pub fn validate_links(spaces: &[Space]) -> GridResult<()> {
    for (i, space) in spaces.iter().enumerate() {
        if space.id().index() != i {
            return Err(GridError::Shape(format!(
                "space at index {i} carries id {}",
                space.id()
            )));
        }
    }

    for space in spaces {
        for (exit, entrance) in space.exit_links() {
            let resolves = spaces
                .get(entrance.space.index())
                .is_some_and(|s| s.contains(entrance.pos));
            if !resolves {
                return Err(GridError::DanglingLink {
                    from: TileRef::new(space.id(), exit),
                    to:   entrance,
                });
            }
        }
    }
    Ok(())
}

