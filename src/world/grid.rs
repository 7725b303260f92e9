//! Tile grid
//!
//! The dense 2D container holding exactly one `Tile` per cell.

use thiserror::Error;

use super::tile::Tile;

/// Errors from grid access and construction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("{op}: ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        op: &'static str,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    #[error("{op}: invalid grid dimensions {width}x{height}, both must be positive")]
    InvalidDimensions {
        op: &'static str,
        width: u32,
        height: u32,
    },
    #[error("{op}: {width}x{height} grid exceeds the limit of {max} cells")]
    TooLarge {
        op: &'static str,
        width: u32,
        height: u32,
        max: usize,
    },
    #[error("{op}: tile at ({tile_x}, {tile_y}) cannot be stored in cell ({x}, {y})")]
    IdentityMismatch {
        op: &'static str,
        x: u32,
        y: u32,
        tile_x: u32,
        tile_y: u32,
    },
}

/// A rectangular grid of tiles.
///
/// Storage is row-major: index = `y * width + x`. Iteration follows the same
/// order, `y` outer and `x` inner. Every stored tile's own `(x, y)` equals the
/// cell it occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Largest number of cells a grid may hold
    pub const MAX_CELLS: usize = 1 << 24;

    /// Check that a `width` x `height` grid can be built: both sides
    /// positive and at most `MAX_CELLS` cells in total
    pub fn check_dimensions(op: &'static str, width: u32, height: u32) -> Result<(), GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::InvalidDimensions { op, width, height });
        }
        match (width as usize).checked_mul(height as usize) {
            Some(cells) if cells <= Self::MAX_CELLS => Ok(()),
            _ => Err(GridError::TooLarge {
                op,
                width,
                height,
                max: Self::MAX_CELLS,
            }),
        }
    }

    /// Build a grid by asking `factory` for every cell
    pub fn from_fn<F>(width: u32, height: u32, mut factory: F) -> Result<Self, GridError>
    where
        F: FnMut(u32, u32) -> Tile,
    {
        Self::check_dimensions("from_fn", width, height)?;

        let mut tiles = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                let tile = factory(x, y);
                check_identity("from_fn", x, y, &tile)?;
                tiles.push(tile);
            }
        }

        Ok(Self { width, height, tiles })
    }

    /// Build a grid from tiles already laid out row-major with matching
    /// coordinates. Callers have passed the sizes through `check_dimensions`.
    pub(crate) fn from_tiles_unchecked(width: u32, height: u32, tiles: Vec<Tile>) -> Self {
        debug_assert!(width > 0 && height > 0);
        debug_assert_eq!(tiles.len(), width as usize * height as usize);
        Self { width, height, tiles }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of cells (`width * height`)
    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Check if coordinates are within bounds
    #[inline]
    pub fn in_bounds(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    /// Convert 2D coordinates to 1D index
    #[inline]
    fn xy_to_idx(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// `OutOfBounds` naming `op` unless `(x, y)` is inside the grid
    pub fn check_bounds(&self, op: &'static str, x: u32, y: u32) -> Result<(), GridError> {
        if self.in_bounds(x, y) {
            return Ok(());
        }
        Err(GridError::OutOfBounds {
            op,
            x,
            y,
            width: self.width,
            height: self.height,
        })
    }

    /// Get tile at position
    pub fn get(&self, x: u32, y: u32) -> Result<&Tile, GridError> {
        self.check_bounds("get", x, y)?;
        Ok(&self.tiles[self.xy_to_idx(x, y)])
    }

    /// Overwrite a cell, returning the tile that was there
    pub fn set(&mut self, x: u32, y: u32, tile: Tile) -> Result<Tile, GridError> {
        self.check_bounds("set", x, y)?;
        check_identity("set", x, y, &tile)?;

        let idx = self.xy_to_idx(x, y);
        Ok(std::mem::replace(&mut self.tiles[idx], tile))
    }

    /// Change the grid dimensions.
    ///
    /// Cells inside both the old and new bounds are kept, cells outside the
    /// new bounds are dropped, and new cells come from `factory`.
    pub fn resize<F>(&mut self, new_width: u32, new_height: u32, mut factory: F) -> Result<(), GridError>
    where
        F: FnMut(u32, u32) -> Tile,
    {
        Self::check_dimensions("resize", new_width, new_height)?;

        let mut old: Vec<Option<Tile>> = std::mem::take(&mut self.tiles).into_iter().map(Some).collect();
        let old_width = self.width;
        let old_height = self.height;

        let mut tiles = Vec::with_capacity(new_width as usize * new_height as usize);
        for y in 0..new_height {
            for x in 0..new_width {
                let kept = if x < old_width && y < old_height {
                    old[y as usize * old_width as usize + x as usize].take()
                } else {
                    None
                };
                let tile = match kept {
                    Some(tile) => tile,
                    None => {
                        let tile = factory(x, y);
                        if let Err(e) = check_identity("resize", x, y, &tile) {
                            // Put the original cells back so a bad factory leaves the grid intact
                            self.restore_after_failed_resize(old, tiles, new_width);
                            return Err(e);
                        }
                        tile
                    }
                };
                tiles.push(tile);
            }
        }

        self.width = new_width;
        self.height = new_height;
        self.tiles = tiles;
        Ok(())
    }

    fn restore_after_failed_resize(&mut self, mut old: Vec<Option<Tile>>, moved: Vec<Tile>, new_width: u32) {
        for (i, tile) in moved.into_iter().enumerate() {
            let x = i as u32 % new_width;
            let y = i as u32 / new_width;
            if x < self.width && y < self.height {
                old[y as usize * self.width as usize + x as usize] = Some(tile);
            }
        }
        self.tiles = old.into_iter().flatten().collect();
    }

    /// Iterate `(x, y, tile)` in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, &Tile)> + '_ {
        self.tiles.iter().map(|tile| (tile.x, tile.y, tile))
    }

    /// All tiles as a row-major slice
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }
}

fn check_identity(op: &'static str, x: u32, y: u32, tile: &Tile) -> Result<(), GridError> {
    if tile.x != x || tile.y != y {
        return Err(GridError::IdentityMismatch {
            op,
            x,
            y,
            tile_x: tile.x,
            tile_y: tile.y,
        });
    }
    Ok(())
}
