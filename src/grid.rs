use crate::input::Direction;

/// Grid position in logical cell coordinates.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns true when the position lies inside the bounds.
    #[must_use]
    pub fn is_within_bounds(self, grid: GridSize) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.x < i32::from(grid.width)
            && self.y < i32::from(grid.height)
    }

    /// Returns the neighbouring cell in `direction`, re-entering from the
    /// opposite edge when the step crosses a border.
    #[must_use]
    pub fn stepped(self, direction: Direction, grid: GridSize) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: wrap_step(self.x, dx, i32::from(grid.width)),
            y: wrap_step(self.y, dy, i32::from(grid.height)),
        }
    }
}

/// Logical grid dimensions, fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct GridSize {
    pub width: u16,
    pub height: u16,
}

impl GridSize {
    /// Creates a grid, raising zero dimensions to one cell.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Derives the grid from a viewport measured in the same unit as `block`.
    ///
    /// Partial blocks at the right and bottom edges are dropped so that every
    /// cell fits the viewport.
    #[must_use]
    pub fn from_viewport(viewport: (u16, u16), block: (u16, u16)) -> Self {
        let (block_w, block_h) = (block.0.max(1), block.1.max(1));
        Self::new(viewport.0 / block_w, viewport.1 / block_h)
    }

    /// Returns the total number of cells in the grid.
    #[must_use]
    pub fn total_cells(self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }

    /// Returns the cell closest to the middle of the grid.
    #[must_use]
    pub fn center(self) -> Position {
        Position::new(i32::from(self.width / 2), i32::from(self.height / 2))
    }
}

/// Applies a unit step to one coordinate modulo the axis length.
///
/// `0 - 1` wraps to `len - 1` and `len - 1 + 1` wraps to `0`.
#[must_use]
pub fn wrap_step(coord: i32, delta: i32, len: i32) -> i32 {
    debug_assert!(len > 0);
    (coord + delta).rem_euclid(len)
}
