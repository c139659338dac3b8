use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Fixed-size grid of [`Cell`]s, indexed `(row, col)`.
///
/// The board never resizes after construction and never wraps: every access outside
/// `[0, rows) x [0, cols)` is reported as [`GameError::OutOfBounds`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    cells: Array2<Cell>,
}

impl Board {
    pub fn new(size: Coord2) -> Self {
        Self {
            cells: Array2::default(size.to_nd_index()),
        }
    }

    pub fn size(&self) -> Coord2 {
        let (rows, cols) = self.cells.dim();
        // construction only accepts `Coord` sized dimensions
        (rows as Coord, cols as Coord)
    }

    pub fn total_cells(&self) -> CellCount {
        let (rows, cols) = self.size();
        mult(rows, cols)
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        let (rows, cols) = self.size();
        coords.0 < rows && coords.1 < cols
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if self.contains(coords) {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds(coords))
        }
    }

    pub fn get(&self, coords: Coord2) -> Result<Cell> {
        let coords = self.validate_coords(coords)?;
        Ok(self.cells[coords.to_nd_index()])
    }

    pub fn set(&mut self, coords: Coord2, cell: Cell) -> Result<()> {
        let coords = self.validate_coords(coords)?;
        self.cells[coords.to_nd_index()] = cell;
        Ok(())
    }

    /// Cell one step away in `direction`, or `None` past an edge.
    pub fn neighbor(&self, coords: Coord2, direction: Direction) -> Option<Coord2> {
        apply_direction(coords, direction, self.size())
    }

    pub fn count(&self, cell: Cell) -> CellCount {
        let count = self.cells.iter().filter(|&&c| c == cell).count();
        // bounded by `total_cells`
        count as CellCount
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::Empty);
    }

    /// Every cell in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord2, Cell)> + '_ {
        self.cells
            .indexed_iter()
            .map(|((row, col), &cell)| ((row as Coord, col as Coord), cell))
    }

    pub(crate) fn cells(&self) -> &Array2<Cell> {
        &self.cells
    }
}
