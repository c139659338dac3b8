use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// New state of one cell, keyed by its coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellUpdate {
    pub coords: Coord2,
    pub cell: Cell,
}

/// Per-tick diff. A move touches two cells and a growth three, so it rarely spills.
pub type CellUpdates = SmallVec<[CellUpdate; 4]>;

/// External scene that owns one visual object per board cell.
pub trait CellRenderer {
    /// Opaque per-cell object, e.g. a mesh or a DOM node.
    type Handle;

    /// Called exactly once per cell when a [`RenderSync`] is built.
    fn create_cell(&mut self, coords: Coord2, cell: Cell) -> Self::Handle;

    fn update_cell(&mut self, handle: &mut Self::Handle, update: CellUpdate);
}

/// Keeps an external renderer in step with a [`Board`] by sending only changed cells.
///
/// Holds the handles the renderer created and the board as last rendered; it never creates or
/// drops handles after construction.
#[derive(Clone, Debug)]
pub struct RenderSync<H> {
    handles: Array2<H>,
    snapshot: Array2<Cell>,
}

impl<H> RenderSync<H> {
    /// Asks `renderer` for one handle per cell of `board`, row-major, and records `board` as
    /// rendered.
    pub fn new<R>(board: &Board, renderer: &mut R) -> Self
    where
        R: CellRenderer<Handle = H>,
    {
        let snapshot = board.cells().clone();
        let handles = Array2::from_shape_fn(snapshot.dim(), |(row, col)| {
            let coords = (row as Coord, col as Coord);
            renderer.create_cell(coords, snapshot[coords.to_nd_index()])
        });
        Self { handles, snapshot }
    }

    pub fn size(&self) -> Coord2 {
        let (rows, cols) = self.snapshot.dim();
        (rows as Coord, cols as Coord)
    }

    pub fn handle(&self, coords: Coord2) -> Option<&H> {
        self.handles.get(coords.to_nd_index())
    }

    /// State of `coords` as the renderer last saw it.
    pub fn rendered_cell(&self, coords: Coord2) -> Option<Cell> {
        self.snapshot.get(coords.to_nd_index()).copied()
    }

    /// Cells of `board` that differ from the last rendered state, row-major.
    pub fn diff(&self, board: &Board) -> Result<CellUpdates> {
        if board.cells().dim() != self.snapshot.dim() {
            return Err(GameError::ShapeMismatch);
        }

        let mut updates = CellUpdates::new();
        Zip::indexed(&self.snapshot)
            .and(board.cells())
            .for_each(|(row, col), &old, &new| {
                if old != new {
                    updates.push(CellUpdate {
                        coords: (row as Coord, col as Coord),
                        cell: new,
                    });
                }
            });
        Ok(updates)
    }

    /// Sends every changed cell to `renderer` once and remembers `board` as rendered.
    pub fn sync<R>(&mut self, board: &Board, renderer: &mut R) -> Result<CellUpdates>
    where
        R: CellRenderer<Handle = H>,
    {
        let updates = self.diff(board)?;
        for &update in &updates {
            let index = update.coords.to_nd_index();
            renderer.update_cell(&mut self.handles[index], update);
            self.snapshot[index] = update.cell;
        }
        if !updates.is_empty() {
            log::trace!("Synced {} changed cells", updates.len());
        }
        Ok(updates)
    }
}
