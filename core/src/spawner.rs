use alloc::vec::Vec;
use ndarray::Array2;
use rand::prelude::*;
use rand::rngs::SmallRng;

use crate::*;

/// Indexed free list of the cells that can take an apple.
///
/// `cells` is dense and unordered, `slots` maps a coordinate back to its position in `cells`,
/// so occupying, releasing, and uniform picking are all O(1).
#[derive(Clone, Debug, PartialEq)]
pub struct FreeCells {
    cells: Vec<Coord2>,
    slots: Array2<Option<CellCount>>,
}

impl FreeCells {
    /// Every cell of a `size` board starts free.
    pub fn new(size: Coord2) -> Self {
        let mut free = Self {
            cells: Vec::with_capacity(mult(size.0, size.1).into()),
            slots: Array2::from_elem(size.to_nd_index(), None),
        };
        free.reset();
        free
    }

    pub fn reset(&mut self) {
        let (rows, cols) = self.size();
        self.cells.clear();
        for row in 0..rows {
            for col in 0..cols {
                self.slots[(row, col).to_nd_index()] = Some(self.cells.len() as CellCount);
                self.cells.push((row, col));
            }
        }
    }

    pub fn size(&self) -> Coord2 {
        let (rows, cols) = self.slots.dim();
        (rows as Coord, cols as Coord)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        self.slot(coords).is_some()
    }

    /// Removes `coords` from the free set, returns whether it was free.
    pub fn occupy(&mut self, coords: Coord2) -> bool {
        let Some(slot) = self.slot(coords) else {
            return false;
        };
        let slot = usize::from(slot);
        self.cells.swap_remove(slot);
        self.slots[coords.to_nd_index()] = None;
        if let Some(&moved) = self.cells.get(slot) {
            self.slots[moved.to_nd_index()] = Some(slot as CellCount);
        }
        true
    }

    /// Adds `coords` back to the free set, returns whether it was occupied.
    pub fn release(&mut self, coords: Coord2) -> bool {
        let (rows, cols) = self.size();
        if coords.0 >= rows || coords.1 >= cols || self.contains(coords) {
            return false;
        }
        self.slots[coords.to_nd_index()] = Some(self.cells.len() as CellCount);
        self.cells.push(coords);
        true
    }

    fn slot(&self, coords: Coord2) -> Option<CellCount> {
        self.slots.get(coords.to_nd_index()).copied().flatten()
    }

    fn get(&self, index: usize) -> Option<Coord2> {
        self.cells.get(index).copied()
    }
}

/// Chooses apple cells uniformly among the free cells of the board.
#[derive(Clone, Debug)]
pub struct AppleSpawner {
    free: FreeCells,
    rng: SmallRng,
}

impl AppleSpawner {
    pub fn new(size: Coord2, seed: u64) -> Self {
        Self {
            free: FreeCells::new(size),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Marks the whole board free again. The random stream keeps going, so consecutive games
    /// from one seed still differ.
    pub fn reset(&mut self) {
        self.free.reset();
    }

    pub fn free_cells(&self) -> &FreeCells {
        &self.free
    }

    pub fn occupy(&mut self, coords: Coord2) -> bool {
        self.free.occupy(coords)
    }

    pub fn release(&mut self, coords: Coord2) -> bool {
        self.free.release(coords)
    }

    /// Picks the next apple cell and takes it out of the free set.
    ///
    /// Candidates are re-checked against `board` and `snake`; a stale entry is dropped and the
    /// pick repeated, so the search always ends, with [`GameError::BoardFull`] once nothing is
    /// left.
    pub fn spawn(&mut self, board: &Board, snake: &Snake) -> Result<Coord2> {
        loop {
            if self.free.is_empty() {
                return Err(GameError::BoardFull);
            }
            let index = self.rng.random_range(0..self.free.len());
            let Some(coords) = self.free.get(index) else {
                return Err(GameError::BoardFull);
            };
            self.free.occupy(coords);

            let cell = board.get(coords)?;
            if !cell.is_empty() || snake.contains(coords) {
                log::warn!(
                    "Dropping stale free cell {:?} ({:?}, on snake: {})",
                    coords,
                    cell,
                    snake.contains(coords)
                );
                continue;
            }

            log::trace!("Apple spawned at {:?}", coords);
            return Ok(coords);
        }
    }
}
