use snake3d_core::{Cell, CellRenderer, CellUpdate, Coord2};

/// Draws the board as a grid of glyphs, one line per row.
#[derive(Clone, Debug)]
pub struct TextRenderer {
    cols: usize,
    glyphs: Vec<char>,
    dirty: bool,
}

impl TextRenderer {
    pub fn new((rows, cols): Coord2) -> Self {
        let cols = cols as usize;
        Self {
            cols,
            glyphs: vec![Cell::Empty.glyph(); rows as usize * cols],
            dirty: true,
        }
    }

    fn slot(&self, (row, col): Coord2) -> usize {
        row as usize * self.cols + col as usize
    }

    pub fn frame(&self) -> String {
        let mut out = String::with_capacity(self.glyphs.len() + self.glyphs.len() / self.cols.max(1));
        for row in self.glyphs.chunks(self.cols.max(1)) {
            out.extend(row);
            out.push('\n');
        }
        out
    }

    /// The current frame if anything changed since the last call.
    pub fn take_frame(&mut self) -> Option<String> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(self.frame())
    }
}

impl CellRenderer for TextRenderer {
    type Handle = usize;

    fn create_cell(&mut self, coords: Coord2, cell: Cell) -> usize {
        let slot = self.slot(coords);
        self.glyphs[slot] = cell.glyph();
        self.dirty = true;
        slot
    }

    fn update_cell(&mut self, handle: &mut usize, update: CellUpdate) {
        self.glyphs[*handle] = update.cell.glyph();
        self.dirty = true;
    }
}
