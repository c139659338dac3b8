use serde::{Deserialize, Serialize};

/// State of a single board cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    SnakeBody,
    Apple,
}

impl Cell {
    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }

    pub const fn is_snake(self) -> bool {
        matches!(self, Self::SnakeBody)
    }

    /// One-character form used by text renderers and test fixtures.
    pub const fn glyph(self) -> char {
        match self {
            Self::Empty => '.',
            Self::SnakeBody => '#',
            Self::Apple => '@',
        }
    }
}
