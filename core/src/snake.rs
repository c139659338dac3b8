use alloc::collections::VecDeque;
use serde::{Deserialize, Serialize};

use crate::*;

/// Ordered snake body, head first, plus the heading it moves in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snake {
    body: VecDeque<Coord2>,
    heading: Direction,
}

impl Snake {
    /// Builds a snake from `body` (head first).
    ///
    /// The body must be non-empty, free of duplicates, and every segment must be orthogonally
    /// adjacent to the next one.
    pub fn new(body: impl IntoIterator<Item = Coord2>, heading: Direction) -> Result<Self> {
        let body: VecDeque<Coord2> = body.into_iter().collect();
        if body.is_empty() {
            return Err(GameError::InvalidLayout("snake needs at least one segment"));
        }
        for (i, segment) in body.iter().enumerate() {
            if body.iter().skip(i + 1).any(|other| other == segment) {
                return Err(GameError::InvalidLayout("snake overlaps itself"));
            }
        }
        let contiguous = body
            .iter()
            .zip(body.iter().skip(1))
            .all(|(a, b)| a.0.abs_diff(b.0) + a.1.abs_diff(b.1) == 1);
        if !contiguous {
            return Err(GameError::InvalidLayout("snake segments are not adjacent"));
        }
        Ok(Self { body, heading })
    }

    pub fn head(&self) -> Coord2 {
        // never empty, checked in `new`
        self.body[0]
    }

    pub fn tail(&self) -> Coord2 {
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> CellCount {
        self.body.len() as CellCount
    }

    pub fn heading(&self) -> Direction {
        self.heading
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        self.body.contains(&coords)
    }

    /// Segments from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.body.iter().copied()
    }

    /// Straight run of `length` cells ending at `head`, extending left and heading right.
    pub(crate) fn horizontal(head: Coord2, length: Coord) -> Self {
        let length = length.max(1).min(head.1.saturating_add(1));
        Self {
            body: (0..length).map(|i| (head.0, head.1 - i)).collect(),
            heading: Direction::Right,
        }
    }

    pub(crate) fn set_heading(&mut self, heading: Direction) {
        self.heading = heading;
    }

    pub(crate) fn push_head(&mut self, coords: Coord2) {
        self.body.push_front(coords);
    }

    pub(crate) fn pop_tail(&mut self) -> Option<Coord2> {
        if self.body.len() > 1 {
            self.body.pop_back()
        } else {
            None
        }
    }
}
