use serde::{Deserialize, Serialize};

use crate::*;

/// Holds at most one direction change waiting for the next tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputQueue {
    pending: Option<Direction>,
}

impl InputQueue {
    pub const fn new() -> Self {
        Self { pending: None }
    }

    pub const fn pending(&self) -> Option<Direction> {
        self.pending
    }

    /// Buffer `direction`, replacing whatever was buffered before.
    ///
    /// Reversals are dropped: a direction opposite to `heading`, or opposite to the already
    /// buffered one, leaves the queue untouched. Returns whether the direction was accepted.
    pub fn set_direction(&mut self, direction: Direction, heading: Direction) -> bool {
        if direction.is_opposite(heading) {
            return false;
        }
        if let Some(pending) = self.pending {
            if direction.is_opposite(pending) {
                return false;
            }
        }
        self.pending = Some(direction);
        true
    }

    pub fn consume(&mut self) -> Option<Direction> {
        self.pending.take()
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}
