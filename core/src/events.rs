use serde::{Deserialize, Serialize};

use crate::*;

/// Notifications for rendering and UI collaborators, in emission order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Cells whose state changed since the previous sync, row-major.
    BoardChanged(CellUpdates),
    ScoreChanged(u32),
    AppleEaten,
    GameOver { score: u32 },
    Win { score: u32 },
    Restarted,
}

impl GameEvent {
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::GameOver { .. } | Self::Win { .. })
    }
}

/// Inputs a host can feed into a [`Session`](crate::Session).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    SetDirection(Direction),
    SetTickPeriodMs(u32),
    SetStepsPerSecond(u32),
    Restart,
}
