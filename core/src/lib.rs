#![no_std]

extern crate alloc;

use serde::{Deserialize, Serialize};

pub use board::*;
pub use cell::*;
pub use engine::*;
pub use error::*;
pub use events::*;
pub use input::*;
pub use render::*;
pub use scheduler::*;
pub use score::*;
pub use session::*;
pub use snake::*;
pub use spawner::*;
pub use storage::*;
pub use types::*;

mod board;
mod cell;
mod engine;
mod error;
mod events;
mod input;
mod render;
mod scheduler;
mod score;
mod session;
mod snake;
mod spawner;
mod storage;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// `(rows, cols)`
    pub size: Coord2,
    pub initial_length: Coord,
    pub seed: u64,
}

impl GameConfig {
    pub const DEFAULT_SIZE: Coord2 = (10, 10);

    pub const fn new_unchecked(size: Coord2, initial_length: Coord, seed: u64) -> Self {
        Self {
            size,
            initial_length,
            seed,
        }
    }

    pub fn new((rows, cols): Coord2, initial_length: Coord, seed: u64) -> Self {
        let rows = rows.clamp(1, Coord::MAX);
        let cols = cols.clamp(1, Coord::MAX);
        let initial_length = initial_length.clamp(1, cols);
        Self::new_unchecked((rows, cols), initial_length, seed)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new_unchecked(Self::DEFAULT_SIZE, 1, 0)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub game: GameConfig,
    pub tick_period: TickPeriod,
}
