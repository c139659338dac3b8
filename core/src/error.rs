use alloc::string::String;
use thiserror::Error;

use crate::Coord2;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Coordinates {0:?} are outside the board")]
    OutOfBounds(Coord2),
    #[error("No empty cell left for an apple")]
    BoardFull,
    #[error("Game is not running, no steps are accepted")]
    NotRunning,
    #[error("Board shape does not match the rendered shape")]
    ShapeMismatch,
    #[error("Invalid layout: {0}")]
    InvalidLayout(&'static str),
    #[error("Storage failure: {0}")]
    Storage(String),
}

pub type Result<T> = core::result::Result<T, GameError>;
