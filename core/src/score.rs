use serde::{Deserialize, Serialize};

/// Running score of the current game. Only ever goes up, until reset.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTracker {
    score: u32,
}

impl ScoreTracker {
    pub const fn new() -> Self {
        Self { score: 0 }
    }

    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Adds one point and returns the new score.
    pub fn increment(&mut self) -> u32 {
        self.score = self.score.saturating_add(1);
        self.score
    }

    pub fn reset(&mut self) {
        self.score = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_and_reset() {
        let mut tracker = ScoreTracker::new();

        assert_eq!(tracker.increment(), 1);
        assert_eq!(tracker.increment(), 2);
        assert_eq!(tracker.score(), 2);

        tracker.reset();
        assert_eq!(tracker.score(), 0);
    }
}
