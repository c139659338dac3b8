use std::collections::VecDeque;

use snake3d_core::{Cell, Coord2, Direction, SnakeEngine};

/// Greedy driver: heads for the apple while keeping enough room to move.
#[derive(Clone, Debug, Default)]
pub struct Autopilot {
    seen: Vec<bool>,
    queue: VecDeque<Coord2>,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks the direction for the next step, `None` if every move is fatal.
    pub fn choose(&mut self, engine: &SnakeEngine) -> Option<Direction> {
        let snake = engine.snake();
        let head = snake.head();
        let heading = engine.heading();

        let mut best: Option<(Direction, (bool, u32, bool))> = None;
        for direction in Direction::ALL {
            if direction.is_opposite(heading) {
                continue;
            }
            let Some(next) = self.safe_target(engine, head, direction) else {
                continue;
            };

            let room = self.reachable(engine, next);
            let distance = engine.apple().map_or(0, |apple| manhattan(next, apple));
            // smaller is better
            let rank = (room < snake.len() as u32, distance, direction != heading);
            if best.is_none_or(|(_, best_rank)| rank < best_rank) {
                best = Some((direction, rank));
            }
        }

        let choice = best.map(|(direction, _)| direction);
        log::trace!("Autopilot at {:?} picks {:?}", head, choice);
        choice
    }

    /// Where `direction` leads if the move neither leaves the board nor bites the body.
    fn safe_target(&self, engine: &SnakeEngine, head: Coord2, direction: Direction) -> Option<Coord2> {
        let board = engine.board();
        let next = board.neighbor(head, direction)?;
        let passable = match board.get(next).ok()? {
            Cell::SnakeBody => next == engine.snake().tail() && engine.apple() != Some(next),
            Cell::Empty | Cell::Apple => true,
        };
        passable.then_some(next)
    }

    /// Cells reachable from `start` through cells the snake does not hold.
    fn reachable(&mut self, engine: &SnakeEngine, start: Coord2) -> u32 {
        let board = engine.board();
        let (rows, cols) = board.size();
        let slot = |(row, col): Coord2| row as usize * cols as usize + col as usize;

        self.seen.clear();
        self.seen.resize(rows as usize * cols as usize, false);
        self.queue.clear();

        self.seen[slot(start)] = true;
        self.queue.push_back(start);
        let mut count = 0;
        while let Some(coords) = self.queue.pop_front() {
            count += 1;
            for direction in Direction::ALL {
                let Some(next) = board.neighbor(coords, direction) else {
                    continue;
                };
                if self.seen[slot(next)] || board.get(next).is_ok_and(|cell| cell.is_snake()) {
                    continue;
                }
                self.seen[slot(next)] = true;
                self.queue.push_back(next);
            }
        }
        count
    }
}

fn manhattan(a: Coord2, b: Coord2) -> u32 {
    a.0.abs_diff(b.0) as u32 + a.1.abs_diff(b.1) as u32
}
