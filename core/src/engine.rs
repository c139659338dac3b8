use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    /// No round has been started yet.
    #[default]
    Idle,
    Running,
    /// The snake hit a wall or itself.
    GameOver,
    /// The snake filled the board, no cell is left for an apple.
    Won,
}

impl EngineState {
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::GameOver | Self::Won)
    }
}

/// Result of a single [`SnakeEngine::step`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    Moved,
    Grew { score: u32 },
    HitWall { score: u32 },
    HitSelf { score: u32 },
    Won { score: u32 },
    /// Ended by the session after an internal error, never returned by the engine itself.
    Aborted { score: u32 },
}

impl StepOutcome {
    /// Whether the board changed during the step.
    pub const fn has_update(self) -> bool {
        use StepOutcome::*;
        match self {
            Moved => true,
            Grew { .. } => true,
            HitWall { .. } => false,
            HitSelf { .. } => false,
            Won { .. } => true,
            Aborted { .. } => false,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::HitWall { .. } | Self::HitSelf { .. } | Self::Won { .. } | Self::Aborted { .. }
        )
    }

    pub const fn ate_apple(self) -> bool {
        matches!(self, Self::Grew { .. } | Self::Won { .. })
    }
}

/// Movement, collision, and growth rules of one game.
///
/// The engine exclusively owns the board, the snake, the apple, the score, and the input
/// buffer. Outside of [`SnakeEngine::step`] and the round (re)initialization nothing mutates
/// them, and a step either completes all its board writes or reports an error.
#[derive(Clone, Debug)]
pub struct SnakeEngine {
    config: GameConfig,
    state: EngineState,
    board: Board,
    snake: Snake,
    apple: Option<Coord2>,
    score: ScoreTracker,
    input: InputQueue,
    spawner: AppleSpawner,
}

impl SnakeEngine {
    /// Creates an idle engine; call [`SnakeEngine::restart`] to place the snake and the first
    /// apple.
    ///
    /// `config` is clamped the way [`GameConfig::new`] does, so configs built with
    /// `new_unchecked` or deserialized from a host still give a playable board.
    pub fn new(config: GameConfig) -> Self {
        let config = GameConfig::new(config.size, config.initial_length, config.seed);
        Self {
            config,
            state: EngineState::Idle,
            board: Board::new(config.size),
            snake: initial_snake(config),
            apple: None,
            score: ScoreTracker::new(),
            input: InputQueue::new(),
            spawner: AppleSpawner::new(config.size, config.seed),
        }
    }

    /// Creates a running engine from an explicit layout.
    pub fn from_layout(config: GameConfig, snake: Snake, apple: Option<Coord2>) -> Result<Self> {
        let mut engine = Self::new(config);

        for coords in snake.iter() {
            engine.board.set(coords, Cell::SnakeBody)?;
            engine.spawner.occupy(coords);
        }
        if let Some(apple) = apple {
            if snake.contains(apple) {
                return Err(GameError::InvalidLayout("apple is on the snake"));
            }
            engine.board.set(apple, Cell::Apple)?;
            engine.spawner.occupy(apple);
        }

        engine.snake = snake;
        engine.apple = apple;
        engine.state = EngineState::Running;
        Ok(engine)
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn apple(&self) -> Option<Coord2> {
        self.apple
    }

    pub fn score(&self) -> u32 {
        self.score.score()
    }

    pub fn heading(&self) -> Direction {
        self.snake.heading()
    }

    pub fn pending_direction(&self) -> Option<Direction> {
        self.input.pending()
    }

    pub fn cell_at(&self, coords: Coord2) -> Result<Cell> {
        self.board.get(coords)
    }

    /// Buffers a heading change for the next step. Reversals are rejected.
    pub fn set_direction(&mut self, direction: Direction) -> bool {
        let accepted = self.input.set_direction(direction, self.snake.heading());
        if !accepted {
            log::trace!(
                "Rejected reversal to {:?} (heading {:?}, pending {:?})",
                direction,
                self.snake.heading(),
                self.input.pending()
            );
        }
        accepted
    }

    /// Throws the current round away and starts a fresh one, whatever the current state.
    pub fn restart(&mut self) -> Result<()> {
        self.board = Board::new(self.config.size);
        self.snake = initial_snake(self.config);
        self.apple = None;
        self.score.reset();
        self.input.clear();
        self.spawner.reset();

        for coords in self.snake.iter() {
            self.board.set(coords, Cell::SnakeBody)?;
            self.spawner.occupy(coords);
        }

        self.state = EngineState::Running;
        match self.spawner.spawn(&self.board, &self.snake) {
            Ok(apple) => {
                self.board.set(apple, Cell::Apple)?;
                self.apple = Some(apple);
            }
            Err(GameError::BoardFull) => {
                log::info!("Snake fills the board from the start");
                self.state = EngineState::Won;
            }
            Err(err) => return Err(err),
        }

        log::debug!(
            "Round started: size {:?}, snake {:?}, apple {:?}",
            self.config.size,
            self.snake.head(),
            self.apple
        );
        Ok(())
    }

    /// Advances the snake by one cell.
    pub fn step(&mut self) -> Result<StepOutcome> {
        self.check_running()?;

        if let Some(direction) = self.input.consume() {
            self.snake.set_heading(direction);
        }

        let Some(new_head) = self.board.neighbor(self.snake.head(), self.snake.heading()) else {
            return Ok(self.end_game(StepOutcome::HitWall {
                score: self.score(),
            }));
        };

        let growing = self.apple == Some(new_head);
        let vacating_tail = new_head == self.snake.tail() && !growing;
        if self.board.get(new_head)?.is_snake() && !vacating_tail {
            return Ok(self.end_game(StepOutcome::HitSelf {
                score: self.score(),
            }));
        }

        if growing {
            self.grow(new_head)
        } else {
            self.slide(new_head)
        }
    }

    fn slide(&mut self, new_head: Coord2) -> Result<StepOutcome> {
        let tail = self.snake.tail();
        self.snake.push_head(new_head);
        self.snake.pop_tail();

        // tail first: the head may be moving into the cell the tail leaves
        self.board.set(tail, Cell::Empty)?;
        self.spawner.release(tail);
        self.board.set(new_head, Cell::SnakeBody)?;
        self.spawner.occupy(new_head);

        Ok(StepOutcome::Moved)
    }

    fn grow(&mut self, new_head: Coord2) -> Result<StepOutcome> {
        self.snake.push_head(new_head);
        self.board.set(new_head, Cell::SnakeBody)?;
        self.spawner.occupy(new_head);
        self.apple = None;

        let score = self.score.increment();

        match self.spawner.spawn(&self.board, &self.snake) {
            Ok(apple) => {
                self.board.set(apple, Cell::Apple)?;
                self.apple = Some(apple);
                Ok(StepOutcome::Grew { score })
            }
            Err(GameError::BoardFull) => Ok(self.end_game(StepOutcome::Won { score })),
            Err(err) => Err(err),
        }
    }

    fn end_game(&mut self, outcome: StepOutcome) -> StepOutcome {
        use StepOutcome::*;

        self.state = match outcome {
            Won { .. } => EngineState::Won,
            _ => EngineState::GameOver,
        };
        log::info!(
            "Game ended: {:?}, snake length {}",
            outcome,
            self.snake.len()
        );
        outcome
    }

    /// Forces the game over after an invariant violation.
    pub(crate) fn abort(&mut self) {
        self.state = EngineState::GameOver;
    }

    fn check_running(&self) -> Result<()> {
        if self.state.is_running() {
            Ok(())
        } else {
            Err(GameError::NotRunning)
        }
    }
}

/// Horizontal snake of `initial_length` cells with its head at the board center, heading right.
fn initial_snake(config: GameConfig) -> Snake {
    let (rows, cols) = config.size;
    let length = config.initial_length.min(cols).max(1);
    let head = (rows / 2, (cols / 2).max(length - 1));
    Snake::horizontal(head, length)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(size: Coord2) -> GameConfig {
        GameConfig::new(size, 1, 1)
    }

    fn engine(size: Coord2, body: &[Coord2], heading: Direction, apple: Option<Coord2>) -> SnakeEngine {
        let snake = Snake::new(body.iter().copied(), heading).unwrap();
        SnakeEngine::from_layout(config(size), snake, apple).unwrap()
    }

    fn body(engine: &SnakeEngine) -> alloc::vec::Vec<Coord2> {
        engine.snake().iter().collect()
    }

    #[test]
    fn eating_grows_scores_and_respawns() {
        let mut engine = engine((10, 10), &[(0, 0)], Direction::Right, Some((0, 1)));

        let outcome = engine.step().unwrap();

        assert_eq!(outcome, StepOutcome::Grew { score: 1 });
        assert_eq!(engine.score(), 1);
        assert_eq!(body(&engine), [(0, 1), (0, 0)]);
        assert_eq!(engine.cell_at((0, 1)).unwrap(), Cell::SnakeBody);
        assert_eq!(engine.cell_at((0, 0)).unwrap(), Cell::SnakeBody);
        let apple = engine.apple().unwrap();
        assert_ne!(apple, (0, 1));
        assert!(!engine.snake().contains(apple));
        assert_eq!(engine.cell_at(apple).unwrap(), Cell::Apple);
        assert_eq!(engine.board().count(Cell::Apple), 1);
    }

    #[test]
    fn normal_move_clears_tail() {
        let mut engine = engine((5, 5), &[(2, 2), (2, 1)], Direction::Right, Some((0, 0)));

        assert_eq!(engine.step().unwrap(), StepOutcome::Moved);

        assert_eq!(body(&engine), [(2, 3), (2, 2)]);
        assert_eq!(engine.cell_at((2, 1)).unwrap(), Cell::Empty);
        assert_eq!(engine.board().count(Cell::SnakeBody), 2);
    }

    #[test]
    fn wall_collision_leaves_board_untouched() {
        let mut engine = engine((3, 3), &[(0, 2), (0, 1)], Direction::Right, Some((2, 2)));
        let before = engine.board().clone();

        assert_eq!(engine.step().unwrap(), StepOutcome::HitWall { score: 0 });
        assert_eq!(engine.state(), EngineState::GameOver);
        assert_eq!(engine.board(), &before);
        assert_eq!(engine.step(), Err(GameError::NotRunning));
        assert_eq!(engine.board(), &before);
    }

    #[test]
    fn self_collision_ends_game() {
        // head at (1,1) heading up into (0,1), which is mid-body
        let mut engine = engine(
            (4, 4),
            &[(1, 1), (1, 2), (0, 2), (0, 1), (0, 0)],
            Direction::Up,
            Some((3, 3)),
        );

        assert_eq!(engine.step().unwrap(), StepOutcome::HitSelf { score: 0 });
        assert_eq!(engine.state(), EngineState::GameOver);
    }

    #[test]
    fn moving_into_vacating_tail_is_legal() {
        // a 2x2 loop: head (1,0) moving up into the tail at (0,0)
        let mut engine = engine(
            (2, 2),
            &[(1, 0), (1, 1), (0, 1), (0, 0)],
            Direction::Up,
            None,
        );

        assert_eq!(engine.step().unwrap(), StepOutcome::Moved);
        assert_eq!(body(&engine), [(0, 0), (1, 0), (1, 1), (0, 1)]);
        assert_eq!(engine.board().count(Cell::SnakeBody), 4);
        assert_eq!(engine.state(), EngineState::Running);
    }

    #[test]
    fn filling_the_board_wins() {
        let mut engine = engine((1, 3), &[(0, 1), (0, 0)], Direction::Right, Some((0, 2)));

        assert_eq!(engine.step().unwrap(), StepOutcome::Won { score: 1 });
        assert_eq!(engine.state(), EngineState::Won);
        assert_eq!(engine.apple(), None);
        assert_eq!(engine.board().count(Cell::SnakeBody), 3);
    }

    #[test]
    fn pending_direction_applies_on_next_step() {
        let mut engine = engine((5, 5), &[(2, 2)], Direction::Right, Some((0, 0)));

        assert!(engine.set_direction(Direction::Down));
        assert!(!engine.set_direction(Direction::Up));
        assert_eq!(engine.heading(), Direction::Right);

        engine.step().unwrap();
        assert_eq!(engine.heading(), Direction::Down);
        assert_eq!(engine.snake().head(), (3, 2));
        assert_eq!(engine.pending_direction(), None);
    }

    #[test]
    fn idle_engine_does_not_step() {
        let mut engine = SnakeEngine::new(GameConfig::default());

        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(engine.step(), Err(GameError::NotRunning));
        assert_eq!(engine.board().count(Cell::Empty), 100);
    }

    #[test]
    fn restart_builds_a_fresh_round() {
        let mut engine = SnakeEngine::new(GameConfig::new((10, 10), 3, 9));
        engine.restart().unwrap();

        assert_eq!(engine.state(), EngineState::Running);
        assert_eq!(body(&engine), [(5, 5), (5, 4), (5, 3)]);
        assert_eq!(engine.board().count(Cell::SnakeBody), 3);
        assert_eq!(engine.board().count(Cell::Apple), 1);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.spawner.free_cells().len(), 96);
    }

    #[test]
    fn degenerate_configs_are_clamped() {
        let parsed: GameConfig =
            serde_json::from_str(r#"{"size":[5,0],"initial_length":3,"seed":0}"#).unwrap();

        for config in [parsed, GameConfig::new_unchecked((5, 0), 1, 0)] {
            let mut engine = SnakeEngine::new(config);
            assert_eq!(engine.config().size, (5, 1));
            assert_eq!(engine.config().initial_length, 1);

            engine.restart().unwrap();
            assert_eq!(body(&engine), [(2, 0)]);
            assert_eq!(engine.board().count(Cell::Apple), 1);
            assert_eq!(engine.state(), EngineState::Running);
        }
    }

    #[test]
    fn layout_rejects_apple_on_snake() {
        let snake = Snake::new([(0, 0)], Direction::Right).unwrap();
        let result = SnakeEngine::from_layout(config((3, 3)), snake, Some((0, 0)));

        assert!(matches!(result, Err(GameError::InvalidLayout(_))));
    }

    #[test]
    fn layout_rejects_out_of_bounds_snake() {
        let snake = Snake::new([(0, 3)], Direction::Right).unwrap();
        let result = SnakeEngine::from_layout(config((3, 3)), snake, None);

        assert_eq!(result.err(), Some(GameError::OutOfBounds((0, 3))));
    }
}
