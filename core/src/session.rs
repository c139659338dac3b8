use alloc::vec::Vec;
use core::mem;
use core::time::Duration;

use crate::*;

/// One game session: the engine, its tick clock, the render adapter, and the host's records.
///
/// Everything goes through `&mut Session`, so a step, a period change, and a restart can never
/// interleave. Events pile up until the host calls [`Session::take_events`].
pub struct Session<S, R: CellRenderer> {
    config: SessionConfig,
    engine: SnakeEngine,
    scheduler: TickScheduler,
    render: RenderSync<R::Handle>,
    renderer: R,
    records: Records<S>,
    events: Vec<GameEvent>,
}

impl<S: Storage, R: CellRenderer> Session<S, R> {
    /// Builds an idle session. `renderer` creates its cell handles right away, against the
    /// empty board.
    pub fn new(config: SessionConfig, store: S, mut renderer: R) -> Self {
        let engine = SnakeEngine::new(config.game);
        let render = RenderSync::new(engine.board(), &mut renderer);
        Self {
            config: SessionConfig {
                game: engine.config(),
                ..config
            },
            engine,
            scheduler: TickScheduler::new(config.tick_period),
            render,
            renderer,
            records: Records::new(store),
            events: Vec::new(),
        }
    }

    /// Wraps an engine that is already set up, e.g. from [`SnakeEngine::from_layout`]. The
    /// renderer's handles start out showing the engine's current board, and the tick clock is
    /// armed if the engine is running.
    pub fn from_engine(engine: SnakeEngine, tick_period: TickPeriod, store: S, mut renderer: R) -> Self {
        let config = SessionConfig {
            game: engine.config(),
            tick_period,
        };
        let render = RenderSync::new(engine.board(), &mut renderer);
        let mut scheduler = TickScheduler::new(tick_period);
        if engine.state().is_running() {
            scheduler.arm();
        }
        Self {
            config,
            engine,
            scheduler,
            render,
            renderer,
            records: Records::new(store),
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn engine(&self) -> &SnakeEngine {
        &self.engine
    }

    pub fn state(&self) -> EngineState {
        self.engine.state()
    }

    pub fn score(&self) -> u32 {
        self.engine.score()
    }

    pub fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }

    pub fn render_sync(&self) -> &RenderSync<R::Handle> {
        &self.render
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn records(&self) -> &Records<S> {
        &self.records
    }

    pub fn best_score(&self) -> u32 {
        self.records.best_score()
    }

    /// Whether the host should show the first-run instructions.
    pub fn should_show_instructions(&self) -> bool {
        !self.records.instructions_seen()
    }

    pub fn acknowledge_instructions(&mut self) {
        if let Err(err) = self.records.mark_instructions_seen() {
            log::warn!("Could not store instructions flag: {}", err);
        }
    }

    /// Drains queued events, oldest first.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        mem::take(&mut self.events)
    }

    pub fn apply(&mut self, command: Command) {
        use Command::*;
        match command {
            SetDirection(direction) => {
                self.set_direction(direction);
            }
            SetTickPeriodMs(millis) => self.set_tick_period(TickPeriod::from_millis(millis)),
            SetStepsPerSecond(steps) => {
                self.set_tick_period(TickPeriod::from_steps_per_second(steps))
            }
            Restart => self.restart(),
        }
    }

    pub fn set_direction(&mut self, direction: Direction) -> bool {
        self.engine.set_direction(direction)
    }

    /// Like [`Session::set_direction`] with a direction or key name; unknown names are ignored.
    pub fn set_direction_named(&mut self, name: &str) -> bool {
        match Direction::from_key(name) {
            Some(direction) => self.set_direction(direction),
            None => {
                log::trace!("Ignoring unknown direction {:?}", name);
                false
            }
        }
    }

    /// Applies from the next scheduled tick on; also kept for later restarts.
    pub fn set_tick_period(&mut self, period: TickPeriod) {
        self.config.tick_period = period;
        self.scheduler.set_period(period);
    }

    /// Starts a fresh round from any state and re-arms the tick clock.
    pub fn restart(&mut self) {
        self.scheduler.halt();
        if let Err(err) = self.engine.restart() {
            log::error!("Could not start a round: {}", err);
            self.abort_round();
            return;
        }

        log::debug!("Session restarted");
        self.events.push(GameEvent::Restarted);
        self.sync_board();

        match self.engine.state() {
            EngineState::Running => self.scheduler.arm(),
            EngineState::Won => self.finish(StepOutcome::Won {
                score: self.engine.score(),
            }),
            _ => {}
        }
    }

    /// Feeds wall time to the tick clock and runs every step that became due. Returns how many
    /// steps ran.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.add_time(elapsed);
        let mut steps = 0;
        while self.step_due().is_some() {
            steps += 1;
        }
        steps
    }

    /// Feeds wall time to the tick clock without stepping. Pair with [`Session::step_due`] to
    /// act between the steps of one long frame.
    pub fn add_time(&mut self, elapsed: Duration) {
        self.scheduler.advance(elapsed);
    }

    /// Runs the next step the tick clock owes, `None` once nothing is due.
    pub fn step_due(&mut self) -> Option<StepOutcome> {
        while self.scheduler.poll() {
            if let Some(outcome) = self.step() {
                return Some(outcome);
            }
        }
        None
    }

    /// Runs one step right away, outside of the tick clock. `None` when not running.
    pub fn step(&mut self) -> Option<StepOutcome> {
        let outcome = match self.engine.step() {
            Ok(outcome) => outcome,
            Err(GameError::NotRunning) => {
                self.scheduler.halt();
                return None;
            }
            Err(err) => {
                log::error!("Step failed, ending the game: {}", err);
                return Some(self.abort_round());
            }
        };

        self.sync_board();

        if let StepOutcome::Grew { score } | StepOutcome::Won { score } = outcome {
            self.events.push(GameEvent::ScoreChanged(score));
            self.events.push(GameEvent::AppleEaten);
        }
        if outcome.is_terminal() {
            self.finish(outcome);
        }
        Some(outcome)
    }

    fn sync_board(&mut self) {
        match self.render.sync(self.engine.board(), &mut self.renderer) {
            Ok(updates) if updates.is_empty() => {}
            Ok(updates) => self.events.push(GameEvent::BoardChanged(updates)),
            Err(err) => log::error!("Could not sync board to renderer: {}", err),
        }
    }

    /// Ends the round as game over after an internal error, keeping the renderer in sync.
    fn abort_round(&mut self) -> StepOutcome {
        self.engine.abort();
        self.sync_board();
        let outcome = StepOutcome::Aborted {
            score: self.engine.score(),
        };
        self.finish(outcome);
        outcome
    }

    fn finish(&mut self, outcome: StepOutcome) {
        self.scheduler.halt();

        let score = self.engine.score();
        self.events.push(match outcome {
            StepOutcome::Won { .. } => GameEvent::Win { score },
            _ => GameEvent::GameOver { score },
        });

        match self.records.record_final_score(score) {
            Ok(true) => log::debug!("Best score is now {}", score),
            Ok(false) => {}
            Err(err) => log::warn!("Could not store best score: {}", err),
        }
    }
}
