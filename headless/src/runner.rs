use std::collections::VecDeque;
use std::io::Write;
use std::thread;
use std::time::Duration;

use serde::Serialize;
use snake3d_core::{GameEvent, Pacer, Session, Storage};

use crate::autopilot::Autopilot;
use crate::text::TextRenderer;

#[derive(Clone, Debug)]
pub struct RunOptions {
    /// Stop once this many steps ran, across all games.
    pub max_steps: u64,
    pub games: u32,
    /// Render cadence; also the simulated time fed per frame when not in realtime.
    pub frame: Duration,
    pub realtime: bool,
    pub autopilot: bool,
    /// Direction names fed one per step, unknown names are ignored.
    pub script: Vec<String>,
    pub json: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_steps: 500,
            games: 1,
            frame: Duration::from_millis(16),
            realtime: false,
            autopilot: false,
            script: Vec::new(),
            json: false,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub games: u32,
    pub steps: u64,
    pub last_score: u32,
    pub best_score: u32,
}

/// Drives a session frame by frame and writes what happens to `out`.
pub struct Runner<S: Storage, W: Write> {
    session: Session<S, TextRenderer>,
    options: RunOptions,
    pilot: Option<Autopilot>,
    script: VecDeque<String>,
    out: W,
    steps: u64,
    games: u32,
}

impl<S: Storage, W: Write> Runner<S, W> {
    pub fn new(session: Session<S, TextRenderer>, options: RunOptions, out: W) -> Self {
        let pilot = options.autopilot.then(Autopilot::new);
        let script = options.script.iter().cloned().collect();
        Self {
            session,
            options,
            pilot,
            script,
            out,
            steps: 0,
            games: 0,
        }
    }

    pub fn session(&self) -> &Session<S, TextRenderer> {
        &self.session
    }

    pub fn run(&mut self) -> anyhow::Result<Summary> {
        self.session.restart();
        self.steer();
        self.flush()?;

        let mut pacer = Pacer::new();
        pacer.elapsed();
        loop {
            let elapsed = if self.options.realtime {
                thread::sleep(self.options.frame);
                pacer.elapsed()
            } else {
                self.options.frame
            };

            // steer between steps so every owed step sees fresh input
            self.session.add_time(elapsed);
            while self.steps < self.options.max_steps && self.session.step_due().is_some() {
                self.steps += 1;
                self.steer();
            }
            self.flush()?;

            if self.session.engine().is_finished() {
                self.games += 1;
                if self.games >= self.options.games || self.steps >= self.options.max_steps {
                    break;
                }
                self.session.restart();
                self.steer();
                self.flush()?;
            } else if self.steps >= self.options.max_steps {
                log::info!("Stopping after {} steps", self.steps);
                break;
            }
        }

        let summary = Summary {
            games: self.games,
            steps: self.steps,
            last_score: self.session.score(),
            best_score: self.session.best_score(),
        };
        log::debug!("Run finished: {:?}", summary);
        Ok(summary)
    }

    /// Queues the input for the next step.
    fn steer(&mut self) {
        if let Some(name) = self.script.pop_front() {
            self.session.set_direction_named(&name);
        } else if let Some(pilot) = &mut self.pilot {
            if let Some(direction) = pilot.choose(self.session.engine()) {
                self.session.set_direction(direction);
            }
        }
    }

    /// Writes queued events and, outside of json mode, the changed frame.
    fn flush(&mut self) -> anyhow::Result<()> {
        for event in self.session.take_events() {
            if self.options.json {
                serde_json::to_writer(&mut self.out, &event)?;
                writeln!(self.out)?;
                continue;
            }
            match event {
                GameEvent::Restarted => writeln!(self.out, "new game")?,
                GameEvent::ScoreChanged(score) => writeln!(self.out, "score: {}", score)?,
                GameEvent::GameOver { score } => writeln!(self.out, "game over, score {}", score)?,
                GameEvent::Win { score } => writeln!(self.out, "board full, you win with {}", score)?,
                GameEvent::BoardChanged(_) | GameEvent::AppleEaten => {}
            }
        }

        if let Some(frame) = self.session.renderer_mut().take_frame() {
            if !self.options.json {
                writeln!(self.out, "{}", frame)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snake3d_core::{GameConfig, MemoryStorage, SessionConfig, TickPeriod};

    fn session(size: (u8, u8), seed: u64) -> Session<MemoryStorage, TextRenderer> {
        let config = SessionConfig {
            game: GameConfig::new(size, 1, seed),
            tick_period: TickPeriod::from_millis(100),
        };
        Session::new(config, MemoryStorage::new(), TextRenderer::new(size))
    }

    #[test]
    fn straight_run_ends_at_the_wall() {
        let options = RunOptions {
            json: true,
            ..Default::default()
        };
        let mut runner = Runner::new(session((5, 5), 1), options, Vec::new());

        let summary = runner.run().unwrap();

        // head starts at (2, 2) heading right
        assert_eq!(summary.games, 1);
        assert_eq!(summary.steps, 3);
        assert!(runner.session().engine().is_finished());

        let out = String::from_utf8(runner.out.clone()).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], r#""Restarted""#);
        assert!(lines.last().unwrap().starts_with(r#"{"GameOver""#));
    }

    #[test]
    fn script_steers_and_skips_unknown_names() {
        let options = RunOptions {
            script: vec!["up".into(), "sideways".into(), "ArrowLeft".into()],
            ..Default::default()
        };
        let mut runner = Runner::new(session((5, 5), 1), options, Vec::new());

        let summary = runner.run().unwrap();

        // up twice since the unknown name keeps the heading, then left into the wall
        assert_eq!(summary.steps, 5);
        let out = String::from_utf8(runner.out.clone()).unwrap();
        assert!(out.starts_with("new game\n"));
        assert!(out.contains("game over"));
    }

    #[test]
    fn long_frames_still_take_one_input_per_step() {
        let options = RunOptions {
            max_steps: 2,
            frame: Duration::from_millis(200),
            script: vec!["up".into(), "right".into()],
            ..Default::default()
        };
        let mut runner = Runner::new(session((5, 5), 1), options, Vec::new());

        let summary = runner.run().unwrap();

        // (2, 2) up to (1, 2), then right to (1, 3), both inside one frame
        assert_eq!(summary.steps, 2);
        assert_eq!(runner.session().engine().snake().head(), (1, 3));
    }

    #[test]
    fn step_limit_stops_a_running_game() {
        let options = RunOptions {
            max_steps: 2,
            ..Default::default()
        };
        let mut runner = Runner::new(session((9, 9), 1), options, Vec::new());

        let summary = runner.run().unwrap();

        assert_eq!(summary.steps, 2);
        assert_eq!(summary.games, 0);
        assert!(runner.session().state().is_running());
    }
}
