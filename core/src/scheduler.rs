use core::time::Duration;
use serde::{Deserialize, Serialize};
use web_time::Instant;

/// Interval between two game steps, always within `[MIN_MS, MAX_MS]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct TickPeriod(u16);

impl TickPeriod {
    pub const MIN_MS: u16 = 50;
    pub const MAX_MS: u16 = 1000;
    pub const MIN_STEPS_PER_SECOND: u16 = 1;
    pub const MAX_STEPS_PER_SECOND: u16 = 20;
    pub const DEFAULT: Self = Self(150);

    /// Clamps `millis` into the accepted range.
    pub fn from_millis(millis: u32) -> Self {
        let clamped = millis.clamp(Self::MIN_MS.into(), Self::MAX_MS.into());
        if clamped != millis {
            log::debug!("Tick period {}ms clamped to {}ms", millis, clamped);
        }
        Self(clamped as u16)
    }

    /// Clamps `steps` into 1..=20 steps per second.
    pub fn from_steps_per_second(steps: u32) -> Self {
        let steps = steps.clamp(
            Self::MIN_STEPS_PER_SECOND.into(),
            Self::MAX_STEPS_PER_SECOND.into(),
        );
        Self::from_millis(1000 / steps)
    }

    pub const fn as_millis(self) -> u16 {
        self.0
    }

    pub const fn as_duration(self) -> Duration {
        Duration::from_millis(self.0 as u64)
    }

    pub const fn steps_per_second(self) -> u16 {
        1000 / self.0
    }
}

impl Default for TickPeriod {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u32> for TickPeriod {
    fn from(millis: u32) -> Self {
        Self::from_millis(millis)
    }
}

impl From<TickPeriod> for u32 {
    fn from(period: TickPeriod) -> Self {
        period.0.into()
    }
}

/// Fixed-period logical clock for game steps.
///
/// The host feeds wall time in with [`TickScheduler::advance`] and drains due ticks one at a
/// time with [`TickScheduler::poll`]. A new period only applies to intervals that start after
/// the change; the interval already running keeps the length it started with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickScheduler {
    period: TickPeriod,
    current: Duration,
    lag: Duration,
    armed: bool,
    ticks: u64,
}

impl TickScheduler {
    /// Backlog cap in intervals, so a stalled host does not replay a burst of steps.
    pub const MAX_BACKLOG: u32 = 4;

    /// Creates a halted scheduler.
    pub fn new(period: TickPeriod) -> Self {
        Self {
            period,
            current: period.as_duration(),
            lag: Duration::ZERO,
            armed: false,
            ticks: 0,
        }
    }

    pub fn period(&self) -> TickPeriod {
        self.period
    }

    pub fn set_period(&mut self, period: TickPeriod) {
        if period != self.period {
            log::debug!(
                "Tick period {}ms -> {}ms",
                self.period.as_millis(),
                period.as_millis()
            );
        }
        self.period = period;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Number of ticks fired since creation.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Starts a fresh interval at the configured period.
    pub fn arm(&mut self) {
        self.current = self.period.as_duration();
        self.lag = Duration::ZERO;
        self.armed = true;
    }

    /// Stops firing until the next [`TickScheduler::arm`].
    pub fn halt(&mut self) {
        self.armed = false;
        self.lag = Duration::ZERO;
    }

    pub fn advance(&mut self, elapsed: Duration) {
        if !self.armed {
            return;
        }
        let cap = self.current + self.period.as_duration() * Self::MAX_BACKLOG;
        self.lag = (self.lag + elapsed).min(cap);
    }

    /// Consumes one due tick, if any.
    pub fn poll(&mut self) -> bool {
        if !self.armed || self.lag < self.current {
            return false;
        }
        self.lag -= self.current;
        self.current = self.period.as_duration();
        self.ticks += 1;
        true
    }

    /// Time left until the next tick is due, `None` while halted.
    pub fn until_next(&self) -> Option<Duration> {
        self.armed.then(|| self.current.saturating_sub(self.lag))
    }
}

/// Turns wall-clock readings into elapsed durations for [`TickScheduler::advance`].
#[derive(Copy, Clone, Debug, Default)]
pub struct Pacer {
    last: Option<Instant>,
}

impl Pacer {
    pub fn new() -> Self {
        Self { last: None }
    }

    pub fn elapsed(&mut self) -> Duration {
        self.elapsed_at(Instant::now())
    }

    /// Time since the previous reading, zero on the first one.
    pub fn elapsed_at(&mut self, now: Instant) -> Duration {
        let elapsed = self
            .last
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last = Some(now);
        elapsed
    }
}
