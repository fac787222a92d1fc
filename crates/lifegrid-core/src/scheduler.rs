//! Periodic step trigger owned by the control layer.
//!
//! The [`Scheduler`] holds at most one armed timer. Starting while armed is a
//! no-op and stopping is idempotent; the simulation core never sees the timer,
//! it is only advanced when [`Scheduler::tick`] resolves in the session loop.

use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Smallest accepted step interval, in milliseconds.
pub const MIN_INTERVAL_MS: u64 = 10;

/// Interval used when no usable speed is given, in milliseconds.
pub const DEFAULT_INTERVAL_MS: u64 = 200;

/// Stand-in first deadline, about thirty years out, when `now + period`
/// overflows the clock.
const FAR_FUTURE: Duration = Duration::from_secs(946_080_000);

/// A validated step interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Speed(u64);

impl Default for Speed {
    fn default() -> Self {
        Self(DEFAULT_INTERVAL_MS)
    }
}

impl Speed {
    /// Raise `ms` to the 10 ms floor. There is no upper bound.
    pub fn from_millis(ms: u64) -> Self {
        Self(ms.max(MIN_INTERVAL_MS))
    }

    /// Parse a user-supplied interval.
    ///
    /// Empty, non-numeric and zero input fall back to the 200 ms default.
    /// Anything below 10 ms (negative values included) clamps to 10 ms,
    /// fractional values are truncated and large values pass through.
    /// Values past `u64::MAX` saturate.
    pub fn parse(raw: &str) -> Self {
        let Some(value) = raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v != 0.0)
        else {
            return Self::default();
        };

        let truncated = value.trunc().max(0.0);
        // Float-to-int `as` saturates, so values past u64::MAX become u64::MAX.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let ms = truncated as u64;
        Self::from_millis(ms)
    }

    /// Interval in milliseconds.
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Interval as a [`Duration`].
    pub const fn as_duration(self) -> Duration {
        Duration::from_millis(self.0)
    }

    /// Half the interval, floored at the minimum.
    pub fn faster(self) -> Self {
        Self::from_millis(self.0.checked_div(2).unwrap_or(MIN_INTERVAL_MS))
    }

    /// Double the interval, saturating at `u64::MAX`.
    pub fn slower(self) -> Self {
        Self::from_millis(self.0.saturating_mul(2))
    }
}

/// The armed timer and the speed it was armed with.
#[derive(Debug)]
struct ActiveTimer {
    interval: Interval,
    speed: Speed,
}

/// Handle for the single periodic step trigger.
#[derive(Debug, Default)]
pub struct Scheduler {
    timer: Option<ActiveTimer>,
}

impl Scheduler {
    /// Create a stopped scheduler.
    pub const fn new() -> Self {
        Self { timer: None }
    }

    /// Arm the timer. The first tick fires one full period from now.
    ///
    /// Returns `false` without touching the running timer if one is already
    /// armed. Must be called from within a tokio runtime.
    pub fn start(&mut self, speed: Speed) -> bool {
        if self.timer.is_some() {
            return false;
        }
        let period = speed.as_duration();
        let now = Instant::now();
        // Periods too long for the clock wait as long as it can represent.
        let first = now
            .checked_add(period)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now);
        let mut interval = tokio::time::interval_at(first, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.timer = Some(ActiveTimer { interval, speed });
        true
    }

    /// Disarm the timer. Returns whether one was armed.
    pub fn stop(&mut self) -> bool {
        self.timer.take().is_some()
    }

    /// Whether a timer is armed.
    pub const fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Speed of the armed timer.
    pub fn speed(&self) -> Option<Speed> {
        self.timer.as_ref().map(|t| t.speed)
    }

    /// Wait for the next period. Pends forever while stopped, so it can sit
    /// in a `select!` next to the command channel.
    pub async fn tick(&mut self) {
        match self.timer.as_mut() {
            Some(timer) => {
                timer.interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_defaults_on_junk() {
        assert_eq!(Speed::parse("").as_millis(), 200);
        assert_eq!(Speed::parse("fast").as_millis(), 200);
        assert_eq!(Speed::parse("0").as_millis(), 200);
        assert_eq!(Speed::parse("NaN").as_millis(), 200);
    }

    #[test]
    fn parse_clamps_to_floor() {
        assert_eq!(Speed::parse("5").as_millis(), 10);
        assert_eq!(Speed::parse("-40").as_millis(), 10);
        assert_eq!(Speed::parse("10").as_millis(), 10);
    }

    #[test]
    fn parse_accepts_and_truncates() {
        assert_eq!(Speed::parse(" 350 ").as_millis(), 350);
        assert_eq!(Speed::parse("12.9").as_millis(), 12);
        assert_eq!(Speed::parse("1e2").as_millis(), 100);
    }

    #[test]
    fn parse_keeps_large_values() {
        assert_eq!(Speed::parse("120000").as_millis(), 120_000);
        assert_eq!(Speed::parse("999999").as_millis(), 999_999);
        assert_eq!(Speed::parse("1e30").as_millis(), u64::MAX);
        assert_eq!(Speed::from_millis(86_400_000).as_millis(), 86_400_000);
    }

    #[test]
    fn faster_and_slower_respect_floor_and_saturate() {
        assert_eq!(Speed::from_millis(200).faster().as_millis(), 100);
        assert_eq!(Speed::from_millis(15).faster().as_millis(), 10);
        assert_eq!(Speed::from_millis(200).slower().as_millis(), 400);
        assert_eq!(Speed::from_millis(90_000).slower().as_millis(), 180_000);
        assert_eq!(Speed::from_millis(u64::MAX).slower().as_millis(), u64::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn start_while_running_is_a_no_op() {
        let mut scheduler = Scheduler::new();
        assert!(scheduler.start(Speed::from_millis(100)));
        assert!(!scheduler.start(Speed::from_millis(20)));
        assert_eq!(scheduler.speed(), Some(Speed::from_millis(100)));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent() {
        let mut scheduler = Scheduler::new();
        assert!(!scheduler.stop());
        scheduler.start(Speed::default());
        assert!(scheduler.stop());
        assert!(!scheduler.stop());
        assert!(!scheduler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_waits_one_period() {
        let mut scheduler = Scheduler::new();
        scheduler.start(Speed::from_millis(100));
        let before = Instant::now();
        scheduler.tick().await;
        assert!(before.elapsed() >= Duration::from_millis(100));
        scheduler.tick().await;
        assert!(before.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn huge_period_does_not_fire_early() {
        let mut scheduler = Scheduler::new();
        assert!(scheduler.start(Speed::from_millis(u64::MAX)));
        let waited = tokio::time::timeout(Duration::from_secs(5), scheduler.tick()).await;
        assert!(waited.is_err());
        assert!(scheduler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_scheduler_never_ticks() {
        let mut scheduler = Scheduler::new();
        let waited = tokio::time::timeout(Duration::from_secs(5), scheduler.tick()).await;
        assert!(waited.is_err());
    }
}
