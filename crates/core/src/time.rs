//! Game-clock timestamps.
//!
//! The host supplies monotonic game time on every tick. [`GameTime`] stores it
//! as signed milliseconds so sessions can start before zero (pre-game phases
//! report negative clock values).
use std::fmt;
use std::ops::{Add, Sub};
use std::time::Duration;

/// Point on the host's game clock, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameTime(pub i64);

impl GameTime {
    pub const ZERO: Self = Self(0);

    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Converts host clock seconds, rounding to the nearest millisecond.
    pub fn from_secs_f64(secs: f64) -> Self {
        Self((secs * 1000.0).round() as i64)
    }

    pub const fn as_millis(self) -> i64 {
        self.0
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Time elapsed from `earlier` to `self`, or zero if `earlier` is later.
    pub fn duration_since(self, earlier: GameTime) -> Duration {
        let delta = self.0.saturating_sub(earlier.0);
        Duration::from_millis(delta.max(0) as u64)
    }

    pub fn saturating_add(self, duration: Duration) -> Self {
        Self(self.0.saturating_add(millis_of(duration)))
    }

    pub fn saturating_sub(self, duration: Duration) -> Self {
        Self(self.0.saturating_sub(millis_of(duration)))
    }
}

fn millis_of(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

impl Add<Duration> for GameTime {
    type Output = GameTime;

    fn add(self, rhs: Duration) -> GameTime {
        self.saturating_add(rhs)
    }
}

impl Sub<Duration> for GameTime {
    type Output = GameTime;

    fn sub(self, rhs: Duration) -> GameTime {
        self.saturating_sub(rhs)
    }
}

impl fmt::Display for GameTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_since_saturates_at_zero() {
        let early = GameTime::from_millis(-200);
        let late = GameTime::from_millis(300);

        assert_eq!(late.duration_since(early), Duration::from_millis(500));
        assert_eq!(early.duration_since(late), Duration::ZERO);
    }

    #[test]
    fn seconds_round_to_nearest_millisecond() {
        assert_eq!(GameTime::from_secs_f64(1.2346), GameTime(1235));
        assert_eq!(GameTime::from_secs_f64(-0.2), GameTime(-200));
        assert_eq!(GameTime(1500).to_string(), "1.500s");
    }
}
