//! Keyed debounce store ("sleeper").
use std::collections::HashMap;
use std::time::Duration;

use crate::time::GameTime;

/// Suppresses repeated actions per key until an expiry time passes.
///
/// Entries are created lazily by [`RateLimiter::arm`] and only ever
/// overwritten; [`RateLimiter::reset_all`] drops all of them at session
/// boundaries so suppression never leaks into the next session.
#[derive(Clone, Debug, Default)]
pub struct RateLimiter {
    expiries: HashMap<String, GameTime>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets (or overwrites) the expiry of `key` to `now + duration`.
    pub fn arm(&mut self, key: impl Into<String>, duration: Duration, now: GameTime) {
        self.expiries.insert(key.into(), now + duration);
    }

    pub fn is_active(&self, key: &str, now: GameTime) -> bool {
        self.expiries.get(key).is_some_and(|&expiry| now < expiry)
    }

    /// Time left before `key` stops suppressing, if it is active.
    pub fn remaining(&self, key: &str, now: GameTime) -> Option<Duration> {
        self.expiries
            .get(key)
            .filter(|&&expiry| now < expiry)
            .map(|&expiry| expiry.duration_since(now))
    }

    pub fn reset_all(&mut self) {
        self.expiries.clear();
    }

    pub fn len(&self) -> usize {
        self.expiries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expiries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_until_expiry_exclusive() {
        let mut limiter = RateLimiter::new();
        limiter.arm("cast", Duration::from_millis(1000), GameTime(0));

        assert!(limiter.is_active("cast", GameTime(0)));
        assert!(limiter.is_active("cast", GameTime(999)));
        assert!(!limiter.is_active("cast", GameTime(1000)));
        assert!(!limiter.is_active("other", GameTime(0)));
    }

    #[test]
    fn rearming_overwrites_expiry() {
        let mut limiter = RateLimiter::new();
        limiter.arm("cast", Duration::from_millis(1000), GameTime(0));
        limiter.arm("cast", Duration::from_millis(100), GameTime(0));

        assert_eq!(
            limiter.remaining("cast", GameTime(50)),
            Some(Duration::from_millis(50))
        );
        assert!(!limiter.is_active("cast", GameTime(100)));
        assert_eq!(limiter.len(), 1);
    }

    #[test]
    fn reset_clears_every_key() {
        let mut limiter = RateLimiter::new();
        limiter.arm("a", Duration::from_secs(5), GameTime(0));
        limiter.arm("b", Duration::from_secs(5), GameTime(0));

        limiter.reset_all();

        assert!(limiter.is_empty());
        assert!(!limiter.is_active("a", GameTime(1)));
    }
}
