//! Controller configuration and tunable defaults.
use std::time::Duration;

use crate::capability::{CapabilityId, CapabilityLookup};

/// Tunables read by the controller on every cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct ControllerConfig {
    /// Capability used by the automated action.
    pub capability: CapabilityId,
    /// Substring used to find the capability when the exact id is missing.
    pub capability_pattern: Option<String>,
    /// Only automate actors of this host kind; `None` accepts any actor.
    pub required_actor_kind: Option<String>,
    /// Master toggle. Gates new cycles; already scheduled executions still run.
    pub enabled: bool,
    /// Replay the user's last command after the action.
    pub restore_enabled: bool,
    /// Gate evaluation cadence, independent of the host tick rate.
    pub poll_interval: Duration,
    /// Minimum time between two successful actions.
    pub min_action_interval: Duration,
    /// Rate limiter window armed after each action.
    pub rate_limit_window: Duration,
    /// Captured commands older than this are never replayed.
    pub max_snapshot_age: Duration,
    /// Delay of each restoration attempt after the action.
    pub restore_delays: Vec<Duration>,
}

impl ControllerConfig {
    pub const DEFAULT_CAPABILITY: &'static str = "venomancer_plague_ward";
    pub const DEFAULT_CAPABILITY_PATTERN: &'static str = "plague_ward";
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
    pub const DEFAULT_MIN_ACTION_INTERVAL: Duration = Duration::from_millis(1000);
    pub const DEFAULT_RATE_LIMIT_WINDOW: Duration = Duration::from_millis(1000);
    pub const DEFAULT_MAX_SNAPSHOT_AGE: Duration = Duration::from_secs(10);
    pub const DEFAULT_RESTORE_DELAYS_MS: [u64; 3] = [500, 1000, 1500];

    pub fn new(capability: CapabilityId) -> Self {
        Self {
            capability,
            capability_pattern: None,
            required_actor_kind: None,
            enabled: true,
            restore_enabled: true,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            min_action_interval: Self::DEFAULT_MIN_ACTION_INTERVAL,
            rate_limit_window: Self::DEFAULT_RATE_LIMIT_WINDOW,
            max_snapshot_age: Self::DEFAULT_MAX_SNAPSHOT_AGE,
            restore_delays: Self::DEFAULT_RESTORE_DELAYS_MS
                .iter()
                .copied()
                .map(Duration::from_millis)
                .collect(),
        }
    }

    pub fn with_capability_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.capability_pattern = Some(pattern.into());
        self
    }

    pub fn with_required_actor_kind(mut self, kind: impl Into<String>) -> Self {
        self.required_actor_kind = Some(kind.into());
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_restore_delays(mut self, delays: Vec<Duration>) -> Self {
        self.restore_delays = delays;
        self
    }

    /// Rate limiter key of the automated action.
    pub fn rate_limit_key(&self) -> String {
        format!("use:{}", self.capability)
    }

    pub fn capability_lookup(&self) -> CapabilityLookup {
        CapabilityLookup::new(self.capability.clone(), self.capability_pattern.clone())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capability.as_str().is_empty() {
            return Err(ConfigError::EmptyCapability);
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.restore_delays.is_empty() {
            return Err(ConfigError::NoRestoreAttempts);
        }
        if self.restore_delays.len() > usize::from(u8::MAX) {
            return Err(ConfigError::TooManyRestoreAttempts(
                self.restore_delays.len(),
            ));
        }
        Ok(())
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::new(CapabilityId::new(Self::DEFAULT_CAPABILITY))
            .with_capability_pattern(Self::DEFAULT_CAPABILITY_PATTERN)
    }
}

/// Invalid controller configuration.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("capability identifier must not be empty")]
    EmptyCapability,

    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,

    #[error("at least one restoration delay is required")]
    NoRestoreAttempts,

    #[error("{0} restoration delays configured, at most 255 are supported")]
    TooManyRestoreAttempts(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ControllerConfig::default();

        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.rate_limit_key(), "use:venomancer_plague_ward");
        assert_eq!(
            config.restore_delays,
            vec![
                Duration::from_millis(500),
                Duration::from_millis(1000),
                Duration::from_millis(1500)
            ]
        );
    }

    #[test]
    fn rejects_degenerate_settings() {
        assert_eq!(
            ControllerConfig::default()
                .with_restore_delays(Vec::new())
                .validate(),
            Err(ConfigError::NoRestoreAttempts)
        );
        assert_eq!(
            ControllerConfig::default()
                .with_poll_interval(Duration::ZERO)
                .validate(),
            Err(ConfigError::ZeroPollInterval)
        );
        assert_eq!(
            ControllerConfig::new(CapabilityId::new("")).validate(),
            Err(ConfigError::EmptyCapability)
        );
    }
}
