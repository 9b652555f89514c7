//! Runtime configuration structures and loaders.
use std::env;
use std::str::FromStr;
use std::time::Duration;

use autocast_core::{CapabilityId, ControllerConfig};

use crate::api::{Result, RuntimeError};

/// Runtime configuration shared across the orchestrator and worker.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub controller: ControllerConfig,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            controller: ControllerConfig::default(),
            event_buffer_size: 100,
            command_buffer_size: 32,
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `AUTOCAST_CAPABILITY` - Capability identifier (default: `venomancer_plague_ward`)
    /// - `AUTOCAST_CAPABILITY_PATTERN` - Fallback substring; empty disables it
    /// - `AUTOCAST_ACTOR_KIND` - Only automate actors of this kind (default: any)
    /// - `AUTOCAST_ENABLED` - Master toggle (default: true)
    /// - `AUTOCAST_RESTORE_ENABLED` - Command restoration toggle (default: true)
    /// - `AUTOCAST_POLL_INTERVAL_MS` - Gate evaluation cadence (default: 500)
    /// - `AUTOCAST_MIN_INTERVAL_MS` - Minimum time between actions (default: 1000)
    /// - `AUTOCAST_RATE_LIMIT_MS` - Rate limiter window (default: 1000)
    /// - `AUTOCAST_MAX_ORDER_AGE_MS` - Snapshot staleness bound (default: 10000)
    /// - `AUTOCAST_RESTORE_DELAYS_MS` - Comma separated attempt delays (default: `500,1000,1500`)
    /// - `AUTOCAST_EVENT_BUFFER` - Event bus capacity per topic (default: 100)
    /// - `AUTOCAST_COMMAND_BUFFER` - Worker command queue size (default: 32)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`RuntimeConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let vars = Vars(&lookup);
        let mut config = Self::default();
        let controller = &mut config.controller;

        if let Some(capability) = lookup("AUTOCAST_CAPABILITY") {
            controller.capability = CapabilityId::new(capability.trim());
        }
        if let Some(pattern) = lookup("AUTOCAST_CAPABILITY_PATTERN") {
            let pattern = pattern.trim();
            controller.capability_pattern = (!pattern.is_empty()).then(|| pattern.to_owned());
        }
        if let Some(kind) = lookup("AUTOCAST_ACTOR_KIND") {
            let kind = kind.trim();
            controller.required_actor_kind = (!kind.is_empty()).then(|| kind.to_owned());
        }
        if let Some(enabled) = vars.parse::<bool>("AUTOCAST_ENABLED")? {
            controller.enabled = enabled;
        }
        if let Some(enabled) = vars.parse::<bool>("AUTOCAST_RESTORE_ENABLED")? {
            controller.restore_enabled = enabled;
        }
        if let Some(interval) = vars.millis("AUTOCAST_POLL_INTERVAL_MS")? {
            controller.poll_interval = interval;
        }
        if let Some(interval) = vars.millis("AUTOCAST_MIN_INTERVAL_MS")? {
            controller.min_action_interval = interval;
        }
        if let Some(window) = vars.millis("AUTOCAST_RATE_LIMIT_MS")? {
            controller.rate_limit_window = window;
        }
        if let Some(age) = vars.millis("AUTOCAST_MAX_ORDER_AGE_MS")? {
            controller.max_snapshot_age = age;
        }
        if let Some(delays) = vars.millis_list("AUTOCAST_RESTORE_DELAYS_MS")? {
            controller.restore_delays = delays;
        }

        if let Some(capacity) = vars.parse::<usize>("AUTOCAST_EVENT_BUFFER")? {
            config.event_buffer_size = capacity.max(1);
        }
        if let Some(capacity) = vars.parse::<usize>("AUTOCAST_COMMAND_BUFFER")? {
            config.command_buffer_size = capacity.max(1);
        }

        config
            .controller
            .validate()
            .map_err(RuntimeError::InvalidConfig)?;
        Ok(config)
    }
}

struct Vars<'a, F>(&'a F);

impl<F> Vars<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn parse<T: FromStr>(&self, key: &'static str) -> Result<Option<T>> {
        let Some(raw) = (self.0)(key) else {
            return Ok(None);
        };
        raw.trim()
            .parse()
            .map(Some)
            .map_err(|_| RuntimeError::InvalidEnv { key, value: raw })
    }

    fn millis(&self, key: &'static str) -> Result<Option<Duration>> {
        Ok(self.parse::<u64>(key)?.map(Duration::from_millis))
    }

    fn millis_list(&self, key: &'static str) -> Result<Option<Vec<Duration>>> {
        let Some(raw) = (self.0)(key) else {
            return Ok(None);
        };
        raw.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| part.parse::<u64>().map(Duration::from_millis))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(Some)
            .map_err(|_| RuntimeError::InvalidEnv { key, value: raw })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<RuntimeConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RuntimeConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_yields_defaults() {
        assert_eq!(load(&[]).unwrap(), RuntimeConfig::default());
    }

    #[test]
    fn overrides_controller_tunables() {
        let config = load(&[
            ("AUTOCAST_CAPABILITY", "lion_mana_drain"),
            ("AUTOCAST_CAPABILITY_PATTERN", ""),
            ("AUTOCAST_ACTOR_KIND", "npc_dota_hero_lion"),
            ("AUTOCAST_ENABLED", "false"),
            ("AUTOCAST_POLL_INTERVAL_MS", "250"),
            ("AUTOCAST_RESTORE_DELAYS_MS", "300, 900"),
            ("AUTOCAST_COMMAND_BUFFER", "0"),
        ])
        .unwrap();

        let controller = &config.controller;
        assert_eq!(controller.capability, CapabilityId::new("lion_mana_drain"));
        assert_eq!(controller.capability_pattern, None);
        assert_eq!(
            controller.required_actor_kind.as_deref(),
            Some("npc_dota_hero_lion")
        );
        assert!(!controller.enabled);
        assert!(controller.restore_enabled);
        assert_eq!(controller.poll_interval, Duration::from_millis(250));
        assert_eq!(
            controller.restore_delays,
            vec![Duration::from_millis(300), Duration::from_millis(900)]
        );
        assert_eq!(config.command_buffer_size, 1);
    }

    #[test]
    fn rejects_malformed_values() {
        let err = load(&[("AUTOCAST_POLL_INTERVAL_MS", "soon")]).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::InvalidEnv {
                key: "AUTOCAST_POLL_INTERVAL_MS",
                ..
            }
        ));
    }

    #[test]
    fn rejects_invalid_controller_config() {
        let err = load(&[("AUTOCAST_RESTORE_DELAYS_MS", " ")]).unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidConfig(_)));
    }
}
