//! Simulator configuration loaded from the environment.
use std::env;
use std::path::PathBuf;

/// Settings of the simulator binary itself; controller tunables live in
/// [`autocast_runtime::RuntimeConfig`].
#[derive(Clone, Debug, Default)]
pub struct SimConfig {
    pub scenario: Option<PathBuf>,
    pub session_id: Option<String>,
    pub realtime: bool,
    pub event_log: bool,
}

impl SimConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `AUTOCAST_SCENARIO` - Scenario RON file (default: bundled scenario)
    /// - `AUTOCAST_SESSION_ID` - Log session identifier (default: timestamp based)
    /// - `AUTOCAST_REALTIME` - Pace ticks with the wall clock (default: false)
    /// - `AUTOCAST_EVENT_LOG` - Write `events.jsonl` next to the log (default: true)
    pub fn from_env() -> Self {
        Self {
            scenario: env::var("AUTOCAST_SCENARIO").ok().map(PathBuf::from),
            session_id: env::var("AUTOCAST_SESSION_ID").ok(),
            realtime: read_env::<bool>("AUTOCAST_REALTIME").unwrap_or(false),
            event_log: read_env::<bool>("AUTOCAST_EVENT_LOG").unwrap_or(true),
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
