//! Autocast simulator binary.
//!
//! Runs a scenario against a simulated host through the automation runtime
//! and logs every controller decision.
//!
//! # Examples
//!
//! ```bash
//! # Bundled scenario with defaults
//! cargo run -p autocast-sim
//!
//! # Custom scenario, faster polling, verbose gate logging
//! AUTOCAST_SCENARIO=my.ron AUTOCAST_POLL_INTERVAL_MS=250 RUST_LOG=autocast_core=debug \
//!     cargo run -p autocast-sim
//! ```

use anyhow::Result;

use autocast_runtime::RuntimeConfig;
use autocast_sim::{Scenario, SimConfig, Simulation, logging};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // 1. Load configuration from environment
    let sim_config = SimConfig::from_env();
    let runtime_config = RuntimeConfig::from_env()?;

    // 2. Setup logging
    let session_dir = logging::setup_logging(sim_config.session_id.as_deref())?;

    tracing::info!("Starting autocast simulator");
    tracing::info!("Capability: {}", runtime_config.controller.capability);
    tracing::info!("Restoration: {}", runtime_config.controller.restore_enabled);

    // 3. Load scenario
    let scenario = match &sim_config.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::bundled()?,
    };

    // 4. Run
    let report = Simulation::new(scenario, runtime_config)
        .realtime(sim_config.realtime)
        .run()
        .await?;

    if sim_config.event_log {
        let path = session_dir.join("events.jsonl");
        report.write_event_log(&path)?;
        tracing::info!("Event log: {}", path.display());
    }

    tracing::info!(
        "Simulation complete: {} actions, {} restorations, {} host orders",
        report.actions(),
        report.restorations(),
        report.orders.len()
    );
    Ok(())
}
