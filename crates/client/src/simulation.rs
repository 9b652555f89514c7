//! Drives a scenario through the runtime.
//!
//! The simulation owns the clock. Each host tick it applies the scripted
//! steps that are due, forwards the resulting order events to the runtime,
//! and then ticks the controller. Every runtime call is awaited before the
//! next, so a run is deterministic for a given scenario and configuration.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use autocast_core::{ControllerEvent, EntityId, GameTime, Position};
use autocast_runtime::{Event, Runtime, RuntimeConfig, RuntimeHandle, Topic};

use crate::host::{IssuedOrder, SharedWorld, SimOrder, SimWorld, SimulatedHost, lock};
use crate::scenario::{Scenario, ScriptAction, UserOrder};

const ALL_TOPICS: [Topic; 4] = [Topic::Gate, Topic::Action, Topic::Restoration, Topic::Capture];

/// Everything that happened during a run.
#[derive(Debug, Default)]
pub struct SimulationReport {
    pub events: Vec<Event>,
    pub orders: Vec<IssuedOrder>,
}

impl SimulationReport {
    pub fn count(&self, predicate: impl Fn(&ControllerEvent) -> bool) -> usize {
        self.events
            .iter()
            .filter(|event| predicate(&event.event))
            .count()
    }

    pub fn actions(&self) -> usize {
        self.count(|event| matches!(event, ControllerEvent::ActionIssued { .. }))
    }

    pub fn restorations(&self) -> usize {
        self.count(|event| matches!(event, ControllerEvent::RestorationDispatched { .. }))
    }

    /// Writes one JSON object per event.
    pub fn write_event_log(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create event log {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        for event in &self.events {
            serde_json::to_writer(&mut writer, event)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }
}

pub struct Simulation {
    scenario: Scenario,
    config: RuntimeConfig,
    realtime: bool,
}

impl Simulation {
    pub fn new(scenario: Scenario, config: RuntimeConfig) -> Self {
        Self {
            scenario,
            config,
            realtime: false,
        }
    }

    /// Pace ticks with the wall clock instead of running as fast as possible.
    pub fn realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    pub async fn run(self) -> Result<SimulationReport> {
        let world = SimWorld::from_scenario(&self.scenario).into_shared();
        let host_world = Arc::clone(&world);
        let runtime = Runtime::builder()
            .config(self.config)
            .host_with_listener(move |listener| SimulatedHost::new(host_world, Some(listener)))
            .build()
            .await?;
        let handle = runtime.handle();
        spawn_event_logger(&handle);

        info!(
            scenario = %self.scenario.name,
            duration_ms = self.scenario.duration_ms,
            tick_ms = self.scenario.tick_ms,
            "simulation started"
        );

        let mut report = SimulationReport::default();
        let mut pacer = tokio::time::interval(Duration::from_millis(self.scenario.tick_ms));
        let mut script = self.scenario.script.iter().peekable();
        let actor = lock(&world).actor_id();

        handle.start_session(GameTime::ZERO).await?;

        let mut elapsed_ms = 0;
        while elapsed_ms <= self.scenario.duration_ms {
            if self.realtime {
                pacer.tick().await;
            }
            let now = GameTime::from_millis(i64::try_from(elapsed_ms)?);
            lock(&world).advance(now);

            while let Some(scripted) = script.next_if(|scripted| scripted.at_ms <= elapsed_ms) {
                apply(&scripted.action, now, actor, &world, &handle, &mut report).await?;
            }

            for event in handle.tick(now).await? {
                report.events.push(Event::new(now, event));
            }
            if lock(&world).take_order_cleared() {
                handle.order_cleared().await?;
            }

            elapsed_ms += self.scenario.tick_ms;
        }

        handle.end_session().await?;
        drop(handle);
        runtime.shutdown().await?;

        report.orders = lock(&world).issued().to_vec();
        info!(
            actions = report.actions(),
            restorations = report.restorations(),
            orders = report.orders.len(),
            "simulation finished"
        );
        Ok(report)
    }
}

async fn apply(
    action: &ScriptAction,
    now: GameTime,
    actor: EntityId,
    world: &SharedWorld,
    handle: &RuntimeHandle,
    report: &mut SimulationReport,
) -> Result<()> {
    debug!(at = %now, ?action, "script step");
    match action {
        ScriptAction::User(order) => {
            lock(world).apply_user_order(sim_order(order));
            let outcome = handle.observe(order.to_event(actor), now).await?;
            report.events.push(Event::new(now, outcome));
        }
        ScriptAction::ClearOrder => lock(world).clear_order(),
        ScriptAction::SetInvisible(invisible) => lock(world).set_invisible(*invisible),
        ScriptAction::Kill(id) => lock(world).kill(EntityId(*id)),
        ScriptAction::SetEnabled(enabled) => handle.set_enabled(*enabled).await?,
        ScriptAction::SetRestoreEnabled(enabled) => handle.set_restore_enabled(*enabled).await?,
    }
    Ok(())
}

fn sim_order(order: &UserOrder) -> Option<SimOrder> {
    match *order {
        UserOrder::Move { x, y, queue } => Some(SimOrder::Move {
            position: Position::new(x, y, 0.0),
            queue,
        }),
        UserOrder::AttackMove { x, y, queue } => Some(SimOrder::AttackMove {
            position: Position::new(x, y, 0.0),
            queue,
        }),
        UserOrder::Attack { target, queue } => Some(SimOrder::Attack {
            target: EntityId(target),
            queue,
        }),
        UserOrder::Follow { target, queue } => Some(SimOrder::Follow {
            target: EntityId(target),
            queue,
        }),
        // Holding or stopping leaves the actor idle.
        UserOrder::Hold | UserOrder::Stop => None,
    }
}

/// Logs every bus event until the runtime goes away.
fn spawn_event_logger(handle: &RuntimeHandle) {
    for (topic, mut rx) in handle.subscribe_multiple(&ALL_TOPICS) {
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(Event { at, event }) => log_event(topic, at, &event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(?topic, skipped, "event logger lagged behind");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }
}

fn log_event(topic: Topic, at: GameTime, event: &ControllerEvent) {
    match event {
        ControllerEvent::ActionIssued { .. } | ControllerEvent::RestorationDispatched { .. } => {
            info!(?topic, %at, ?event, "controller event");
        }
        ControllerEvent::ActionFailed { .. } => warn!(?topic, %at, ?event, "controller event"),
        _ => debug!(?topic, %at, ?event, "controller event"),
    }
}
