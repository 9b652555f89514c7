//! The automation controller and its poll loop.
//!
//! [`Controller`] owns every piece of session state: the snapshot store, the
//! rate limiter, the deferred task queue and the session clock. Hosts feed it
//! three kinds of input:
//!
//! - clock ticks through [`Controller::tick`]
//! - order events through [`Controller::on_command`] (or a
//!   [`CommandListener`] registered with the host's event source)
//! - session lifecycle through [`Controller::start_session`] and
//!   [`Controller::end_session`]
//!
//! Each tick first runs deferred tasks that are due, then, at most once per
//! poll interval, evaluates the readiness gate and triggers a new cycle.
use std::sync::Arc;

use tracing::{debug, info};

use crate::capability::{CapabilityLookup, CapabilityState};
use crate::command::{Command, CommandEvent};
use crate::config::{ConfigError, ControllerConfig};
use crate::events::ControllerEvent;
use crate::gate::{BlockReason, GateContext, ReadinessGate};
use crate::host::{Host, WorldView};
use crate::limiter::RateLimiter;
use crate::snapshot::{CommandListener, SnapshotStore};
use crate::state::ActorState;
use crate::task::{RestoreSlot, Task, TaskQueue};
use crate::time::GameTime;

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct SessionClock {
    pub(crate) active: bool,
    pub(crate) last_evaluation: GameTime,
    pub(crate) last_action: GameTime,
}

/// Diagnostic view of controller state.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControllerStatus {
    pub session_active: bool,
    pub enabled: bool,
    pub restore_enabled: bool,
    pub primary: Option<Command>,
    pub backup: Option<Command>,
    pub pending_tasks: usize,
    pub last_action: GameTime,
    pub cycles_triggered: u64,
}

/// Gated, retrying automation controller for a single actor.
#[derive(Debug)]
pub struct Controller {
    pub(crate) config: ControllerConfig,
    pub(crate) lookup: CapabilityLookup,
    pub(crate) limiter_key: String,
    pub(crate) gate: ReadinessGate,
    pub(crate) store: Arc<SnapshotStore>,
    pub(crate) limiter: RateLimiter,
    pub(crate) tasks: TaskQueue,
    pub(crate) clock: SessionClock,
    pub(crate) cycles: u64,
    pub(crate) last_restored: Option<RestoreSlot>,
}

impl Controller {
    pub fn new(config: ControllerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            lookup: config.capability_lookup(),
            limiter_key: config.rate_limit_key(),
            gate: ReadinessGate::new(config.min_action_interval),
            config,
            store: Arc::new(SnapshotStore::new()),
            limiter: RateLimiter::new(),
            tasks: TaskQueue::new(),
            clock: SessionClock::default(),
            cycles: 0,
            last_restored: None,
        })
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Master toggle. Only affects cycles that have not been triggered yet.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    pub fn set_restore_enabled(&mut self, enabled: bool) {
        self.config.restore_enabled = enabled;
    }

    /// Callback for the host's command event source.
    pub fn command_listener(&self) -> CommandListener {
        CommandListener::new(Arc::clone(&self.store), self.lookup.clone())
    }

    pub fn snapshots(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn limiter_key(&self) -> &str {
        &self.limiter_key
    }

    pub fn is_session_active(&self) -> bool {
        self.clock.active
    }

    pub fn last_action_time(&self) -> GameTime {
        self.clock.last_action
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn status(&self) -> ControllerStatus {
        ControllerStatus {
            session_active: self.clock.active,
            enabled: self.config.enabled,
            restore_enabled: self.config.restore_enabled,
            primary: self.store.primary(),
            backup: self.store.backup(),
            pending_tasks: self.tasks.len(),
            last_action: self.clock.last_action,
            cycles_triggered: self.cycles,
        }
    }

    /// Starts a session at `now`; the gate is immediately satisfiable.
    pub fn start_session(&mut self, now: GameTime) {
        self.reset_state();
        self.clock = SessionClock {
            active: true,
            last_evaluation: now - self.config.poll_interval,
            last_action: now - self.config.min_action_interval,
        };
        info!(at = %now, capability = %self.config.capability, "automation session started");
    }

    pub fn end_session(&mut self) {
        self.reset_state();
        self.clock.active = false;
        info!("automation session ended");
    }

    fn reset_state(&mut self) {
        self.limiter.reset_all();
        self.store.clear();
        self.tasks.clear();
        self.last_restored = None;
    }

    /// The host cleared the actor's current order.
    pub fn on_order_cleared(&self) {
        self.store.invalidate_primary();
    }

    /// Offers an order event observed by the host.
    pub fn on_command<W: WorldView + ?Sized>(
        &self,
        event: &CommandEvent,
        now: GameTime,
        world: &W,
    ) -> ControllerEvent {
        let controlled = world.controlled_actor().map(|actor| actor.id);
        match self.command_listener().on_command(event, now, controlled) {
            Ok(()) => ControllerEvent::CommandCaptured {
                kind: event.kind.into(),
            },
            Err(rejection) => ControllerEvent::CommandIgnored { rejection },
        }
    }

    /// Advances the controller to `now`.
    pub fn tick(&mut self, now: GameTime, host: &mut dyn Host) -> Vec<ControllerEvent> {
        let mut events = Vec::new();

        while let Some(task) = self.tasks.pop_due(now) {
            let event = match task {
                Task::Execute { cycle } => self.execute(cycle, now, host),
                Task::Restore { slot, fallback } => {
                    self.restore_attempt(slot, fallback.as_ref(), now, host)
                }
            };
            events.push(event);
        }

        if !self.clock.active || !self.config.enabled {
            return events;
        }
        if now.duration_since(self.clock.last_evaluation) < self.config.poll_interval {
            return events;
        }
        self.clock.last_evaluation = now;

        match self.evaluate(now, &*host) {
            Ok(()) => {
                let cycle = self.trigger(now);
                events.push(ControllerEvent::Triggered { cycle });
            }
            Err(reason) => {
                debug!(%reason, at = %now, "gate blocked");
                events.push(ControllerEvent::Blocked { reason });
            }
        }

        events
    }

    /// Runs the readiness gate against the host's current state.
    pub fn evaluate<W: WorldView + ?Sized>(
        &self,
        now: GameTime,
        world: &W,
    ) -> Result<(), BlockReason> {
        let actor = world.controlled_actor();
        if let (Some(actor), Some(required)) = (&actor, &self.config.required_actor_kind) {
            if actor.kind != *required {
                return Err(BlockReason::ActorKindMismatch);
            }
        }
        let capability = actor.as_ref().and_then(|actor| self.resolve_capability(actor, world));

        self.gate.evaluate(&GateContext {
            actor: actor.as_ref(),
            capability: capability.as_ref(),
            limiter: &self.limiter,
            limiter_key: &self.limiter_key,
            last_action: self.clock.last_action,
            now,
        })
    }

    pub(crate) fn resolve_capability<W: WorldView + ?Sized>(
        &self,
        actor: &ActorState,
        world: &W,
    ) -> Option<CapabilityState> {
        let capabilities = world.capabilities(actor.id);
        self.lookup.find(&capabilities).cloned()
    }
}
