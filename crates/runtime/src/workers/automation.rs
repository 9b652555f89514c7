//! Automation worker that owns the [`autocast_core::Controller`] and the host.
//!
//! Receives commands from [`crate::RuntimeHandle`], drives the controller, and
//! publishes every produced event to the EventBus.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use autocast_core::{CommandEvent, Controller, ControllerEvent, ControllerStatus, GameTime, Host};

use crate::events::{Event, EventBus};

/// Commands that can be sent to the automation worker
pub enum Command {
    /// Advance the controller clock; replies with the events produced.
    Tick {
        now: GameTime,
        reply: oneshot::Sender<Vec<ControllerEvent>>,
    },
    /// Offer an order event observed by the host.
    Observe {
        event: CommandEvent,
        now: GameTime,
        reply: oneshot::Sender<ControllerEvent>,
    },
    /// The host cleared the actor's current order.
    OrderCleared { reply: oneshot::Sender<()> },
    StartSession {
        now: GameTime,
        reply: oneshot::Sender<()>,
    },
    EndSession { reply: oneshot::Sender<()> },
    SetEnabled {
        enabled: bool,
        reply: oneshot::Sender<()>,
    },
    SetRestoreEnabled {
        enabled: bool,
        reply: oneshot::Sender<()>,
    },
    /// Query a diagnostic snapshot of controller state.
    QueryStatus {
        reply: oneshot::Sender<ControllerStatus>,
    },
    /// Stop the worker loop.
    Shutdown,
}

/// Background task that serializes every controller entry point.
///
/// The controller itself is synchronous; the worker is the only place it is
/// touched, so ticks, order events and toggles never interleave.
pub struct AutomationWorker {
    controller: Controller,
    host: Box<dyn Host>,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
}

impl AutomationWorker {
    /// Creates a new automation worker.
    pub fn new(
        controller: Controller,
        host: Box<dyn Host>,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
    ) -> Self {
        info!(
            capability = %controller.config().capability,
            poll_ms = controller.config().poll_interval.as_millis() as u64,
            attempts = controller.config().restore_delays.len(),
            "AutomationWorker initialized"
        );

        Self {
            controller,
            host,
            command_rx,
            event_bus,
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    if !self.handle_command(cmd) {
                        break;
                    }
                }
                else => break,
            }
        }

        self.controller.end_session();
        debug!("AutomationWorker stopped");
    }

    /// Returns `false` once the worker should stop.
    fn handle_command(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Tick { now, reply } => {
                let events = self.controller.tick(now, self.host.as_mut());
                self.publish(now, &events);
                if reply.send(events).is_err() {
                    debug!("Tick reply channel closed (caller dropped)");
                }
            }
            Command::Observe { event, now, reply } => {
                let outcome = self.controller.on_command(&event, now, self.host.as_ref());
                self.publish(now, std::slice::from_ref(&outcome));
                if reply.send(outcome).is_err() {
                    debug!("Observe reply channel closed (caller dropped)");
                }
            }
            Command::OrderCleared { reply } => {
                self.controller.on_order_cleared();
                Self::ack(reply, "OrderCleared");
            }
            Command::StartSession { now, reply } => {
                self.controller.start_session(now);
                Self::ack(reply, "StartSession");
            }
            Command::EndSession { reply } => {
                self.controller.end_session();
                Self::ack(reply, "EndSession");
            }
            Command::SetEnabled { enabled, reply } => {
                info!(enabled, "automation toggled");
                self.controller.set_enabled(enabled);
                Self::ack(reply, "SetEnabled");
            }
            Command::SetRestoreEnabled { enabled, reply } => {
                info!(enabled, "restoration toggled");
                self.controller.set_restore_enabled(enabled);
                Self::ack(reply, "SetRestoreEnabled");
            }
            Command::QueryStatus { reply } => {
                if reply.send(self.controller.status()).is_err() {
                    debug!("QueryStatus reply channel closed (caller dropped)");
                }
            }
            Command::Shutdown => return false,
        }
        true
    }

    fn publish(&self, now: GameTime, events: &[ControllerEvent]) {
        for event in events {
            self.event_bus.publish(Event::new(now, event.clone()));
        }
    }

    fn ack(reply: oneshot::Sender<()>, command: &str) {
        if reply.send(()).is_err() {
            debug!(command, "reply channel closed (caller dropped)");
        }
    }
}
