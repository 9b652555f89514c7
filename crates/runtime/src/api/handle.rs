//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! driving the controller or streaming events from specific topics.
use std::collections::HashMap;

use tokio::sync::{broadcast, mpsc, oneshot};

use autocast_core::{CommandEvent, ControllerEvent, ControllerStatus, GameTime};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Advance the controller to `now`, returning the events of this tick
    pub async fn tick(&self, now: GameTime) -> Result<Vec<ControllerEvent>> {
        self.request(|reply| Command::Tick { now, reply }).await
    }

    /// Forward an order event observed by the host
    pub async fn observe(&self, event: CommandEvent, now: GameTime) -> Result<ControllerEvent> {
        self.request(|reply| Command::Observe { event, now, reply })
            .await
    }

    /// Report that the host cleared the actor's current order
    pub async fn order_cleared(&self) -> Result<()> {
        self.request(|reply| Command::OrderCleared { reply }).await
    }

    pub async fn start_session(&self, now: GameTime) -> Result<()> {
        self.request(|reply| Command::StartSession { now, reply })
            .await
    }

    pub async fn end_session(&self) -> Result<()> {
        self.request(|reply| Command::EndSession { reply }).await
    }

    pub async fn set_enabled(&self, enabled: bool) -> Result<()> {
        self.request(|reply| Command::SetEnabled { enabled, reply })
            .await
    }

    pub async fn set_restore_enabled(&self, enabled: bool) -> Result<()> {
        self.request(|reply| Command::SetRestoreEnabled { enabled, reply })
            .await
    }

    /// Query a diagnostic snapshot of controller state
    pub async fn status(&self) -> Result<ControllerStatus> {
        self.request(|reply| Command::QueryStatus { reply }).await
    }

    pub(crate) async fn shutdown(&self) -> Result<()> {
        self.command_tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Gate` - Gate evaluations
    /// - `Topic::Action` - Automated action outcomes
    /// - `Topic::Restoration` - Restoration attempts
    /// - `Topic::Capture` - User command capture decisions
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use autocast_runtime::Topic;
    ///
    /// let mut actions = handle.subscribe(Topic::Action);
    /// while let Ok(event) = actions.recv().await {
    ///     // Handle action events
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
