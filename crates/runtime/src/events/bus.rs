//! Topic-based event bus implementation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use autocast_core::{ControllerEvent, GameTime};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Gate evaluations (blocked, triggered)
    Gate,
    /// Automated action execution (issued, aborted, failed)
    Action,
    /// Restoration attempts
    Restoration,
    /// User command capture decisions
    Capture,
}

/// Controller event stamped with the game time it was produced at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub at: GameTime,
    pub event: ControllerEvent,
}

impl Event {
    pub fn new(at: GameTime, event: ControllerEvent) -> Self {
        Self { at, event }
    }

    pub fn topic(&self) -> Topic {
        match self.event {
            ControllerEvent::Blocked { .. } | ControllerEvent::Triggered { .. } => Topic::Gate,
            ControllerEvent::ExecutionAborted { .. }
            | ControllerEvent::ActionIssued { .. }
            | ControllerEvent::ActionFailed { .. } => Topic::Action,
            ControllerEvent::RestorationDispatched { .. }
            | ControllerEvent::RestorationSkipped { .. } => Topic::Restoration,
            ControllerEvent::CommandCaptured { .. } | ControllerEvent::CommandIgnored { .. } => {
                Topic::Capture
            }
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Every topic channel exists from construction on.
#[derive(Clone)]
pub struct EventBus {
    gate: broadcast::Sender<Event>,
    action: broadcast::Sender<Event>,
    restoration: broadcast::Sender<Event>,
    capture: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            gate: broadcast::channel(capacity).0,
            action: broadcast::channel(capacity).0,
            restoration: broadcast::channel(capacity).0,
            capture: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Gate => &self.gate,
            Topic::Action => &self.action,
            Topic::Restoration => &self.restoration,
            Topic::Capture => &self.capture,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    ///
    /// Returns receivers for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
