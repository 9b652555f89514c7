//! Command snapshot store.
//!
//! Keeps the last qualifying user command twice: `primary` follows the
//! environment (hosts may drop it when their current order is cleared, see
//! [`SnapshotStore::invalidate_primary`]) while `backup` survives until the
//! next capture or session boundary. Restoration therefore still finds the
//! user's intent after the automated action wiped the host's order queue.
//!
//! The store is shared between the controller and the host's command event
//! callback ([`CommandListener`]). A host may fire order events synchronously
//! from inside an issuance primitive, so capture consults the reentrancy
//! guard held by restoration.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::debug;

use crate::capability::CapabilityLookup;
use crate::command::{Command, CommandEvent, CommandSource, OrderKind};
use crate::host::WorldView;
use crate::state::EntityId;
use crate::time::GameTime;

#[derive(Debug, Default)]
struct Slots {
    primary: Option<Command>,
    backup: Option<Command>,
}

/// Why an order event was not captured.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CaptureRejection {
    #[error("restoration in progress")]
    GuardActive,

    #[error("order was not issued by the user")]
    NotUserInput,

    #[error("no controlled actor")]
    NoControlledActor,

    #[error("order was issued to other units")]
    ForeignIssuer,

    #[error("{0} orders are never restored")]
    IgnoredKind(OrderKind),

    #[error("order casts the automated capability")]
    OwnAction,
}

/// Per-event capture context.
#[derive(Clone, Copy, Debug)]
pub struct CaptureFilter<'a> {
    pub controlled: Option<EntityId>,
    pub own_capability: &'a CapabilityLookup,
}

/// Primary/backup command slots plus the reentrancy guard.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    slots: Mutex<Slots>,
    guard: AtomicBool,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, Slots> {
        // Slots hold plain values; a panic elsewhere cannot leave them torn.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Captures `event` as the user's current intent.
    ///
    /// Writes `primary` and mirrors it into `backup`, both stamped `now`.
    pub fn capture(
        &self,
        event: &CommandEvent,
        now: GameTime,
        filter: &CaptureFilter<'_>,
    ) -> Result<(), CaptureRejection> {
        if self.is_guarded() {
            return Err(CaptureRejection::GuardActive);
        }
        if event.source != CommandSource::User {
            return Err(CaptureRejection::NotUserInput);
        }
        let controlled = filter
            .controlled
            .ok_or(CaptureRejection::NoControlledActor)?;
        if !event.issuers.contains(&controlled) {
            return Err(CaptureRejection::ForeignIssuer);
        }
        if event.kind.is_never_restored() {
            return Err(CaptureRejection::IgnoredKind(event.kind));
        }
        if event
            .capability
            .as_ref()
            .is_some_and(|id| filter.own_capability.matches(id))
        {
            return Err(CaptureRejection::OwnAction);
        }

        let command = Command::from_event(event, now);
        let mut slots = self.slots();
        slots.backup = Some(command.clone());
        slots.primary = Some(command);
        Ok(())
    }

    /// `primary` if present, else `backup`, without freshness checks.
    pub fn current(&self) -> Option<Command> {
        let slots = self.slots();
        slots.primary.clone().or_else(|| slots.backup.clone())
    }

    /// Snapshot that may still be replayed at `now`.
    pub fn effective<W: WorldView + ?Sized>(
        &self,
        now: GameTime,
        max_age: Duration,
        world: &W,
    ) -> Option<Command> {
        self.current().filter(|command| {
            command
                .check_fresh(now, max_age, |id| world.entity_status(id))
                .is_ok()
        })
    }

    pub fn primary(&self) -> Option<Command> {
        self.slots().primary.clone()
    }

    pub fn backup(&self) -> Option<Command> {
        self.slots().backup.clone()
    }

    /// The host cleared its current order; only `primary` follows it.
    pub fn invalidate_primary(&self) {
        self.slots().primary = None;
    }

    pub fn clear(&self) {
        let mut slots = self.slots();
        slots.primary = None;
        slots.backup = None;
    }

    pub fn is_guarded(&self) -> bool {
        self.guard.load(Ordering::Acquire)
    }

    /// Blocks capture until the returned guard is dropped.
    ///
    /// Restoration never nests, so the flag is a plain bool rather than a
    /// depth counter.
    pub fn enter_guard(&self) -> ReentrancyGuard<'_> {
        self.guard.store(true, Ordering::Release);
        ReentrancyGuard { flag: &self.guard }
    }
}

/// Clears the store's reentrancy flag when dropped, including during unwinding.
#[must_use = "the guard is released as soon as it is dropped"]
#[derive(Debug)]
pub struct ReentrancyGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for ReentrancyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Command event callback handed to the host's event source.
///
/// Cloneable; every clone writes into the controller's store.
#[derive(Clone, Debug)]
pub struct CommandListener {
    store: Arc<SnapshotStore>,
    own_capability: CapabilityLookup,
}

impl CommandListener {
    pub(crate) fn new(store: Arc<SnapshotStore>, own_capability: CapabilityLookup) -> Self {
        Self {
            store,
            own_capability,
        }
    }

    /// Offers an order event to the store.
    ///
    /// `controlled` is the actor the host currently controls.
    pub fn on_command(
        &self,
        event: &CommandEvent,
        now: GameTime,
        controlled: Option<EntityId>,
    ) -> Result<(), CaptureRejection> {
        let filter = CaptureFilter {
            controlled,
            own_capability: &self.own_capability,
        };
        match self.store.capture(event, now, &filter) {
            Ok(()) => {
                debug!(kind = %event.kind, at = %now, "captured user command");
                Ok(())
            }
            Err(rejection) => {
                debug!(kind = %event.kind, %rejection, "command not captured");
                Err(rejection)
            }
        }
    }
}
