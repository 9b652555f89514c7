//! Orders issued to the controlled actor and the commands captured from them.
//!
//! Hosts report every order as a [`CommandEvent`] carrying the raw
//! [`OrderKind`]. The snapshot store turns qualifying events into immutable
//! [`Command`] values, folding the raw kind into the restorable
//! [`CommandKind`] set.
use std::time::Duration;

use crate::capability::CapabilityId;
use crate::state::{EntityId, EntityStatus, Position};
use crate::time::GameTime;

/// Raw order kinds reported by the host's order pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OrderKind {
    MoveToPosition,
    MoveToTarget,
    AttackMove,
    AttackTarget,
    /// Attack order that keeps the target locked even when other units
    /// become closer.
    AttackTargetFocus,
    CastPosition,
    CastTarget,
    CastNoTarget,
    CastToggle,
    CastToggleAuto,
    PurchaseItem,
    SellItem,
    Stop,
    HoldPosition,
    /// Any host order without a dedicated variant, by host numeric code.
    Other(u32),
}

impl OrderKind {
    /// Orders that must never be replayed: shop and toggle interactions have
    /// side effects of their own, stop and hold express "do nothing".
    pub fn is_never_restored(self) -> bool {
        matches!(
            self,
            OrderKind::PurchaseItem
                | OrderKind::SellItem
                | OrderKind::CastToggle
                | OrderKind::CastToggleAuto
                | OrderKind::Stop
                | OrderKind::HoldPosition
        )
    }
}

/// Who produced an order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandSource {
    /// Physical input from the end user.
    #[default]
    User,
    /// Issued by a script, including this controller.
    Synthetic,
}

/// Order event as fired by the host's command event source.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommandEvent {
    pub kind: OrderKind,
    pub position: Option<Position>,
    pub target: Option<EntityId>,
    pub queue: bool,
    /// Capability the order casts, if any.
    pub capability: Option<CapabilityId>,
    /// Units the order was issued to.
    pub issuers: Vec<EntityId>,
    pub source: CommandSource,
}

impl CommandEvent {
    /// User order of `kind` issued to `issuer`, without operands.
    pub fn user(kind: OrderKind, issuer: EntityId) -> Self {
        Self {
            kind,
            position: None,
            target: None,
            queue: false,
            capability: None,
            issuers: vec![issuer],
            source: CommandSource::User,
        }
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_target(mut self, target: EntityId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_capability(mut self, capability: CapabilityId) -> Self {
        self.capability = Some(capability);
        self
    }

    pub fn queued(mut self, queue: bool) -> Self {
        self.queue = queue;
        self
    }

    pub fn synthetic(mut self) -> Self {
        self.source = CommandSource::Synthetic;
        self
    }
}

/// Restorable command kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandKind {
    MoveToPoint,
    MoveToTarget,
    AttackPoint,
    AttackTarget,
    AttackTargetFocus,
    /// Captured but not replayable; restoration logs and skips it.
    Unsupported(OrderKind),
}

impl From<OrderKind> for CommandKind {
    fn from(kind: OrderKind) -> Self {
        match kind {
            OrderKind::MoveToPosition => CommandKind::MoveToPoint,
            OrderKind::MoveToTarget => CommandKind::MoveToTarget,
            OrderKind::AttackMove => CommandKind::AttackPoint,
            OrderKind::AttackTarget => CommandKind::AttackTarget,
            OrderKind::AttackTargetFocus => CommandKind::AttackTargetFocus,
            other => CommandKind::Unsupported(other),
        }
    }
}

/// A captured user command. Immutable; replaced wholesale on the next capture.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Command {
    kind: CommandKind,
    position: Option<Position>,
    target: Option<EntityId>,
    queue: bool,
    captured_at: GameTime,
}

impl Command {
    pub fn new(
        kind: CommandKind,
        position: Option<Position>,
        target: Option<EntityId>,
        queue: bool,
        captured_at: GameTime,
    ) -> Self {
        Self {
            kind,
            position,
            target,
            queue,
            captured_at,
        }
    }

    pub fn from_event(event: &CommandEvent, now: GameTime) -> Self {
        Self::new(
            event.kind.into(),
            event.position,
            event.target,
            event.queue,
            now,
        )
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    pub fn queue(&self) -> bool {
        self.queue
    }

    pub fn captured_at(&self) -> GameTime {
        self.captured_at
    }

    pub fn age(&self, now: GameTime) -> Duration {
        now.duration_since(self.captured_at)
    }

    /// Checks that replaying the command at `now` still reflects live intent.
    ///
    /// `entity_status` resolves the target reference; it is only consulted
    /// when the command carries one.
    pub fn check_fresh(
        &self,
        now: GameTime,
        max_age: Duration,
        entity_status: impl Fn(EntityId) -> EntityStatus,
    ) -> Result<(), Staleness> {
        let age = self.age(now);
        if age >= max_age {
            return Err(Staleness::Expired { age });
        }
        match self.target {
            Some(target) if !entity_status(target).is_targetable() => {
                Err(Staleness::TargetLost { target })
            }
            _ => Ok(()),
        }
    }
}

/// Why a captured command no longer represents the user's intent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Staleness {
    Expired { age: Duration },
    /// Target is invalid, dead or no longer visible.
    TargetLost { target: EntityId },
}
