//! Restoration engine: replays the user's command after the automated action.
//!
//! Several attempts are scheduled per cycle to absorb host order latency.
//! They replay the same intent; each re-resolves the snapshot, preferring a
//! command the user issued after the action over the pre-action copy.
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::command::{Command, CommandKind, OrderKind};
use crate::controller::Controller;
use crate::events::{ControllerEvent, SkipReason};
use crate::host::{Host, IssueError};
use crate::state::EntityId;
use crate::task::RestoreSlot;
use crate::time::GameTime;

impl Controller {
    /// Runs one restoration attempt.
    ///
    /// Capture is blocked for the whole attempt and released on every exit
    /// path. A slot dispatches at most once; repeated calls for a slot that
    /// already dispatched are skipped.
    pub fn restore_attempt(
        &mut self,
        slot: RestoreSlot,
        fallback: Option<&Command>,
        now: GameTime,
        host: &mut dyn Host,
    ) -> ControllerEvent {
        let skipped = |reason: SkipReason| {
            debug!(cycle = slot.cycle, attempt = slot.attempt, ?reason, "restoration skipped");
            ControllerEvent::RestorationSkipped { slot, reason }
        };

        if self.last_restored.is_some_and(|last| slot <= last) {
            return skipped(SkipReason::AlreadyDispatched);
        }

        let store = Arc::clone(&self.store);
        let _guard = store.enter_guard();

        if !self.config.restore_enabled {
            return skipped(SkipReason::Disabled);
        }
        let Some(command) = store.current().or_else(|| fallback.cloned()) else {
            return skipped(SkipReason::NoSnapshot);
        };
        if let Err(staleness) =
            command.check_fresh(now, self.config.max_snapshot_age, |id| host.entity_status(id))
        {
            return skipped(SkipReason::Stale(staleness));
        }
        let Some(actor) = host.controlled_actor().filter(|actor| actor.is_usable()) else {
            return skipped(SkipReason::ActorUnavailable);
        };

        match dispatch(host, actor.id, &command) {
            Ok(()) => {
                self.last_restored = Some(slot);
                info!(
                    cycle = slot.cycle,
                    attempt = slot.attempt,
                    kind = %command.kind(),
                    age_ms = u64::try_from(command.age(now).as_millis()).unwrap_or(u64::MAX),
                    "restored user command"
                );
                ControllerEvent::RestorationDispatched {
                    slot,
                    kind: command.kind(),
                }
            }
            Err(DispatchError::Unsupported(kind)) => skipped(SkipReason::Unsupported(kind)),
            Err(DispatchError::MissingOperand) => {
                skipped(SkipReason::MissingOperand(command.kind()))
            }
            Err(DispatchError::Issue(error)) => {
                warn!(cycle = slot.cycle, attempt = slot.attempt, %error, "failed to restore user command");
                skipped(SkipReason::DispatchFailed(error))
            }
        }
    }
}

enum DispatchError {
    Unsupported(OrderKind),
    MissingOperand,
    Issue(IssueError),
}

impl From<IssueError> for DispatchError {
    fn from(error: IssueError) -> Self {
        DispatchError::Issue(error)
    }
}

/// Issues `command` through the primitive matching its kind.
fn dispatch(
    issuer: &mut dyn Host,
    actor: EntityId,
    command: &Command,
) -> Result<(), DispatchError> {
    let queue = command.queue();
    match command.kind() {
        CommandKind::MoveToPoint => {
            let position = command.position().ok_or(DispatchError::MissingOperand)?;
            issuer.move_to_point(actor, position, queue)?;
        }
        CommandKind::AttackPoint => {
            let position = command.position().ok_or(DispatchError::MissingOperand)?;
            issuer.attack_move(actor, position, queue)?;
        }
        // Hosts expose no dedicated focus primitive; a plain attack order
        // keeps the same target.
        CommandKind::AttackTarget | CommandKind::AttackTargetFocus => {
            let target = command.target().ok_or(DispatchError::MissingOperand)?;
            issuer.attack_target(actor, target, queue)?;
        }
        CommandKind::MoveToTarget => {
            let target = command.target().ok_or(DispatchError::MissingOperand)?;
            issuer.move_to_target(actor, target, queue)?;
        }
        CommandKind::Unsupported(kind) => return Err(DispatchError::Unsupported(kind)),
    }
    Ok(())
}
