//! Outcomes reported by the controller.
//!
//! Every call into the controller that can change something returns the
//! events it produced, so hosts can log or forward them without the core
//! knowing about any sink.
use crate::capability::CapabilityId;
use crate::command::{CommandKind, OrderKind, Staleness};
use crate::gate::BlockReason;
use crate::host::IssueError;
use crate::snapshot::CaptureRejection;
use crate::task::RestoreSlot;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ControllerEvent {
    /// A poll evaluated the gate and it refused.
    Blocked { reason: BlockReason },
    /// The gate passed; execution is deferred to the next slot.
    Triggered { cycle: u64 },
    /// Re-validation at execution time failed; nothing was issued.
    ExecutionAborted { cycle: u64, reason: BlockReason },
    ActionIssued {
        cycle: u64,
        capability: CapabilityId,
    },
    /// The host refused the action. Rate limiter and clocks are untouched.
    ActionFailed { cycle: u64, error: IssueError },
    RestorationDispatched { slot: RestoreSlot, kind: CommandKind },
    RestorationSkipped { slot: RestoreSlot, reason: SkipReason },
    CommandCaptured { kind: CommandKind },
    CommandIgnored { rejection: CaptureRejection },
}

/// Why a restoration attempt ended without dispatching.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SkipReason {
    /// This slot (or a later one) already dispatched.
    AlreadyDispatched,
    Disabled,
    NoSnapshot,
    Stale(Staleness),
    ActorUnavailable,
    Unsupported(OrderKind),
    /// The command lacks the position or target its kind requires.
    MissingOperand(CommandKind),
    DispatchFailed(IssueError),
}
