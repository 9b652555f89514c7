//! Gated automation controller for a single host-controlled actor.
//!
//! `autocast-core` decides when an automated capability may fire, issues it
//! one scheduler slot later, and then replays the command the user had in
//! flight before the interruption. It holds no I/O and no threads: the host
//! drives it from its tick callback and reaches back through the traits in
//! [`host`].
//!
//! Modules are organized by responsibility:
//! - [`gate`] decides readiness, [`limiter`] debounces repeats
//! - [`snapshot`] captures user commands behind a reentrancy guard
//! - [`controller`] owns session state and the poll loop; the executor and
//!   restoration halves of a cycle live in their own modules
//! - [`task`] is the deferred work queue keyed by game time
pub mod capability;
pub mod command;
pub mod config;
pub mod controller;
pub mod events;
pub mod gate;
pub mod host;
pub mod limiter;
pub mod snapshot;
pub mod state;
pub mod task;
pub mod time;

mod executor;
mod restore;

pub use capability::{CapabilityId, CapabilityLookup, CapabilityState, Targeting};
pub use command::{Command, CommandEvent, CommandKind, CommandSource, OrderKind, Staleness};
pub use config::{ConfigError, ControllerConfig};
pub use controller::{Controller, ControllerStatus};
pub use events::{ControllerEvent, SkipReason};
pub use gate::{BlockReason, GateContext, ReadinessGate};
pub use host::{CapabilityTarget, CommandIssuer, Host, IssueError, WorldView};
pub use limiter::RateLimiter;
pub use snapshot::{CaptureRejection, CommandListener, ReentrancyGuard, SnapshotStore};
pub use state::{ActorState, EntityId, EntityStatus, Position};
pub use task::{RestoreSlot, Task, TaskQueue};
pub use time::GameTime;
