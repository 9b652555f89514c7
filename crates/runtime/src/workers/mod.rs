//! Worker tasks that back the runtime orchestration.
//!
//! The automation worker owns the controller and the host; everything else
//! talks to it through commands.

mod automation;

pub use automation::{AutomationWorker, Command};
