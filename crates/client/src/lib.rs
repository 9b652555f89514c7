//! Scenario simulator for the autocast controller.
//!
//! # Architecture
//!
//! ```text
//! main (composition root)
//!   ├─→ Scenario (RON file: actor, capability, entities, script)
//!   ├─→ SimWorld / SimulatedHost (host state behind a mutex)
//!   └─→ Runtime (controller on a worker task, driven by Simulation)
//! ```
//!
//! The simulator exists to exercise the controller end to end: scripted
//! user orders go in as order events, the controller's actions and
//! restorations come out as host orders, and every controller event is
//! logged and kept in the [`simulation::SimulationReport`].

pub mod config;
pub mod host;
pub mod logging;
pub mod scenario;
pub mod simulation;

pub use config::SimConfig;
pub use host::{IssuedOrder, SimOrder, SimWorld, SimulatedHost};
pub use scenario::Scenario;
pub use simulation::{Simulation, SimulationReport};
