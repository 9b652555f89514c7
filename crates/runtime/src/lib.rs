//! Runtime orchestration for the automation controller.
//!
//! This crate moves an [`autocast_core::Controller`] and its host onto a
//! tokio worker task and exposes it through a cloneable [`RuntimeHandle`].
//! Consumers embed [`Runtime`] to drive ticks, forward order events, and
//! subscribe to controller events.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`config`] loads runtime and controller tunables from the environment
//! - [`events`] provides topic-based event bus for flexible event routing
//! - `workers` keeps the background task internal to the crate
pub mod api;
pub mod config;
pub mod events;
pub mod runtime;

mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use config::RuntimeConfig;
pub use events::{Event, EventBus, Topic};
pub use runtime::{Runtime, RuntimeBuilder};
