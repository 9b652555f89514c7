//! Traits describing the host environment the controller runs inside.
//!
//! The controller never owns game objects. It reads copies through
//! [`WorldView`] and issues fire-and-forget orders through
//! [`CommandIssuer`]; [`Host`] bundles both for the tick entry point.
use crate::capability::{CapabilityId, CapabilityState};
use crate::state::{ActorState, EntityId, EntityStatus, Position};

/// Read-only access to the host's object model.
pub trait WorldView: Send {
    /// The single actor under control, if the host currently has one.
    fn controlled_actor(&self) -> Option<ActorState>;

    /// Capabilities of `actor`. Empty when the actor is unknown.
    fn capabilities(&self, actor: EntityId) -> Vec<CapabilityState>;

    /// Status of an entity referenced by a captured command.
    ///
    /// Hosts return [`EntityStatus::GONE`] for entities they no longer track.
    fn entity_status(&self, entity: EntityId) -> EntityStatus;
}

/// Target handed to [`CommandIssuer::use_capability`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CapabilityTarget {
    Entity(EntityId),
    Point(Position),
    None,
}

/// Order issuance primitives.
///
/// The host processes orders asynchronously; `Ok` only means the order was
/// accepted into its pipeline.
pub trait CommandIssuer: Send {
    fn move_to_point(
        &mut self,
        actor: EntityId,
        position: Position,
        queue: bool,
    ) -> Result<(), IssueError>;

    fn attack_move(
        &mut self,
        actor: EntityId,
        position: Position,
        queue: bool,
    ) -> Result<(), IssueError>;

    fn attack_target(
        &mut self,
        actor: EntityId,
        target: EntityId,
        queue: bool,
    ) -> Result<(), IssueError>;

    fn move_to_target(
        &mut self,
        actor: EntityId,
        target: EntityId,
        queue: bool,
    ) -> Result<(), IssueError>;

    fn use_capability(
        &mut self,
        actor: EntityId,
        capability: &CapabilityId,
        target: CapabilityTarget,
    ) -> Result<(), IssueError>;
}

/// Full host surface consumed by [`crate::Controller::tick`].
pub trait Host: WorldView + CommandIssuer {}

impl<T: WorldView + CommandIssuer> Host for T {}

/// Failure reported by an issuance primitive.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IssueError {
    /// The host refused the order (unit busy, silenced, out of range, ...).
    #[error("host rejected the order: {0}")]
    Rejected(String),

    /// The actor disappeared between lookup and issuance.
    #[error("actor {0} is no longer controllable")]
    ActorUnavailable(EntityId),

    /// The host's order pipeline failed internally.
    #[error("host order pipeline failed: {0}")]
    Host(String),
}
