//! Readiness gate: may the automated action fire now?
//!
//! The gate is a pure function over copies of host state. Checks run in a
//! fixed order and the first failing one is reported as a [`BlockReason`];
//! missing data always fails closed.
use std::time::Duration;

use crate::capability::CapabilityState;
use crate::limiter::RateLimiter;
use crate::state::ActorState;
use crate::time::GameTime;

/// First gate check that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlockReason {
    /// The actor has no matching capability.
    CapabilityMissing,
    NotLearned,
    /// Actor absent, invalid or dead.
    ActorUnavailable,
    /// Controlled actor is not the kind this controller automates.
    ActorKindMismatch,
    /// Actor is invisible; acting would reveal it.
    ActorConcealed,
    RateLimited,
    /// Not ready or still casting.
    NotReady,
    OnCooldown,
    InsufficientResource,
    /// Minimum interval since the last successful action not yet elapsed.
    IntervalPending,
}

/// Inputs of one gate evaluation.
#[derive(Clone, Copy, Debug)]
pub struct GateContext<'a> {
    pub actor: Option<&'a ActorState>,
    pub capability: Option<&'a CapabilityState>,
    pub limiter: &'a RateLimiter,
    pub limiter_key: &'a str,
    pub last_action: GameTime,
    pub now: GameTime,
}

/// Evaluates the gate checks in order.
#[derive(Clone, Copy, Debug)]
pub struct ReadinessGate {
    min_action_interval: Duration,
}

impl ReadinessGate {
    pub fn new(min_action_interval: Duration) -> Self {
        Self {
            min_action_interval,
        }
    }

    pub fn evaluate(&self, ctx: &GateContext<'_>) -> Result<(), BlockReason> {
        let capability = ctx.capability.ok_or(BlockReason::CapabilityMissing)?;
        if capability.level == 0 {
            return Err(BlockReason::NotLearned);
        }

        let actor = ctx
            .actor
            .filter(|actor| actor.is_usable())
            .ok_or(BlockReason::ActorUnavailable)?;
        // Hard veto, checked before anything cooldown-related.
        if actor.is_invisible {
            return Err(BlockReason::ActorConcealed);
        }

        if ctx.limiter.is_active(ctx.limiter_key, ctx.now) {
            return Err(BlockReason::RateLimited);
        }
        if !capability.is_ready || capability.is_casting {
            return Err(BlockReason::NotReady);
        }
        if !capability.cooldown_remaining.is_zero() {
            return Err(BlockReason::OnCooldown);
        }
        if actor.resource < capability.cost {
            return Err(BlockReason::InsufficientResource);
        }
        if ctx.now.duration_since(ctx.last_action) < self.min_action_interval {
            return Err(BlockReason::IntervalPending);
        }

        Ok(())
    }

    pub fn can_act(&self, ctx: &GateContext<'_>) -> bool {
        self.evaluate(ctx).is_ok()
    }
}
