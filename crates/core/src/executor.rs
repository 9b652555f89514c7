//! Action executor: deferred, re-validated issuance of the automated action.
use tracing::{debug, info, warn};

use crate::capability::Targeting;
use crate::controller::Controller;
use crate::events::ControllerEvent;
use crate::gate::BlockReason;
use crate::host::{CapabilityTarget, Host};
use crate::task::{RestoreSlot, Task};
use crate::time::GameTime;

impl Controller {
    /// Starts a cycle whose gate already passed.
    ///
    /// Execution is deferred to the next scheduler slot so it is ordered
    /// after any user command the host is still processing. Returns the
    /// cycle number.
    pub fn trigger(&mut self, now: GameTime) -> u64 {
        self.cycles += 1;
        let cycle = self.cycles;
        self.tasks.schedule(now, Task::Execute { cycle });
        debug!(cycle, at = %now, "cycle triggered");
        cycle
    }

    /// Deferred half of a cycle.
    ///
    /// State may have drifted since the gate passed, so actor, stealth,
    /// readiness, rate limiter and minimum interval are checked again. The enable toggle is
    /// not: it only gates new cycles.
    pub(crate) fn execute(
        &mut self,
        cycle: u64,
        now: GameTime,
        host: &mut dyn Host,
    ) -> ControllerEvent {
        let aborted = |reason: BlockReason| {
            debug!(cycle, %reason, "execution aborted");
            ControllerEvent::ExecutionAborted { cycle, reason }
        };

        let Some(actor) = host.controlled_actor().filter(|actor| actor.is_usable()) else {
            return aborted(BlockReason::ActorUnavailable);
        };
        if actor.is_invisible {
            return aborted(BlockReason::ActorConcealed);
        }
        let Some(capability) = self.resolve_capability(&actor, &*host) else {
            return aborted(BlockReason::CapabilityMissing);
        };
        if !capability.is_available() {
            return aborted(BlockReason::NotReady);
        }
        if self.limiter.is_active(&self.limiter_key, now) {
            return aborted(BlockReason::RateLimited);
        }
        if now.duration_since(self.clock.last_action) < self.config.min_action_interval {
            return aborted(BlockReason::IntervalPending);
        }

        // Taken before issuing: the action itself may clear host order state.
        let pre_action = self.store.current();

        let target = match capability.targeting {
            Targeting::SelfTarget => CapabilityTarget::Entity(actor.id),
            Targeting::Point => CapabilityTarget::Point(actor.position),
            Targeting::NoTarget => CapabilityTarget::None,
        };
        if let Err(error) = host.use_capability(actor.id, &capability.id, target) {
            warn!(cycle, capability = %capability.id, %error, "failed to issue automated action");
            return ControllerEvent::ActionFailed { cycle, error };
        }

        self.limiter
            .arm(self.limiter_key.clone(), self.config.rate_limit_window, now);
        self.clock.last_action = now;
        info!(cycle, capability = %capability.id, at = %now, "automated action issued");

        for (index, delay) in self.config.restore_delays.iter().enumerate() {
            let slot = RestoreSlot {
                cycle,
                attempt: u8::try_from(index + 1).unwrap_or(u8::MAX),
            };
            self.tasks.schedule(
                now + *delay,
                Task::Restore {
                    slot,
                    fallback: pre_action.clone(),
                },
            );
        }

        ControllerEvent::ActionIssued {
            cycle,
            capability: capability.id,
        }
    }
}
