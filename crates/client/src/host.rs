//! Simulated host world.
//!
//! [`SimWorld`] is the authoritative state the scenario script mutates;
//! [`SimulatedHost`] is the view of it handed to the runtime worker. Both
//! sides share the world through a mutex, and every order the host accepts
//! is echoed to the controller's listener the way a real host reports
//! script-issued orders.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tracing::trace;

use autocast_core::{
    ActorState, CapabilityId, CapabilityState, CapabilityTarget, CommandEvent, CommandIssuer,
    CommandListener, EntityId, EntityStatus, GameTime, IssueError, OrderKind, Position,
    WorldView,
};

use crate::scenario::Scenario;

/// Order accepted by the simulated host.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum SimOrder {
    Move { position: Position, queue: bool },
    AttackMove { position: Position, queue: bool },
    Attack { target: EntityId, queue: bool },
    Follow { target: EntityId, queue: bool },
    Use { capability: CapabilityId },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IssuedOrder {
    pub at: GameTime,
    pub order: SimOrder,
}

#[derive(Debug)]
pub struct SimWorld {
    clock: GameTime,
    actor: ActorState,
    resource_regen: f32,
    capability: CapabilityState,
    cooldown: Duration,
    entities: HashMap<EntityId, EntityStatus>,
    current_order: Option<SimOrder>,
    order_cleared: bool,
    issued: Vec<IssuedOrder>,
}

impl SimWorld {
    pub fn from_scenario(scenario: &Scenario) -> Self {
        let actor = ActorState {
            id: EntityId(scenario.actor.id),
            kind: scenario.actor.kind.clone(),
            is_valid: true,
            is_alive: true,
            is_invisible: false,
            resource: scenario.actor.resource,
            position: scenario.actor.position,
        };
        let capability = CapabilityState {
            id: CapabilityId::new(scenario.capability.id.clone()),
            level: scenario.capability.level,
            is_ready: true,
            is_casting: false,
            cooldown_remaining: Duration::ZERO,
            cost: scenario.capability.cost,
            targeting: scenario.capability.targeting,
        };
        let entities = scenario
            .entities
            .iter()
            .map(|spec| {
                let status = EntityStatus {
                    is_valid: true,
                    is_alive: spec.alive,
                    is_visible: spec.visible,
                };
                (EntityId(spec.id), status)
            })
            .collect();

        Self {
            clock: GameTime::ZERO,
            actor,
            resource_regen: scenario.actor.resource_regen,
            capability,
            cooldown: scenario.capability.cooldown(),
            entities,
            current_order: None,
            order_cleared: false,
            issued: Vec::new(),
        }
    }

    pub fn into_shared(self) -> SharedWorld {
        Arc::new(Mutex::new(self))
    }

    pub fn actor_id(&self) -> EntityId {
        self.actor.id
    }

    /// Moves the world clock to `now`, running cooldowns and regeneration.
    pub fn advance(&mut self, now: GameTime) {
        let elapsed = now.duration_since(self.clock);
        self.clock = now;
        if elapsed.is_zero() {
            return;
        }

        let remaining = self.capability.cooldown_remaining.saturating_sub(elapsed);
        self.capability.cooldown_remaining = remaining;
        self.capability.is_ready = remaining.is_zero();
        self.actor.resource += self.resource_regen * elapsed.as_secs_f32();
    }

    pub fn set_invisible(&mut self, invisible: bool) {
        self.actor.is_invisible = invisible;
    }

    pub fn kill(&mut self, entity: EntityId) {
        if let Some(status) = self.entities.get_mut(&entity) {
            status.is_alive = false;
        }
    }

    /// Follows a user order into the world's current order; `None` idles.
    pub fn apply_user_order(&mut self, order: Option<SimOrder>) {
        self.current_order = order;
    }

    /// Drops the current order, as hosts do when a cast interrupts it.
    pub fn clear_order(&mut self) {
        self.current_order = None;
        self.order_cleared = true;
    }

    /// Returns whether the current order was cleared since the last call.
    pub fn take_order_cleared(&mut self) -> bool {
        std::mem::take(&mut self.order_cleared)
    }

    pub fn current_order(&self) -> Option<&SimOrder> {
        self.current_order.as_ref()
    }

    pub fn issued(&self) -> &[IssuedOrder] {
        &self.issued
    }

    fn accept(&mut self, order: SimOrder) {
        trace!(at = %self.clock, ?order, "host accepted order");
        self.issued.push(IssuedOrder {
            at: self.clock,
            order: order.clone(),
        });
        if !matches!(order, SimOrder::Use { .. }) {
            self.current_order = Some(order);
        }
    }
}

pub type SharedWorld = Arc<Mutex<SimWorld>>;

pub fn lock(world: &SharedWorld) -> MutexGuard<'_, SimWorld> {
    world.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Host half handed to the runtime.
pub struct SimulatedHost {
    world: SharedWorld,
    listener: Option<CommandListener>,
}

impl SimulatedHost {
    pub fn new(world: SharedWorld, listener: Option<CommandListener>) -> Self {
        Self { world, listener }
    }

    fn issue(&mut self, actor: EntityId, order: SimOrder, echo: CommandEvent) -> Result<(), IssueError> {
        self.issue_with(actor, order, echo, |_| Ok(()))
    }

    /// Accepts `order` once the actor checks out and `apply` succeeds, all
    /// under one world lock, then echoes it to the listener.
    fn issue_with<F>(
        &mut self,
        actor: EntityId,
        order: SimOrder,
        echo: CommandEvent,
        apply: F,
    ) -> Result<(), IssueError>
    where
        F: FnOnce(&mut SimWorld) -> Result<(), IssueError>,
    {
        let (now, controlled) = {
            let mut guard = lock(&self.world);
            let world = &mut *guard;
            if actor != world.actor.id || !world.actor.is_usable() {
                return Err(IssueError::ActorUnavailable(actor));
            }
            apply(world)?;
            world.accept(order);
            (world.clock, world.actor.id)
        };

        // The world lock is released: the listener may run arbitrary capture code.
        if let Some(listener) = &self.listener {
            let _ = listener.on_command(&echo.synthetic(), now, Some(controlled));
        }
        Ok(())
    }
}

impl WorldView for SimulatedHost {
    fn controlled_actor(&self) -> Option<ActorState> {
        Some(lock(&self.world).actor.clone())
    }

    fn capabilities(&self, actor: EntityId) -> Vec<CapabilityState> {
        let world = lock(&self.world);
        if world.actor.id == actor {
            vec![world.capability.clone()]
        } else {
            Vec::new()
        }
    }

    fn entity_status(&self, entity: EntityId) -> EntityStatus {
        lock(&self.world)
            .entities
            .get(&entity)
            .copied()
            .unwrap_or(EntityStatus::GONE)
    }
}

impl CommandIssuer for SimulatedHost {
    fn move_to_point(
        &mut self,
        actor: EntityId,
        position: Position,
        queue: bool,
    ) -> Result<(), IssueError> {
        let echo = CommandEvent::user(OrderKind::MoveToPosition, actor)
            .with_position(position)
            .queued(queue);
        self.issue(actor, SimOrder::Move { position, queue }, echo)
    }

    fn attack_move(
        &mut self,
        actor: EntityId,
        position: Position,
        queue: bool,
    ) -> Result<(), IssueError> {
        let echo = CommandEvent::user(OrderKind::AttackMove, actor)
            .with_position(position)
            .queued(queue);
        self.issue(actor, SimOrder::AttackMove { position, queue }, echo)
    }

    fn attack_target(
        &mut self,
        actor: EntityId,
        target: EntityId,
        queue: bool,
    ) -> Result<(), IssueError> {
        let echo = CommandEvent::user(OrderKind::AttackTarget, actor)
            .with_target(target)
            .queued(queue);
        self.issue(actor, SimOrder::Attack { target, queue }, echo)
    }

    fn move_to_target(
        &mut self,
        actor: EntityId,
        target: EntityId,
        queue: bool,
    ) -> Result<(), IssueError> {
        let echo = CommandEvent::user(OrderKind::MoveToTarget, actor)
            .with_target(target)
            .queued(queue);
        self.issue(actor, SimOrder::Follow { target, queue }, echo)
    }

    fn use_capability(
        &mut self,
        actor: EntityId,
        capability: &CapabilityId,
        target: CapabilityTarget,
    ) -> Result<(), IssueError> {
        let mut echo = CommandEvent::user(OrderKind::CastNoTarget, actor)
            .with_capability(capability.clone());
        match target {
            CapabilityTarget::Entity(entity) => {
                echo = echo.with_target(entity);
                echo.kind = OrderKind::CastTarget;
            }
            CapabilityTarget::Point(position) => {
                echo = echo.with_position(position);
                echo.kind = OrderKind::CastPosition;
            }
            CapabilityTarget::None => {}
        }
        let order = SimOrder::Use {
            capability: capability.clone(),
        };
        self.issue_with(actor, order, echo, |world| {
            if world.capability.id != *capability {
                return Err(IssueError::Rejected(format!("unknown capability {}", capability)));
            }
            if !world.capability.is_available() {
                return Err(IssueError::Rejected(format!("{} is not ready", capability)));
            }
            if world.actor.resource < world.capability.cost {
                return Err(IssueError::Rejected("not enough mana".into()));
            }
            world.actor.resource -= world.capability.cost;
            world.capability.cooldown_remaining = world.cooldown;
            world.capability.is_ready = world.cooldown.is_zero();
            Ok(())
        })?;

        // Casting interrupts whatever the actor was doing.
        lock(&self.world).clear_order();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> SimWorld {
        SimWorld::from_scenario(&Scenario::parse(
            r#"(
                name: "unit",
                tick_ms: 10,
                duration_ms: 100,
                actor: (id: 1, kind: "npc_dota_hero_venomancer", resource: 30.0, resource_regen: 2.0),
                capability: (id: "venomancer_plague_ward", cooldown_ms: 1000, cost: 20.0),
                entities: [(id: 7)],
            )"#,
        )
        .unwrap())
    }

    #[test]
    fn cast_applies_cooldown_cost_and_clears_order() {
        let shared = world().into_shared();
        let mut host = SimulatedHost::new(Arc::clone(&shared), None);
        let ward = CapabilityId::new("venomancer_plague_ward");
        host.move_to_point(EntityId(1), Position::new(5.0, 5.0, 0.0), false)
            .unwrap();

        host.use_capability(EntityId(1), &ward, CapabilityTarget::Entity(EntityId(1)))
            .unwrap();

        let mut world = lock(&shared);
        assert!(world.current_order().is_none());
        assert!(world.take_order_cleared());
        assert!(!world.take_order_cleared());
        assert_eq!(world.actor.resource, 10.0);
        assert!(!world.capability.is_ready);
        drop(world);

        let err = host
            .use_capability(EntityId(1), &ward, CapabilityTarget::None)
            .unwrap_err();
        assert!(matches!(err, IssueError::Rejected(_)));
    }

    #[test]
    fn cast_by_unusable_actor_leaves_world_uncharged() {
        let shared = world().into_shared();
        let mut host = SimulatedHost::new(Arc::clone(&shared), None);
        let ward = CapabilityId::new("venomancer_plague_ward");
        lock(&shared).actor.is_alive = false;

        let err = host
            .use_capability(EntityId(1), &ward, CapabilityTarget::None)
            .unwrap_err();

        assert!(matches!(err, IssueError::ActorUnavailable(EntityId(1))));
        let world = lock(&shared);
        assert_eq!(world.actor.resource, 30.0);
        assert!(world.capability.is_ready);
        assert!(world.issued().is_empty());
    }

    #[test]
    fn advance_runs_cooldown_and_regen() {
        let mut world = world();
        world.capability.cooldown_remaining = Duration::from_millis(800);
        world.capability.is_ready = false;

        world.advance(GameTime(500));
        assert_eq!(
            world.capability.cooldown_remaining,
            Duration::from_millis(300)
        );
        assert!(!world.capability.is_ready);

        world.advance(GameTime(1000));
        assert!(world.capability.is_ready);
        assert_eq!(world.actor.resource, 32.0);
    }

    #[test]
    fn dead_or_unknown_entities_are_not_targetable() {
        let shared = world().into_shared();
        let host = SimulatedHost::new(Arc::clone(&shared), None);
        assert!(host.entity_status(EntityId(7)).is_targetable());

        lock(&shared).kill(EntityId(7));

        assert!(!host.entity_status(EntityId(7)).is_targetable());
        assert_eq!(host.entity_status(EntityId(99)), EntityStatus::GONE);
    }
}
