//! In-memory host used by the controller integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;

use autocast_core::{
    ActorState, CapabilityId, CapabilityState, CapabilityTarget, CaptureRejection, CommandEvent,
    CommandIssuer, CommandListener, CommandSource, Controller, ControllerConfig, ControllerEvent,
    EntityId, EntityStatus, GameTime, IssueError, OrderKind, Position, Targeting, WorldView,
};

pub const HERO: EntityId = EntityId(1);
pub const WARD: &str = "venomancer_plague_ward";

/// Order accepted by [`FakeHost`].
#[derive(Clone, Debug, PartialEq)]
pub enum Issued {
    MoveToPoint { position: Position, queue: bool },
    AttackMove { position: Position, queue: bool },
    AttackTarget { target: EntityId, queue: bool },
    MoveToTarget { target: EntityId, queue: bool },
    UseCapability { capability: CapabilityId, target: CapabilityTarget },
}

pub struct FakeHost {
    pub actor: Option<ActorState>,
    pub capabilities: Vec<CapabilityState>,
    pub entities: HashMap<EntityId, EntityStatus>,
    pub issued: Vec<Issued>,
    /// Cooldown applied to a capability once it has been used.
    pub cooldown_on_use: Duration,
    pub fail_next_use: Option<IssueError>,
    pub fail_orders: Option<IssueError>,
    /// Fires every accepted order back into this listener, synchronously,
    /// the way some hosts report script orders as regular order events.
    pub echo: Option<CommandListener>,
    pub echo_source: CommandSource,
    pub echo_results: Vec<Result<(), CaptureRejection>>,
    pub clock: GameTime,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            actor: Some(hero()),
            capabilities: vec![ward()],
            entities: HashMap::new(),
            issued: Vec::new(),
            cooldown_on_use: Duration::ZERO,
            fail_next_use: None,
            fail_orders: None,
            echo: None,
            echo_source: CommandSource::Synthetic,
            echo_results: Vec::new(),
            clock: GameTime::ZERO,
        }
    }

    pub fn actor_mut(&mut self) -> &mut ActorState {
        self.actor.as_mut().expect("actor present")
    }

    pub fn ward_mut(&mut self) -> &mut CapabilityState {
        &mut self.capabilities[0]
    }

    pub fn uses(&self) -> usize {
        self.issued
            .iter()
            .filter(|order| matches!(order, Issued::UseCapability { .. }))
            .count()
    }

    pub fn restorations(&self) -> Vec<Issued> {
        self.issued
            .iter()
            .filter(|order| !matches!(order, Issued::UseCapability { .. }))
            .cloned()
            .collect()
    }

    fn accept(&mut self, order: Issued, echo: CommandEvent) -> Result<(), IssueError> {
        if let Some(error) = self.fail_orders.clone() {
            return Err(error);
        }
        self.issued.push(order);
        self.fire_echo(echo);
        Ok(())
    }

    fn fire_echo(&mut self, mut event: CommandEvent) {
        if let Some(listener) = &self.echo {
            event.source = self.echo_source;
            let controlled = self.actor.as_ref().map(|actor| actor.id);
            let result = listener.on_command(&event, self.clock, controlled);
            self.echo_results.push(result);
        }
    }
}

impl WorldView for FakeHost {
    fn controlled_actor(&self) -> Option<ActorState> {
        self.actor.clone()
    }

    fn capabilities(&self, actor: EntityId) -> Vec<CapabilityState> {
        match &self.actor {
            Some(hero) if hero.id == actor => self.capabilities.clone(),
            _ => Vec::new(),
        }
    }

    fn entity_status(&self, entity: EntityId) -> EntityStatus {
        self.entities
            .get(&entity)
            .copied()
            .unwrap_or(EntityStatus::GONE)
    }
}

impl CommandIssuer for FakeHost {
    fn move_to_point(
        &mut self,
        actor: EntityId,
        position: Position,
        queue: bool,
    ) -> Result<(), IssueError> {
        let echo = CommandEvent::user(OrderKind::MoveToPosition, actor)
            .with_position(position)
            .queued(queue);
        self.accept(Issued::MoveToPoint { position, queue }, echo)
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
        self.accept(Issued::AttackMove { position, queue }, echo)
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
        self.accept(Issued::AttackTarget { target, queue }, echo)
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
        self.accept(Issued::MoveToTarget { target, queue }, echo)
    }

    fn use_capability(
        &mut self,
        actor: EntityId,
        capability: &CapabilityId,
        target: CapabilityTarget,
    ) -> Result<(), IssueError> {
        if let Some(error) = self.fail_next_use.take() {
            return Err(error);
        }
        let cooldown = self.cooldown_on_use;
        let mut cost = 0.0;
        if let Some(state) = self.capabilities.iter_mut().find(|c| &c.id == capability) {
            state.cooldown_remaining = cooldown;
            state.is_ready = cooldown.is_zero();
            cost = state.cost;
        }
        if let Some(hero) = self.actor.as_mut() {
            hero.resource -= cost;
        }
        self.issued.push(Issued::UseCapability {
            capability: capability.clone(),
            target,
        });

        let mut echo = CommandEvent::user(OrderKind::CastTarget, actor)
            .with_capability(capability.clone());
        if let CapabilityTarget::Entity(entity) = target {
            echo = echo.with_target(entity);
        }
        self.fire_echo(echo);
        Ok(())
    }
}

pub fn hero() -> ActorState {
    ActorState {
        id: HERO,
        kind: "npc_dota_hero_venomancer".into(),
        is_valid: true,
        is_alive: true,
        is_invisible: false,
        resource: 500.0,
        position: Position::new(-1200.0, 300.0, 128.0),
    }
}

pub fn ward() -> CapabilityState {
    CapabilityState {
        id: CapabilityId::new(WARD),
        level: 1,
        is_ready: true,
        is_casting: false,
        cooldown_remaining: Duration::ZERO,
        cost: 20.0,
        targeting: Targeting::SelfTarget,
    }
}

pub fn controller() -> Controller {
    Controller::new(ControllerConfig::default()).expect("default config is valid")
}

pub fn t(millis: i64) -> GameTime {
    GameTime::from_millis(millis)
}

/// Ticks every `step` ms over `[from, to]`, collecting events with their time.
pub fn run(
    controller: &mut Controller,
    host: &mut FakeHost,
    from: i64,
    to: i64,
    step: i64,
) -> Vec<(GameTime, ControllerEvent)> {
    let mut events = Vec::new();
    let mut now = from;
    while now <= to {
        host.clock = t(now);
        for event in controller.tick(t(now), host) {
            events.push((t(now), event));
        }
        now += step;
    }
    events
}

pub fn user_move(x: f32, y: f32) -> CommandEvent {
    CommandEvent::user(OrderKind::MoveToPosition, HERO).with_position(Position::new(x, y, 0.0))
}

pub fn user_attack(target: EntityId) -> CommandEvent {
    CommandEvent::user(OrderKind::AttackTarget, HERO).with_target(target)
}
