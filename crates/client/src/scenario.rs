//! Scenario files for the simulator.
//!
//! A scenario describes the controlled actor, the automated capability, the
//! other entities a command may reference, and a timed script of user
//! orders and world changes. Scenarios are written in RON:
//!
//! ```ron
//! (
//!     name: "ward while walking",
//!     tick_ms: 30,
//!     duration_ms: 4000,
//!     actor: (id: 1, kind: "npc_dota_hero_venomancer", resource: 400.0),
//!     capability: (id: "venomancer_plague_ward", cooldown_ms: 5000, cost: 20.0),
//!     entities: [(id: 7)],
//!     script: [
//!         (at_ms: 0, action: User(Move(x: 300.0, y: 120.0))),
//!         (at_ms: 900, action: Kill(7)),
//!     ],
//! )
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use autocast_core::{CommandEvent, EntityId, OrderKind, Position, Targeting};

const BUNDLED: &str = include_str!("../scenarios/plague_ward.ron");

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    /// Simulated host tick length.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    pub duration_ms: u64,
    pub actor: ActorSpec,
    pub capability: CapabilitySpec,
    #[serde(default)]
    pub entities: Vec<EntitySpec>,
    #[serde(default)]
    pub script: Vec<ScriptStep>,
}

fn default_tick_ms() -> u64 {
    30
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActorSpec {
    pub id: u32,
    pub kind: String,
    pub resource: f32,
    /// Resource regained per second.
    #[serde(default)]
    pub resource_regen: f32,
    #[serde(default)]
    pub position: Position,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CapabilitySpec {
    pub id: String,
    #[serde(default = "default_level")]
    pub level: u32,
    pub cooldown_ms: u64,
    pub cost: f32,
    #[serde(default = "default_targeting")]
    pub targeting: Targeting,
}

fn default_level() -> u32 {
    1
}

fn default_targeting() -> Targeting {
    Targeting::SelfTarget
}

impl CapabilitySpec {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntitySpec {
    pub id: u32,
    #[serde(default = "yes")]
    pub alive: bool,
    #[serde(default = "yes")]
    pub visible: bool,
}

fn yes() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    pub at_ms: u64,
    pub action: ScriptAction,
}

/// Something that happens in the simulated world at a scripted time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ScriptAction {
    /// The user issues an order to the controlled actor.
    User(UserOrder),
    /// The host drops the actor's current order.
    ClearOrder,
    SetInvisible(bool),
    Kill(u32),
    SetEnabled(bool),
    SetRestoreEnabled(bool),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum UserOrder {
    Move {
        x: f32,
        y: f32,
        #[serde(default)]
        queue: bool,
    },
    AttackMove {
        x: f32,
        y: f32,
        #[serde(default)]
        queue: bool,
    },
    Attack {
        target: u32,
        #[serde(default)]
        queue: bool,
    },
    Follow {
        target: u32,
        #[serde(default)]
        queue: bool,
    },
    Hold,
    Stop,
}

impl UserOrder {
    /// Order event as the host would report it for `actor`.
    pub fn to_event(&self, actor: EntityId) -> CommandEvent {
        match *self {
            UserOrder::Move { x, y, queue } => CommandEvent::user(OrderKind::MoveToPosition, actor)
                .with_position(Position::new(x, y, 0.0))
                .queued(queue),
            UserOrder::AttackMove { x, y, queue } => CommandEvent::user(OrderKind::AttackMove, actor)
                .with_position(Position::new(x, y, 0.0))
                .queued(queue),
            UserOrder::Attack { target, queue } => CommandEvent::user(OrderKind::AttackTarget, actor)
                .with_target(EntityId(target))
                .queued(queue),
            UserOrder::Follow { target, queue } => CommandEvent::user(OrderKind::MoveToTarget, actor)
                .with_target(EntityId(target))
                .queued(queue),
            UserOrder::Hold => CommandEvent::user(OrderKind::HoldPosition, actor),
            UserOrder::Stop => CommandEvent::user(OrderKind::Stop, actor),
        }
    }
}

impl Scenario {
    /// Loads and validates a scenario file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid scenario {}", path.display()))
    }

    /// Scenario shipped with the binary.
    pub fn bundled() -> Result<Self> {
        Self::parse(BUNDLED).context("Invalid bundled scenario")
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut scenario: Scenario = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse scenario RON: {}", e))?;
        scenario.validate()?;
        scenario.script.sort_by_key(|step| step.at_ms);
        Ok(scenario)
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.tick_ms > 0, "tick_ms must be greater than zero");
        ensure!(!self.capability.id.is_empty(), "capability id must not be empty");
        for step in &self.script {
            if let ScriptAction::Kill(id) = step.action {
                ensure!(
                    self.entities.iter().any(|entity| entity.id == id),
                    "script kills unknown entity {}",
                    id
                );
            }
        }
        Ok(())
    }
}
