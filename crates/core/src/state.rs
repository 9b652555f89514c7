//! Read-only views of host entities.
//!
//! The host owns every unit in the world. The controller only ever sees
//! copies taken at the moment it asks, so nothing here is kept across ticks
//! except an [`EntityId`] inside a captured command.
use std::fmt;

/// Host identifier of an entity (unit, hero, ward, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// World position in host units.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: f32,
    pub y: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub z: f32,
}

impl Position {
    pub const ORIGIN: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}

/// Copy of the controlled actor as reported by the host.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorState {
    pub id: EntityId,
    /// Host unit name, e.g. `npc_dota_hero_venomancer`.
    pub kind: String,
    pub is_valid: bool,
    pub is_alive: bool,
    /// Invisible or stealthed. Acting would reveal the actor.
    pub is_invisible: bool,
    /// Resource balance spent by capabilities (mana).
    pub resource: f32,
    pub position: Position,
}

impl ActorState {
    /// Returns true if the host still considers the actor controllable.
    #[inline]
    pub fn is_usable(&self) -> bool {
        self.is_valid && self.is_alive
    }
}

/// Liveness of an entity referenced by a captured command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityStatus {
    pub is_valid: bool,
    pub is_alive: bool,
    pub is_visible: bool,
}

impl EntityStatus {
    /// Status reported for entities the host no longer knows about.
    pub const GONE: Self = Self {
        is_valid: false,
        is_alive: false,
        is_visible: false,
    };

    pub const VISIBLE: Self = Self {
        is_valid: true,
        is_alive: true,
        is_visible: true,
    };

    /// An order may still be aimed at this entity.
    #[inline]
    pub fn is_targetable(self) -> bool {
        self.is_valid && self.is_alive && self.is_visible
    }
}
