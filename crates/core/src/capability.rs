//! The automated capability and how the controller finds it on the actor.
use std::fmt;
use std::time::Duration;

/// Stable host identifier of a capability, e.g. `venomancer_plague_ward`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CapabilityId(pub String);

impl CapabilityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How the capability is aimed when the controller uses it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Targeting {
    /// Cast on the actor itself.
    SelfTarget,
    /// Cast at the actor's current position.
    Point,
    /// No target at all.
    NoTarget,
}

/// Copy of a capability as reported by the host.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CapabilityState {
    pub id: CapabilityId,
    /// Learned level; zero means not learned yet.
    pub level: u32,
    pub is_ready: bool,
    /// Currently in its cast animation or channel.
    pub is_casting: bool,
    pub cooldown_remaining: Duration,
    pub cost: f32,
    pub targeting: Targeting,
}

impl CapabilityState {
    /// Ready, idle and off cooldown: the host would accept a use order now.
    pub fn is_available(&self) -> bool {
        self.is_ready && !self.is_casting && self.cooldown_remaining.is_zero()
    }
}

/// Resolves the automated capability among the actor's capabilities.
///
/// The exact identifier wins; when it is absent the first capability whose
/// identifier contains `pattern` is used (hosts rename abilities between
/// versions, the stem survives).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapabilityLookup {
    id: CapabilityId,
    pattern: Option<String>,
}

impl CapabilityLookup {
    pub fn new(id: CapabilityId, pattern: Option<String>) -> Self {
        let pattern = pattern.filter(|p| !p.is_empty());
        Self { id, pattern }
    }

    pub fn id(&self) -> &CapabilityId {
        &self.id
    }

    pub fn find<'a>(&self, capabilities: &'a [CapabilityState]) -> Option<&'a CapabilityState> {
        capabilities
            .iter()
            .find(|c| c.id == self.id)
            .or_else(|| capabilities.iter().find(|c| self.matches_pattern(&c.id)))
    }

    /// Returns true if `id` names the automated capability.
    ///
    /// Used to recognize orders produced by the controller's own action.
    pub fn matches(&self, id: &CapabilityId) -> bool {
        *id == self.id || self.matches_pattern(id)
    }

    fn matches_pattern(&self, id: &CapabilityId) -> bool {
        self.pattern
            .as_deref()
            .is_some_and(|pattern| id.as_str().contains(pattern))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capability(id: &str) -> CapabilityState {
        CapabilityState {
            id: CapabilityId::new(id),
            level: 1,
            is_ready: true,
            is_casting: false,
            cooldown_remaining: Duration::ZERO,
            cost: 0.0,
            targeting: Targeting::SelfTarget,
        }
    }

    #[test]
    fn exact_identifier_beats_pattern() {
        let lookup = CapabilityLookup::new(
            CapabilityId::new("venomancer_plague_ward"),
            Some("plague_ward".into()),
        );
        let caps = vec![
            capability("venomancer_plague_ward_legacy"),
            capability("venomancer_plague_ward"),
        ];

        let found = lookup.find(&caps).map(|c| c.id.as_str());
        assert_eq!(found, Some("venomancer_plague_ward"));
    }

    #[test]
    fn pattern_is_used_when_identifier_missing() {
        let lookup = CapabilityLookup::new(
            CapabilityId::new("venomancer_plague_ward"),
            Some("plague_ward".into()),
        );
        let caps = vec![capability("venomancer_venomous_gale"), capability("plague_ward_v2")];

        assert_eq!(lookup.find(&caps).map(|c| c.id.as_str()), Some("plague_ward_v2"));
        assert!(lookup.matches(&CapabilityId::new("plague_ward_v2")));
        assert!(!lookup.matches(&CapabilityId::new("venomancer_venomous_gale")));
    }

    #[test]
    fn empty_pattern_matches_nothing() {
        let lookup = CapabilityLookup::new(CapabilityId::new("blink"), Some(String::new()));
        let caps = vec![capability("blink_strike")];

        assert!(lookup.find(&caps).is_none());
    }

    #[test]
    fn availability_requires_idle_ready_and_no_cooldown() {
        let mut cap = capability("blink");
        assert!(cap.is_available());

        cap.is_casting = true;
        assert!(!cap.is_available());

        cap.is_casting = false;
        cap.cooldown_remaining = Duration::from_millis(1);
        assert!(!cap.is_available());
    }
}
