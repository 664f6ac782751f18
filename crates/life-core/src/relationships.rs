//! Relationship ledger: typed relationships with levels in `[0, 100]`.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Kinds of relationship an event can touch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipKind {
    Family,
    Friend,
    BestFriend,
    Rival,
    Mentor,
    Crush,
    Partner,
    Colleague,
}

impl RelationshipKind {
    fn slug(self) -> &'static str {
        match self {
            RelationshipKind::Family => "family",
            RelationshipKind::Friend => "friend",
            RelationshipKind::BestFriend => "best-friend",
            RelationshipKind::Rival => "rival",
            RelationshipKind::Mentor => "mentor",
            RelationshipKind::Crush => "crush",
            RelationshipKind::Partner => "partner",
            RelationshipKind::Colleague => "colleague",
        }
    }

    /// Names handed out when a relationship of this kind is first created.
    pub fn name_pool(self) -> &'static [&'static str] {
        match self {
            RelationshipKind::Family => &["Grandma", "Uncle Ah Seng", "Cousin Mei"],
            RelationshipKind::Friend => &["Jun Wei", "Priya", "Hafiz", "Xin Yi", "Marcus"],
            RelationshipKind::BestFriend => &["Darren", "Nur Aisyah", "Kai Xuan"],
            RelationshipKind::Rival => &["Bryan", "Charmaine", "Ravi"],
            RelationshipKind::Mentor => &["Mr Tan", "Mdm Lim", "Coach Rahman"],
            RelationshipKind::Crush => &["Joanne", "Ethan", "Farah"],
            RelationshipKind::Partner => &["Rachel", "Daniel", "Siti"],
            RelationshipKind::Colleague => &["Kelvin", "Angela", "Suresh"],
        }
    }

    fn description(self) -> &'static str {
        match self {
            RelationshipKind::Family => "A relative who looks out for you.",
            RelationshipKind::Friend => "Someone you hang out with.",
            RelationshipKind::BestFriend => "Your closest confidant.",
            RelationshipKind::Rival => "Always one step ahead, or behind.",
            RelationshipKind::Mentor => "Guides you when you are lost.",
            RelationshipKind::Crush => "You get nervous around them.",
            RelationshipKind::Partner => "Your significant other.",
            RelationshipKind::Colleague => "You share the office pantry.",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: String,
    pub name: String,
    pub kind: RelationshipKind,
    /// Closeness in `[0, 100]`.
    pub level: f64,
    pub description: String,
}

impl Relationship {
    /// Create a relationship; the level is clamped into `[0, 100]`.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: RelationshipKind,
        level: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            level: clamp_level(level),
            description: description.into(),
        }
    }
}

/// A single `(kind, change)` effect carried by an event.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RelationshipEffect {
    pub kind: RelationshipKind,
    pub change: f64,
}

impl RelationshipEffect {
    pub const fn new(kind: RelationshipKind, change: f64) -> Self {
        Self { kind, change }
    }
}

/// All of a player's relationships, in creation order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipLedger {
    entries: Vec<Relationship>,
}

impl RelationshipLedger {
    pub fn from_entries(entries: Vec<Relationship>) -> Self {
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn of_kind(&self, kind: RelationshipKind) -> impl Iterator<Item = &Relationship> {
        self.entries.iter().filter(move |r| r.kind == kind)
    }

    /// Number of relationships at or above `level`.
    pub fn count_at_least(&self, level: f64) -> usize {
        self.entries.iter().filter(|r| r.level >= level).count()
    }

    /// Apply effects in order.
    ///
    /// Existing relationships of the effect's kind all move by `change`,
    /// clamped. With none present a positive change creates one at
    /// `min(100, change)`; a non-positive change is a no-op.
    pub fn apply_effects(mut self, effects: &[RelationshipEffect]) -> Self {
        for effect in effects {
            if !effect.change.is_finite() {
                continue;
            }
            let mut touched = false;
            for rel in self.entries.iter_mut().filter(|r| r.kind == effect.kind) {
                rel.level = clamp_level(rel.level + effect.change);
                touched = true;
            }
            if !touched && effect.change > 0.0 {
                let created = self.instantiate(effect.kind, effect.change);
                debug!(id = %created.id, name = %created.name, level = created.level, "new relationship");
                self.entries.push(created);
            }
        }
        self
    }

    fn instantiate(&self, kind: RelationshipKind, change: f64) -> Relationship {
        let pool = kind.name_pool();
        let seen = self.of_kind(kind).count();
        let ordinal = self.entries.len() + 1;
        Relationship::new(
            format!("{}-{ordinal}", kind.slug()),
            pool[seen % pool.len()],
            kind,
            change.min(100.0),
            kind.description(),
        )
    }
}

fn clamp_level(level: f64) -> f64 {
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn positive_effect_creates_missing_relationship() {
        let ledger = RelationshipLedger::default()
            .apply_effects(&[RelationshipEffect::new(RelationshipKind::Friend, 15.0)]);
        let friends: Vec<_> = ledger.of_kind(RelationshipKind::Friend).collect();
        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0].level, 15.0);
        assert_eq!(friends[0].name, "Jun Wei");
        assert_eq!(friends[0].id, "friend-1");
    }

    #[test]
    fn negative_effect_on_missing_kind_is_noop() {
        let ledger = RelationshipLedger::default()
            .apply_effects(&[RelationshipEffect::new(RelationshipKind::Rival, -10.0)]);
        assert!(ledger.is_empty());
    }

    #[test]
    fn existing_relationships_are_clamped() {
        let ledger = RelationshipLedger::from_entries(vec![
            Relationship::new("family-1", "Mum", RelationshipKind::Family, 95.0, ""),
            Relationship::new("family-2", "Dad", RelationshipKind::Family, 5.0, ""),
        ]);
        let up = ledger
            .clone()
            .apply_effects(&[RelationshipEffect::new(RelationshipKind::Family, 10.0)]);
        assert!(up.iter().all(|r| r.level <= 100.0));
        assert_eq!(up.iter().map(|r| r.level).collect::<Vec<_>>(), vec![100.0, 15.0]);
        let down = ledger.apply_effects(&[RelationshipEffect::new(RelationshipKind::Family, -20.0)]);
        assert_eq!(down.iter().map(|r| r.level).collect::<Vec<_>>(), vec![75.0, 0.0]);
        assert_eq!(down.len(), 2);
    }

    #[test]
    fn large_gain_starts_at_cap() {
        let ledger = RelationshipLedger::default()
            .apply_effects(&[RelationshipEffect::new(RelationshipKind::Mentor, 250.0)]);
        assert_eq!(ledger.of_kind(RelationshipKind::Mentor).next().unwrap().level, 100.0);
    }

    proptest! {
        #[test]
        fn levels_stay_bounded(changes in prop::collection::vec(-150.0f64..150.0, 1..40)) {
            let mut ledger = RelationshipLedger::default();
            for c in changes {
                ledger = ledger.apply_effects(&[RelationshipEffect::new(RelationshipKind::Friend, c)]);
                prop_assert!(ledger.iter().all(|r| (0.0..=100.0).contains(&r.level)));
                prop_assert!(ledger.len() <= 1);
            }
        }
    }
}
