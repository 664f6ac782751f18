//! One-shot achievements evaluated against the current player snapshot.
//!
//! Every achievement exists from creation, locked. [`evaluate`] only ever
//! flips locked to unlocked and stamps the year; it is idempotent.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::exams::Stream;
use crate::lifestage::LifeStage;
use crate::player::{Housing, Player};

/// Health the player must stay at or above throughout primary school.
pub const SURVIVOR_HEALTH_FLOOR: f64 = 20.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AchievementId {
    TopOfClass,
    SocialButterfly,
    FirstSavings,
    WellRounded,
    PillarOfCommunity,
    Gifted,
    Survivor,
    CcaStar,
    NaturalLeader,
    Zen,
    Homeowner,
    Millionaire,
}

impl AchievementId {
    pub const ALL: [AchievementId; 12] = [
        AchievementId::TopOfClass,
        AchievementId::SocialButterfly,
        AchievementId::FirstSavings,
        AchievementId::WellRounded,
        AchievementId::PillarOfCommunity,
        AchievementId::Gifted,
        AchievementId::Survivor,
        AchievementId::CcaStar,
        AchievementId::NaturalLeader,
        AchievementId::Zen,
        AchievementId::Homeowner,
        AchievementId::Millionaire,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AchievementId::TopOfClass => "Top of the Class",
            AchievementId::SocialButterfly => "Social Butterfly",
            AchievementId::FirstSavings => "First Savings",
            AchievementId::WellRounded => "Well Rounded",
            AchievementId::PillarOfCommunity => "Pillar of the Community",
            AchievementId::Gifted => "Gifted",
            AchievementId::Survivor => "Survivor",
            AchievementId::CcaStar => "CCA Star",
            AchievementId::NaturalLeader => "Natural Leader",
            AchievementId::Zen => "Zen",
            AchievementId::Homeowner => "Homeowner",
            AchievementId::Millionaire => "Millionaire",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            AchievementId::TopOfClass => "Reach 80 academic skill.",
            AchievementId::SocialButterfly => "Have five relationships at level 60 or higher.",
            AchievementId::FirstSavings => "Save $5,000.",
            AchievementId::WellRounded => {
                "Get happiness, health, social impact, academics and reputation to 60 at once."
            }
            AchievementId::PillarOfCommunity => "Reach 90 reputation.",
            AchievementId::Gifted => "Be placed in the Integrated Programme.",
            AchievementId::Survivor => "Finish primary school without health ever dropping below 20.",
            AchievementId::CcaStar => "Reach 80 skill in your CCA.",
            AchievementId::NaturalLeader => "Reach 50 leadership.",
            AchievementId::Zen => "Keep stress at 10 or below while still in school.",
            AchievementId::Homeowner => "Win a BTO ballot.",
            AchievementId::Millionaire => "Hold $1,000,000 in cash.",
        }
    }

    /// Whether the predicate holds for the current snapshot.
    pub fn is_satisfied(self, player: &Player) -> bool {
        let s = player.stats();
        match self {
            AchievementId::TopOfClass => s.academic_skill() >= 80.0,
            AchievementId::SocialButterfly => player.relationships.count_at_least(60.0) >= 5,
            AchievementId::FirstSavings => s.wealth() >= Decimal::new(5000, 0),
            AchievementId::WellRounded => [
                s.happiness(),
                s.health(),
                s.social_impact(),
                s.academic_skill(),
                s.reputation(),
            ]
            .iter()
            .all(|v| *v >= 60.0),
            AchievementId::PillarOfCommunity => s.reputation() >= 90.0,
            AchievementId::Gifted => {
                player.secondary.stream == Some(Stream::IntegratedProgramme)
            }
            AchievementId::Survivor => {
                player.progress.stage != LifeStage::PrimarySchool
                    && player.lowest_primary_health >= SURVIVOR_HEALTH_FLOOR
            }
            AchievementId::CcaStar => player.cca_skill() >= 80.0,
            AchievementId::NaturalLeader => s.leadership() >= 50.0,
            AchievementId::Zen => player.progress.stage.is_schooling() && s.stress() <= 10.0,
            AchievementId::Homeowner => matches!(player.housing.home, Housing::Bto(_)),
            AchievementId::Millionaire => s.wealth() >= Decimal::new(1_000_000, 0),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: AchievementId,
    pub unlocked: bool,
    /// Player year (cumulative years lived) at which it unlocked.
    pub unlocked_year: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AchievementLedger {
    entries: Vec<Achievement>,
}

impl AchievementLedger {
    /// Every known achievement, locked.
    pub fn all_locked() -> Self {
        Self {
            entries: AchievementId::ALL
                .iter()
                .map(|&id| Achievement {
                    id,
                    unlocked: false,
                    unlocked_year: None,
                })
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Achievement> {
        self.entries.iter()
    }

    pub fn get(&self, id: AchievementId) -> Option<&Achievement> {
        self.entries.iter().find(|a| a.id == id)
    }

    pub fn is_unlocked(&self, id: AchievementId) -> bool {
        self.get(id).map_or(false, |a| a.unlocked)
    }

    pub fn unlocked_count(&self) -> usize {
        self.entries.iter().filter(|a| a.unlocked).count()
    }
}

impl Default for AchievementLedger {
    fn default() -> Self {
        Self::all_locked()
    }
}

/// Unlock every locked achievement whose predicate now holds, stamping `year`.
pub fn evaluate(mut player: Player, year: u32) -> Player {
    let newly: Vec<AchievementId> = player
        .achievements
        .iter()
        .filter(|a| !a.unlocked && a.id.is_satisfied(&player))
        .map(|a| a.id)
        .collect();
    for id in newly {
        if let Some(entry) = player.achievements.entries.iter_mut().find(|a| a.id == id) {
            entry.unlocked = true;
            entry.unlocked_year = Some(year);
            info!(achievement = id.name(), year, "achievement unlocked");
        }
    }
    player
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::tests::{test_player, with_stats};
    use crate::player::SesClass;
    use crate::relationships::{Relationship, RelationshipKind, RelationshipLedger};
    use crate::stats::StatDelta;
    use proptest::prelude::*;

    #[test]
    fn unlock_is_stamped_and_idempotent() {
        let p = test_player(SesClass::Middle, vec![]);
        let p = with_stats(
            p,
            StatDelta {
                academic_skill: 85.0,
                wealth: Decimal::new(6000, 0),
                ..Default::default()
            },
        );
        let p = evaluate(p, 3);
        assert!(p.achievements.is_unlocked(AchievementId::TopOfClass));
        assert!(p.achievements.is_unlocked(AchievementId::FirstSavings));
        assert_eq!(p.achievements.get(AchievementId::TopOfClass).unwrap().unlocked_year, Some(3));
        let again = evaluate(p.clone(), 3);
        assert_eq!(again, p);
    }

    #[test]
    fn unlocked_achievements_stay_unlocked() {
        let p = test_player(SesClass::Middle, vec![]);
        let p = with_stats(
            p,
            StatDelta {
                reputation: 95.0,
                ..Default::default()
            },
        );
        let p = evaluate(p, 1);
        let p = p.with_stats_delta(&StatDelta {
            reputation: -80.0,
            ..Default::default()
        });
        let p = evaluate(p, 2);
        let a = p.achievements.get(AchievementId::PillarOfCommunity).unwrap();
        assert!(a.unlocked);
        assert_eq!(a.unlocked_year, Some(1));
    }

    #[test]
    fn social_butterfly_counts_close_relationships() {
        let mut p = test_player(SesClass::Lower, vec![]);
        let rels = (0..5)
            .map(|i| Relationship::new(format!("friend-{i}"), "x", RelationshipKind::Friend, 60.0, ""))
            .collect();
        p.relationships = RelationshipLedger::from_entries(rels);
        let p = evaluate(p, 4);
        assert!(p.achievements.is_unlocked(AchievementId::SocialButterfly));
    }

    #[test]
    fn survivor_uses_the_whole_primary_span() {
        let p = test_player(SesClass::Middle, vec![]);
        let dipped = p.clone().with_stats_delta(&StatDelta {
            health: -55.0,
            ..Default::default()
        });
        let mut dipped = dipped.with_stats_delta(&StatDelta {
            health: 40.0,
            ..Default::default()
        });
        dipped.progress.stage = LifeStage::SecondarySchool;
        assert!(!evaluate(dipped, 6).achievements.is_unlocked(AchievementId::Survivor));

        let mut healthy = p;
        healthy.progress.stage = LifeStage::SecondarySchool;
        assert!(evaluate(healthy, 6).achievements.is_unlocked(AchievementId::Survivor));
    }

    proptest! {
        #[test]
        fn evaluation_is_monotonic(deltas in prop::collection::vec((-60.0f64..60.0, -60.0f64..60.0), 1..15)) {
            let mut p = test_player(SesClass::Upper, vec![]);
            let mut year = 0u32;
            let mut previous: Vec<Achievement> = p.achievements.iter().cloned().collect();
            for (academic, reputation) in deltas {
                year += 1;
                p = p.with_stats_delta(&StatDelta { academic_skill: academic, reputation, ..Default::default() });
                p = evaluate(p, year);
                for (before, after) in previous.iter().zip(p.achievements.iter()) {
                    if before.unlocked {
                        prop_assert!(after.unlocked);
                        prop_assert_eq!(before.unlocked_year, after.unlocked_year);
                    }
                }
                previous = p.achievements.iter().cloned().collect();
            }
        }
    }
}
