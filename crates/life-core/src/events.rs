//! Static catalog of random life events.
//!
//! Each entry pairs a base weight and an effect (stat delta, relationship
//! effects, optional family change) with eligibility predicates. Events
//! whose effect depends on a fresh roll register a generator in the
//! override table instead of hard-coding it in the selector.

use once_cell::sync::Lazy;
use rand::{Rng, RngCore};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::lifestage::LifeStage;
use crate::player::{CcaKind, Gender, PersonalityTrait, Player};
use crate::relationships::{RelationshipEffect, RelationshipKind};
use crate::stats::StatDelta;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventId {
    MadeNewFriend,
    SchoolBully,
    EraserBusiness,
    SpellingBeeWin,
    CaughtTheFlu,
    TeacherMentor,
    SportsDayChampion,
    PsleMockDisaster,
    ConcertSolo,
    GrandparentVisit,
    FirstCrush,
    CcaCompetitionWin,
    PrefectAppointment,
    GroupProjectConflict,
    BestFriendBond,
    LateNightGaming,
    OrientationCamp,
    InternshipOffer,
    FieldCampBonding,
    SpecialistCourse,
    DeansList,
    ExchangeSemester,
    Promotion,
    Retrenchment,
    Wedding,
    NewBaby,
    TotoWin,
    OfficePolitics,
    GrandchildrenVisit,
    HealthScare,
}

impl EventId {
    /// Events that can happen at most once in a life.
    pub fn is_once_only(self) -> bool {
        matches!(
            self,
            EventId::EraserBusiness
                | EventId::TeacherMentor
                | EventId::PsleMockDisaster
                | EventId::FirstCrush
                | EventId::PrefectAppointment
                | EventId::OrientationCamp
                | EventId::SpecialistCourse
                | EventId::ExchangeSemester
                | EventId::Wedding
        )
    }
}

/// Change to the family record carried by some events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FamilyChange {
    Marriage,
    Child,
}

/// Predicates an event requires; empty or `None` means unconstrained.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Eligibility {
    pub stage: Option<LifeStage>,
    /// Allowed years within the stage.
    pub years: Vec<u8>,
    /// Inclusive age window.
    pub ages: Option<(u8, u8)>,
    /// The player must hold at least one of these.
    pub traits: Vec<PersonalityTrait>,
    pub gender: Option<Gender>,
    pub min_cca_skill: Option<f64>,
    /// The player's CCA must be one of these.
    pub cca_kinds: Vec<CcaKind>,
    pub married: Option<bool>,
}

impl Eligibility {
    pub fn admits(&self, player: &Player) -> bool {
        if self.stage.map_or(false, |s| s != player.progress.stage) {
            return false;
        }
        if !self.years.is_empty() && !self.years.contains(&player.progress.year_in_stage) {
            return false;
        }
        if let Some((lo, hi)) = self.ages {
            if player.age < lo || player.age > hi {
                return false;
            }
        }
        if !self.traits.is_empty() && !self.traits.iter().any(|t| player.has_trait(*t)) {
            return false;
        }
        if self.gender.map_or(false, |g| g != player.gender) {
            return false;
        }
        if let Some(min) = self.min_cca_skill {
            if player.cca.is_none() || player.cca_skill() < min {
                return false;
            }
        }
        if !self.cca_kinds.is_empty() {
            match &player.cca {
                Some(c) if self.cca_kinds.contains(&c.kind) => {}
                _ => return false,
            }
        }
        if self.married.map_or(false, |m| m != player.family.married) {
            return false;
        }
        true
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EventDefinition {
    pub id: EventId,
    pub name: &'static str,
    pub description: &'static str,
    pub delta: StatDelta,
    /// Base selection weight.
    pub weight: f64,
    pub relationships: Vec<RelationshipEffect>,
    pub eligibility: Eligibility,
    pub family: Option<FamilyChange>,
}

impl EventDefinition {
    fn new(id: EventId, name: &'static str, description: &'static str, weight: f64) -> Self {
        Self {
            id,
            name,
            description,
            delta: StatDelta::default(),
            weight,
            relationships: Vec::new(),
            eligibility: Eligibility::default(),
            family: None,
        }
    }

    fn delta(mut self, delta: StatDelta) -> Self {
        self.delta = delta;
        self
    }

    fn rel(mut self, kind: RelationshipKind, change: f64) -> Self {
        self.relationships.push(RelationshipEffect::new(kind, change));
        self
    }

    fn stage(mut self, stage: LifeStage) -> Self {
        self.eligibility.stage = Some(stage);
        self
    }

    fn years(mut self, years: &[u8]) -> Self {
        self.eligibility.years = years.to_vec();
        self
    }

    fn ages(mut self, lo: u8, hi: u8) -> Self {
        self.eligibility.ages = Some((lo, hi));
        self
    }

    fn traits(mut self, traits: &[PersonalityTrait]) -> Self {
        self.eligibility.traits = traits.to_vec();
        self
    }

    fn gender(mut self, gender: Gender) -> Self {
        self.eligibility.gender = Some(gender);
        self
    }

    fn cca(mut self, min_skill: Option<f64>, kinds: &[CcaKind]) -> Self {
        self.eligibility.min_cca_skill = min_skill;
        self.eligibility.cca_kinds = kinds.to_vec();
        self
    }

    fn married(mut self, married: bool) -> Self {
        self.eligibility.married = Some(married);
        self
    }

    fn family(mut self, change: FamilyChange) -> Self {
        self.family = Some(change);
        self
    }
}

static CATALOG: Lazy<Vec<EventDefinition>> = Lazy::new(build_catalog);

/// The full event table, in stable order.
pub fn catalog() -> &'static [EventDefinition] {
    &CATALOG
}

pub fn find(id: EventId) -> Option<&'static EventDefinition> {
    CATALOG.iter().find(|e| e.id == id)
}

/// Produces a freshly rolled delta for an event, replacing its static one.
pub type EffectGenerator = fn(&EventDefinition, &mut dyn RngCore) -> StatDelta;

static EFFECT_OVERRIDES: Lazy<HashMap<EventId, EffectGenerator>> = Lazy::new(|| {
    let mut table: HashMap<EventId, EffectGenerator> = HashMap::new();
    table.insert(EventId::EraserBusiness, eraser_business_profit);
    table.insert(EventId::TotoWin, toto_payout);
    table
});

pub fn effect_override(id: EventId) -> Option<EffectGenerator> {
    EFFECT_OVERRIDES.get(&id).copied()
}

/// Eraser sales earn a whole-dollar profit between $20 and $150.
fn eraser_business_profit(event: &EventDefinition, rng: &mut dyn RngCore) -> StatDelta {
    StatDelta {
        wealth: Decimal::from(rng.gen_range(20..=150i64)),
        ..event.delta.clone()
    }
}

fn toto_payout(event: &EventDefinition, rng: &mut dyn RngCore) -> StatDelta {
    StatDelta {
        wealth: Decimal::from(rng.gen_range(50..=5000i64)),
        ..event.delta.clone()
    }
}

fn build_catalog() -> Vec<EventDefinition> {
    use EventId::*;
    use LifeStage::*;
    use PersonalityTrait::*;
    use RelationshipKind as R;

    vec![
        // Primary school
        EventDefinition::new(MadeNewFriend, "Made a New Friend", "You shared your snacks at recess.", 10.0)
            .stage(PrimarySchool)
            .delta(StatDelta { happiness: 5.0, social_impact: 3.0, ..StatDelta::default() })
            .rel(R::Friend, 15.0),
        EventDefinition::new(SchoolBully, "Playground Bully", "An older kid keeps taking your lunch money.", 6.0)
            .stage(PrimarySchool)
            .delta(StatDelta { happiness: -8.0, stress: 6.0, health: -2.0, ..StatDelta::default() })
            .rel(R::Rival, 10.0),
        EventDefinition::new(EraserBusiness, "Eraser Business", "You sold scented erasers to classmates.", 5.0)
            .stage(PrimarySchool)
            .years(&[3, 4, 5])
            .traits(&[Ambitious, Creative])
            .delta(StatDelta { reputation: 2.0, social_impact: 2.0, ..StatDelta::default() }),
        EventDefinition::new(SpellingBeeWin, "Spelling Bee Champion", "You spelt 'onomatopoeia' correctly.", 4.0)
            .stage(PrimarySchool)
            .years(&[2, 3, 4])
            .delta(StatDelta { academic_skill: 3.0, reputation: 5.0, happiness: 4.0, ..StatDelta::default() }),
        EventDefinition::new(CaughtTheFlu, "Caught the Flu", "A week in bed with a fever.", 6.0)
            .ages(7, 70)
            .delta(StatDelta { health: -8.0, academic_skill: -1.0, ..StatDelta::default() }),
        EventDefinition::new(TeacherMentor, "A Teacher Believes in You", "Your form teacher stays back to coach you.", 4.0)
            .stage(PrimarySchool)
            .years(&[4, 5, 6])
            .delta(StatDelta { academic_skill: 4.0, happiness: 2.0, ..StatDelta::default() })
            .rel(R::Mentor, 20.0),
        EventDefinition::new(SportsDayChampion, "Sports Day Champion", "Gold in the 4x100m relay.", 4.0)
            .stage(PrimarySchool)
            .cca(Some(40.0), &[CcaKind::Football, CcaKind::Basketball, CcaKind::Swimming])
            .delta(StatDelta { reputation: 6.0, health: 2.0, happiness: 5.0, ..StatDelta::default() }),
        EventDefinition::new(PsleMockDisaster, "Prelim Paper Disaster", "You blanked out during the mock PSLE.", 5.0)
            .stage(PrimarySchool)
            .years(&[6])
            .delta(StatDelta { stress: 10.0, happiness: -5.0, ..StatDelta::default() }),
        EventDefinition::new(ConcertSolo, "Concert Solo", "You performed a solo at the school concert.", 4.0)
            .ages(7, 18)
            .cca(Some(50.0), &[CcaKind::Band, CcaKind::Choir, CcaKind::Drama])
            .delta(StatDelta { reputation: 5.0, happiness: 4.0, social_impact: 3.0, ..StatDelta::default() }),
        EventDefinition::new(GrandparentVisit, "Weekend at Grandma's", "Kueh, stories, and mahjong sounds.", 5.0)
            .ages(7, 40)
            .delta(StatDelta { happiness: 4.0, stress: -2.0, ..StatDelta::default() })
            .rel(R::Family, 5.0),
        // Secondary school
        EventDefinition::new(FirstCrush, "First Crush", "You can't stop thinking about someone in class.", 5.0)
            .stage(SecondarySchool)
            .years(&[2, 3])
            .delta(StatDelta { happiness: 6.0, stress: 3.0, ..StatDelta::default() })
            .rel(R::Crush, 20.0),
        EventDefinition::new(CcaCompetitionWin, "National Competition Win", "Your CCA team takes home the trophy.", 4.0)
            .stage(SecondarySchool)
            .cca(Some(60.0), &[])
            .delta(StatDelta { reputation: 8.0, leadership: 5.0, happiness: 5.0, ..StatDelta::default() }),
        EventDefinition::new(PrefectAppointment, "Appointed Prefect", "The principal pins on your prefect badge.", 3.0)
            .stage(SecondarySchool)
            .years(&[3, 4])
            .traits(&[Disciplined, Ambitious])
            .delta(StatDelta { leadership: 10.0, reputation: 6.0, stress: 3.0, ..StatDelta::default() }),
        EventDefinition::new(GroupProjectConflict, "Group Project Drama", "Someone didn't do their part. Again.", 6.0)
            .stage(SecondarySchool)
            .delta(StatDelta { stress: 5.0, social_impact: -2.0, ..StatDelta::default() })
            .rel(R::Friend, -5.0)
            .rel(R::Rival, 8.0),
        EventDefinition::new(BestFriendBond, "A Friend for Life", "Late-night talks turn a friend into a best friend.", 4.0)
            .stage(SecondarySchool)
            .traits(&[Sociable])
            .delta(StatDelta { happiness: 6.0, ..StatDelta::default() })
            .rel(R::BestFriend, 25.0),
        EventDefinition::new(LateNightGaming, "Gaming Till 3am", "Just one more round.", 5.0)
            .stage(SecondarySchool)
            .traits(&[Relaxed])
            .delta(StatDelta { happiness: 4.0, health: -3.0, academic_skill: -2.0, ..StatDelta::default() }),
        // Post-secondary
        EventDefinition::new(OrientationCamp, "Orientation Camp", "Cheers, games, and new faces.", 6.0)
            .stage(PostSecondary)
            .years(&[1])
            .delta(StatDelta { social_impact: 5.0, happiness: 5.0, ..StatDelta::default() })
            .rel(R::Friend, 10.0),
        EventDefinition::new(InternshipOffer, "Internship Offer", "A company offers you a holiday internship.", 4.0)
            .stage(PostSecondary)
            .traits(&[Ambitious, Disciplined])
            .delta(StatDelta {
                work_experience: 1.0,
                wealth: Decimal::new(800, 0),
                reputation: 3.0,
                ..StatDelta::default()
            })
            .rel(R::Mentor, 10.0),
        // National service
        EventDefinition::new(FieldCampBonding, "Field Camp", "Two weeks in Tekong bonds your section.", 6.0)
            .stage(NationalService)
            .gender(Gender::Male)
            .delta(StatDelta { health: 4.0, leadership: 4.0, stress: 4.0, ..StatDelta::default() })
            .rel(R::Friend, 12.0),
        EventDefinition::new(SpecialistCourse, "Specialist Cadet School", "You are selected for command school.", 3.0)
            .stage(NationalService)
            .years(&[1])
            .delta(StatDelta { leadership: 8.0, reputation: 4.0, stress: 4.0, ..StatDelta::default() }),
        // University
        EventDefinition::new(DeansList, "Dean's List", "Top few percent of your cohort.", 3.0)
            .stage(University)
            .delta(StatDelta { academic_skill: 4.0, reputation: 6.0, ..StatDelta::default() }),
        EventDefinition::new(ExchangeSemester, "Exchange Semester", "A semester abroad opens your eyes.", 2.0)
            .stage(University)
            .years(&[2, 3])
            .delta(StatDelta {
                happiness: 8.0,
                social_impact: 5.0,
                wealth: Decimal::new(-3000, 0),
                ..StatDelta::default()
            }),
        // Career
        EventDefinition::new(Promotion, "Promotion", "Your manager puts you up for promotion.", 4.0)
            .stage(Career)
            .delta(StatDelta {
                leadership: 5.0,
                reputation: 5.0,
                wealth: Decimal::new(2000, 0),
                ..StatDelta::default()
            })
            .rel(R::Colleague, 5.0),
        EventDefinition::new(Retrenchment, "Retrenchment Scare", "Your department is restructured.", 2.0)
            .stage(Career)
            .delta(StatDelta { happiness: -10.0, stress: 12.0, ..StatDelta::default() }),
        EventDefinition::new(Wedding, "Wedding Day", "Tea ceremony in the morning, banquet at night.", 3.0)
            .stage(Career)
            .ages(25, 40)
            .married(false)
            .delta(StatDelta { happiness: 15.0, wealth: Decimal::new(-20000, 0), ..StatDelta::default() })
            .rel(R::Partner, 30.0)
            .family(FamilyChange::Marriage),
        EventDefinition::new(NewBaby, "New Baby", "Sleepless nights and tiny fingers.", 3.0)
            .stage(Career)
            .ages(26, 45)
            .married(true)
            .delta(StatDelta { happiness: 10.0, stress: 8.0, health: -2.0, ..StatDelta::default() })
            .rel(R::Family, 10.0)
            .family(FamilyChange::Child),
        EventDefinition::new(TotoWin, "Toto Win", "Your birthday numbers finally came up.", 1.0)
            .ages(21, 100)
            .delta(StatDelta { happiness: 5.0, ..StatDelta::default() }),
        EventDefinition::new(OfficePolitics, "Office Politics", "A colleague takes credit for your work.", 5.0)
            .stage(Career)
            .delta(StatDelta { stress: 6.0, ..StatDelta::default() })
            .rel(R::Colleague, -5.0)
            .rel(R::Rival, 6.0),
        // Later life
        EventDefinition::new(GrandchildrenVisit, "Grandchildren Visit", "The house is loud again.", 6.0)
            .stage(Retirement)
            .delta(StatDelta { happiness: 8.0, ..StatDelta::default() })
            .rel(R::Family, 10.0),
        EventDefinition::new(HealthScare, "Health Scare", "A routine check-up finds something worrying.", 4.0)
            .ages(55, 120)
            .delta(StatDelta { health: -12.0, stress: 6.0, ..StatDelta::default() }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    #[test]
    fn catalog_ids_are_unique_and_weights_positive() {
        let mut seen = HashSet::new();
        for e in catalog() {
            assert!(seen.insert(e.id), "duplicate event {:?}", e.id);
            assert!(e.weight > 0.0);
        }
        assert!(find(EventId::Wedding).is_some());
    }

    #[test]
    fn eraser_profit_is_rolled_in_range() {
        let event = find(EventId::EraserBusiness).unwrap();
        let generator = effect_override(EventId::EraserBusiness).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..200 {
            let d = generator(event, &mut rng);
            assert!(d.wealth >= Decimal::new(20, 0) && d.wealth <= Decimal::new(150, 0));
            assert_eq!(d.wealth.fract(), Decimal::ZERO);
            assert_eq!(d.reputation, 2.0);
        }
        assert!(effect_override(EventId::MadeNewFriend).is_none());
    }
}
