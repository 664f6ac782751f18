//! The player aggregate, its creation, and the socioeconomic tables.

use once_cell::sync::Lazy;
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::achievements::AchievementLedger;
use crate::events::EventId;
use crate::exams::{ExamResult, Pathway, Stream};
use crate::finance::{CpfAccounts, Portfolio};
use crate::lifestage::{LifeStage, StageProgress};
use crate::relationships::{Relationship, RelationshipKind, RelationshipLedger};
use crate::stats::{apply_delta, StatDelta, StatVector};
use crate::ValidationError;

/// Maximum number of personality traits chosen at creation.
pub const MAX_TRAITS: usize = 2;
/// Age at which a new player starts Primary 1.
pub const STARTING_AGE: u8 = 7;
/// Share of CCA skill kept when switching to a different activity.
pub const CCA_SWITCH_RETENTION: f64 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

/// Socioeconomic tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SesClass {
    Lower,
    Middle,
    Upper,
}

/// Static per-tier configuration.
#[derive(Clone, Debug)]
pub struct SesProfile {
    pub class: SesClass,
    /// Starting stats, applied to the zero vector.
    pub starting: StatDelta,
    /// Inclusive daily allowance range in dollars.
    pub allowance_min: Decimal,
    pub allowance_max: Decimal,
    pub max_tuition_subjects: u8,
    /// Occupations the player's parents may hold; flavour for the family ledger.
    pub parent_occupations: &'static [&'static str],
}

static SES_PROFILES: Lazy<[SesProfile; 3]> = Lazy::new(|| {
    [
        SesProfile {
            class: SesClass::Lower,
            starting: StatDelta {
                wealth: Decimal::new(200, 0),
                happiness: 60.0,
                health: 65.0,
                social_impact: 40.0,
                academic_skill: 35.0,
                stress: 35.0,
                reputation: 30.0,
                ..Default::default()
            },
            allowance_min: Decimal::new(1, 0),
            allowance_max: Decimal::new(3, 0),
            max_tuition_subjects: 1,
            parent_occupations: &["Hawker", "Cleaner", "Security Guard", "Bus Driver"],
        },
        SesProfile {
            class: SesClass::Middle,
            starting: StatDelta {
                wealth: Decimal::new(1000, 0),
                happiness: 65.0,
                health: 70.0,
                social_impact: 45.0,
                academic_skill: 45.0,
                stress: 30.0,
                reputation: 40.0,
                ..Default::default()
            },
            allowance_min: Decimal::new(3, 0),
            allowance_max: Decimal::new(6, 0),
            max_tuition_subjects: 2,
            parent_occupations: &["Teacher", "Engineer", "Nurse", "Civil Servant"],
        },
        SesProfile {
            class: SesClass::Upper,
            starting: StatDelta {
                wealth: Decimal::new(5000, 0),
                happiness: 70.0,
                health: 75.0,
                social_impact: 50.0,
                academic_skill: 55.0,
                stress: 40.0,
                reputation: 50.0,
                ..Default::default()
            },
            allowance_min: Decimal::new(6, 0),
            allowance_max: Decimal::new(12, 0),
            max_tuition_subjects: 4,
            parent_occupations: &["Doctor", "Lawyer", "Banker", "Business Owner"],
        },
    ]
});

impl SesClass {
    pub fn profile(self) -> &'static SesProfile {
        let idx = match self {
            SesClass::Lower => 0,
            SesClass::Middle => 1,
            SesClass::Upper => 2,
        };
        &SES_PROFILES[idx]
    }
}

/// Personality traits; each carries a fixed yearly modifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PersonalityTrait {
    Ambitious,
    Relaxed,
    Sociable,
    Creative,
    Disciplined,
    Athletic,
}

impl PersonalityTrait {
    /// Additive yearly offsets applied by the progression engine.
    pub fn yearly_modifier(self) -> StatDelta {
        match self {
            PersonalityTrait::Ambitious => StatDelta {
                academic_skill: 2.0,
                stress: 2.0,
                ..Default::default()
            },
            PersonalityTrait::Relaxed => StatDelta {
                stress: -3.0,
                ..Default::default()
            },
            PersonalityTrait::Sociable => StatDelta {
                social_impact: 2.0,
                happiness: 1.0,
                ..Default::default()
            },
            PersonalityTrait::Creative => StatDelta {
                happiness: 2.0,
                ..Default::default()
            },
            PersonalityTrait::Disciplined => StatDelta {
                academic_skill: 1.0,
                health: 1.0,
                ..Default::default()
            },
            PersonalityTrait::Athletic => StatDelta {
                health: 2.0,
                ..Default::default()
            },
        }
    }
}

/// Co-curricular activities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CcaKind {
    Football,
    Basketball,
    Swimming,
    Band,
    Choir,
    Drama,
    Scouts,
    Robotics,
}

/// The player's current activity and their skill in it, in `[0, 100]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cca {
    pub kind: CcaKind,
    pub skill: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SecondaryRecord {
    pub stream: Option<Stream>,
    pub psle_score: Option<f64>,
    pub exam: Option<ExamResult>,
    /// Normal-Academic student staying a fifth year for O-Levels.
    pub sec_five: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PostSecondaryRecord {
    pub pathway: Pathway,
    pub graduated: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NationalServiceRecord {
    pub vocation: String,
    pub months_served: u16,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UniversityRecord {
    pub course: String,
    pub gpa: f64,
    pub graduated: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CareerRecord {
    pub occupation: String,
    pub monthly_salary: Decimal,
    pub years_employed: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FamilyRecord {
    pub married: bool,
    pub children: u8,
}

impl FamilyRecord {
    /// People living in the player's own household.
    pub fn household_size(&self) -> u8 {
        1u8.saturating_add(u8::from(self.married))
            .saturating_add(self.children)
    }
}

/// HDB flat types offered through the BTO ballot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlatType {
    TwoRoomFlexi,
    ThreeRoom,
    FourRoom,
    FiveRoom,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Housing {
    #[default]
    WithParents,
    Bto(FlatType),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HousingRecord {
    pub home: Housing,
    pub ballot_attempts: u8,
}

/// Input to [`create_player`].
#[derive(Clone, Debug)]
pub struct NewPlayer {
    pub name: String,
    pub avatar: String,
    pub gender: Gender,
    pub ses: SesClass,
    pub traits: Vec<PersonalityTrait>,
}

/// The player aggregate. Engine functions consume or borrow it and return a
/// fresh value; stats can only change through [`Player::with_stats_delta`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub avatar: String,
    pub gender: Gender,
    pub age: u8,
    pub ses: SesClass,
    pub daily_allowance: Decimal,
    stats: StatVector,
    pub cca: Option<Cca>,
    pub traits: Vec<PersonalityTrait>,
    pub tuition_subjects: u8,
    pub relationships: RelationshipLedger,
    pub achievements: AchievementLedger,
    pub event_history: Vec<EventId>,
    pub progress: StageProgress,
    /// Lowest health observed while in primary school.
    pub lowest_primary_health: f64,
    pub secondary: SecondaryRecord,
    pub post_secondary: Option<PostSecondaryRecord>,
    pub national_service: Option<NationalServiceRecord>,
    pub university: Option<UniversityRecord>,
    pub career: Option<CareerRecord>,
    pub family: FamilyRecord,
    pub housing: HousingRecord,
    pub cpf: CpfAccounts,
    pub portfolio: Portfolio,
}

impl Player {
    pub fn stats(&self) -> &StatVector {
        &self.stats
    }

    /// Apply a stat delta through the clamping path and return the new snapshot.
    pub fn with_stats_delta(mut self, delta: &StatDelta) -> Player {
        self.stats = apply_delta(&self.stats, delta);
        if self.progress.stage == LifeStage::PrimarySchool {
            self.lowest_primary_health = self.lowest_primary_health.min(self.stats.health());
        }
        self
    }

    pub fn cca_skill(&self) -> f64 {
        self.cca.as_ref().map_or(0.0, |c| c.skill)
    }

    pub fn has_trait(&self, t: PersonalityTrait) -> bool {
        self.traits.contains(&t)
    }

    /// Human-readable school level, e.g. "Primary 3" or "Secondary 2".
    pub fn grade(&self) -> String {
        let year = self.progress.year_in_stage;
        match self.progress.stage {
            LifeStage::PrimarySchool => format!("Primary {year}"),
            LifeStage::SecondarySchool => format!("Secondary {year}"),
            LifeStage::PostSecondary => match &self.post_secondary {
                Some(p) => format!("{} Year {year}", p.pathway.label()),
                None => format!("Post-Secondary Year {year}"),
            },
            LifeStage::NationalService => format!("NS Year {year}"),
            LifeStage::University => format!("University Year {year}"),
            LifeStage::Career => "Working".to_string(),
            LifeStage::Retirement => "Retired".to_string(),
        }
    }
}

/// Create a new Primary 1 player. The daily allowance is rolled once within
/// the tier's range.
pub fn create_player<R: Rng>(new: NewPlayer, rng: &mut R) -> Result<Player, ValidationError> {
    if new.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if new.traits.len() > MAX_TRAITS {
        return Err(ValidationError::TooManyTraits(new.traits.len()));
    }
    if new.traits.len() == MAX_TRAITS && new.traits[0] == new.traits[1] {
        return Err(ValidationError::DuplicateTrait(new.traits[0]));
    }

    let profile = new.ses.profile();
    // Allowance is rolled in 10-cent steps.
    let lo = (profile.allowance_min * Decimal::TEN).trunc();
    let hi = (profile.allowance_max * Decimal::TEN).trunc();
    let lo_i = lo.to_i64().unwrap_or(0);
    let hi_i = hi.to_i64().unwrap_or(lo_i).max(lo_i);
    let allowance = Decimal::new(rng.gen_range(lo_i..=hi_i), 1);

    let stats = StatVector::from_delta(&profile.starting);
    let parent_job = profile.parent_occupations[rng.gen_range(0..profile.parent_occupations.len())];
    let relationships = RelationshipLedger::from_entries(vec![
        Relationship::new(
            "family-1",
            "Mum",
            RelationshipKind::Family,
            70.0,
            format!("Your mother, a {parent_job}."),
        ),
        Relationship::new(
            "family-2",
            "Dad",
            RelationshipKind::Family,
            65.0,
            "Your father.".to_string(),
        ),
    ]);

    Ok(Player {
        name: new.name.trim().to_string(),
        avatar: new.avatar,
        gender: new.gender,
        age: STARTING_AGE,
        ses: new.ses,
        daily_allowance: allowance,
        lowest_primary_health: stats.health(),
        stats,
        cca: None,
        traits: new.traits,
        tuition_subjects: 0,
        relationships,
        achievements: AchievementLedger::all_locked(),
        event_history: Vec::new(),
        progress: StageProgress::start(),
        secondary: SecondaryRecord::default(),
        post_secondary: None,
        national_service: None,
        university: None,
        career: None,
        family: FamilyRecord::default(),
        housing: HousingRecord::default(),
        cpf: CpfAccounts::default(),
        portfolio: Portfolio::default(),
    })
}

/// Join `kind`. Switching keeps [`CCA_SWITCH_RETENTION`] of the old skill;
/// re-joining the current activity changes nothing.
pub fn switch_cca(mut player: Player, kind: CcaKind) -> Player {
    player.cca = match player.cca.take() {
        Some(current) if current.kind == kind => Some(current),
        Some(previous) => Some(Cca {
            kind,
            skill: (previous.skill * CCA_SWITCH_RETENTION).clamp(0.0, 100.0),
        }),
        None => Some(Cca { kind, skill: 0.0 }),
    };
    player
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    pub(crate) fn test_player(ses: SesClass, traits: Vec<PersonalityTrait>) -> Player {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        create_player(
            NewPlayer {
                name: "Wei Ling".to_string(),
                avatar: "cat".to_string(),
                gender: Gender::Female,
                ses,
                traits,
            },
            &mut rng,
        )
        .unwrap()
    }

    /// A player whose float stats are set to the given absolute values.
    pub(crate) fn with_stats(player: Player, target: StatDelta) -> Player {
        let current = player.stats().clone();
        let reset = StatDelta {
            wealth: -current.wealth(),
            happiness: -current.happiness(),
            health: -current.health(),
            social_impact: -current.social_impact(),
            academic_skill: -current.academic_skill(),
            stress: -current.stress(),
            reputation: -current.reputation(),
            leadership: -current.leadership(),
            work_experience: -current.work_experience(),
        };
        player.with_stats_delta(&reset).with_stats_delta(&target)
    }

    #[test]
    fn creation_uses_tier_profile() {
        let p = test_player(SesClass::Middle, vec![PersonalityTrait::Relaxed]);
        assert_eq!(p.age, STARTING_AGE);
        assert_eq!(p.stats().academic_skill(), 45.0);
        assert_eq!(p.stats().wealth(), Decimal::new(1000, 0));
        assert!(p.daily_allowance >= Decimal::new(3, 0));
        assert!(p.daily_allowance <= Decimal::new(6, 0));
        assert_eq!(p.relationships.len(), 2);
        assert!(p.achievements.iter().all(|a| !a.unlocked));
        assert_eq!(p.grade(), "Primary 1");
    }

    #[test]
    fn creation_rejects_bad_input() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let base = NewPlayer {
            name: "  ".to_string(),
            avatar: String::new(),
            gender: Gender::Male,
            ses: SesClass::Lower,
            traits: vec![],
        };
        assert_eq!(
            create_player(base.clone(), &mut rng).unwrap_err(),
            ValidationError::EmptyName
        );
        let too_many = NewPlayer {
            name: "Ali".into(),
            traits: vec![
                PersonalityTrait::Ambitious,
                PersonalityTrait::Relaxed,
                PersonalityTrait::Creative,
            ],
            ..base.clone()
        };
        assert_eq!(
            create_player(too_many, &mut rng).unwrap_err(),
            ValidationError::TooManyTraits(3)
        );
        let dup = NewPlayer {
            name: "Ali".into(),
            traits: vec![PersonalityTrait::Creative, PersonalityTrait::Creative],
            ..base
        };
        assert_eq!(
            create_player(dup, &mut rng).unwrap_err(),
            ValidationError::DuplicateTrait(PersonalityTrait::Creative)
        );
    }

    #[test]
    fn switching_cca_keeps_thirty_percent() {
        let mut p = test_player(SesClass::Lower, vec![]);
        p = switch_cca(p, CcaKind::Football);
        p.cca.as_mut().unwrap().skill = 50.0;
        let same = switch_cca(p.clone(), CcaKind::Football);
        assert_eq!(same.cca_skill(), 50.0);
        let switched = switch_cca(p, CcaKind::Band);
        assert_eq!(switched.cca.as_ref().unwrap().kind, CcaKind::Band);
        assert!((switched.cca_skill() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn primary_low_water_mark_tracks_minimum() {
        let p = test_player(SesClass::Middle, vec![]);
        let p = p.with_stats_delta(&StatDelta {
            health: -60.0,
            ..Default::default()
        });
        let p = p.with_stats_delta(&StatDelta {
            health: 50.0,
            ..Default::default()
        });
        assert_eq!(p.lowest_primary_health, 10.0);
        assert_eq!(p.stats().health(), 60.0);
    }

    #[test]
    fn household_size_counts_spouse_and_children() {
        let f = FamilyRecord {
            married: true,
            children: 2,
        };
        assert_eq!(f.household_size(), 4);
        assert_eq!(FamilyRecord::default().household_size(), 1);
    }
}
