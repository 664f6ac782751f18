//! The player's stat vector and the single mutation path over it.
//!
//! Bounded stats live in `[0, 100]`; wealth, leadership and work experience
//! are floored at zero with no ceiling. Every update goes through
//! [`apply_delta`], which re-clamps every field.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

use crate::ValidationError;

/// Lower bound shared by every stat.
pub const STAT_MIN: f64 = 0.0;
/// Upper bound of the percentage-style stats.
pub const STAT_MAX: f64 = 100.0;

/// Names of the numeric stats, used in diagnostics and achievement rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatField {
    Wealth,
    Happiness,
    Health,
    SocialImpact,
    AcademicSkill,
    Stress,
    Reputation,
    Leadership,
    WorkExperience,
}

impl StatField {
    /// Upper bound of the field, `None` when unbounded above.
    pub fn upper_bound(self) -> Option<f64> {
        match self {
            StatField::Wealth | StatField::Leadership | StatField::WorkExperience => None,
            _ => Some(STAT_MAX),
        }
    }
}

/// Bounded numeric vector describing the player.
///
/// Fields are private: a `StatVector` can only be produced by
/// [`apply_delta`] (or deserialized, after which [`StatVector::validate`]
/// should be checked).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatVector {
    wealth: Decimal,
    happiness: f64,
    health: f64,
    social_impact: f64,
    academic_skill: f64,
    stress: f64,
    reputation: f64,
    leadership: f64,
    work_experience: f64,
}

impl StatVector {
    /// Build a vector by applying `delta` to the all-zero vector.
    pub fn from_delta(delta: &StatDelta) -> Self {
        apply_delta(&StatVector::default(), delta)
    }

    pub fn wealth(&self) -> Decimal {
        self.wealth
    }
    pub fn happiness(&self) -> f64 {
        self.happiness
    }
    pub fn health(&self) -> f64 {
        self.health
    }
    pub fn social_impact(&self) -> f64 {
        self.social_impact
    }
    pub fn academic_skill(&self) -> f64 {
        self.academic_skill
    }
    pub fn stress(&self) -> f64 {
        self.stress
    }
    pub fn reputation(&self) -> f64 {
        self.reputation
    }
    pub fn leadership(&self) -> f64 {
        self.leadership
    }
    pub fn work_experience(&self) -> f64 {
        self.work_experience
    }

    /// Value of a float-valued field; wealth is reported through `to_f64`.
    pub fn get(&self, field: StatField) -> f64 {
        use rust_decimal::prelude::ToPrimitive;
        match field {
            StatField::Wealth => self.wealth.to_f64().unwrap_or(0.0),
            StatField::Happiness => self.happiness,
            StatField::Health => self.health,
            StatField::SocialImpact => self.social_impact,
            StatField::AcademicSkill => self.academic_skill,
            StatField::Stress => self.stress,
            StatField::Reputation => self.reputation,
            StatField::Leadership => self.leadership,
            StatField::WorkExperience => self.work_experience,
        }
    }

    /// Check every bound. A failure here means some code bypassed [`apply_delta`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.wealth < Decimal::ZERO {
            return Err(ValidationError::NegativeMoney);
        }
        let floats = [
            StatField::Happiness,
            StatField::Health,
            StatField::SocialImpact,
            StatField::AcademicSkill,
            StatField::Stress,
            StatField::Reputation,
            StatField::Leadership,
            StatField::WorkExperience,
        ];
        for field in floats {
            let value = self.get(field);
            if !value.is_finite() {
                return Err(ValidationError::NonFinite);
            }
            let above = field.upper_bound().map_or(false, |hi| value > hi);
            if value < STAT_MIN || above {
                return Err(ValidationError::StatOutOfRange { field, value });
            }
        }
        Ok(())
    }
}

/// Additive change to a [`StatVector`]. Missing fields default to zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatDelta {
    pub wealth: Decimal,
    pub happiness: f64,
    pub health: f64,
    pub social_impact: f64,
    pub academic_skill: f64,
    pub stress: f64,
    pub reputation: f64,
    pub leadership: f64,
    pub work_experience: f64,
}

impl StatDelta {
    /// True when the delta changes nothing.
    pub fn is_zero(&self) -> bool {
        *self == StatDelta::default()
    }
}

impl AddAssign<&StatDelta> for StatDelta {
    fn add_assign(&mut self, rhs: &StatDelta) {
        self.wealth += rhs.wealth;
        self.happiness += rhs.happiness;
        self.health += rhs.health;
        self.social_impact += rhs.social_impact;
        self.academic_skill += rhs.academic_skill;
        self.stress += rhs.stress;
        self.reputation += rhs.reputation;
        self.leadership += rhs.leadership;
        self.work_experience += rhs.work_experience;
    }
}

impl Add for StatDelta {
    type Output = StatDelta;

    fn add(mut self, rhs: StatDelta) -> StatDelta {
        self += &rhs;
        self
    }
}

/// Apply `delta` to `stats`, clamping every field into its declared range.
///
/// Non-finite float deltas are ignored so a bad input can never poison the
/// vector with `NaN`.
pub fn apply_delta(stats: &StatVector, delta: &StatDelta) -> StatVector {
    let wealth = match stats.wealth.checked_add(delta.wealth) {
        Some(w) => w.max(Decimal::ZERO),
        None if delta.wealth.is_sign_negative() => Decimal::ZERO,
        None => Decimal::MAX,
    };
    StatVector {
        wealth,
        happiness: bounded(stats.happiness, delta.happiness),
        health: bounded(stats.health, delta.health),
        social_impact: bounded(stats.social_impact, delta.social_impact),
        academic_skill: bounded(stats.academic_skill, delta.academic_skill),
        stress: bounded(stats.stress, delta.stress),
        reputation: bounded(stats.reputation, delta.reputation),
        leadership: floored(stats.leadership, delta.leadership),
        work_experience: floored(stats.work_experience, delta.work_experience),
    }
}

fn step(value: f64, change: f64) -> f64 {
    let value = if value.is_finite() { value } else { STAT_MIN };
    if change.is_finite() {
        value + change
    } else {
        value
    }
}

fn bounded(value: f64, change: f64) -> f64 {
    step(value, change).clamp(STAT_MIN, STAT_MAX)
}

fn floored(value: f64, change: f64) -> f64 {
    let next = step(value, change);
    if next.is_finite() {
        next.max(STAT_MIN)
    } else {
        STAT_MIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn wealth_never_goes_negative() {
        let stats = StatVector::default();
        let delta = StatDelta {
            wealth: Decimal::new(-50, 0),
            ..Default::default()
        };
        let next = apply_delta(&stats, &delta);
        assert_eq!(next.wealth(), Decimal::ZERO);
    }

    #[test]
    fn bounded_fields_saturate() {
        let stats = StatVector::from_delta(&StatDelta {
            happiness: 95.0,
            stress: 3.0,
            ..Default::default()
        });
        let next = apply_delta(
            &stats,
            &StatDelta {
                happiness: 40.0,
                stress: -10.0,
                leadership: 250.0,
                ..Default::default()
            },
        );
        assert_eq!(next.happiness(), 100.0);
        assert_eq!(next.stress(), 0.0);
        assert_eq!(next.leadership(), 250.0);
    }

    #[test]
    fn nan_delta_is_ignored() {
        let stats = StatVector::from_delta(&StatDelta {
            health: 40.0,
            ..Default::default()
        });
        let next = apply_delta(
            &stats,
            &StatDelta {
                health: f64::NAN,
                work_experience: f64::INFINITY,
                ..Default::default()
            },
        );
        assert_eq!(next.health(), 40.0);
        assert_eq!(next.work_experience(), 0.0);
        next.validate().unwrap();
    }

    #[test]
    fn deltas_add_fieldwise() {
        let a = StatDelta {
            wealth: Decimal::new(10, 0),
            stress: 2.0,
            ..Default::default()
        };
        let b = StatDelta {
            wealth: Decimal::new(-4, 0),
            stress: 1.5,
            health: -1.0,
            ..Default::default()
        };
        let sum = a + b;
        assert_eq!(sum.wealth, Decimal::new(6, 0));
        assert_eq!(sum.stress, 3.5);
        assert_eq!(sum.health, -1.0);
        assert!(!sum.is_zero());
        assert!(StatDelta::default().is_zero());
    }

    fn arb_delta() -> impl Strategy<Value = StatDelta> {
        (
            -1_000_000i64..1_000_000,
            prop::array::uniform8(-500.0f64..500.0),
        )
            .prop_map(|(w, f)| StatDelta {
                wealth: Decimal::new(w, 2),
                happiness: f[0],
                health: f[1],
                social_impact: f[2],
                academic_skill: f[3],
                stress: f[4],
                reputation: f[5],
                leadership: f[6],
                work_experience: f[7],
            })
    }

    proptest! {
        #[test]
        fn bounds_hold_for_any_delta_sequence(deltas in prop::collection::vec(arb_delta(), 1..20)) {
            let mut stats = StatVector::default();
            for d in &deltas {
                stats = apply_delta(&stats, d);
                prop_assert!(stats.validate().is_ok());
                prop_assert!((STAT_MIN..=STAT_MAX).contains(&stats.happiness()));
                prop_assert!((STAT_MIN..=STAT_MAX).contains(&stats.stress()));
                prop_assert!(stats.wealth() >= Decimal::ZERO);
            }
        }
    }
}
