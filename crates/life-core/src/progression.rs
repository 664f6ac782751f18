//! Yearly stat arithmetic driven by the player's focus allocation, meal plan
//! and tuition.
//!
//! [`year_delta`] is the pure rule table; [`advance_year`] applies it through
//! [`Player::with_stats_delta`] and grows the CCA skill. Validating the
//! allocation against the stage budget is the caller's job
//! ([`Allocation::validate`]).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::lifestage::LifeStage;
use crate::player::Player;
use crate::stats::StatDelta;
use crate::{SimConfig, ValidationError};

/// Academic points above this add a workload penalty.
pub const OVERLOAD_THRESHOLD: u8 = 7;
/// CCA points below this count as neglecting an active CCA.
pub const CCA_NEGLECT_THRESHOLD: u8 = 3;
/// Social points above this give a happiness bonus.
pub const SOCIAL_BONUS_THRESHOLD: u8 = 3;

const SECONDARY_ACADEMIC_FACTOR: f64 = 0.9;
const SECONDARY_STRESS_FACTOR: f64 = 1.6;
const DAYS_PER_YEAR: i64 = 365;

/// Focus points spread over the three areas for one year.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub academic: u8,
    pub cca: u8,
    pub social: u8,
}

impl Allocation {
    pub fn new(academic: u8, cca: u8, social: u8) -> Self {
        Self {
            academic,
            cca,
            social,
        }
    }

    pub fn total(&self) -> u32 {
        u32::from(self.academic) + u32::from(self.cca) + u32::from(self.social)
    }

    pub fn validate(&self, budget: u8) -> Result<(), ValidationError> {
        let actual = self.total();
        if actual != u32::from(budget) {
            return Err(ValidationError::AllocationBudget {
                expected: u32::from(budget),
                actual,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MealChoice {
    #[default]
    Healthy,
    Unhealthy,
}

/// Everything the player decides for a year.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearPlan {
    pub allocation: Allocation,
    pub meal: MealChoice,
    /// Requested tuition subjects; capped by the SES tier.
    pub tuition_subjects: u8,
}

/// Focus points available in the player's current stage.
pub fn point_budget(stage: LifeStage, config: &SimConfig) -> u8 {
    match stage {
        LifeStage::SecondarySchool => config.secondary_point_budget,
        _ => config.general_point_budget,
    }
}

/// Tuition subjects actually taken: none outside school, otherwise capped
/// by the SES tier.
pub fn effective_tuition(player: &Player, requested: u8) -> u8 {
    if !player.progress.stage.is_schooling() {
        return 0;
    }
    requested.min(player.ses.profile().max_tuition_subjects)
}

/// The stat change one year of `plan` produces for `player`.
pub fn year_delta(player: &Player, plan: &YearPlan, config: &SimConfig) -> StatDelta {
    let secondary = player.progress.stage == LifeStage::SecondarySchool;
    let stress_factor = if secondary { SECONDARY_STRESS_FACTOR } else { 1.0 };
    let alloc = plan.allocation;
    let academic = f64::from(alloc.academic);
    let mut d = StatDelta::default();

    d.academic_skill += if secondary {
        academic * SECONDARY_ACADEMIC_FACTOR
    } else {
        academic
    };
    if alloc.academic > OVERLOAD_THRESHOLD {
        let over = f64::from(alloc.academic - OVERLOAD_THRESHOLD);
        d.health -= 2.0 * over;
        d.stress += 3.0 * over * stress_factor;
    }

    if player.cca.is_some() && alloc.cca < CCA_NEGLECT_THRESHOLD {
        d.happiness -= 2.0;
        d.health -= 1.0;
    } else {
        d.stress -= 2.0;
    }

    d.social_impact += f64::from(alloc.social);
    if alloc.social > SOCIAL_BONUS_THRESHOLD {
        d.happiness += 2.0;
    }

    let meal_cost = match plan.meal {
        MealChoice::Healthy => {
            d.health += 2.0;
            config.healthy_meal_daily
        }
        MealChoice::Unhealthy => {
            d.health -= 1.0;
            config.unhealthy_meal_daily
        }
    };
    let allowance = if player.progress.stage.is_schooling() {
        player.daily_allowance
    } else {
        Decimal::ZERO
    };
    d.wealth += (allowance - meal_cost) * Decimal::from(DAYS_PER_YEAR);

    let tuition = effective_tuition(player, plan.tuition_subjects);
    if tuition > 0 {
        let n = f64::from(tuition);
        d.academic_skill += n;
        d.happiness -= n;
        d.stress += 2.0 * n * stress_factor;
        d.wealth -= config.tuition_monthly_per_subject * Decimal::from(12 * u32::from(tuition));
    }

    if secondary {
        let total = f64::from(alloc.total());
        d.happiness -= (total / 3.0).round().max(2.0);
        d.health -= (academic / 2.0).round().max(2.0);
        d.stress += (total / 2.0).round().max(3.0);
        d.wealth -= config.secondary_personal_expense;
    }

    for t in &player.traits {
        d += &t.yearly_modifier();
    }
    d
}

/// Run one year of `plan` for `player`, returning the new snapshot and the
/// delta that was applied.
pub fn advance_year(player: Player, plan: &YearPlan, config: &SimConfig) -> (Player, StatDelta) {
    let delta = year_delta(&player, plan, config);
    let tuition = effective_tuition(&player, plan.tuition_subjects);
    let growth = match player.progress.stage {
        LifeStage::PrimarySchool => 2.0,
        LifeStage::SecondarySchool => 1.5,
        _ => 1.0,
    } * f64::from(plan.allocation.cca);

    let mut player = player.with_stats_delta(&delta);
    player.tuition_subjects = tuition;
    if let Some(cca) = player.cca.as_mut() {
        cca.skill = (cca.skill + growth).clamp(0.0, 100.0);
    }
    debug!(
        stage = ?player.progress.stage,
        year = player.progress.year_in_stage,
        wealth = %delta.wealth,
        "year applied"
    );
    (player, delta)
}
