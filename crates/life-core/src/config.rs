//! Tunable engine parameters.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Simulation configuration parameters.
///
/// Every field has a default so partial YAML/JSON documents deserialize.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for the deterministic RNG owned by the runtime.
    pub rng_seed: u64,
    /// Focus points per year in primary school and every non-secondary stage.
    pub general_point_budget: u8,
    /// Focus points per year in secondary school.
    pub secondary_point_budget: u8,
    /// Daily cost of the healthy meal plan.
    pub healthy_meal_daily: Decimal,
    /// Daily cost of the unhealthy meal plan.
    pub unhealthy_meal_daily: Decimal,
    /// Monthly fee per tuition subject.
    pub tuition_monthly_per_subject: Decimal,
    /// Fixed yearly spend on personal items in secondary school.
    pub secondary_personal_expense: Decimal,
    /// Age at which the career stage ends.
    pub retirement_age: u8,
    /// Yearly salary raise in percent.
    pub salary_raise_pct: Decimal,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rng_seed: 42,
            general_point_budget: 10,
            secondary_point_budget: 10,
            healthy_meal_daily: Decimal::new(500, 2),
            unhealthy_meal_daily: Decimal::new(300, 2),
            tuition_monthly_per_subject: Decimal::new(200, 0),
            secondary_personal_expense: Decimal::new(500, 0),
            retirement_age: 63,
            salary_raise_pct: Decimal::new(3, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_falls_back_to_defaults() {
        let cfg: SimConfig = serde_json::from_str(r#"{"rng_seed": 7, "retirement_age": 65}"#).unwrap();
        assert_eq!(cfg.rng_seed, 7);
        assert_eq!(cfg.retirement_age, 65);
        assert_eq!(cfg.general_point_budget, 10);
        assert_eq!(cfg.healthy_meal_daily, Decimal::new(5, 0));
    }
}
