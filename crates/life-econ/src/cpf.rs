//! CPF contributions by age band.
//!
//! Contributions are computed on the salary up to the ordinary wage ceiling
//! and split across the three sub-accounts by fixed proportions. Monthly
//! amounts are rounded to cents; accumulation over several months is a
//! plain multiplication.

use life_core::{LifeStage, Player};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Monthly salary above which no further contributions are due.
pub fn wage_ceiling() -> Decimal {
    Decimal::new(6800, 0)
}

/// Total and employee-share rates for an age band.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CpfRates {
    pub total: Decimal,
    pub employee: Decimal,
}

/// Full rate up to 55, reduced to 60, further reduced above.
pub fn contribution_rates(age: u8) -> CpfRates {
    let (total, employee) = match age {
        0..=55 => (37, 20),
        56..=60 => (295, 150),
        _ => (205, 95),
    };
    let scale = if age > 55 { 3 } else { 2 };
    CpfRates {
        total: Decimal::new(total, scale),
        employee: Decimal::new(employee, scale),
    }
}

/// One month of contributions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpfContribution {
    pub total: Decimal,
    /// Deducted from the employee's salary.
    pub employee: Decimal,
    pub ordinary: Decimal,
    pub special: Decimal,
    pub medisave: Decimal,
}

pub fn monthly_contribution(salary: Decimal, age: u8) -> CpfContribution {
    if salary <= Decimal::ZERO {
        return CpfContribution::default();
    }
    let wage = salary.min(wage_ceiling());
    let rates = contribution_rates(age);
    let total = (wage * rates.total).round_dp(2);
    let employee = (wage * rates.employee).round_dp(2);
    let ordinary = (total * Decimal::new(6216, 4)).round_dp(2);
    let special = (total * Decimal::new(1622, 4)).round_dp(2);
    CpfContribution {
        total,
        employee,
        ordinary,
        special,
        medisave: total - ordinary - special,
    }
}

/// Salary left after the employee contribution.
pub fn take_home_pay(salary: Decimal, age: u8) -> Decimal {
    salary - monthly_contribution(salary, age).employee
}

/// Credit `months` of contributions from the player's current salary.
/// Players without a salary are returned unchanged.
pub fn accumulate_cpf(mut player: Player, months: u32) -> Player {
    let salary = match (&player.career, player.progress.stage) {
        (Some(c), LifeStage::Career) => c.monthly_salary,
        _ => return player,
    };
    let c = monthly_contribution(salary, player.age);
    let n = Decimal::from(months);
    player.cpf.ordinary += c.ordinary * n;
    player.cpf.special += c.special * n;
    player.cpf.medisave += c.medisave * n;
    debug!(months, total = %(c.total * n), "CPF accrued");
    player
}
