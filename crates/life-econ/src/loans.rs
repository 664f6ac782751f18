//! Loan amortization and installment affordability.

use life_core::{LifeStage, Player, StatDelta};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{info, warn};

use crate::TradeError;

/// Installments may take at most this share of monthly income, in percent.
pub const MAX_INSTALLMENT_SHARE_PCT: i64 = 40;

/// One month of a loan: how the installment splits and what is left.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AmortizationStep {
    pub interest: Decimal,
    pub principal: Decimal,
    pub balance: Decimal,
}

impl AmortizationStep {
    /// Cash actually paid; the last payment is only what remains owed.
    pub fn paid(&self, balance_before: Decimal) -> Decimal {
        self.interest + self.principal.min(balance_before)
    }
}

fn monthly_rate(annual_rate_pct: Decimal) -> Decimal {
    annual_rate_pct / Decimal::from(100) / Decimal::from(12)
}

/// Split one installment into interest (rounded to cents) and principal.
pub fn amortize_month(balance: Decimal, installment: Decimal, annual_rate_pct: Decimal) -> AmortizationStep {
    let interest = (balance * monthly_rate(annual_rate_pct)).round_dp(2);
    let principal = installment - interest;
    AmortizationStep {
        interest,
        principal,
        balance: (balance - principal).max(Decimal::ZERO),
    }
}

/// Level monthly payment that repays `principal` over `months`, rounded up
/// to the cent.
pub fn annuity_installment(principal: Decimal, annual_rate_pct: Decimal, months: u32) -> Result<Decimal, TradeError> {
    if months == 0 {
        return Err(TradeError::InvalidQuantity(0));
    }
    let n = Decimal::from(months);
    if annual_rate_pct.is_zero() {
        return Ok((principal / n).round_dp_with_strategy(2, RoundingStrategy::AwayFromZero));
    }
    let p = principal.to_f64().ok_or(TradeError::NonFinite)?;
    let r = monthly_rate(annual_rate_pct).to_f64().ok_or(TradeError::NonFinite)?;
    let payment = p * r / (1.0 - (1.0 + r).powi(-(months as i32)));
    let payment = Decimal::from_f64(payment).ok_or(TradeError::NonFinite)?;
    Ok(payment.round_dp_with_strategy(2, RoundingStrategy::AwayFromZero))
}

/// Yearly dividends across all holdings.
pub fn annual_dividends(player: &Player) -> Decimal {
    player
        .portfolio
        .assets
        .iter()
        .map(|a| a.market_value() * a.dividend_yield_pct / Decimal::from(100))
        .sum()
}

/// Salary (while working) plus a twelfth of yearly dividends.
pub fn monthly_income(player: &Player) -> Decimal {
    let salary = match (&player.career, player.progress.stage) {
        (Some(c), LifeStage::Career) => c.monthly_salary,
        _ => Decimal::ZERO,
    };
    (salary + annual_dividends(player) / Decimal::from(12)).round_dp(2)
}

/// Reject `additional` when total installments would exceed the allowed
/// share of monthly income.
pub fn check_affordability(player: &Player, additional: Decimal) -> Result<(), TradeError> {
    let income = monthly_income(player);
    let installments = player.portfolio.monthly_installments() + additional;
    let limit = income * Decimal::new(MAX_INSTALLMENT_SHARE_PCT, 2);
    if income <= Decimal::ZERO || installments > limit {
        return Err(TradeError::Unaffordable {
            installments,
            income,
        });
    }
    Ok(())
}

/// Pay one month on every open loan, deducting the cash from wealth.
/// A loan whose installment the remaining cash cannot cover is skipped: its
/// balance and term stay put and the miss is counted. Loans with no months
/// and no balance left are removed.
pub fn process_monthly_payments(mut player: Player) -> Player {
    let mut cash = player.stats().wealth();
    let mut paid = Decimal::ZERO;
    let mut open = Vec::with_capacity(player.portfolio.liabilities.len());
    for mut loan in std::mem::take(&mut player.portfolio.liabilities) {
        let before = loan.loan_amount;
        if before > Decimal::ZERO {
            let step = amortize_month(before, loan.monthly_installment, loan.interest_rate_pct);
            let due = step.paid(before);
            if due > cash {
                loan.missed_payments = loan.missed_payments.saturating_add(1);
                warn!(loan = %loan.id, due = %due, cash = %cash, missed = loan.missed_payments, "installment missed");
                open.push(loan);
                continue;
            }
            cash -= due;
            paid += due;
            loan.loan_amount = step.balance;
        }
        loan.remaining_months = loan.remaining_months.saturating_sub(1);
        if loan.remaining_months == 0 && loan.loan_amount.is_zero() {
            info!(loan = %loan.id, "loan paid off");
            continue;
        }
        open.push(loan);
    }
    player.portfolio.liabilities = open;
    player.with_stats_delta(&StatDelta {
        wealth: -paid,
        ..StatDelta::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::test_player;
    use life_core::Liability;
    use proptest::prelude::*;

    fn loan(amount: Decimal, installment: Decimal, rate: Decimal, months: u32) -> Liability {
        Liability {
            id: "loan-1".into(),
            name: "Test loan".into(),
            principal: amount,
            loan_amount: amount,
            monthly_installment: installment,
            remaining_months: months,
            interest_rate_pct: rate,
            purchase_price: amount,
            current_value: amount,
            depreciation_rate_pct: None,
            missed_payments: 0,
        }
    }

    #[test]
    fn first_month_splits_interest_and_principal() {
        let step = amortize_month(Decimal::new(1200, 0), Decimal::new(110, 0), Decimal::new(6, 0));
        assert_eq!(step.interest, Decimal::new(6, 0));
        assert_eq!(step.principal, Decimal::new(104, 0));
        assert_eq!(step.balance, Decimal::new(1096, 0));
    }

    #[test]
    fn monthly_payment_deducts_wealth() {
        let mut p = test_player();
        p.portfolio.liabilities.push(loan(
            Decimal::new(1200, 0),
            Decimal::new(110, 0),
            Decimal::new(6, 0),
            12,
        ));
        let before = p.stats().wealth();
        let p = process_monthly_payments(p);
        assert_eq!(p.stats().wealth(), before - Decimal::new(110, 0));
        let l = &p.portfolio.liabilities[0];
        assert_eq!(l.loan_amount, Decimal::new(1096, 0));
        assert_eq!(l.remaining_months, 11);
    }

    #[test]
    fn no_cash_means_a_missed_payment_not_a_free_one() {
        let p = crate::tests::worker(3000);
        let cash = p.stats().wealth();
        let mut p = p.with_stats_delta(&StatDelta {
            wealth: -cash,
            ..StatDelta::default()
        });
        assert_eq!(p.stats().wealth(), Decimal::ZERO);
        p.portfolio.liabilities.push(loan(
            Decimal::new(10_500, 0),
            Decimal::new(19815, 2),
            Decimal::new(5, 0),
            60,
        ));
        let p = process_monthly_payments(p);
        let l = &p.portfolio.liabilities[0];
        assert_eq!(p.stats().wealth(), Decimal::ZERO);
        assert_eq!(l.loan_amount, Decimal::new(10_500, 0));
        assert_eq!(l.remaining_months, 60);
        assert_eq!(l.missed_payments, 1);
    }

    #[test]
    fn cash_covers_loans_in_order_until_it_runs_out() {
        let mut p = test_player();
        p.portfolio.liabilities.push(loan(
            Decimal::new(1200, 0),
            Decimal::new(600, 0),
            Decimal::ZERO,
            2,
        ));
        let mut second = loan(Decimal::new(1200, 0), Decimal::new(600, 0), Decimal::ZERO, 2);
        second.id = "loan-2".into();
        p.portfolio.liabilities.push(second);
        // $1,000 on hand: the first installment is paid, the second is missed.
        let p = process_monthly_payments(p);
        assert_eq!(p.stats().wealth(), Decimal::new(400, 0));
        let loans = &p.portfolio.liabilities;
        assert_eq!(loans[0].loan_amount, Decimal::new(600, 0));
        assert_eq!(loans[0].missed_payments, 0);
        assert_eq!(loans[1].loan_amount, Decimal::new(1200, 0));
        assert_eq!(loans[1].missed_payments, 1);
    }

    #[test]
    fn installment_matches_closed_form() {
        let pmt = annuity_installment(Decimal::new(100_000, 0), Decimal::new(6, 0), 360).unwrap();
        assert_eq!(pmt, Decimal::new(59_956, 2));
        let flat = annuity_installment(Decimal::new(1000, 0), Decimal::ZERO, 3).unwrap();
        assert_eq!(flat, Decimal::new(33_334, 2));
        assert_eq!(
            annuity_installment(Decimal::ONE, Decimal::ONE, 0),
            Err(TradeError::InvalidQuantity(0))
        );
    }

    #[test]
    fn affordability_is_forty_percent_of_income() {
        let p = crate::tests::worker(3000);
        assert!(check_affordability(&p, Decimal::new(1200, 0)).is_ok());
        assert_eq!(
            check_affordability(&p, Decimal::new(120001, 2)),
            Err(TradeError::Unaffordable {
                installments: Decimal::new(120001, 2),
                income: Decimal::new(3000, 0),
            })
        );
        assert!(check_affordability(&test_player(), Decimal::ONE).is_err());
    }

    proptest! {
        #[test]
        fn loans_terminate_within_tenure(
            principal in 1_000i64..500_000,
            rate_bp in 0i64..1_000,
            months in 12u32..360,
        ) {
            let amount = Decimal::new(principal, 0);
            let rate = Decimal::new(rate_bp, 2);
            let installment = annuity_installment(amount, rate, months).unwrap();
            let mut p = test_player();
            p = p.with_stats_delta(&StatDelta { wealth: Decimal::new(10_000_000, 0), ..StatDelta::default() });
            p.portfolio.liabilities.push(loan(amount, installment, rate, months));
            let mut periods = 0u32;
            while !p.portfolio.liabilities.is_empty() && periods <= months + 1 {
                p = process_monthly_payments(p);
                periods += 1;
            }
            prop_assert!(p.portfolio.liabilities.is_empty());
            prop_assert!(periods <= months + 1);
        }
    }
}
