#![deny(warnings)]

//! Financial engine: CPF, market trades, portfolio returns, loans and the
//! BTO ballot.
//!
//! Money is [`Decimal`] throughout. Operations that can be refused take the
//! player by reference and return a [`TradeError`] describing why; the
//! caller's snapshot is never partially updated.

use rust_decimal::Decimal;
use thiserror::Error;

pub mod cpf;
pub mod housing;
pub mod loans;
pub mod market;
pub mod portfolio;

pub use cpf::{accumulate_cpf, monthly_contribution, take_home_pay, CpfContribution};
pub use housing::{ballot_bto, BallotOutcome};
pub use loans::{process_monthly_payments, AmortizationStep};
pub use market::{find_item, market, ItemKind, MarketItem};
pub use portfolio::{apply_annual_returns, buy_asset, buy_liability, sell_asset, summarize, PortfolioSummary};

/// Structured refusals for trades and purchases. The message is user-facing.
#[derive(Debug, Error, PartialEq)]
pub enum TradeError {
    #[error("insufficient funds: need ${needed}, have ${available}")]
    InsufficientFunds { needed: Decimal, available: Decimal },
    #[error("minimum investment for {item} is ${minimum}")]
    MinimumInvestment { item: String, minimum: Decimal },
    /// Installments would exceed the allowed share of monthly income.
    #[error("monthly installments of ${installments} are too high for an income of ${income}")]
    Unaffordable { installments: Decimal, income: Decimal },
    #[error("{0} not found")]
    NotFound(String),
    #[error("invalid quantity {0}")]
    InvalidQuantity(u32),
    #[error("{0} cannot be bought that way")]
    WrongKind(String),
    #[error("already living in a BTO flat")]
    AlreadyOwnsHome,
    /// Numeric conversion to floating point failed.
    #[error("non-finite numeric conversion")]
    NonFinite,
}

#[cfg(test)]
pub(crate) mod tests {
    use life_core::player::CareerRecord;
    use life_core::{create_player, Gender, LifeStage, NewPlayer, Player, SesClass};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rust_decimal::Decimal;

    /// A fresh middle-tier student with $1,000.
    pub(crate) fn test_player() -> Player {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        create_player(
            NewPlayer {
                name: "Mei".into(),
                avatar: "owl".into(),
                gender: Gender::Female,
                ses: SesClass::Middle,
                traits: vec![],
            },
            &mut rng,
        )
        .unwrap()
    }

    /// A 30-year-old earning `salary` a month.
    pub(crate) fn worker(salary: i64) -> Player {
        let mut p = test_player();
        p.age = 30;
        p.progress.stage = LifeStage::Career;
        p.career = Some(CareerRecord {
            occupation: "Executive".into(),
            monthly_salary: Decimal::new(salary, 0),
            years_employed: 2,
        });
        p
    }

    #[test]
    fn errors_read_as_messages() {
        let e = super::TradeError::InsufficientFunds {
            needed: Decimal::new(700, 0),
            available: Decimal::new(300, 0),
        };
        assert_eq!(e.to_string(), "insufficient funds: need $700, have $300");
    }
}
