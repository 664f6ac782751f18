//! Financial records carried on the player. The arithmetic over them lives
//! in the `life-econ` crate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// CPF sub-account balances.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CpfAccounts {
    pub ordinary: Decimal,
    pub special: Decimal,
    pub medisave: Decimal,
}

impl CpfAccounts {
    pub fn total(&self) -> Decimal {
        self.ordinary + self.special + self.medisave
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetClass {
    Stock,
    Etf,
    Bond,
    Reit,
}

/// A holding bought from the market. Values are per unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Market item id; one holding per id.
    pub id: String,
    pub name: String,
    pub class: AssetClass,
    pub quantity: u32,
    pub purchase_price: Decimal,
    pub current_value: Decimal,
    /// Expected annual return in percent.
    pub annual_return_pct: f64,
    /// Noise amplitude applied to the expected return, in `[0, 1]`.
    pub volatility: f64,
    /// Annual dividend yield in percent of current value.
    pub dividend_yield_pct: Decimal,
}

impl Asset {
    pub fn market_value(&self) -> Decimal {
        self.current_value * Decimal::from(self.quantity)
    }
}

/// A financed purchase: the loan plus the item it paid for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Liability {
    pub id: String,
    pub name: String,
    /// Amount originally borrowed.
    pub principal: Decimal,
    /// Outstanding loan balance.
    pub loan_amount: Decimal,
    pub monthly_installment: Decimal,
    pub remaining_months: u32,
    /// Annual interest rate in percent.
    pub interest_rate_pct: Decimal,
    pub purchase_price: Decimal,
    /// Current resale value of the financed item.
    pub current_value: Decimal,
    /// Annual depreciation in percent, for items that lose value.
    pub depreciation_rate_pct: Option<Decimal>,
    /// Installments the player could not cover. A missed month leaves the
    /// balance and the remaining term as they were.
    #[serde(default)]
    pub missed_payments: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub assets: Vec<Asset>,
    pub liabilities: Vec<Liability>,
    /// Loans ever taken out; numbers new liability ids so a paid-off loan's
    /// id is never handed out again.
    #[serde(default)]
    pub loans_opened: u32,
}

impl Portfolio {
    pub fn asset(&self, id: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == id)
    }

    /// Sum of monthly installments across open loans.
    pub fn monthly_installments(&self) -> Decimal {
        self.liabilities.iter().map(|l| l.monthly_installment).sum()
    }
}
