//! Static catalog of things the player can buy.

use life_core::AssetClass;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::Serialize;

/// What buying an item produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ItemKind {
    /// Paid in full; becomes an [`life_core::Asset`] holding.
    Investment(AssetClass),
    /// Financed with a loan; becomes a [`life_core::Liability`].
    Property,
    Vehicle,
}

/// Loan terms for financed items.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Financing {
    pub tenure_months: u32,
    /// Annual interest in percent.
    pub interest_rate_pct: Decimal,
    /// Share of the price paid upfront, in percent.
    pub down_payment_pct: Decimal,
    /// Annual loss of value in percent, for items that depreciate.
    pub depreciation_rate_pct: Option<Decimal>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MarketItem {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: ItemKind,
    /// Unit price for investments, full price for financed items.
    pub price: Decimal,
    pub annual_return_pct: f64,
    pub volatility: f64,
    /// Smallest order value accepted.
    pub min_investment: Decimal,
    pub dividend_yield_pct: Decimal,
    pub financing: Option<Financing>,
}

impl MarketItem {
    #[allow(clippy::too_many_arguments)]
    fn investment(
        id: &'static str,
        name: &'static str,
        class: AssetClass,
        price: Decimal,
        annual_return_pct: f64,
        volatility: f64,
        min_investment: i64,
        dividend_yield_pct: Decimal,
    ) -> Self {
        Self {
            id,
            name,
            kind: ItemKind::Investment(class),
            price,
            annual_return_pct,
            volatility,
            min_investment: Decimal::new(min_investment, 0),
            dividend_yield_pct,
            financing: None,
        }
    }

    fn financed(
        id: &'static str,
        name: &'static str,
        kind: ItemKind,
        price: i64,
        financing: Financing,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            price: Decimal::new(price, 0),
            annual_return_pct: 0.0,
            volatility: 0.0,
            min_investment: Decimal::ZERO,
            dividend_yield_pct: Decimal::ZERO,
            financing: Some(financing),
        }
    }
}

static MARKET: Lazy<Vec<MarketItem>> = Lazy::new(|| {
    vec![
        MarketItem::investment(
            "sti-etf",
            "STI ETF",
            AssetClass::Etf,
            Decimal::new(350, 2),
            6.0,
            0.15,
            500,
            Decimal::new(35, 1),
        ),
        MarketItem::investment(
            "bank-shares",
            "Local Bank Shares",
            AssetClass::Stock,
            Decimal::new(3500, 2),
            8.0,
            0.25,
            350,
            Decimal::new(50, 1),
        ),
        MarketItem::investment(
            "telco-shares",
            "Telco Shares",
            AssetClass::Stock,
            Decimal::new(250, 2),
            4.0,
            0.20,
            250,
            Decimal::new(40, 1),
        ),
        MarketItem::investment(
            "tech-fund",
            "Global Tech Fund",
            AssetClass::Stock,
            Decimal::new(100, 0),
            12.0,
            0.45,
            1000,
            Decimal::ZERO,
        ),
        MarketItem::investment(
            "savings-bond",
            "Singapore Savings Bond",
            AssetClass::Bond,
            Decimal::ONE,
            0.0,
            0.0,
            500,
            Decimal::new(28, 1),
        ),
        MarketItem::investment(
            "mall-reit",
            "Mall REIT",
            AssetClass::Reit,
            Decimal::new(200, 2),
            3.0,
            0.20,
            500,
            Decimal::new(60, 1),
        ),
        MarketItem::financed(
            "hdb-resale",
            "HDB Resale Flat",
            ItemKind::Property,
            450_000,
            Financing {
                tenure_months: 300,
                interest_rate_pct: Decimal::new(26, 1),
                down_payment_pct: Decimal::new(25, 0),
                depreciation_rate_pct: None,
            },
        ),
        MarketItem::financed(
            "condo",
            "Condominium",
            ItemKind::Property,
            1_200_000,
            Financing {
                tenure_months: 300,
                interest_rate_pct: Decimal::new(35, 1),
                down_payment_pct: Decimal::new(25, 0),
                depreciation_rate_pct: None,
            },
        ),
        MarketItem::financed(
            "sedan",
            "Family Sedan",
            ItemKind::Vehicle,
            120_000,
            Financing {
                tenure_months: 84,
                interest_rate_pct: Decimal::new(278, 2),
                down_payment_pct: Decimal::new(40, 0),
                depreciation_rate_pct: Some(Decimal::new(10, 0)),
            },
        ),
        MarketItem::financed(
            "motorcycle",
            "Motorcycle",
            ItemKind::Vehicle,
            15_000,
            Financing {
                tenure_months: 60,
                interest_rate_pct: Decimal::new(5, 0),
                down_payment_pct: Decimal::new(30, 0),
                depreciation_rate_pct: Some(Decimal::new(15, 0)),
            },
        ),
    ]
});

/// Everything on sale, in display order.
pub fn market() -> &'static [MarketItem] {
    &MARKET
}

pub fn find_item(id: &str) -> Option<&'static MarketItem> {
    MARKET.iter().find(|m| m.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_consistent() {
        for item in market() {
            assert!(item.price > Decimal::ZERO, "{}", item.id);
            assert!((0.0..=1.0).contains(&item.volatility));
            let financed = !matches!(item.kind, ItemKind::Investment(_));
            assert_eq!(financed, item.financing.is_some(), "{}", item.id);
            assert_eq!(find_item(item.id), Some(item));
        }
        assert!(find_item("lottery-ticket").is_none());
    }
}
