//! Buying, selling and revaluing the player's holdings.
//!
//! Trades take the player by reference and return a new snapshot only on
//! success, so a rejected trade leaves the caller's player untouched.

use life_core::{Asset, Liability, Player, StatDelta};
use rand::Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::loans::{self, annual_dividends, check_affordability};
use crate::market::{find_item, ItemKind, MarketItem};
use crate::TradeError;

/// Derived totals over a player's finances.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Investments plus the resale value of financed items.
    pub total_asset_value: Decimal,
    /// Outstanding loan balances.
    pub total_liability_value: Decimal,
    /// Cash, CPF and assets, less liabilities.
    pub net_worth: Decimal,
    pub monthly_income: Decimal,
    pub monthly_expense: Decimal,
}

pub fn summarize(player: &Player) -> PortfolioSummary {
    let p = &player.portfolio;
    let investments: Decimal = p.assets.iter().map(Asset::market_value).sum();
    let financed: Decimal = p.liabilities.iter().map(|l| l.current_value).sum();
    let owed: Decimal = p.liabilities.iter().map(|l| l.loan_amount).sum();
    let total_asset_value = investments + financed;
    PortfolioSummary {
        total_asset_value,
        total_liability_value: owed,
        net_worth: player.stats().wealth() + player.cpf.total() + total_asset_value - owed,
        monthly_income: loans::monthly_income(player),
        monthly_expense: p.monthly_installments(),
    }
}

fn with_wealth_change(player: &Player, change: Decimal) -> Player {
    player.clone().with_stats_delta(&StatDelta {
        wealth: change,
        ..StatDelta::default()
    })
}

/// Unit price the player trades at: their holding's current value if they
/// already own some, otherwise the listed price.
pub fn quote(player: &Player, item: &MarketItem) -> Decimal {
    player
        .portfolio
        .asset(item.id)
        .map_or(item.price, |a| a.current_value)
}

/// Buy `quantity` units of an investment, paying cash.
pub fn buy_asset(player: &Player, item_id: &str, quantity: u32) -> Result<Player, TradeError> {
    let item = find_item(item_id).ok_or_else(|| TradeError::NotFound(item_id.to_string()))?;
    let class = match item.kind {
        ItemKind::Investment(class) => class,
        _ => return Err(TradeError::WrongKind(item.name.to_string())),
    };
    if quantity == 0 {
        return Err(TradeError::InvalidQuantity(quantity));
    }
    let unit = quote(player, item);
    let cost = unit * Decimal::from(quantity);
    if cost < item.min_investment {
        return Err(TradeError::MinimumInvestment {
            item: item.name.to_string(),
            minimum: item.min_investment,
        });
    }
    let available = player.stats().wealth();
    if cost > available {
        return Err(TradeError::InsufficientFunds {
            needed: cost,
            available,
        });
    }

    let mut next = with_wealth_change(player, -cost);
    match next.portfolio.assets.iter_mut().find(|a| a.id == item.id) {
        Some(held) => {
            let old_cost = held.purchase_price * Decimal::from(held.quantity);
            held.quantity = held
                .quantity
                .checked_add(quantity)
                .ok_or(TradeError::InvalidQuantity(quantity))?;
            held.purchase_price = ((old_cost + cost) / Decimal::from(held.quantity)).round_dp(4);
        }
        None => next.portfolio.assets.push(Asset {
            id: item.id.to_string(),
            name: item.name.to_string(),
            class,
            quantity,
            purchase_price: unit,
            current_value: unit,
            annual_return_pct: item.annual_return_pct,
            volatility: item.volatility,
            dividend_yield_pct: item.dividend_yield_pct,
        }),
    }
    info!(item = item.id, quantity, cost = %cost, "asset bought");
    Ok(next)
}

/// Sell part of a holding, or all of it when `quantity` is `None`.
pub fn sell_asset(player: &Player, asset_id: &str, quantity: Option<u32>) -> Result<Player, TradeError> {
    let held = player
        .portfolio
        .asset(asset_id)
        .ok_or_else(|| TradeError::NotFound(asset_id.to_string()))?;
    let quantity = quantity.unwrap_or(held.quantity);
    if quantity == 0 || quantity > held.quantity {
        return Err(TradeError::InvalidQuantity(quantity));
    }
    let proceeds = held.current_value * Decimal::from(quantity);
    let mut next = with_wealth_change(player, proceeds);
    if let Some(pos) = next.portfolio.assets.iter().position(|a| a.id == asset_id) {
        let remaining = next.portfolio.assets[pos].quantity - quantity;
        if remaining == 0 {
            next.portfolio.assets.remove(pos);
        } else {
            next.portfolio.assets[pos].quantity = remaining;
        }
    }
    info!(asset = asset_id, quantity, proceeds = %proceeds, "asset sold");
    Ok(next)
}

/// Buy a financed item: pay the down payment in cash and take a loan for
/// the rest, if the installment is affordable.
pub fn buy_liability(player: &Player, item_id: &str) -> Result<Player, TradeError> {
    let item = find_item(item_id).ok_or_else(|| TradeError::NotFound(item_id.to_string()))?;
    let terms = item
        .financing
        .as_ref()
        .ok_or_else(|| TradeError::WrongKind(item.name.to_string()))?;
    let down = (item.price * terms.down_payment_pct / Decimal::from(100)).round_dp(2);
    let available = player.stats().wealth();
    if down > available {
        return Err(TradeError::InsufficientFunds {
            needed: down,
            available,
        });
    }
    let principal = item.price - down;
    let installment = loans::annuity_installment(principal, terms.interest_rate_pct, terms.tenure_months)?;
    check_affordability(player, installment)?;

    let mut next = with_wealth_change(player, -down);
    next.portfolio.loans_opened = next.portfolio.loans_opened.saturating_add(1);
    let ordinal = next.portfolio.loans_opened;
    next.portfolio.liabilities.push(Liability {
        id: format!("{}-{ordinal}", item.id),
        name: item.name.to_string(),
        principal,
        loan_amount: principal,
        monthly_installment: installment,
        remaining_months: terms.tenure_months,
        interest_rate_pct: terms.interest_rate_pct,
        purchase_price: item.price,
        current_value: item.price,
        depreciation_rate_pct: terms.depreciation_rate_pct,
        missed_payments: 0,
    });
    info!(item = item.id, down = %down, installment = %installment, "financed purchase");
    Ok(next)
}

/// One year of market movement: every holding moves by its expected return
/// scaled by a noise factor in `1 ± volatility`, dividends are paid in cash,
/// and depreciating items lose value.
pub fn apply_annual_returns<R: Rng>(mut player: Player, rng: &mut R) -> Player {
    let dividends = annual_dividends(&player).round_dp(2);
    for asset in &mut player.portfolio.assets {
        let noise = 1.0 + rng.gen_range(-0.5f64..0.5) * 2.0 * asset.volatility;
        let growth = 1.0 + asset.annual_return_pct / 100.0 * noise;
        let factor = Decimal::from_f64(growth).unwrap_or(Decimal::ONE);
        asset.current_value = (asset.current_value * factor).round_dp(4).max(Decimal::ZERO);
        debug!(asset = %asset.id, growth, "annual return");
    }
    for loan in &mut player.portfolio.liabilities {
        if let Some(rate) = loan.depreciation_rate_pct {
            let keep = Decimal::ONE - rate / Decimal::from(100);
            loan.current_value = (loan.current_value * keep).round_dp(2).max(Decimal::ZERO);
        }
    }
    player.with_stats_delta(&StatDelta {
        wealth: dividends,
        ..StatDelta::default()
    })
}
