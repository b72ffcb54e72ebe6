//! The trading state owned by the ledger.

use serde::{Deserialize, Serialize};

use super::alert::Alert;
use super::trade::Trade;

pub const DEFAULT_CASH: f64 = 10_000.0;
pub const DEFAULT_FX_RATE: f64 = 1.36;
pub const DEFAULT_DAILY_TRADE_LIMIT: u32 = 5;
pub const DEFAULT_MAX_POSITION: f64 = 120.0;

/// Unit amounts are shown in. Every stored amount is in the primary unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisplayCurrency {
    #[default]
    Primary,
    Secondary,
}

/// Cash, position and history of a single paper account.
///
/// Serialized field names are the storage schema. Fields missing from a
/// stored blob fall back to [`TradingState::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TradingState {
    pub display_currency: DisplayCurrency,
    pub fx_rate: f64,
    pub cash_balance: f64,
    pub position_quantity: f64,
    pub average_cost_per_unit: f64,
    /// Newest first.
    pub trade_history: Vec<Trade>,
    pub daily_trade_limit: u32,
    pub cooling_off: bool,
    pub max_position_quantity: f64,
    pub alerts: Vec<Alert>,
}

impl Default for TradingState {
    fn default() -> Self {
        TradingState {
            display_currency: DisplayCurrency::Primary,
            fx_rate: DEFAULT_FX_RATE,
            cash_balance: DEFAULT_CASH,
            position_quantity: 0.0,
            average_cost_per_unit: 0.0,
            trade_history: Vec::new(),
            daily_trade_limit: DEFAULT_DAILY_TRADE_LIMIT,
            cooling_off: false,
            max_position_quantity: DEFAULT_MAX_POSITION,
            alerts: Vec::new(),
        }
    }
}

impl TradingState {
    /// Fresh state with a given starting balance.
    pub fn with_cash(cash_balance: f64) -> Self {
        TradingState {
            cash_balance,
            ..TradingState::default()
        }
    }

    /// Restore the invariants a stored blob may have lost. Unusable fx rate,
    /// daily limit or max position fall back to their defaults; a negative or
    /// non-finite position becomes flat, and a flat position carries no cost.
    pub fn normalized(mut self) -> Self {
        if !(self.fx_rate.is_finite() && self.fx_rate > 0.0) {
            self.fx_rate = DEFAULT_FX_RATE;
        }
        if self.daily_trade_limit == 0 {
            self.daily_trade_limit = DEFAULT_DAILY_TRADE_LIMIT;
        }
        if !(self.max_position_quantity.is_finite() && self.max_position_quantity > 0.0) {
            self.max_position_quantity = DEFAULT_MAX_POSITION;
        }
        if !(self.position_quantity.is_finite() && self.position_quantity > 0.0) {
            self.position_quantity = 0.0;
        }
        if self.position_quantity == 0.0
            || !(self.average_cost_per_unit.is_finite() && self.average_cost_per_unit >= 0.0)
        {
            self.average_cost_per_unit = 0.0;
        }
        self
    }

    pub fn last_trade(&self) -> Option<&Trade> {
        self.trade_history.first()
    }
}
