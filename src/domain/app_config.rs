//! Resolved application configuration.

use std::path::PathBuf;

use super::state::{
    DEFAULT_CASH, DEFAULT_DAILY_TRADE_LIMIT, DEFAULT_FX_RATE, DEFAULT_MAX_POSITION, TradingState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Json,
    Sqlite,
}

impl StorageBackend {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "json" => Some(StorageBackend::Json),
            "sqlite" => Some(StorageBackend::Sqlite),
            _ => None,
        }
    }

    pub fn default_path(&self) -> &'static str {
        match self {
            StorageBackend::Json => "ouncebook-state.json",
            StorageBackend::Sqlite => "ouncebook.db",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub storage_backend: StorageBackend,
    pub storage_path: PathBuf,
    pub feed_path: Option<PathBuf>,
    pub initial_cash: f64,
    pub fx_rate: f64,
    pub daily_trade_limit: u32,
    pub max_position: f64,
    /// Start a fresh account with trading paused.
    pub cooling_off: bool,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            storage_backend: StorageBackend::Json,
            storage_path: PathBuf::from(StorageBackend::Json.default_path()),
            feed_path: None,
            initial_cash: DEFAULT_CASH,
            fx_rate: DEFAULT_FX_RATE,
            daily_trade_limit: DEFAULT_DAILY_TRADE_LIMIT,
            max_position: DEFAULT_MAX_POSITION,
            cooling_off: false,
            log_level: "warn".to_string(),
        }
    }
}

impl AppConfig {
    /// State used when nothing has been saved yet.
    pub fn fresh_state(&self) -> TradingState {
        TradingState {
            cash_balance: self.initial_cash,
            fx_rate: self.fx_rate,
            daily_trade_limit: self.daily_trade_limit,
            max_position_quantity: self.max_position,
            cooling_off: self.cooling_off,
            ..TradingState::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_backend() {
        assert_eq!(StorageBackend::parse("JSON"), Some(StorageBackend::Json));
        assert_eq!(StorageBackend::parse(" sqlite "), Some(StorageBackend::Sqlite));
        assert_eq!(StorageBackend::parse("redis"), None);
    }

    #[test]
    fn default_fresh_state_matches_state_default() {
        assert_eq!(AppConfig::default().fresh_state(), TradingState::default());
    }

    #[test]
    fn fresh_state_uses_configured_values() {
        let config = AppConfig {
            initial_cash: 2500.0,
            daily_trade_limit: 3,
            max_position: 40.0,
            cooling_off: true,
            ..AppConfig::default()
        };
        let state = config.fresh_state();
        assert!((state.cash_balance - 2500.0).abs() < f64::EPSILON);
        assert_eq!(state.daily_trade_limit, 3);
        assert!((state.max_position_quantity - 40.0).abs() < f64::EPSILON);
        assert!(state.cooling_off);
        assert!(state.trade_history.is_empty());
    }
}
