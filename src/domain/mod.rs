//! Core domain types and logic.

pub mod alert;
pub mod app_config;
pub mod config_validation;
pub mod desk;
pub mod error;
pub mod feed;
pub mod guardrail;
pub mod ledger;
pub mod money;
pub mod state;
pub mod trade;
pub mod valuation;
