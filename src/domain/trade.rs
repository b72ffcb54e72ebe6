//! Trade records and order requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest note kept on a trade; anything past this is cut off.
pub const MAX_NOTE_LEN: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A proposed trade, not yet admitted or applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub side: Side,
    pub quantity: f64,
    pub unit_price: f64,
    pub note: Option<String>,
}

impl Order {
    pub fn buy(quantity: f64, unit_price: f64) -> Self {
        Order {
            side: Side::Buy,
            quantity,
            unit_price,
            note: None,
        }
    }

    pub fn sell(quantity: f64, unit_price: f64) -> Self {
        Order {
            side: Side::Sell,
            quantity,
            unit_price,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn notional(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

/// An executed trade. Only the ledger creates these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: Uuid,
    pub side: Side,
    pub quantity: f64,
    pub unit_price: f64,
    #[serde(rename = "timestampUTC")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Trade {
    pub fn total(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

/// Trims a note, drops it if empty, and caps it at [`MAX_NOTE_LEN`] characters.
pub fn normalize_note(note: Option<&str>) -> Option<String> {
    let trimmed = note?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_NOTE_LEN).collect())
}
