//! Price and daily-move alerts.
//!
//! Alerts are evaluated statelessly against the current feed snapshot. A
//! triggered alert stays in place; triggering is re-derived on every
//! evaluation and never mutates the alert set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::feed::PriceFeedSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Above,
    Below,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Above => f.write_str("ABOVE"),
            Direction::Below => f.write_str("BELOW"),
        }
    }
}

/// What an alert watches. Each kind carries its own required threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertTrigger {
    /// Spot price crosses an absolute level, in the primary unit.
    #[serde(rename_all = "camelCase")]
    Price { direction: Direction, threshold: f64 },
    /// Daily change crosses a percent magnitude. The threshold is stored
    /// positive; `Below` compares against its negation.
    #[serde(rename_all = "camelCase")]
    Move { direction: Direction, threshold: f64 },
}

impl AlertTrigger {
    pub fn direction(&self) -> Direction {
        match self {
            AlertTrigger::Price { direction, .. } | AlertTrigger::Move { direction, .. } => {
                *direction
            }
        }
    }

    pub fn threshold(&self) -> f64 {
        match self {
            AlertTrigger::Price { threshold, .. } | AlertTrigger::Move { threshold, .. } => {
                *threshold
            }
        }
    }

    pub fn is_triggered(&self, feed: &PriceFeedSnapshot) -> bool {
        match *self {
            AlertTrigger::Price {
                direction: Direction::Above,
                threshold,
            } => feed.spot_price >= threshold,
            AlertTrigger::Price {
                direction: Direction::Below,
                threshold,
            } => feed.spot_price <= threshold,
            AlertTrigger::Move {
                direction: Direction::Above,
                threshold,
            } => feed.change_pct >= threshold,
            AlertTrigger::Move {
                direction: Direction::Below,
                threshold,
            } => feed.change_pct <= -threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: Uuid,
    #[serde(flatten)]
    pub trigger: AlertTrigger,
    pub created_at: DateTime<Utc>,
}

/// Outcome of evaluating a single alert.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertStatus<'a> {
    pub alert: &'a Alert,
    pub triggered: bool,
}

/// Evaluate every alert against the snapshot, preserving display order.
pub fn evaluate<'a>(alerts: &'a [Alert], feed: &PriceFeedSnapshot) -> Vec<AlertStatus<'a>> {
    alerts
        .iter()
        .map(|alert| AlertStatus {
            alert,
            triggered: alert.trigger.is_triggered(feed),
        })
        .collect()
}
