//! Price feed snapshot and the stale-but-available cache around it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::ports::feed_port::PriceFeedPort;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ohlc {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1D")]
    Day,
    #[serde(rename = "1W")]
    Week,
    #[serde(rename = "1M")]
    Month,
    #[serde(rename = "1Y")]
    Year,
}

impl Timeframe {
    pub const ALL: [Timeframe; 4] = [
        Timeframe::Day,
        Timeframe::Week,
        Timeframe::Month,
        Timeframe::Year,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::Day => "1D",
            Timeframe::Week => "1W",
            Timeframe::Month => "1M",
            Timeframe::Year => "1Y",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub label: String,
    pub value: f64,
}

/// Most recent market data, as supplied by a [`PriceFeedPort`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceFeedSnapshot {
    pub spot_price: f64,
    pub change_pct: f64,
    pub ohlc: Ohlc,
    #[serde(default)]
    pub history_series: BTreeMap<Timeframe, Vec<PricePoint>>,
    pub fx_rate: f64,
    #[serde(default, rename = "fetchedAtUTC")]
    pub fetched_at: Option<DateTime<Utc>>,
}

fn points(raw: &[(&str, f64)]) -> Vec<PricePoint> {
    raw.iter()
        .map(|&(label, value)| PricePoint {
            label: label.to_string(),
            value,
        })
        .collect()
}

impl PriceFeedSnapshot {
    /// Built-in snapshot used until the first successful fetch.
    pub fn fallback() -> Self {
        let mut history_series = BTreeMap::new();
        history_series.insert(
            Timeframe::Day,
            points(&[
                ("09:00", 29.12),
                ("10:00", 29.24),
                ("11:00", 28.96),
                ("12:00", 29.38),
                ("13:00", 29.15),
                ("14:00", 29.6),
                ("15:00", 29.34),
                ("16:00", 29.84),
            ]),
        );
        history_series.insert(
            Timeframe::Week,
            points(&[
                ("Mon", 27.9),
                ("Tue", 28.1),
                ("Wed", 28.6),
                ("Thu", 29.1),
                ("Fri", 29.84),
            ]),
        );
        history_series.insert(
            Timeframe::Month,
            points(&[("W1", 26.9), ("W2", 27.4), ("W3", 28.2), ("W4", 29.84)]),
        );
        history_series.insert(
            Timeframe::Year,
            points(&[
                ("Jan", 22.4),
                ("Mar", 24.8),
                ("May", 26.1),
                ("Jul", 27.6),
                ("Sep", 28.9),
                ("Nov", 29.84),
            ]),
        );

        PriceFeedSnapshot {
            spot_price: 29.84,
            change_pct: 0.86,
            ohlc: Ohlc {
                open: 29.12,
                high: 30.34,
                low: 28.66,
                close: 29.84,
            },
            history_series,
            fx_rate: 1.36,
            fetched_at: None,
        }
    }

    /// History for a timeframe; absent timeframes read as empty.
    pub fn history(&self, timeframe: Timeframe) -> &[PricePoint] {
        self.history_series
            .get(&timeframe)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Range of a history series as `(min, max)`, or `None` when it is empty.
    pub fn history_range(&self, timeframe: Timeframe) -> Option<(f64, f64)> {
        let series = self.history(timeframe);
        let first = series.first()?.value;
        Some(series.iter().fold((first, first), |(lo, hi), p| {
            (lo.min(p.value), hi.max(p.value))
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    Fresh,
    Stale,
}

/// Holds the last good snapshot. A failed refresh leaves it untouched.
#[derive(Debug, Clone)]
pub struct FeedCache {
    snapshot: PriceFeedSnapshot,
    status: FeedStatus,
}

impl Default for FeedCache {
    fn default() -> Self {
        FeedCache::new(PriceFeedSnapshot::fallback())
    }
}

impl FeedCache {
    pub fn new(initial: PriceFeedSnapshot) -> Self {
        FeedCache {
            snapshot: initial,
            status: FeedStatus::Stale,
        }
    }

    pub fn snapshot(&self) -> &PriceFeedSnapshot {
        &self.snapshot
    }

    pub fn status(&self) -> FeedStatus {
        self.status
    }

    pub fn refresh(&mut self, port: &dyn PriceFeedPort) -> FeedStatus {
        match port.fetch() {
            Ok(snapshot) => {
                debug!(spot = snapshot.spot_price, "price feed refreshed");
                self.snapshot = snapshot;
                self.status = FeedStatus::Fresh;
            }
            Err(e) => {
                warn!("price feed unavailable, keeping last snapshot: {e}");
                self.status = FeedStatus::Stale;
            }
        }
        self.status
    }
}
