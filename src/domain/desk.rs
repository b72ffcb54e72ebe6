//! The trading desk: application-context handle around the ledger and feed.
//!
//! Every user action follows the same path: check with the guardrails,
//! apply through the [`Ledger`], let observers persist, then re-derive
//! valuation and alert status from the new state and current feed.

use chrono::{DateTime, Local, TimeZone, Utc};
use tracing::{info, warn};

use super::alert::{self, AlertStatus};
use super::error::OunceError;
use super::feed::{FeedCache, FeedStatus, PriceFeedSnapshot};
use super::guardrail::{self, Admission, Denial};
use super::ledger::Ledger;
use super::state::TradingState;
use super::trade::{Order, Side, Trade};
use super::valuation::{self, PortfolioValuation, RiskPreview};
use crate::ports::feed_port::PriceFeedPort;
use crate::ports::observer_port::StateObserver;
use crate::ports::state_port::StatePort;

/// Result of placing an order through the guardrails.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderOutcome {
    Executed {
        trade: Trade,
        exceeds_max_position: bool,
    },
    Denied(Denial),
}

/// Load the saved state, or fall back to `fresh` when nothing usable is stored.
/// A loaded state is normalized before use.
pub fn hydrate(store: &dyn StatePort, fresh: TradingState) -> TradingState {
    match store.load() {
        Ok(Some(stored)) => {
            let state = stored.clone().normalized();
            if state != stored {
                warn!("saved state broke ledger invariants, repaired on load");
            }
            state
        }
        Ok(None) => fresh,
        Err(e) => {
            warn!("could not load saved state, starting fresh: {e}");
            fresh
        }
    }
}

pub struct Desk {
    ledger: Ledger,
    feed: FeedCache,
}

impl Desk {
    pub fn new(state: TradingState) -> Self {
        Desk::with_feed(state, FeedCache::default())
    }

    pub fn with_feed(state: TradingState, feed: FeedCache) -> Self {
        Desk {
            ledger: Ledger::new(state),
            feed,
        }
    }

    pub fn subscribe(&mut self, observer: Box<dyn StateObserver>) {
        self.ledger.subscribe(observer);
    }

    pub fn state(&self) -> &TradingState {
        self.ledger.state()
    }

    /// Settings and alert mutations go straight to the ledger.
    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    pub fn feed(&self) -> &PriceFeedSnapshot {
        self.feed.snapshot()
    }

    pub fn feed_status(&self) -> FeedStatus {
        self.feed.status()
    }

    /// Refresh the feed, keeping the last snapshot on failure. A fresh
    /// snapshot's fx rate is pushed into the state.
    pub fn refresh_feed(&mut self, port: &dyn PriceFeedPort) -> FeedStatus {
        let status = self.feed.refresh(port);
        if status == FeedStatus::Fresh {
            let rate = self.feed.snapshot().fx_rate;
            if !self.ledger.set_fx_rate(rate) {
                warn!(rate, "ignoring non-positive fx rate from feed");
            }
        }
        status
    }

    /// Build a market order at the current spot price.
    pub fn market_order(&self, side: Side, quantity: f64, note: Option<String>) -> Order {
        Order {
            side,
            quantity,
            unit_price: self.feed.snapshot().spot_price,
            note,
        }
    }

    pub fn check<Tz: TimeZone>(&self, order: &Order, now: &DateTime<Tz>) -> Admission {
        guardrail::can_execute(self.state(), order, now)
    }

    /// Place a market order against the local clock.
    pub fn place_order(
        &mut self,
        side: Side,
        quantity: f64,
        note: Option<String>,
    ) -> Result<OrderOutcome, OunceError> {
        let order = self.market_order(side, quantity, note);
        self.place_order_at(&order, Local::now())
    }

    /// Guardrails first, then the ledger. Denials are returned, not raised.
    pub fn place_order_at<Tz: TimeZone>(
        &mut self,
        order: &Order,
        now: DateTime<Tz>,
    ) -> Result<OrderOutcome, OunceError> {
        let exceeds_max_position = match self.check(order, &now) {
            Admission::Denied(reason) => {
                info!(side = %order.side, quantity = order.quantity, reason = reason.code(), "order denied");
                return Ok(OrderOutcome::Denied(reason));
            }
            Admission::Admissible {
                exceeds_max_position,
            } => exceeds_max_position,
        };
        if exceeds_max_position {
            warn!(
                max = self.state().max_position_quantity,
                "trade takes position above the configured maximum"
            );
        }

        let trade = self
            .ledger
            .execute(order, now.with_timezone(&Utc))?
            .clone();
        Ok(OrderOutcome::Executed {
            trade,
            exceeds_max_position,
        })
    }

    pub fn valuation(&self) -> PortfolioValuation {
        valuation::value_portfolio(self.state(), self.feed())
    }

    pub fn alert_statuses(&self) -> Vec<AlertStatus<'_>> {
        alert::evaluate(&self.state().alerts, self.feed())
    }

    pub fn triggered_alerts(&self) -> Vec<AlertStatus<'_>> {
        self.alert_statuses()
            .into_iter()
            .filter(|s| s.triggered)
            .collect()
    }

    pub fn risk_preview(&self, quantity: f64, move_pct: f64) -> RiskPreview {
        valuation::risk_preview(quantity, self.feed().spot_price, move_pct)
    }

    pub fn trades_remaining<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> usize {
        guardrail::trades_remaining(self.state(), now)
    }
}
