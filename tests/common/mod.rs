#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use ouncebook::domain::error::OunceError;
use ouncebook::domain::feed::PriceFeedSnapshot;
use ouncebook::domain::state::TradingState;
use ouncebook::ports::feed_port::PriceFeedPort;
use ouncebook::ports::state_port::StatePort;
use std::cell::RefCell;
use std::rc::Rc;

/// Feed returning a fixed snapshot, or failing with a fixed reason.
pub struct MockFeedPort {
    result: Result<PriceFeedSnapshot, String>,
}

impl MockFeedPort {
    pub fn ok(snapshot: PriceFeedSnapshot) -> Self {
        Self {
            result: Ok(snapshot),
        }
    }

    pub fn at_spot(spot_price: f64, change_pct: f64) -> Self {
        Self::ok(snapshot_at(spot_price, change_pct))
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            result: Err(reason.to_string()),
        }
    }
}

impl PriceFeedPort for MockFeedPort {
    fn fetch(&self) -> Result<PriceFeedSnapshot, OunceError> {
        self.result
            .clone()
            .map_err(|reason| OunceError::Feed { reason })
    }
}

/// In-memory store whose clones share one slot, so a test can keep a
/// handle while the ledger owns another.
#[derive(Clone, Default)]
pub struct SharedStore {
    slot: Rc<RefCell<Option<TradingState>>>,
    saves: Rc<RefCell<usize>>,
    fail_saves: bool,
}

impl SharedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(state: TradingState) -> Self {
        let store = Self::default();
        *store.slot.borrow_mut() = Some(state);
        store
    }

    pub fn read_only() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    pub fn saved(&self) -> Option<TradingState> {
        self.slot.borrow().clone()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }
}

impl StatePort for SharedStore {
    fn load(&self) -> Result<Option<TradingState>, OunceError> {
        Ok(self.slot.borrow().clone())
    }

    fn save(&self, state: &TradingState) -> Result<(), OunceError> {
        if self.fail_saves {
            return Err(OunceError::Storage {
                reason: "store is read-only".into(),
            });
        }
        *self.slot.borrow_mut() = Some(state.clone());
        *self.saves.borrow_mut() += 1;
        Ok(())
    }
}

pub fn snapshot_at(spot_price: f64, change_pct: f64) -> PriceFeedSnapshot {
    let mut snapshot = PriceFeedSnapshot::fallback();
    snapshot.spot_price = spot_price;
    snapshot.change_pct = change_pct;
    snapshot
}

pub fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

pub fn state_with_cash(cash_balance: f64) -> TradingState {
    TradingState::with_cash(cash_balance)
}
