//! Saves the full state after every ledger commit.

use crate::domain::state::TradingState;
use crate::ports::observer_port::StateObserver;
use crate::ports::state_port::StatePort;
use tracing::{debug, warn};

/// A failed save is logged and dropped; the next commit writes the whole
/// state again.
pub struct PersistenceObserver<S: StatePort> {
    store: S,
    failures: usize,
}

impl<S: StatePort> PersistenceObserver<S> {
    pub fn new(store: S) -> Self {
        Self { store, failures: 0 }
    }

    pub fn failures(&self) -> usize {
        self.failures
    }
}

impl<S: StatePort> StateObserver for PersistenceObserver<S> {
    fn on_state_changed(&mut self, state: &TradingState) {
        match self.store.save(state) {
            Ok(()) => debug!(trades = state.trade_history.len(), "state saved"),
            Err(e) => {
                self.failures += 1;
                warn!("failed to persist trading state: {e}");
            }
        }
    }
}
