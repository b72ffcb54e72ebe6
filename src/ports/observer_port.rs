//! State change subscription port.

use crate::domain::state::TradingState;

/// Notified after every committed ledger mutation, with the new state.
///
/// Observers run inline on the committing call and must return quickly.
/// Failures stay inside the observer; the commit has already happened.
pub trait StateObserver {
    fn on_state_changed(&mut self, state: &TradingState);
}
