//! Trading state persistence port.

use crate::domain::error::OunceError;
use crate::domain::state::TradingState;

/// Loads and saves the whole [`TradingState`] as one blob.
pub trait StatePort {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<TradingState>, OunceError>;

    fn save(&self, state: &TradingState) -> Result<(), OunceError>;
}

impl<T: StatePort + ?Sized> StatePort for Box<T> {
    fn load(&self) -> Result<Option<TradingState>, OunceError> {
        (**self).load()
    }

    fn save(&self, state: &TradingState) -> Result<(), OunceError> {
        (**self).save(state)
    }
}
