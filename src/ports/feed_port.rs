//! Price feed port.

use crate::domain::error::OunceError;
use crate::domain::feed::PriceFeedSnapshot;

pub trait PriceFeedPort {
    fn fetch(&self) -> Result<PriceFeedSnapshot, OunceError>;
}
