//! A feed that always returns the same snapshot.

use crate::domain::error::OunceError;
use crate::domain::feed::PriceFeedSnapshot;
use crate::ports::feed_port::PriceFeedPort;

#[derive(Debug, Clone)]
pub struct StaticFeed {
    snapshot: PriceFeedSnapshot,
}

impl StaticFeed {
    pub fn new(snapshot: PriceFeedSnapshot) -> Self {
        Self { snapshot }
    }
}

impl Default for StaticFeed {
    fn default() -> Self {
        StaticFeed::new(PriceFeedSnapshot::fallback())
    }
}

impl PriceFeedPort for StaticFeed {
    fn fetch(&self) -> Result<PriceFeedSnapshot, OunceError> {
        Ok(self.snapshot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_fallback_by_default() {
        let snapshot = StaticFeed::default().fetch().unwrap();
        assert_eq!(snapshot, PriceFeedSnapshot::fallback());
    }
}
