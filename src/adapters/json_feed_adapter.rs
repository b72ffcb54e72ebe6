//! Price feed read from a JSON file written by an external fetcher.

use crate::domain::error::OunceError;
use crate::domain::feed::PriceFeedSnapshot;
use crate::ports::feed_port::PriceFeedPort;
use std::fs;
use std::path::PathBuf;

pub struct JsonFeedAdapter {
    path: PathBuf,
}

impl JsonFeedAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PriceFeedPort for JsonFeedAdapter {
    fn fetch(&self) -> Result<PriceFeedSnapshot, OunceError> {
        let content = fs::read_to_string(&self.path).map_err(|e| OunceError::Feed {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;
        let snapshot: PriceFeedSnapshot =
            serde_json::from_str(&content).map_err(|e| OunceError::Feed {
                reason: format!("invalid feed document {}: {}", self.path.display(), e),
            })?;

        if !snapshot.spot_price.is_finite() || snapshot.spot_price <= 0.0 {
            return Err(OunceError::Feed {
                reason: format!("spot price must be positive, got {}", snapshot.spot_price),
            });
        }
        Ok(snapshot)
    }
}
