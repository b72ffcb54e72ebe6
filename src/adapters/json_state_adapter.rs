//! Trading state stored as a JSON document on disk.

use crate::domain::error::OunceError;
use crate::domain::state::TradingState;
use crate::ports::state_port::StatePort;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

pub struct JsonStateAdapter {
    path: PathBuf,
}

impl JsonStateAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StatePort for JsonStateAdapter {
    fn load(&self) -> Result<Option<TradingState>, OunceError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(OunceError::Storage {
                    reason: format!("failed to read {}: {}", self.path.display(), e),
                });
            }
        };
        if content.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| OunceError::StorageFormat {
                reason: format!("{}: {}", self.path.display(), e),
            })
    }

    fn save(&self, state: &TradingState) -> Result<(), OunceError> {
        let body = serde_json::to_string_pretty(state).map_err(|e| OunceError::Storage {
            reason: format!("failed to serialize state: {}", e),
        })?;

        // atomic replace
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(|e| OunceError::Storage {
            reason: format!("failed to write {}: {}", tmp.display(), e),
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| OunceError::Storage {
            reason: format!("failed to replace {}: {}", self.path.display(), e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state::DEFAULT_CASH;
    use tempfile::tempdir;

    #[test]
    fn load_missing_file_is_none() {
        let dir = tempdir().unwrap();
        let adapter = JsonStateAdapter::new(dir.path().join("state.json"));
        assert_eq!(adapter.load().unwrap(), None);
    }

    #[test]
    fn save_then_load() {
        let dir = tempdir().unwrap();
        let adapter = JsonStateAdapter::new(dir.path().join("state.json"));
        let state = TradingState {
            cash_balance: 650.0,
            position_quantity: 15.0,
            average_cost_per_unit: 70.0 / 3.0,
            cooling_off: true,
            ..TradingState::default()
        };
        adapter.save(&state).unwrap();
        assert_eq!(adapter.load().unwrap(), Some(state));
        assert!(!dir.path().join("state.json.tmp").exists());
    }

    #[test]
    fn partial_document_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, r#"{"positionQuantity": 2.0, "averageCostPerUnit": 28.0}"#).unwrap();
        let state = JsonStateAdapter::new(&path).load().unwrap().unwrap();
        assert_eq!(state.cash_balance, DEFAULT_CASH);
        assert_eq!(state.position_quantity, 2.0);
    }

    #[test]
    fn malformed_document_is_format_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{not json").unwrap();
        let result = JsonStateAdapter::new(&path).load();
        assert!(matches!(result, Err(OunceError::StorageFormat { .. })));
    }

    #[test]
    fn save_into_missing_directory_fails() {
        let adapter = JsonStateAdapter::new("/nonexistent/dir/state.json");
        let result = adapter.save(&TradingState::default());
        assert!(matches!(result, Err(OunceError::Storage { .. })));
    }
}
