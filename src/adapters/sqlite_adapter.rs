//! SQLite state adapter: the serialized state in a single-row table.

use crate::domain::error::OunceError;
use crate::domain::state::TradingState;
use crate::ports::config_port::ConfigPort;
use crate::ports::state_port::StatePort;
use chrono::Utc;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};

const STATE_ROW_ID: i64 = 1;

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, OunceError> {
        let db_path =
            config
                .get_string("storage", "path")
                .ok_or_else(|| OunceError::ConfigMissing {
                    section: "storage".into(),
                    key: "path".into(),
                })?;
        Self::open(&db_path)
    }

    pub fn open(db_path: &str) -> Result<Self, OunceError> {
        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| OunceError::Storage {
                reason: e.to_string(),
            })?;

        let adapter = Self { pool };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    pub fn in_memory() -> Result<Self, OunceError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| OunceError::Storage {
                reason: e.to_string(),
            })?;

        let adapter = Self { pool };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, OunceError> {
        self.pool.get().map_err(|e: r2d2::Error| OunceError::Storage {
            reason: e.to_string(),
        })
    }

    pub fn initialize_schema(&self) -> Result<(), OunceError> {
        self.conn()?
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS trading_state (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    payload TEXT NOT NULL,
                    saved_at TEXT NOT NULL
                );",
            )
            .map_err(|e: rusqlite::Error| OunceError::Storage {
                reason: e.to_string(),
            })
    }

    /// When the state was last written, as stored (RFC 3339).
    pub fn saved_at(&self) -> Result<Option<String>, OunceError> {
        self.conn()?
            .query_row(
                "SELECT saved_at FROM trading_state WHERE id = ?1",
                params![STATE_ROW_ID],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e: rusqlite::Error| OunceError::Storage {
                reason: e.to_string(),
            })
    }
}

impl StatePort for SqliteAdapter {
    fn load(&self) -> Result<Option<TradingState>, OunceError> {
        let payload: Option<String> = self
            .conn()?
            .query_row(
                "SELECT payload FROM trading_state WHERE id = ?1",
                params![STATE_ROW_ID],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e: rusqlite::Error| OunceError::Storage {
                reason: e.to_string(),
            })?;

        match payload {
            None => Ok(None),
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| OunceError::StorageFormat {
                    reason: e.to_string(),
                }),
        }
    }

    fn save(&self, state: &TradingState) -> Result<(), OunceError> {
        let payload = serde_json::to_string(state).map_err(|e| OunceError::Storage {
            reason: format!("failed to serialize state: {}", e),
        })?;

        self.conn()?
            .execute(
                "INSERT OR REPLACE INTO trading_state (id, payload, saved_at)
                 VALUES (?1, ?2, ?3)",
                params![STATE_ROW_ID, payload, Utc::now().to_rfc3339()],
            )
            .map_err(|e: rusqlite::Error| OunceError::Storage {
                reason: e.to_string(),
            })?;

        Ok(())
    }
}
