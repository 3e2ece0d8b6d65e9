use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

use crate::error::StoreError;

/// A scenario ready to be written; id and timestamp come from the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewScenario {
    pub summary: String,
    pub recommendation: String,
    /// Pretty-printed JSON object of role name -> generated text
    pub agent_inputs: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    pub id: i64,
    pub timestamp: NaiveDateTime,
    pub summary: String,
    pub recommendation: String,
    pub agent_inputs: String,
}

/// Append-only scenario table.
pub trait ScenarioStore: Send + Sync {
    /// Writes one row and returns its id.
    fn insert(&self, scenario: &NewScenario) -> Result<i64, StoreError>;

    /// Newest first.
    fn recent(&self, limit: usize) -> Result<Vec<Scenario>, StoreError>;

    fn count(&self) -> Result<u64, StoreError>;
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS scenarios (
    id INTEGER PRIMARY KEY,
    timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
    summary TEXT,
    recommendation TEXT,
    agent_inputs TEXT
)";

pub struct SqliteScenarioStore {
    conn: Mutex<Connection>,
}

impl SqliteScenarioStore {
    /// Opens (creating parent directories and the table if needed).
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
                info!("📁 [STORE] Created data directory: {}", dir.display());
            }
        }
        let store = Self::with_connection(Connection::open(path)?)?;
        info!("🗄️ [STORE] Database initialized successfully at {}", path.display());
        Ok(store)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(SCHEMA, [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl ScenarioStore for SqliteScenarioStore {
    fn insert(&self, scenario: &NewScenario) -> Result<i64, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        conn.execute(
            "INSERT INTO scenarios (summary, recommendation, agent_inputs) VALUES (?1, ?2, ?3)",
            params![scenario.summary, scenario.recommendation, scenario.agent_inputs],
        )?;
        let id = conn.last_insert_rowid();
        info!("🗄️ [STORE] New scenario stored in the database (id={})", id);
        Ok(id)
    }

    fn recent(&self, limit: usize) -> Result<Vec<Scenario>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let mut stmt = conn.prepare(
            "SELECT id, timestamp, summary, recommendation, agent_inputs
             FROM scenarios ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(Scenario {
                id: row.get(0)?,
                timestamp: row.get(1)?,
                summary: row.get(2)?,
                recommendation: row.get(3)?,
                agent_inputs: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn count(&self) -> Result<u64, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM scenarios", [], |row| row.get(0))?;
        Ok(n as u64)
    }
}
