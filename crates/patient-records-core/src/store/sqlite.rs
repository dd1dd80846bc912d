//! SQLite record store.

use std::path::Path;

use rusqlite::{params, Connection};

use super::{check_metrics, RecordStore, StoreError, StoreResult, SCHEMA};
use crate::models::{Patient, PatientCollection};

/// Record store backed by a SQLite database.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> StoreResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }
}

impl RecordStore for SqliteStore {
    fn load(&self) -> StoreResult<PatientCollection> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, record FROM patients ORDER BY seq")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut records = PatientCollection::new();
        for row in rows {
            let (id, json) = row?;
            let patient: Patient = serde_json::from_str(&json)?;
            if patient.id != id {
                return Err(StoreError::Malformed(format!(
                    "row {} holds record for {}",
                    id, patient.id
                )));
            }
            records.insert(patient);
        }
        check_metrics(&records)?;
        tracing::debug!(count = records.len(), "loaded records from sqlite");
        Ok(records)
    }

    /// Replace every row in a single transaction.
    fn save(&mut self, records: &PatientCollection) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM patients", [])?;
        {
            let mut stmt = tx.prepare("INSERT INTO patients (id, record) VALUES (?1, ?2)")?;
            for patient in records {
                let json = serde_json::to_string(patient)?;
                stmt.execute(params![patient.id, json])?;
            }
        }
        tx.commit()?;
        tracing::debug!(count = records.len(), "saved records to sqlite");
        Ok(())
    }
}
