//! Whole-collection persistence for patient records.
//!
//! Stores only load and save the full collection. There are no partial or
//! indexed writes; a save either replaces everything or changes nothing.

mod json_file;
mod schema;
mod sqlite;

pub use json_file::*;
pub use schema::*;
pub use sqlite::*;

use thiserror::Error;

use crate::models::PatientCollection;

/// Storage errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to replace data file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Malformed stored data: {0}")]
    Malformed(String),

    #[error("Lock poisoned: {0}")]
    Poisoned(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Whole-collection record store.
pub trait RecordStore: Send {
    /// Read the full collection.
    fn load(&self) -> StoreResult<PatientCollection>;

    /// Replace the full collection. Must be all-or-nothing.
    fn save(&mut self, records: &PatientCollection) -> StoreResult<()>;
}

/// Reject records whose stored `bmi`/`verdict` disagree with height/weight.
pub(crate) fn check_metrics(records: &PatientCollection) -> StoreResult<()> {
    match records.iter().find(|patient| !patient.metrics_consistent()) {
        Some(patient) => Err(StoreError::Malformed(format!(
            "record {} has stale derived metrics",
            patient.id
        ))),
        None => Ok(()),
    }
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn load(&self) -> StoreResult<PatientCollection> {
        (**self).load()
    }

    fn save(&mut self, records: &PatientCollection) -> StoreResult<()> {
        (**self).save(records)
    }
}
