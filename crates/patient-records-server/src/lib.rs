//! HTTP surface for the patient records service.
//!
//! Maps routes onto [`patient_records_core::RecordService`] calls and
//! translates record errors into status codes with a `{"detail": ...}` body.

pub mod config;
pub mod error;
pub mod routes;

pub use config::{ServerConfig, StorageBackend};
pub use error::ApiError;
pub use routes::{router, AppState};

use patient_records_core::{JsonFileStore, RecordStore, SqliteStore, StoreResult};

/// Open the record store selected by `config`.
pub fn open_store(config: &ServerConfig) -> StoreResult<Box<dyn RecordStore>> {
    let store: Box<dyn RecordStore> = match config.backend {
        StorageBackend::Json => Box::new(JsonFileStore::new(&config.data_path)),
        StorageBackend::Sqlite => Box::new(SqliteStore::open(&config.data_path)?),
    };
    Ok(store)
}
