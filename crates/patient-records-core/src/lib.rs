//! Patient Records Core Library
//!
//! Stores patient health records keyed by an externally assigned identifier and
//! keeps their derived metrics (BMI and weight verdict) consistent with the
//! stored height and weight.
//!
//! # Architecture
//!
//! ```text
//! HTTP surface ──► RecordService ──► RecordStore::load
//!                        │
//!                  merge sparse update
//!                        │
//!                  metrics::derive(height, weight)
//!                        │
//!                  RecordStore::save ──► response
//! ```
//!
//! # Core Principle
//!
//! **Derived fields are recomputed after every mutation.** A record is never
//! persisted with a `bmi`/`verdict` that came from a different height/weight
//! pair than the one stored next to it.
//!
//! # Modules
//!
//! - [`models`]: Domain types (Patient, PatientUpdate, PatientCollection)
//! - [`metrics`]: Pure BMI and verdict derivation
//! - [`store`]: Whole-collection persistence (JSON file, SQLite)
//! - [`service`]: Read, sort, merge-update and delete orchestration

pub mod error;
pub mod metrics;
pub mod models;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use error::{RecordError, RecordResult};
pub use metrics::{derive, Metrics, Verdict};
pub use models::{Gender, NewPatient, Patient, PatientCollection, PatientUpdate};
pub use service::{RecordService, SortField, SortOrder};
pub use store::{JsonFileStore, RecordStore, SqliteStore, StoreError, StoreResult};
