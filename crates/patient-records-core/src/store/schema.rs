//! SQLite schema definition.

/// Schema for the SQLite record store.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Patients
-- ============================================================================

-- One row per patient. `record` holds the same JSON object the file store
-- writes, so both backends share one at-rest record layout.
CREATE TABLE IF NOT EXISTS patients (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,        -- insertion order
    id TEXT NOT NULL UNIQUE,
    record TEXT NOT NULL,                         -- JSON object
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
