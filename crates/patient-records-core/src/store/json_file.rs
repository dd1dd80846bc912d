//! JSON file store.

use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::{check_metrics, RecordStore, StoreResult};
use crate::models::PatientCollection;

/// Single JSON document holding every record, keyed by patient id.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

impl RecordStore for JsonFileStore {
    /// A missing file is an empty collection.
    fn load(&self) -> StoreResult<PatientCollection> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "data file missing, starting empty");
                return Ok(PatientCollection::new());
            }
            Err(e) => return Err(e.into()),
        };
        let records: PatientCollection = serde_json::from_str(&contents)?;
        check_metrics(&records)?;
        tracing::debug!(path = %self.path.display(), count = records.len(), "loaded records");
        Ok(records)
    }

    /// Write to a sibling temp file, sync, then rename over the target.
    fn save(&mut self, records: &PatientCollection) -> StoreResult<()> {
        let mut tmp = NamedTempFile::new_in(self.parent_dir())?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, records)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;
        tracing::debug!(path = %self.path.display(), count = records.len(), "saved records");
        Ok(())
    }
}
