//! Record service: read, sort, merge-update and delete over a record store.
//!
//! Every operation holds the store lock from `load` through `save`, so two
//! concurrent updates in one process cannot lose each other's writes.

use std::str::FromStr;
use std::sync::Mutex;

use crate::error::{RecordError, RecordResult};
use crate::models::{NewPatient, Patient, PatientCollection, PatientUpdate};
use crate::store::RecordStore;

/// Field a collection can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Height,
    Weight,
    Bmi,
}

impl SortField {
    fn value(&self, patient: &Patient) -> f64 {
        match self {
            SortField::Height => patient.height,
            SortField::Weight => patient.weight,
            SortField::Bmi => patient.bmi(),
        }
    }
}

impl FromStr for SortField {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "height" => Ok(SortField::Height),
            "weight" => Ok(SortField::Weight),
            "bmi" => Ok(SortField::Bmi),
            _ => Err(RecordError::InvalidArgument(
                "Invalid sort_by field. Must be one of ['height', 'weight', 'bmi']".into(),
            )),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(RecordError::InvalidArgument(
                "Invalid order. Must be 'asc' or 'desc'".into(),
            )),
        }
    }
}

/// Orchestrates record operations against a store.
pub struct RecordService<S: RecordStore> {
    store: Mutex<S>,
}

impl<S: RecordStore> RecordService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    /// Full collection as persisted.
    pub fn list_all(&self) -> RecordResult<PatientCollection> {
        let store = self.store.lock()?;
        Ok(store.load()?)
    }

    pub fn get(&self, id: &str) -> RecordResult<Patient> {
        let store = self.store.lock()?;
        store
            .load()?
            .get(id)
            .cloned()
            .ok_or_else(|| RecordError::NotFound(id.to_string()))
    }

    /// Parse `field`/`order` and sort. `field` is checked first.
    pub fn sort(&self, field: &str, order: &str) -> RecordResult<PatientCollection> {
        let field: SortField = field.parse()?;
        let order: SortOrder = order.parse()?;
        self.sort_by(field, order)
    }

    /// Stable sort of the full collection; ties keep stored order in both directions.
    pub fn sort_by(&self, field: SortField, order: SortOrder) -> RecordResult<PatientCollection> {
        let mut records = self.list_all()?;
        records.sort_by(|a, b| {
            let (a, b) = (field.value(a), field.value(b));
            match order {
                SortOrder::Asc => a.total_cmp(&b),
                SortOrder::Desc => b.total_cmp(&a),
            }
        });
        Ok(records)
    }

    /// Create a record under its externally assigned id.
    pub fn create(&self, input: NewPatient) -> RecordResult<Patient> {
        let patient = Patient::new(input)?;

        let mut store = self.store.lock()?;
        let mut records = store.load()?;
        if records.contains(&patient.id) {
            return Err(RecordError::AlreadyExists(patient.id));
        }
        records.insert(patient.clone());
        store.save(&records)?;

        tracing::info!(id = %patient.id, bmi = patient.bmi(), "patient created");
        Ok(patient)
    }

    /// Merge a sparse update onto the stored record and persist it.
    ///
    /// Derived fields are recomputed even when neither height nor weight was
    /// sent. On any error the store is left untouched.
    pub fn update(&self, id: &str, update: &PatientUpdate) -> RecordResult<Patient> {
        let mut store = self.store.lock()?;
        let mut records = store.load()?;
        let current = records
            .get(id)
            .ok_or_else(|| RecordError::NotFound(id.to_string()))?;
        if update.is_empty() {
            tracing::debug!(id, "update carries no fields, recomputing metrics only");
        }

        let merged = update.apply(id, current)?;
        records.insert(merged.clone());
        store.save(&records)?;

        tracing::info!(id, bmi = merged.bmi(), verdict = %merged.verdict(), "patient updated");
        Ok(merged)
    }

    pub fn delete(&self, id: &str) -> RecordResult<()> {
        let mut store = self.store.lock()?;
        let mut records = store.load()?;
        if records.remove(id).is_none() {
            return Err(RecordError::NotFound(id.to_string()));
        }
        store.save(&records)?;

        tracing::info!(id, "patient deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;

    fn new_patient(id: &str, height: f64, weight: f64) -> NewPatient {
        NewPatient {
            id: id.into(),
            name: format!("Patient {}", id),
            city: Some("Pune".into()),
            age: 33,
            gender: None,
            height,
            weight,
        }
    }

    fn setup_service() -> RecordService<SqliteStore> {
        let service = RecordService::new(SqliteStore::open_in_memory().unwrap());
        service.create(new_patient("P001", 1.5, 50.0)).unwrap();
        service.create(new_patient("P002", 1.8, 90.0)).unwrap();
        service.create(new_patient("P003", 1.6, 70.0)).unwrap();
        service
    }

    #[test]
    fn test_sort_field_parse() {
        assert_eq!("bmi".parse::<SortField>().unwrap(), SortField::Bmi);
        match "age".parse::<SortField>() {
            Err(RecordError::InvalidArgument(msg)) => {
                assert_eq!(
                    msg,
                    "Invalid sort_by field. Must be one of ['height', 'weight', 'bmi']"
                );
            }
            other => panic!("expected InvalidArgument, got {:?}", other),
        }
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!("desc".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!(matches!(
            "up".parse::<SortOrder>(),
            Err(RecordError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_create_duplicate_rejected() {
        let service = setup_service();
        assert!(matches!(
            service.create(new_patient("P001", 1.7, 60.0)),
            Err(RecordError::AlreadyExists(_))
        ));
        assert_eq!(service.get("P001").unwrap().height, 1.5);
    }

    #[test]
    fn test_sort_ties_keep_stored_order() {
        let service = RecordService::new(SqliteStore::open_in_memory().unwrap());
        service.create(new_patient("A", 1.7, 60.0)).unwrap();
        service.create(new_patient("B", 1.7, 65.0)).unwrap();
        service.create(new_patient("C", 1.6, 65.0)).unwrap();

        let asc = service.sort("height", "asc").unwrap();
        assert_eq!(asc.ids(), vec!["C", "A", "B"]);

        let desc = service.sort("height", "desc").unwrap();
        assert_eq!(desc.ids(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_sort_does_not_mutate_store() {
        let service = setup_service();
        service.sort("weight", "desc").unwrap();
        assert_eq!(service.list_all().unwrap().ids(), vec!["P001", "P002", "P003"]);
    }

    #[test]
    fn test_update_failure_leaves_store_untouched() {
        let service = setup_service();
        let before = service.list_all().unwrap();

        let update = PatientUpdate {
            name: Some(Some("Changed".into())),
            height: Some(Some(-1.0)),
            ..Default::default()
        };
        assert!(matches!(
            service.update("P002", &update),
            Err(RecordError::InvalidInput(_))
        ));
        assert_eq!(service.list_all().unwrap(), before);
    }

    #[test]
    fn test_empty_update_keeps_record() {
        let service = setup_service();
        let before = service.get("P002").unwrap();
        let update = PatientUpdate::default();
        assert!(update.is_empty());

        let after = service.update("P002", &update).unwrap();
        assert_eq!(after, before);
        assert!(after.metrics_consistent());
    }

    #[test]
    fn test_update_keeps_position() {
        let service = setup_service();
        let update = PatientUpdate {
            weight: Some(Some(55.0)),
            ..Default::default()
        };
        service.update("P001", &update).unwrap();
        assert_eq!(service.list_all().unwrap().ids(), vec!["P001", "P002", "P003"]);
    }
}
