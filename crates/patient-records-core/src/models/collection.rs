//! Ordered patient collection keyed by id.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::Patient;

/// Mapping from patient id to record, in insertion order.
///
/// On the wire and at rest this is a single JSON object keyed by id. Each key
/// must equal the `id` inside its record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientCollection {
    records: Vec<Patient>,
}

impl PatientCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&Patient> {
        self.records.iter().find(|p| p.id == id)
    }

    /// Insert or replace by id. A replaced record keeps its position.
    pub fn insert(&mut self, patient: Patient) -> Option<Patient> {
        match self.position(&patient.id) {
            Some(idx) => Some(std::mem::replace(&mut self.records[idx], patient)),
            None => {
                self.records.push(patient);
                None
            }
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Patient> {
        self.position(id).map(|idx| self.records.remove(idx))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Patient> {
        self.records.iter()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.records.iter().map(|p| p.id.as_str()).collect()
    }

    /// Stable in-place sort.
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&Patient, &Patient) -> std::cmp::Ordering,
    {
        self.records.sort_by(compare);
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|p| p.id == id)
    }
}

impl FromIterator<Patient> for PatientCollection {
    fn from_iter<I: IntoIterator<Item = Patient>>(iter: I) -> Self {
        let mut collection = Self::new();
        for patient in iter {
            collection.insert(patient);
        }
        collection
    }
}

impl IntoIterator for PatientCollection {
    type Item = Patient;
    type IntoIter = std::vec::IntoIter<Patient>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a PatientCollection {
    type Item = &'a Patient;
    type IntoIter = std::slice::Iter<'a, Patient>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl Serialize for PatientCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for patient in &self.records {
            map.serialize_entry(&patient.id, patient)?;
        }
        map.end()
    }
}

struct CollectionVisitor;

impl<'de> Visitor<'de> for CollectionVisitor {
    type Value = PatientCollection;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of patient id to patient record")
    }

    fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Self::Value, M::Error> {
        let mut collection = PatientCollection::new();
        while let Some((key, patient)) = access.next_entry::<String, Patient>()? {
            if key != patient.id {
                return Err(de::Error::custom(format!(
                    "key {:?} does not match record id {:?}",
                    key, patient.id
                )));
            }
            if collection.insert(patient).is_some() {
                return Err(de::Error::custom(format!("duplicate patient id {:?}", key)));
            }
        }
        Ok(collection)
    }
}

impl<'de> Deserialize<'de> for PatientCollection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(CollectionVisitor)
    }
}
