//! Patient models.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{RecordError, RecordResult};
use crate::metrics::{derive, Verdict};

/// Patient gender as accepted on the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Others,
}

/// A stored patient record.
///
/// `bmi` and `verdict` are private: the only way to set them is through
/// [`derive`], either at creation or after a merge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Externally assigned key, immutable once created
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub age: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    /// Height in meters
    pub height: f64,
    /// Weight in kg
    pub weight: f64,
    bmi: f64,
    verdict: Verdict,
}

impl Patient {
    /// Build a validated patient with freshly derived metrics.
    pub fn new(input: NewPatient) -> RecordResult<Self> {
        if input.id.trim().is_empty() {
            return Err(RecordError::InvalidInput("id must not be empty".into()));
        }
        check_name(&input.name)?;
        check_age(input.age)?;
        let metrics = derive(input.height, input.weight)?;
        Ok(Self {
            id: input.id,
            name: input.name,
            city: input.city,
            age: input.age,
            gender: input.gender,
            height: input.height,
            weight: input.weight,
            bmi: metrics.bmi,
            verdict: metrics.verdict,
        })
    }

    pub fn bmi(&self) -> f64 {
        self.bmi
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// Overwrite derived fields from height/weight.
    pub fn refresh_metrics(&mut self) -> RecordResult<()> {
        let metrics = derive(self.height, self.weight)?;
        self.bmi = metrics.bmi;
        self.verdict = metrics.verdict;
        Ok(())
    }

    /// Check whether the stored derived fields match height/weight.
    pub fn metrics_consistent(&self) -> bool {
        derive(self.height, self.weight)
            .map(|m| m.bmi == self.bmi && m.verdict == self.verdict)
            .unwrap_or(false)
    }
}

fn check_name(name: &str) -> RecordResult<()> {
    if name.trim().is_empty() {
        return Err(RecordError::InvalidInput("name must not be empty".into()));
    }
    Ok(())
}

fn check_age(age: u32) -> RecordResult<()> {
    if age == 0 || age >= 120 {
        return Err(RecordError::InvalidInput(format!(
            "age must be between 1 and 119, got {}",
            age
        )));
    }
    Ok(())
}

/// Creation payload. Derived fields sent by a client are ignored.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NewPatient {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    pub age: u32,
    #[serde(default)]
    pub gender: Option<Gender>,
    pub height: f64,
    pub weight: f64,
}

/// Sparse update.
///
/// Each field is tri-state: `None` when the key was absent from the request,
/// `Some(None)` for an explicit `null`, `Some(Some(v))` for a value. Only
/// present keys are applied. An `id` key is not part of this type and is
/// dropped during deserialization.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PatientUpdate {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub city: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub age: Option<Option<u32>>,
    #[serde(default, deserialize_with = "present")]
    pub gender: Option<Option<Gender>>,
    #[serde(default, deserialize_with = "present")]
    pub height: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present")]
    pub weight: Option<Option<f64>>,
}

/// Marks a key as present, keeping an explicit `null` distinct from absence.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn required<T>(field: &str, value: &Option<T>) -> RecordResult<T>
where
    T: Clone,
{
    value
        .clone()
        .ok_or_else(|| RecordError::InvalidInput(format!("{} cannot be null", field)))
}

impl PatientUpdate {
    /// True when the request carried none of the updatable fields.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.city.is_none()
            && self.age.is_none()
            && self.gender.is_none()
            && self.height.is_none()
            && self.weight.is_none()
    }

    /// Merge onto `current`, pin the key to `id` and recompute derived fields.
    ///
    /// Only the fields carried by the update are validated; untouched fields
    /// keep whatever value the stored record has.
    pub fn apply(&self, id: &str, current: &Patient) -> RecordResult<Patient> {
        let mut merged = current.clone();

        if let Some(name) = &self.name {
            merged.name = required("name", name)?;
            check_name(&merged.name)?;
        }
        if let Some(city) = &self.city {
            merged.city = city.clone();
        }
        if let Some(age) = &self.age {
            merged.age = required("age", age)?;
            check_age(merged.age)?;
        }
        if let Some(gender) = &self.gender {
            merged.gender = *gender;
        }
        if let Some(height) = &self.height {
            merged.height = required("height", height)?;
        }
        if let Some(weight) = &self.weight {
            merged.weight = required("weight", weight)?;
        }

        merged.id = id.to_string();
        merged.refresh_metrics()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Patient {
        Patient::new(NewPatient {
            id: "P001".into(),
            name: "Ananya Verma".into(),
            city: Some("Guwahati".into()),
            age: 28,
            gender: Some(Gender::Female),
            height: 1.65,
            weight: 90.0,
        })
        .unwrap()
    }

    #[test]
    fn test_new_patient_derives_metrics() {
        let patient = sample();
        assert_eq!(patient.bmi(), 33.06);
        assert_eq!(patient.verdict(), Verdict::Obesity);
        assert!(patient.metrics_consistent());
    }

    #[test]
    fn test_new_patient_validation() {
        let mut input = NewPatient {
            id: "P002".into(),
            name: "Ravi".into(),
            city: None,
            age: 0,
            gender: None,
            height: 1.7,
            weight: 60.0,
        };
        assert!(matches!(
            Patient::new(input.clone()),
            Err(RecordError::InvalidInput(_))
        ));

        input.age = 35;
        input.height = 0.0;
        assert!(matches!(
            Patient::new(input.clone()),
            Err(RecordError::InvalidInput(_))
        ));

        input.height = 1.7;
        input.name = "  ".into();
        assert!(matches!(Patient::new(input), Err(RecordError::InvalidInput(_))));
    }

    #[test]
    fn test_serialized_layout() {
        let value = serde_json::to_value(sample()).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        for key in ["id", "name", "city", "age", "gender", "height", "weight", "bmi", "verdict"] {
            assert!(keys.contains(&key), "missing {}", key);
        }
        assert_eq!(value["verdict"], "Obesity");
        assert_eq!(value["gender"], "female");
    }

    #[test]
    fn test_optional_fields_omitted_when_unset() {
        let mut patient = sample();
        patient.city = None;
        patient.gender = None;
        let value = serde_json::to_value(&patient).unwrap();
        assert!(value.get("city").is_none());
        assert!(value.get("gender").is_none());
    }

    #[test]
    fn test_update_distinguishes_absent_from_null() {
        let update: PatientUpdate = serde_json::from_str(r#"{"city": null}"#).unwrap();
        assert_eq!(update.city, Some(None));
        assert_eq!(update.name, None);

        let update: PatientUpdate = serde_json::from_str(r#"{"weight": 80}"#).unwrap();
        assert_eq!(update.weight, Some(Some(80.0)));
        assert_eq!(update.height, None);

        let update: PatientUpdate = serde_json::from_str("{}").unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn test_update_ignores_id_key() {
        let update: PatientUpdate =
            serde_json::from_str(r#"{"id": "P999", "name": "Renamed"}"#).unwrap();
        let merged = update.apply("P001", &sample()).unwrap();
        assert_eq!(merged.id, "P001");
        assert_eq!(merged.name, "Renamed");
    }

    #[test]
    fn test_apply_recomputes_metrics() {
        let update = PatientUpdate {
            weight: Some(Some(60.0)),
            ..Default::default()
        };
        let merged = update.apply("P001", &sample()).unwrap();
        assert_eq!(merged.height, 1.65);
        assert_eq!(merged.bmi(), 22.04);
        assert_eq!(merged.verdict(), Verdict::NormalWeight);
    }

    #[test]
    fn test_apply_null_clears_optional_field() {
        let update: PatientUpdate = serde_json::from_str(r#"{"gender": null}"#).unwrap();
        let merged = update.apply("P001", &sample()).unwrap();
        assert_eq!(merged.gender, None);
        assert_eq!(merged.city, Some("Guwahati".into()));
    }

    #[test]
    fn test_apply_null_required_field_rejected() {
        let update: PatientUpdate = serde_json::from_str(r#"{"height": null}"#).unwrap();
        match update.apply("P001", &sample()) {
            Err(RecordError::InvalidInput(msg)) => assert!(msg.contains("height")),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_apply_validates_sent_fields() {
        let update: PatientUpdate = serde_json::from_str(r#"{"age": 0}"#).unwrap();
        assert!(matches!(
            update.apply("P001", &sample()),
            Err(RecordError::InvalidInput(_))
        ));

        let update: PatientUpdate = serde_json::from_str(r#"{"name": " "}"#).unwrap();
        assert!(matches!(
            update.apply("P001", &sample()),
            Err(RecordError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_apply_keeps_unsent_out_of_range_fields() {
        let mut stored = sample();
        stored.age = 0;
        stored.name = String::new();

        let update: PatientUpdate = serde_json::from_str(r#"{"weight": 60}"#).unwrap();
        let merged = update.apply("P001", &stored).unwrap();
        assert_eq!(merged.age, 0);
        assert_eq!(merged.bmi(), 22.04);
    }

    #[test]
    fn test_apply_rejects_degenerate_height() {
        let update = PatientUpdate {
            height: Some(Some(0.0)),
            ..Default::default()
        };
        assert!(matches!(
            update.apply("P001", &sample()),
            Err(RecordError::InvalidInput(_))
        ));
    }
}
