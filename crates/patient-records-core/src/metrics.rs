//! Derived health metrics.
//!
//! BMI and the weight verdict are pure functions of height and weight. They are
//! never read back from a client and never updated on their own; every mutation
//! path in the service calls [`derive`] on the final height/weight pair.

use serde::{Deserialize, Serialize};

use crate::error::{RecordError, RecordResult};

/// Categorical weight classification derived from BMI.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Verdict {
    #[serde(rename = "Underweight")]
    Underweight,
    #[serde(rename = "Normal weight")]
    NormalWeight,
    #[serde(rename = "Overweight")]
    Overweight,
    #[serde(rename = "Obesity")]
    Obesity,
}

impl Verdict {
    /// Classify a (rounded) BMI value.
    ///
    /// The upper bounds are 24.9 and 29.9 with strict comparison, so values in
    /// [24.9, 25.0) already classify as overweight and [29.9, 30.0) as obesity.
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            Verdict::Underweight
        } else if bmi < 24.9 {
            Verdict::NormalWeight
        } else if bmi < 29.9 {
            Verdict::Overweight
        } else {
            Verdict::Obesity
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Underweight => "Underweight",
            Verdict::NormalWeight => "Normal weight",
            Verdict::Overweight => "Overweight",
            Verdict::Obesity => "Obesity",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived fields of a patient record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub bmi: f64,
    pub verdict: Verdict,
}

/// Compute BMI (rounded to 2 decimals) and verdict from height (m) and weight (kg).
pub fn derive(height: f64, weight: f64) -> RecordResult<Metrics> {
    if !height.is_finite() || height <= 0.0 {
        return Err(RecordError::InvalidInput(format!(
            "height must be a positive number, got {}",
            height
        )));
    }
    if !weight.is_finite() || weight <= 0.0 {
        return Err(RecordError::InvalidInput(format!(
            "weight must be a positive number, got {}",
            weight
        )));
    }

    let bmi = round2(weight / (height * height));
    Ok(Metrics {
        bmi,
        verdict: Verdict::from_bmi(bmi),
    })
}

/// Round to 2 decimals on the exact binary value, ties to even.
///
/// Formatting rounds the true decimal expansion, so values just below a half
/// stay below it and exact ties (e.g. 15.625) go to the even digit.
fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}
