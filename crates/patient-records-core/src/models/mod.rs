//! Domain models for the patient records system.

mod collection;
mod patient;

pub use collection::*;
pub use patient::*;
