//! Domain layer: Core business types and logic.
//!
//! This module contains pure Rust types with no I/O.
//! Triage (`classify`) is a total function over any reading.

mod patient;
mod record;
mod risk;
mod vitals;

pub use patient::{PatientDetails, StoredPatient, UNKNOWN_PHONE};
pub use record::ClassifiedRecord;
pub use risk::{
    classify, Assessment, NormalizedVitals, RiskLevel, DEFAULT_HEART_RATE_BPM,
    DEFAULT_OXYGEN_PCT, DEFAULT_TEMPERATURE_F, HIGH_RISK_DISEASE, HIGH_RISK_RECOMMENDATIONS,
    LOW_RISK_DISEASE, LOW_RISK_RECOMMENDATIONS, MEDIUM_RISK_DISEASE, MEDIUM_RISK_RECOMMENDATIONS,
};
pub use vitals::{leading_float, leading_int, Gender, Symptom, SymptomSet, VitalReading};
