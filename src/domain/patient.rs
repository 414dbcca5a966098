//! Patient rows as kept by the record store.
//!
//! Rows written by this application come from a [`ClassifiedRecord`], but the
//! store may also hold rows written by other clients, so the triage labels are
//! optional here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::ClassifiedRecord;
use super::risk::{NormalizedVitals, RiskLevel};
use super::vitals::{leading_float, leading_int};

/// Placeholder phone number written when the form does not collect one.
pub const UNKNOWN_PHONE: &str = "0000000000";

/// Patient fields sent to the record store on create/update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientDetails {
    pub name: String,
    /// Whole years, `None` when the form value was not a number.
    pub age: Option<i64>,
    pub gender: String,
    pub phone: String,
    pub state: String,
    pub city: String,
    /// Location text as entered.
    pub location: String,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub temperature: Option<f64>,
    /// `"sys/dia"`
    pub blood_pressure: Option<String>,
    pub oxygen: Option<f64>,
    pub pulse: Option<i64>,
    pub symptoms: Vec<String>,
    pub risk_level: Option<RiskLevel>,
    pub disease: Option<String>,
    pub recommendations: Vec<String>,
}

impl PatientDetails {
    /// Build the store payload for a freshly classified record.
    ///
    /// Temperature and oxygen are written after default substitution, so the
    /// stored values are the ones triage actually used.
    #[must_use]
    pub fn from_record(record: &ClassifiedRecord) -> Self {
        let reading = record.reading();
        let vitals = NormalizedVitals::from_reading(reading);
        let assessment = record.assessment();
        let (city, state) = reading.city_and_state();

        Self {
            name: reading.full_name.clone(),
            age: leading_int(&reading.age),
            gender: reading.gender.label().to_string(),
            phone: UNKNOWN_PHONE.to_string(),
            state,
            city,
            location: reading.location.clone(),
            weight: leading_float(&reading.weight),
            height: leading_float(&reading.height),
            temperature: Some(vitals.temperature),
            blood_pressure: Some(reading.blood_pressure()),
            oxygen: Some(vitals.oxygen),
            pulse: leading_int(&reading.heart_rate).filter(|p| *p != 0),
            symptoms: reading.symptoms.names(),
            risk_level: Some(record.risk_level()),
            disease: Some(record.disease().to_string()),
            recommendations: assessment.recommendations,
        }
    }
}

/// A row read back from the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPatient {
    /// Store-assigned identifier
    pub id: i64,
    pub details: PatientDetails,
    /// `None` when the stored text is not a timestamp
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
