//! Classified intake records.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::risk::{classify, Assessment, RiskLevel};
use super::vitals::VitalReading;

/// A reading frozen at submit time together with its triage labels.
///
/// Construct through [`ClassifiedRecord::from_reading`] so the labels always
/// come from [`classify`]. Fields are read-only after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedRecord {
    id: String,
    submitted_at: DateTime<Utc>,
    reading: VitalReading,
    risk_level: RiskLevel,
    disease: String,
}

impl ClassifiedRecord {
    /// Classify `reading` and stamp it with a fresh id and the current time.
    #[must_use]
    pub fn from_reading(reading: VitalReading) -> Self {
        Self::with_timestamp(reading, Utc::now())
    }

    /// Same as [`from_reading`](Self::from_reading) with an explicit timestamp.
    #[must_use]
    pub fn with_timestamp(reading: VitalReading, submitted_at: DateTime<Utc>) -> Self {
        let assessment = classify(&reading);
        Self {
            id: uuid_v4(),
            submitted_at,
            reading,
            risk_level: assessment.risk_level,
            disease: assessment.disease,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    #[must_use]
    pub fn reading(&self) -> &VitalReading {
        &self.reading
    }

    #[must_use]
    pub fn risk_level(&self) -> RiskLevel {
        self.risk_level
    }

    #[must_use]
    pub fn disease(&self) -> &str {
        &self.disease
    }

    /// Re-derive the full assessment from the frozen reading.
    ///
    /// Always agrees with [`risk_level`](Self::risk_level) and
    /// [`disease`](Self::disease).
    #[must_use]
    pub fn assessment(&self) -> Assessment {
        classify(&self.reading)
    }

    /// Plain-text summary handed to the share encoder.
    #[must_use]
    pub fn share_summary(&self) -> String {
        let r = &self.reading;
        let assessment = self.assessment();
        format!(
            "PATIENT SUMMARY\n\
             Name: {}\n\
             Risk Level: {}\n\
             Disease: {}\n\
             Temperature: {}°F\n\
             Oxygen: {}%\n\
             Heart Rate: {} bpm\n\
             Symptoms: {}",
            r.full_name,
            assessment.risk_level,
            assessment.disease,
            r.temperature,
            r.oxygen,
            r.heart_rate,
            r.symptoms.joined(),
        )
    }
}

/// Generate a simple UUID v4 (random) using CSPRNG.
///
/// Uses ChaCha20Rng seeded from OS entropy so record ids are not guessable.
fn uuid_v4() -> String {
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let bytes: [u8; 16] = rng.gen();

    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3],
        bytes[4], bytes[5],
        (bytes[6] & 0x0f) | 0x40, bytes[7],
        (bytes[8] & 0x3f) | 0x80, bytes[9],
        bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15]
    )
}
