//! Rule-based risk triage.
//!
//! Maps a [`VitalReading`] to a risk tier, a presumptive condition label and
//! the advice shown on the results screen. Every screen that needs a risk
//! level goes through [`classify`].

use serde::{Deserialize, Serialize};

use super::vitals::{leading_float, VitalReading};

/// Temperature assumed when the field is empty or unreadable (°F).
pub const DEFAULT_TEMPERATURE_F: f64 = 98.6;
/// Oxygen saturation assumed when the field is empty or unreadable (%).
pub const DEFAULT_OXYGEN_PCT: f64 = 98.0;
/// Heart rate assumed when the field is empty or unreadable (bpm).
pub const DEFAULT_HEART_RATE_BPM: f64 = 70.0;

pub const HIGH_RISK_DISEASE: &str = "Acute Respiratory Infection";
pub const MEDIUM_RISK_DISEASE: &str = "Viral Fever / Flu";
pub const LOW_RISK_DISEASE: &str = "Common Cold";

pub static HIGH_RISK_RECOMMENDATIONS: [&str; 5] = [
    "IMMEDIATE MEDICAL ATTENTION REQUIRED",
    "Visit nearest hospital or emergency room",
    "Do not delay seeking professional care",
    "Ensure patient is accompanied at all times",
    "Monitor vital signs continuously",
];

pub static MEDIUM_RISK_RECOMMENDATIONS: [&str; 5] = [
    "Schedule appointment with healthcare provider within 24 hours",
    "Monitor temperature regularly",
    "Maintain hydration - drink 8-10 glasses of water",
    "Take prescribed antipyretics for fever",
    "Avoid contact with others to prevent spread",
];

pub static LOW_RISK_RECOMMENDATIONS: [&str; 3] = [
    "Stay hydrated and get plenty of rest",
    "Monitor symptoms over the next 24-48 hours",
    "Take over-the-counter pain relievers if needed",
];

/// Risk tier assigned by triage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Self-care at home
    Low,
    /// See a provider within a day
    Medium,
    /// Emergency care
    High,
}

impl RiskLevel {
    /// Storage / wire label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parse a stored label, ignoring case. Unrecognized labels yield `None`.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Self-care recommended",
            Self::Medium => "Provider visit within 24 hours",
            Self::High => "Emergency care required",
        }
    }

    /// Confidence figure shown next to the predicted condition (%).
    #[must_use]
    pub fn display_confidence(&self) -> u8 {
        match self {
            Self::Low => 85,
            Self::Medium => 78,
            Self::High => 92,
        }
    }

    /// Get the associated color for TUI display (RGB).
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Low => (74, 222, 128),   // #4ADE80
            Self::Medium => (234, 179, 8), // #EAB308
            Self::High => (239, 68, 68),   // #EF4444
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Vitals after fallback to clinical defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedVitals {
    pub symptom_count: usize,
    pub temperature: f64,
    pub oxygen: f64,
    pub heart_rate: f64,
}

impl NormalizedVitals {
    /// Normalize a reading. Empty, unreadable and zero values take the default.
    #[must_use]
    pub fn from_reading(reading: &VitalReading) -> Self {
        Self {
            symptom_count: reading.symptoms.len(),
            temperature: vital_or(&reading.temperature, DEFAULT_TEMPERATURE_F),
            oxygen: vital_or(&reading.oxygen, DEFAULT_OXYGEN_PCT),
            heart_rate: vital_or(&reading.heart_rate, DEFAULT_HEART_RATE_BPM),
        }
    }

    #[must_use]
    pub fn risk_level(&self) -> RiskLevel {
        if self.symptom_count >= 8
            || self.temperature > 102.0
            || self.oxygen < 90.0
            || self.heart_rate > 100.0
        {
            RiskLevel::High
        } else if self.symptom_count >= 5
            || self.temperature > 100.0
            || self.oxygen < 95.0
            || self.heart_rate > 90.0
        {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

fn vital_or(raw: &str, default: f64) -> f64 {
    match leading_float(raw) {
        Some(v) if v != 0.0 && !v.is_nan() => v,
        _ => default,
    }
}

/// Triage outcome for one reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub risk_level: RiskLevel,
    pub disease: String,
    pub recommendations: Vec<String>,
}

impl Assessment {
    /// The fixed outcome for a tier.
    #[must_use]
    pub fn for_level(risk_level: RiskLevel) -> Self {
        let (disease, recommendations): (&str, &[&str]) = match risk_level {
            RiskLevel::High => (HIGH_RISK_DISEASE, &HIGH_RISK_RECOMMENDATIONS[..]),
            RiskLevel::Medium => (MEDIUM_RISK_DISEASE, &MEDIUM_RISK_RECOMMENDATIONS[..]),
            RiskLevel::Low => (LOW_RISK_DISEASE, &LOW_RISK_RECOMMENDATIONS[..]),
        };

        Self {
            risk_level,
            disease: disease.to_string(),
            recommendations: recommendations.iter().map(|r| (*r).to_string()).collect(),
        }
    }
}

/// Classify a reading. Total: never fails, whatever the field contents.
#[must_use]
pub fn classify(reading: &VitalReading) -> Assessment {
    Assessment::for_level(NormalizedVitals::from_reading(reading).risk_level())
}
