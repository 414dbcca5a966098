//! # IntakeCare
//!
//! Patient intake and triage for field clinics.
//!
//! This crate provides:
//! - A rule-based risk classifier over intake vitals and symptoms
//! - Grouped counts over classified records for the dashboard
//! - Terminal UI for local-only deployment
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (VitalReading, ClassifiedRecord, RiskLevel)
//! - `ports`: Trait definitions for external operations
//! - `adapters`: Concrete implementations (SQLite, in-memory, log sanitizer)
//! - `application`: Use cases orchestrating domain and ports
//! - `config`: Environment configuration
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{classify, Assessment, ClassifiedRecord, RiskLevel, VitalReading};

/// Message shown when a required intake field is empty.
pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill in all required fields (Name, Age, Location)";

/// Message shown when no store accepted the record.
pub const PERSISTENCE_FAILED_MESSAGE: &str = "Failed to save patient data. Please try again.";

/// Result type for IntakeCare operations
pub type Result<T> = std::result::Result<T, IntakeError>;

/// Main error type for IntakeCare
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("{0}")]
    Validation(String),

    #[error("Storage operation failed: {0}")]
    Storage(#[from] adapters::StorageError),

    /// Every configured store rejected the record.
    #[error("{0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
