//! Storage port: Trait for patient record persistence.
//!
//! This trait abstracts the record store (SQLite, in-memory) from the
//! application logic.

use crate::domain::{PatientDetails, StoredPatient};

/// A page of patients with pagination metadata.
#[derive(Debug, Clone)]
pub struct PatientPage {
    /// Patients in this page
    pub items: Vec<StoredPatient>,
    /// Total count of all patients (for UI pagination)
    pub total_count: usize,
    /// Current page offset
    pub offset: usize,
    /// Page size limit
    pub limit: usize,
    /// Whether there are more pages
    pub has_more: bool,
}

impl PatientPage {
    /// Create a new patient page.
    #[must_use]
    pub fn new(items: Vec<StoredPatient>, total_count: usize, offset: usize, limit: usize) -> Self {
        let has_more = offset + items.len() < total_count;
        Self {
            items,
            total_count,
            offset,
            limit,
            has_more,
        }
    }

    /// Get the next page offset.
    #[must_use]
    pub fn next_offset(&self) -> Option<usize> {
        if self.has_more {
            Some(self.offset + self.limit)
        } else {
            None
        }
    }

    /// Get the previous page offset.
    #[must_use]
    pub fn prev_offset(&self) -> Option<usize> {
        if self.offset > 0 {
            Some(self.offset.saturating_sub(self.limit))
        } else {
            None
        }
    }
}

/// Patient record store: create / list / get / update / delete by identifier.
///
/// Listings are ordered newest first.
pub trait PatientStore: Send + Sync {
    /// Error type for storage operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Short adapter name for logs.
    fn name(&self) -> &'static str;

    /// Insert a patient and return the stored row.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn create_patient(&self, details: &PatientDetails) -> Result<StoredPatient, Self::Error>;

    /// Load up to `limit` patients, newest first.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn list_patients(&self, limit: usize) -> Result<Vec<StoredPatient>, Self::Error>;

    /// Load patients with pagination.
    ///
    /// # Arguments
    /// * `offset` - Starting position (0-indexed)
    /// * `limit` - Maximum number of items to return
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn list_patients_paginated(&self, offset: usize, limit: usize) -> Result<PatientPage, Self::Error>;

    /// Load a single patient.
    ///
    /// # Returns
    /// `None` if no patient has this id.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn get_patient(&self, id: i64) -> Result<Option<StoredPatient>, Self::Error>;

    /// Replace a patient's details.
    ///
    /// # Errors
    /// Returns error if the patient does not exist or storage fails.
    fn update_patient(&self, id: i64, details: &PatientDetails) -> Result<StoredPatient, Self::Error>;

    /// Delete a patient by id.
    ///
    /// # Errors
    /// Returns error if the patient does not exist or storage fails.
    fn delete_patient(&self, id: i64) -> Result<(), Self::Error>;

    /// Get the total count of patients.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn count_patients(&self) -> Result<usize, Self::Error>;
}
