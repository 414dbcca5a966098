//! In-memory adapter: Fallback implementation of PatientStore.
//!
//! Used as the second write path when the primary store rejects a record,
//! and as the only store when `INTAKECARE_STORAGE=memory`. Contents live for
//! the lifetime of the process.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use super::StorageError;
use crate::domain::{PatientDetails, StoredPatient};
use crate::ports::{PatientPage, PatientStore};

#[derive(Debug, Default)]
struct MemoryState {
    next_id: i64,
    /// Insertion order, oldest first
    rows: Vec<StoredPatient>,
}

/// Process-local patient store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }
}

impl PatientStore for MemoryStore {
    type Error = StorageError;

    fn name(&self) -> &'static str {
        "memory"
    }

    fn create_patient(&self, details: &PatientDetails) -> Result<StoredPatient, Self::Error> {
        let mut state = self.lock()?;
        state.next_id += 1;

        let now = Some(Utc::now());
        let patient = StoredPatient {
            id: state.next_id,
            details: details.clone(),
            created_at: now,
            updated_at: now,
        };
        state.rows.push(patient.clone());

        tracing::debug!("Saved patient {} to memory", patient.id);
        Ok(patient)
    }

    fn list_patients(&self, limit: usize) -> Result<Vec<StoredPatient>, Self::Error> {
        let state = self.lock()?;
        Ok(state.rows.iter().rev().take(limit).cloned().collect())
    }

    fn list_patients_paginated(&self, offset: usize, limit: usize) -> Result<PatientPage, Self::Error> {
        let state = self.lock()?;
        let items = state
            .rows
            .iter()
            .rev()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        Ok(PatientPage::new(items, state.rows.len(), offset, limit))
    }

    fn get_patient(&self, id: i64) -> Result<Option<StoredPatient>, Self::Error> {
        let state = self.lock()?;
        Ok(state.rows.iter().find(|p| p.id == id).cloned())
    }

    fn update_patient(&self, id: i64, details: &PatientDetails) -> Result<StoredPatient, Self::Error> {
        let mut state = self.lock()?;
        let patient = state
            .rows
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StorageError::NotFound(id))?;

        patient.details = details.clone();
        patient.updated_at = Some(Utc::now());
        Ok(patient.clone())
    }

    fn delete_patient(&self, id: i64) -> Result<(), Self::Error> {
        let mut state = self.lock()?;
        let before = state.rows.len();
        state.rows.retain(|p| p.id != id);

        if state.rows.len() == before {
            return Err(StorageError::NotFound(id));
        }
        Ok(())
    }

    fn count_patients(&self) -> Result<usize, Self::Error> {
        Ok(self.lock()?.rows.len())
    }
}
