//! Intake service: validate, classify and persist a form submission.
//!
//! Persistence tries the primary store, then the fallback store. The
//! session log only receives records that some store accepted.

use std::sync::Arc;

use crate::adapters::{MemoryStore, StorageError};
use crate::application::SessionLog;
use crate::domain::{ClassifiedRecord, PatientDetails, StoredPatient, VitalReading};
use crate::ports::PatientStore;
use crate::{IntakeError, PERSISTENCE_FAILED_MESSAGE, REQUIRED_FIELDS_MESSAGE};

/// Outcome of a successful submit.
#[derive(Debug, Clone)]
pub struct Submission {
    pub record: ClassifiedRecord,
    pub stored: StoredPatient,
    /// Name of the store that accepted the row
    pub store: &'static str,
    pub used_fallback: bool,
}

/// Service for accepting intake forms.
pub struct IntakeService<P, F = MemoryStore>
where
    P: PatientStore + ?Sized,
    F: PatientStore + ?Sized,
{
    primary: Arc<P>,
    fallback: Option<Arc<F>>,
}

impl<P, F> IntakeService<P, F>
where
    P: PatientStore + ?Sized,
    P::Error: Into<StorageError>,
    F: PatientStore + ?Sized,
    F::Error: Into<StorageError>,
{
    /// Create a new intake service.
    pub fn new(primary: Arc<P>, fallback: Option<Arc<F>>) -> Self {
        Self { primary, fallback }
    }

    #[must_use]
    pub fn primary(&self) -> &P {
        &self.primary
    }

    #[must_use]
    pub fn fallback(&self) -> Option<&F> {
        self.fallback.as_deref()
    }

    /// Validate, classify and persist `reading`, then append it to `log`.
    ///
    /// # Errors
    /// - `Validation` if name, age or location is empty; nothing is classified.
    /// - `Persistence` if every store rejected the row; `log` is left untouched.
    pub fn submit(
        &self,
        log: &mut SessionLog,
        reading: VitalReading,
    ) -> crate::Result<Submission> {
        let missing = reading.missing_required();
        if !missing.is_empty() {
            tracing::debug!("Rejected intake form, missing: {}", missing.join(", "));
            return Err(IntakeError::Validation(REQUIRED_FIELDS_MESSAGE.to_string()));
        }

        let record = ClassifiedRecord::from_reading(reading);
        let details = PatientDetails::from_record(&record);

        let (stored, store, used_fallback) = self.persist(&details)?;

        tracing::info!(
            "Recorded {} as {} risk in {} store (patient {})",
            record.id(),
            record.risk_level().as_str(),
            store,
            stored.id
        );

        log.append(record.clone());

        Ok(Submission {
            record,
            stored,
            store,
            used_fallback,
        })
    }

    fn persist(
        &self,
        details: &PatientDetails,
    ) -> crate::Result<(StoredPatient, &'static str, bool)> {
        let primary_err: StorageError = match self.primary.create_patient(details) {
            Ok(stored) => return Ok((stored, self.primary.name(), false)),
            Err(e) => e.into(),
        };

        let Some(fallback) = &self.fallback else {
            tracing::error!("Primary store {} failed: {}", self.primary.name(), primary_err);
            return Err(IntakeError::Persistence(PERSISTENCE_FAILED_MESSAGE.to_string()));
        };

        tracing::warn!(
            "Primary store {} failed, using {}: {}",
            self.primary.name(),
            fallback.name(),
            primary_err
        );

        match fallback.create_patient(details) {
            Ok(stored) => Ok((stored, fallback.name(), true)),
            Err(e) => {
                let err: StorageError = e.into();
                tracing::error!("Fallback store {} failed: {}", fallback.name(), err);
                Err(IntakeError::Persistence(PERSISTENCE_FAILED_MESSAGE.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::SqliteStore;
    use crate::domain::{PatientDetails, RiskLevel, Symptom};
    use crate::ports::PatientPage;

    /// Store that rejects every call.
    struct FailingStore;

    impl PatientStore for FailingStore {
        type Error = StorageError;

        fn name(&self) -> &'static str {
            "failing"
        }

        fn create_patient(&self, _: &PatientDetails) -> Result<StoredPatient, Self::Error> {
            Err(StorageError::Unavailable("offline".into()))
        }

        fn list_patients(&self, _: usize) -> Result<Vec<StoredPatient>, Self::Error> {
            Err(StorageError::Unavailable("offline".into()))
        }

        fn list_patients_paginated(&self, _: usize, _: usize) -> Result<PatientPage, Self::Error> {
            Err(StorageError::Unavailable("offline".into()))
        }

        fn get_patient(&self, _: i64) -> Result<Option<StoredPatient>, Self::Error> {
            Err(StorageError::Unavailable("offline".into()))
        }

        fn update_patient(&self, _: i64, _: &PatientDetails) -> Result<StoredPatient, Self::Error> {
            Err(StorageError::Unavailable("offline".into()))
        }

        fn delete_patient(&self, _: i64) -> Result<(), Self::Error> {
            Err(StorageError::Unavailable("offline".into()))
        }

        fn count_patients(&self) -> Result<usize, Self::Error> {
            Err(StorageError::Unavailable("offline".into()))
        }
    }

    fn complete_reading() -> VitalReading {
        VitalReading {
            full_name: "Sunita Devi".into(),
            age: "52".into(),
            location: "Patna, Bihar".into(),
            temperature: "103".into(),
            symptoms: [Symptom::Fever, Symptom::Headache].into_iter().collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_submit_persists_and_logs() {
        let service: IntakeService<SqliteStore, MemoryStore> = IntakeService::new(
            Arc::new(SqliteStore::in_memory().expect("Should create db")),
            Some(Arc::new(MemoryStore::new())),
        );
        let mut log = SessionLog::new();

        let submission = service
            .submit(&mut log, complete_reading())
            .expect("Should submit");

        assert_eq!(submission.record.risk_level(), RiskLevel::High);
        assert_eq!(submission.store, "sqlite");
        assert!(!submission.used_fallback);
        assert_eq!(submission.stored.details.risk_level, Some(RiskLevel::High));
        assert_eq!(log.len(), 1);
        assert_eq!(log.records()[0].id(), submission.record.id());
        assert_eq!(service.primary().count_patients().expect("Should count"), 1);
        assert_eq!(
            service
                .fallback()
                .map(|f| f.count_patients().expect("Should count")),
            Some(0)
        );
    }

    #[test]
    fn test_missing_required_fields() {
        let service: IntakeService<MemoryStore, MemoryStore> =
            IntakeService::new(Arc::new(MemoryStore::new()), None);
        let mut log = SessionLog::new();

        for reading in [
            VitalReading { full_name: " ".into(), ..complete_reading() },
            VitalReading { age: String::new(), ..complete_reading() },
            VitalReading { location: String::new(), ..complete_reading() },
        ] {
            let err = service
                .submit(&mut log, reading)
                .expect_err("Should reject incomplete form");
            assert!(matches!(err, IntakeError::Validation(_)));
            assert_eq!(err.to_string(), REQUIRED_FIELDS_MESSAGE);
        }

        assert!(log.is_empty());
        assert_eq!(service.primary().count_patients().expect("Should count"), 0);
    }

    #[test]
    fn test_fallback_store_used_when_primary_fails() {
        let service = IntakeService::new(Arc::new(FailingStore), Some(Arc::new(MemoryStore::new())));
        let mut log = SessionLog::new();

        let submission = service
            .submit(&mut log, complete_reading())
            .expect("Should fall back");

        assert!(submission.used_fallback);
        assert_eq!(submission.store, "memory");
        assert_eq!(log.len(), 1);
        assert_eq!(
            service
                .fallback()
                .map(|f| f.count_patients().expect("Should count")),
            Some(1)
        );
    }

    #[test]
    fn test_log_untouched_when_every_store_fails() {
        let service = IntakeService::new(Arc::new(FailingStore), Some(Arc::new(FailingStore)));
        let mut log = SessionLog::new();

        let err = service
            .submit(&mut log, complete_reading())
            .expect_err("Should fail");

        assert!(matches!(err, IntakeError::Persistence(_)));
        assert_eq!(err.to_string(), PERSISTENCE_FAILED_MESSAGE);
        assert!(log.is_empty());
    }

    #[test]
    fn test_no_fallback_configured() {
        let service: IntakeService<FailingStore, MemoryStore> =
            IntakeService::new(Arc::new(FailingStore), None);
        let mut log = SessionLog::new();

        assert!(matches!(
            service.submit(&mut log, complete_reading()),
            Err(IntakeError::Persistence(_))
        ));
        assert!(log.is_empty());
    }

    #[test]
    fn test_trait_object_primary() {
        let primary: Arc<dyn PatientStore<Error = StorageError>> = Arc::new(MemoryStore::new());
        let service: IntakeService<dyn PatientStore<Error = StorageError>, MemoryStore> =
            IntakeService::new(primary, None);
        let mut log = SessionLog::new();

        service
            .submit(&mut log, complete_reading())
            .expect("Should submit");
        assert_eq!(service.primary().count_patients().expect("Should count"), 1);
    }
}
