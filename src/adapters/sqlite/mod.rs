//! SQLite adapter: Implementation of PatientStore.
//!
//! Provides local persistence for patient rows.
//!
//! Symptom and recommendation lists are stored as JSON text; timestamps are
//! RFC 3339 UTC with fixed microsecond precision so they sort lexically.
//!
//! # Mutex Behavior
//!
//! Database connection is protected by `Mutex`. A poisoned mutex (from panic
//! in another thread) is reported as [`StorageError::Unavailable`].
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{leading_float, leading_int, PatientDetails, RiskLevel, StoredPatient};
use crate::ports::{PatientPage, PatientStore};

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found: patient {0}")]
    NotFound(i64),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

const SELECT_COLUMNS: &str = r"
    SELECT id, name, age, gender, phone, state, city, location,
           weight, height, temperature, blood_pressure, oxygen, pulse,
           symptoms, risk_level, disease, recommendations,
           created_at, updated_at
    FROM patients
";

/// SQLite patient store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a patient database at `path`.
    ///
    /// # Errors
    /// Returns error if database cannot be opened or initialized.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory SQLite database (for testing).
    ///
    /// # Errors
    /// Returns error if database cannot be created.
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> Result<(), StorageError> {
        let conn = self.lock()?;

        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS patients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                age INTEGER,
                gender TEXT NOT NULL,
                phone TEXT NOT NULL,
                state TEXT NOT NULL,
                city TEXT NOT NULL,
                location TEXT NOT NULL,
                weight REAL,
                height REAL,
                temperature REAL,
                blood_pressure TEXT,
                oxygen REAL,
                pulse INTEGER,
                symptoms TEXT NOT NULL,
                risk_level TEXT,
                disease TEXT,
                recommendations TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_patients_created
                ON patients(created_at DESC);
            ",
        )?;

        Ok(())
    }

    fn timestamp(at: DateTime<Utc>) -> String {
        at.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn parse_timestamp(raw: Option<String>) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw?.trim())
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    }

    /// Map a row selected with [`SELECT_COLUMNS`].
    ///
    /// Rows may have been written by other clients, so every column except
    /// `id` is read by value: a number stored as text is parsed, anything
    /// that does not fit reads back absent (or empty for required text).
    fn row_to_patient(row: &Row<'_>) -> rusqlite::Result<StoredPatient> {
        let text = |idx: usize| row.get_ref(idx).map(lenient_text);
        let required = |idx: usize| text(idx).map(Option::unwrap_or_default);
        let int = |idx: usize| row.get_ref(idx).map(lenient_int);
        let real = |idx: usize| row.get_ref(idx).map(lenient_real);

        let symptoms = text(14)?.unwrap_or_default();
        let recommendations = text(17)?.unwrap_or_default();

        let details = PatientDetails {
            name: required(1)?,
            age: int(2)?,
            gender: required(3)?,
            phone: required(4)?,
            state: required(5)?,
            city: required(6)?,
            location: required(7)?,
            weight: real(8)?,
            height: real(9)?,
            temperature: real(10)?,
            blood_pressure: text(11)?,
            oxygen: real(12)?,
            pulse: int(13)?,
            symptoms: serde_json::from_str(&symptoms).unwrap_or_default(),
            risk_level: text(15)?.as_deref().and_then(RiskLevel::parse),
            disease: text(16)?,
            recommendations: serde_json::from_str(&recommendations).unwrap_or_default(),
        };

        Ok(StoredPatient {
            id: row.get(0)?,
            details,
            created_at: Self::parse_timestamp(text(18)?),
            updated_at: Self::parse_timestamp(text(19)?),
        })
    }

    fn fetch(conn: &Connection, id: i64) -> Result<Option<StoredPatient>, StorageError> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        let patient = conn
            .query_row(&sql, params![id], Self::row_to_patient)
            .optional()?;
        Ok(patient)
    }

    fn fetch_page(
        conn: &Connection,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<StoredPatient>, StorageError> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2");
        let mut stmt = conn.prepare(&sql)?;
        let patients = stmt
            .query_map(params![limit as i64, offset as i64], Self::row_to_patient)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(patients)
    }
}

fn lenient_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Text(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Null | ValueRef::Blob(_) => None,
    }
}

fn lenient_int(value: ValueRef<'_>) -> Option<i64> {
    match value {
        ValueRef::Integer(i) => Some(i),
        ValueRef::Real(f) if f.is_finite() => Some(f.trunc() as i64),
        ValueRef::Text(bytes) => leading_int(&String::from_utf8_lossy(bytes)),
        _ => None,
    }
}

fn lenient_real(value: ValueRef<'_>) -> Option<f64> {
    match value {
        ValueRef::Real(f) => Some(f),
        ValueRef::Integer(i) => Some(i as f64),
        ValueRef::Text(bytes) => leading_float(&String::from_utf8_lossy(bytes)),
        _ => None,
    }
}

impl PatientStore for SqliteStore {
    type Error = StorageError;

    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn create_patient(&self, details: &PatientDetails) -> Result<StoredPatient, Self::Error> {
        let symptoms = serde_json::to_string(&details.symptoms)?;
        let recommendations = serde_json::to_string(&details.recommendations)?;
        let now = Self::timestamp(Utc::now());

        let conn = self.lock()?;
        conn.execute(
            r"
            INSERT INTO patients (
                name, age, gender, phone, state, city, location,
                weight, height, temperature, blood_pressure, oxygen, pulse,
                symptoms, risk_level, disease, recommendations,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?18)
            ",
            params![
                details.name,
                details.age,
                details.gender,
                details.phone,
                details.state,
                details.city,
                details.location,
                details.weight,
                details.height,
                details.temperature,
                details.blood_pressure,
                details.oxygen,
                details.pulse,
                symptoms,
                details.risk_level.map(|r| r.as_str()),
                details.disease,
                recommendations,
                now,
            ],
        )?;

        let id = conn.last_insert_rowid();
        tracing::debug!("Saved patient {} to sqlite", id);

        Self::fetch(&conn, id)?.ok_or(StorageError::NotFound(id))
    }

    fn list_patients(&self, limit: usize) -> Result<Vec<StoredPatient>, Self::Error> {
        let conn = self.lock()?;
        Self::fetch_page(&conn, 0, limit)
    }

    fn list_patients_paginated(&self, offset: usize, limit: usize) -> Result<PatientPage, Self::Error> {
        let conn = self.lock()?;

        let total_count: i64 = conn.query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;
        let patients = Self::fetch_page(&conn, offset, limit)?;

        Ok(PatientPage::new(patients, total_count as usize, offset, limit))
    }

    fn get_patient(&self, id: i64) -> Result<Option<StoredPatient>, Self::Error> {
        let conn = self.lock()?;
        Self::fetch(&conn, id)
    }

    fn update_patient(&self, id: i64, details: &PatientDetails) -> Result<StoredPatient, Self::Error> {
        let symptoms = serde_json::to_string(&details.symptoms)?;
        let recommendations = serde_json::to_string(&details.recommendations)?;
        let now = Self::timestamp(Utc::now());

        let conn = self.lock()?;
        let changed = conn.execute(
            r"
            UPDATE patients SET
                name = ?1, age = ?2, gender = ?3, phone = ?4, state = ?5,
                city = ?6, location = ?7, weight = ?8, height = ?9,
                temperature = ?10, blood_pressure = ?11, oxygen = ?12,
                pulse = ?13, symptoms = ?14, risk_level = ?15, disease = ?16,
                recommendations = ?17, updated_at = ?18
            WHERE id = ?19
            ",
            params![
                details.name,
                details.age,
                details.gender,
                details.phone,
                details.state,
                details.city,
                details.location,
                details.weight,
                details.height,
                details.temperature,
                details.blood_pressure,
                details.oxygen,
                details.pulse,
                symptoms,
                details.risk_level.map(|r| r.as_str()),
                details.disease,
                recommendations,
                now,
                id,
            ],
        )?;

        if changed == 0 {
            return Err(StorageError::NotFound(id));
        }

        tracing::debug!("Updated patient {} in sqlite", id);
        Self::fetch(&conn, id)?.ok_or(StorageError::NotFound(id))
    }

    fn delete_patient(&self, id: i64) -> Result<(), Self::Error> {
        let conn = self.lock()?;
        let changed = conn.execute("DELETE FROM patients WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(StorageError::NotFound(id));
        }
        tracing::debug!("Deleted patient {} from sqlite", id);
        Ok(())
    }

    fn count_patients(&self) -> Result<usize, Self::Error> {
        let conn = self.lock()?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;

        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClassifiedRecord, Gender, Symptom, VitalReading};

    fn sample_details(name: &str, temperature: &str) -> PatientDetails {
        let reading = VitalReading {
            full_name: name.into(),
            age: "42".into(),
            gender: Gender::Male,
            location: "Pune, Maharashtra".into(),
            temperature: temperature.into(),
            symptoms: [Symptom::Fever, Symptom::Chills].into_iter().collect(),
            ..Default::default()
        };
        PatientDetails::from_record(&ClassifiedRecord::from_reading(reading))
    }

    #[test]
    fn test_patient_crud() {
        let store = SqliteStore::in_memory().expect("Should create db");

        // No patients initially
        assert_eq!(store.count_patients().expect("Should count"), 0);

        let details = sample_details("Anil Rao", "101");
        let created = store.create_patient(&details).expect("Should save");
        assert_eq!(created.details, details);
        assert_eq!(store.count_patients().expect("Should count"), 1);

        let loaded = store
            .get_patient(created.id)
            .expect("Should load")
            .expect("Should exist");
        assert_eq!(loaded.details.risk_level, Some(RiskLevel::Medium));
        assert_eq!(loaded.details.symptoms, vec!["Fever", "Chills"]);

        let mut changed = details.clone();
        changed.phone = "9876543210".into();
        let updated = store.update_patient(created.id, &changed).expect("Should update");
        assert_eq!(updated.details.phone, "9876543210");
        assert_eq!(updated.created_at, created.created_at);

        store.delete_patient(created.id).expect("Should delete");
        assert_eq!(store.count_patients().expect("Should count"), 0);
        assert!(store.get_patient(created.id).expect("Should load").is_none());
    }

    #[test]
    fn test_missing_patient_is_not_found() {
        let store = SqliteStore::in_memory().expect("Should create db");
        let details = sample_details("Nobody", "");

        assert!(matches!(
            store.update_patient(99, &details),
            Err(StorageError::NotFound(99))
        ));
        assert!(matches!(store.delete_patient(99), Err(StorageError::NotFound(99))));
    }

    #[test]
    fn test_listing_is_newest_first() {
        let store = SqliteStore::in_memory().expect("Should create db");
        let first = store.create_patient(&sample_details("First", "")).expect("Should save");
        let second = store.create_patient(&sample_details("Second", "")).expect("Should save");

        let listed = store.list_patients(10).expect("Should list");
        let ids: Vec<i64> = listed.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);

        let limited = store.list_patients(1).expect("Should list");
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].id, second.id);
    }

    #[test]
    fn test_pagination() {
        let store = SqliteStore::in_memory().expect("Should create db");
        for i in 0..5 {
            store
                .create_patient(&sample_details(&format!("P{i}"), ""))
                .expect("Should save");
        }

        let page = store.list_patients_paginated(0, 2).expect("Should page");
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_count, 5);
        assert!(page.has_more);
        assert_eq!(page.next_offset(), Some(2));
        assert_eq!(page.prev_offset(), None);

        let last = store.list_patients_paginated(4, 2).expect("Should page");
        assert_eq!(last.items.len(), 1);
        assert!(!last.has_more);
        assert_eq!(last.prev_offset(), Some(2));
    }

    #[test]
    fn test_unknown_risk_label_reads_back_absent() {
        let store = SqliteStore::in_memory().expect("Should create db");
        let created = store.create_patient(&sample_details("Legacy", "")).expect("Should save");

        {
            let conn = store.lock().expect("Should lock");
            conn.execute(
                "UPDATE patients SET risk_level = 'Critical' WHERE id = ?1",
                params![created.id],
            )
            .expect("Should update");
        }

        let loaded = store
            .get_patient(created.id)
            .expect("Should load")
            .expect("Should exist");
        assert_eq!(loaded.details.risk_level, None);
    }

    #[test]
    fn test_mixed_case_risk_label_parses() {
        let store = SqliteStore::in_memory().expect("Should create db");
        let created = store.create_patient(&sample_details("Legacy", "")).expect("Should save");

        {
            let conn = store.lock().expect("Should lock");
            conn.execute(
                "UPDATE patients SET risk_level = 'High' WHERE id = ?1",
                params![created.id],
            )
            .expect("Should update");
        }

        let loaded = store
            .get_patient(created.id)
            .expect("Should load")
            .expect("Should exist");
        assert_eq!(loaded.details.risk_level, Some(RiskLevel::High));
    }

    #[test]
    fn test_foreign_row_with_mistyped_columns_is_read() {
        let store = SqliteStore::in_memory().expect("Should create db");
        store.create_patient(&sample_details("Local", "")).expect("Should save");

        {
            let conn = store.lock().expect("Should lock");
            conn.execute(
                r"
                INSERT INTO patients (
                    name, age, gender, phone, state, city, location,
                    weight, pulse, symptoms, risk_level, recommendations,
                    created_at, updated_at
                ) VALUES (
                    'Imported', 'abc', 'Female', 12345, '', '', 'Nagpur',
                    '61.5 kg', 'n/a', 'not json', 'high', '[]',
                    '2024-03-01T09:30:00.000000Z', 'yesterday'
                )
                ",
                [],
            )
            .expect("Should insert");
        }

        let listed = store.list_patients(10).expect("Should list");
        assert_eq!(listed.len(), 2);

        let imported = listed
            .iter()
            .find(|p| p.details.name == "Imported")
            .expect("Should include foreign row");
        assert_eq!(imported.details.age, None);
        assert_eq!(imported.details.phone, "12345");
        assert_eq!(imported.details.weight, Some(61.5));
        assert_eq!(imported.details.pulse, None);
        assert!(imported.details.symptoms.is_empty());
        assert_eq!(imported.details.risk_level, Some(RiskLevel::High));
        assert!(imported.created_at.is_some());
        assert_eq!(imported.updated_at, None);
    }

    #[test]
    fn test_unreadable_timestamp_sorts_last() {
        use crate::application::AnalyticsService;
        use crate::adapters::MemoryStore;
        use std::sync::Arc;

        let store = Arc::new(SqliteStore::in_memory().expect("Should create db"));
        let older = store.create_patient(&sample_details("Older", "")).expect("Should save");
        let garbled = store.create_patient(&sample_details("Garbled", "")).expect("Should save");

        {
            let conn = store.lock().expect("Should lock");
            conn.execute(
                "UPDATE patients SET created_at = 'not a date' WHERE id = ?1",
                params![garbled.id],
            )
            .expect("Should update");
        }

        let loaded = store
            .get_patient(garbled.id)
            .expect("Should load")
            .expect("Should exist");
        assert_eq!(loaded.created_at, None);

        let service: AnalyticsService<SqliteStore, MemoryStore> =
            AnalyticsService::new(store, None, 10);
        let ids: Vec<i64> = service
            .stored_rows()
            .expect("Should list")
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![older.id, garbled.id]);
    }

    #[test]
    fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("patients.db");

        let id = {
            let store = SqliteStore::new(&path).expect("Should open db");
            store.create_patient(&sample_details("Persisted", "")).expect("Should save").id
        };

        let reopened = SqliteStore::new(&path).expect("Should reopen db");
        let loaded = reopened
            .get_patient(id)
            .expect("Should load")
            .expect("Should exist");
        assert_eq!(loaded.details.name, "Persisted");
    }
}
