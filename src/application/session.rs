//! Append-only log of the records submitted in this session.

use crate::domain::ClassifiedRecord;

/// Records submitted since the application started, oldest first.
///
/// Owned by the caller and handed to services by reference. Records can be
/// appended and read, never edited or removed.
#[derive(Debug, Default)]
pub struct SessionLog {
    records: Vec<ClassifiedRecord>,
}

impl SessionLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: ClassifiedRecord) {
        self.records.push(record);
    }

    #[must_use]
    pub fn records(&self) -> &[ClassifiedRecord] {
        &self.records
    }

    #[must_use]
    pub fn latest(&self) -> Option<&ClassifiedRecord> {
        self.records.last()
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&ClassifiedRecord> {
        self.records.iter().find(|r| r.id() == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VitalReading;

    fn record(name: &str) -> ClassifiedRecord {
        ClassifiedRecord::from_reading(VitalReading {
            full_name: name.into(),
            ..Default::default()
        })
    }

    #[test]
    fn test_append_keeps_order() {
        let mut log = SessionLog::new();
        assert!(log.is_empty());
        assert!(log.latest().is_none());

        let first = record("first");
        let first_id = first.id().to_string();
        log.append(first);
        log.append(record("second"));

        assert_eq!(log.len(), 2);
        assert_eq!(log.records()[0].reading().full_name, "first");
        assert_eq!(log.latest().map(|r| r.reading().full_name.as_str()), Some("second"));
        assert_eq!(
            log.find(&first_id).map(|r| r.reading().full_name.as_str()),
            Some("first")
        );
        assert!(log.find("missing").is_none());
    }
}
