//! Analytics service: grouped counts for the dashboard.
//!
//! [`summarize`] is a single pass over any sequence of [`DashboardRow`]s.
//! Session records and stored patients both implement the trait, so the
//! dashboard counts them the same way.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::Serialize;

use crate::adapters::{MemoryStore, StorageError};
use crate::application::SessionLog;
use crate::domain::{leading_int, ClassifiedRecord, RiskLevel, StoredPatient};
use crate::ports::PatientStore;

/// Label used for rows with no disease.
pub const UNKNOWN_DISEASE: &str = "Unknown";

/// Read-only view of one row for aggregation.
pub trait DashboardRow {
    fn risk_level(&self) -> Option<RiskLevel>;
    fn gender(&self) -> &str;
    /// Age in whole years, `None` if not numeric.
    fn age(&self) -> Option<i64>;
    fn disease(&self) -> Option<&str>;
    fn location(&self) -> &str;
    /// `None` when the row carries no readable timestamp.
    fn recorded_at(&self) -> Option<DateTime<Utc>>;
}

impl DashboardRow for ClassifiedRecord {
    fn risk_level(&self) -> Option<RiskLevel> {
        Some(ClassifiedRecord::risk_level(self))
    }

    fn gender(&self) -> &str {
        self.reading().gender.label()
    }

    fn age(&self) -> Option<i64> {
        leading_int(&self.reading().age)
    }

    fn disease(&self) -> Option<&str> {
        Some(ClassifiedRecord::disease(self))
    }

    fn location(&self) -> &str {
        &self.reading().location
    }

    fn recorded_at(&self) -> Option<DateTime<Utc>> {
        Some(self.submitted_at())
    }
}

impl DashboardRow for StoredPatient {
    fn risk_level(&self) -> Option<RiskLevel> {
        self.details.risk_level
    }

    fn gender(&self) -> &str {
        &self.details.gender
    }

    fn age(&self) -> Option<i64> {
        self.details.age
    }

    fn disease(&self) -> Option<&str> {
        self.details.disease.as_deref()
    }

    fn location(&self) -> &str {
        &self.details.location
    }

    fn recorded_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiskCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl RiskCounts {
    #[must_use]
    pub fn get(&self, level: RiskLevel) -> usize {
        match level {
            RiskLevel::Low => self.low,
            RiskLevel::Medium => self.medium,
            RiskLevel::High => self.high,
        }
    }

    fn add(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::Low => self.low += 1,
            RiskLevel::Medium => self.medium += 1,
            RiskLevel::High => self.high += 1,
        }
    }
}

/// Binary only: other gender values are not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GenderCounts {
    pub male: usize,
    pub female: usize,
}

/// child < 18, adult 18..=60, senior > 60.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AgeBrackets {
    pub child: usize,
    pub adult: usize,
    pub senior: usize,
}

impl AgeBrackets {
    fn add(&mut self, age: i64) {
        if age < 18 {
            self.child += 1;
        } else if age <= 60 {
            self.adult += 1;
        } else {
            self.senior += 1;
        }
    }
}

/// Counts keyed by label, in first-seen key order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupCounts {
    #[serde(skip)]
    index: HashMap<String, usize>,
    entries: Vec<(String, usize)>,
}

impl GroupCounts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&pos) => self.entries[pos].1 += 1,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), 1));
            }
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> usize {
        self.index.get(key).map_or(0, |&pos| self.entries[pos].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(k, n)| (k.as_str(), *n))
    }

    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for GroupCounts {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total: usize,
    pub by_risk: RiskCounts,
    pub by_gender: GenderCounts,
    pub by_age: AgeBrackets,
    pub by_disease: GroupCounts,
    pub by_location: GroupCounts,
}

/// Group `rows` by risk, gender, age bracket, disease and location.
pub fn summarize<'a, R, I>(rows: I) -> DashboardSummary
where
    R: DashboardRow + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut summary = DashboardSummary::default();

    for row in rows {
        summary.total += 1;

        if let Some(level) = row.risk_level() {
            summary.by_risk.add(level);
        }

        match row.gender() {
            "Male" => summary.by_gender.male += 1,
            "Female" => summary.by_gender.female += 1,
            _ => {}
        }

        if let Some(age) = row.age() {
            summary.by_age.add(age);
        }

        let disease = row.disease().filter(|d| !d.is_empty()).unwrap_or(UNKNOWN_DISEASE);
        summary.by_disease.add(disease);

        let location = row.location();
        if !location.is_empty() {
            summary.by_location.add(location);
        }
    }

    summary
}

/// Headline numbers for the home screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HomeStats {
    pub total: usize,
    pub high_risk: usize,
    /// Rows recorded on `today` in local time
    pub today: usize,
}

pub fn home_stats<'a, R, I>(rows: I, today: NaiveDate) -> HomeStats
where
    R: DashboardRow + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut stats = HomeStats::default();
    for row in rows {
        stats.total += 1;
        if row.risk_level() == Some(RiskLevel::High) {
            stats.high_risk += 1;
        }
        let on_day = row
            .recorded_at()
            .is_some_and(|at| at.with_timezone(&Local).date_naive() == today);
        if on_day {
            stats.today += 1;
        }
    }
    stats
}

/// Where the dashboard numbers came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Stored,
    /// Store listing failed; only this session's records are counted
    Session,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub source: DataSource,
    pub summary: DashboardSummary,
    pub home: HomeStats,
}

impl Dashboard {
    fn from_rows<'a, R, I>(source: DataSource, rows: I) -> Self
    where
        R: DashboardRow + 'a,
        I: IntoIterator<Item = &'a R> + Clone,
    {
        let today = Local::now().date_naive();
        Self {
            source,
            summary: summarize(rows.clone()),
            home: home_stats(rows, today),
        }
    }
}

/// Service for dashboard analytics over the record stores.
pub struct AnalyticsService<P, F = MemoryStore>
where
    P: PatientStore + ?Sized,
    F: PatientStore + ?Sized,
{
    primary: Arc<P>,
    fallback: Option<Arc<F>>,
    limit: usize,
}

impl<P, F> AnalyticsService<P, F>
where
    P: PatientStore + ?Sized,
    P::Error: Into<StorageError>,
    F: PatientStore + ?Sized,
    F::Error: Into<StorageError>,
{
    /// Create a new analytics service reading at most `limit` rows per store.
    pub fn new(primary: Arc<P>, fallback: Option<Arc<F>>, limit: usize) -> Self {
        Self {
            primary,
            fallback,
            limit,
        }
    }

    /// Load stored rows from both stores, newest first; rows without a
    /// readable timestamp sort last.
    ///
    /// # Errors
    /// Returns error if the primary store cannot be listed. A failing
    /// fallback store is logged and skipped.
    pub fn stored_rows(&self) -> Result<Vec<StoredPatient>, StorageError> {
        let mut rows = self
            .primary
            .list_patients(self.limit)
            .map_err(Into::<StorageError>::into)?;

        if let Some(fallback) = &self.fallback {
            match fallback.list_patients(self.limit) {
                Ok(extra) => rows.extend(extra),
                Err(e) => {
                    let err: StorageError = e.into();
                    tracing::warn!("Skipping {} store in dashboard: {}", fallback.name(), err);
                }
            }
        }

        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(self.limit);
        Ok(rows)
    }

    /// Build the dashboard, falling back to `log` if the store is unreadable.
    #[must_use]
    pub fn dashboard(&self, log: &SessionLog) -> Dashboard {
        match self.stored_rows() {
            Ok(rows) => {
                tracing::debug!("Dashboard over {} stored rows", rows.len());
                Dashboard::from_rows(DataSource::Stored, rows.iter())
            }
            Err(e) => {
                tracing::warn!(
                    "Could not list {} store, showing session records only: {}",
                    self.primary.name(),
                    e
                );
                Dashboard::from_rows(DataSource::Session, log.records().iter())
            }
        }
    }
}
