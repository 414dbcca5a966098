//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the core use cases of the application.

mod analytics;
mod intake;
mod session;

pub use analytics::{
    home_stats, summarize, AgeBrackets, AnalyticsService, Dashboard, DashboardRow,
    DashboardSummary, DataSource, GenderCounts, GroupCounts, HomeStats, RiskCounts,
    UNKNOWN_DISEASE,
};
pub use intake::{IntakeService, Submission};
pub use session::SessionLog;
