//! TUI module: Terminal User Interface using Ratatui.
//!
//! Screens:
//! - Sign-in (session label)
//! - Home with headline numbers
//! - Intake form
//! - Results with share summary
//! - Dashboard of grouped counts

mod app;
mod styles;
mod ui;

pub use app::{App, Screen};
pub use styles::MedicalTheme;
