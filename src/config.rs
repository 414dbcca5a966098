//! Application configuration from environment variables.

use std::path::PathBuf;

/// Which store receives records first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// SQLite primary, memory fallback
    Sqlite,
    /// Memory only
    Memory,
}

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// File when stdout is a terminal (the TUI owns it), stdout otherwise
    Auto,
    File,
    Stdout,
}

impl LogMode {
    /// Resolve `Auto` against whether stdout is interactive.
    #[must_use]
    pub fn use_file(self, interactive: bool) -> bool {
        match self {
            Self::File => true,
            Self::Stdout => false,
            Self::Auto => interactive,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub storage: StorageBackend,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
    /// Maximum stored rows pulled into the dashboard
    pub dashboard_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("intakecare.db"),
            storage: StorageBackend::Sqlite,
            log_mode: LogMode::Auto,
            log_file: PathBuf::from("intakecare.log"),
            dashboard_limit: 1000,
        }
    }
}

impl AppConfig {
    /// Load config overrides from environment (best-effort).
    ///
    /// Supported:
    /// - INTAKECARE_DB_PATH
    /// - INTAKECARE_STORAGE=sqlite|memory
    /// - INTAKECARE_LOG_MODE=auto|file|stdout
    /// - INTAKECARE_LOG_FILE
    /// - INTAKECARE_DASHBOARD_LIMIT
    ///
    /// Unrecognized values keep the default. One message per ignored value
    /// is returned alongside the config; the logger is not installed yet when
    /// this runs, so the caller logs them.
    #[must_use]
    pub fn from_env_or_default() -> (Self, Vec<String>) {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> (Self, Vec<String>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let mut ignored = Vec::new();

        if let Some(v) = lookup("INTAKECARE_DB_PATH") {
            let v = v.trim();
            if !v.is_empty() {
                cfg.db_path = PathBuf::from(v);
            }
        }

        if let Some(v) = lookup("INTAKECARE_STORAGE") {
            match v.trim().to_ascii_lowercase().as_str() {
                "sqlite" => cfg.storage = StorageBackend::Sqlite,
                "memory" => cfg.storage = StorageBackend::Memory,
                _ => ignored.push(format!("Ignoring INTAKECARE_STORAGE={v:?}")),
            }
        }

        if let Some(v) = lookup("INTAKECARE_LOG_MODE") {
            match v.trim().to_ascii_lowercase().as_str() {
                "auto" => cfg.log_mode = LogMode::Auto,
                "file" => cfg.log_mode = LogMode::File,
                "stdout" => cfg.log_mode = LogMode::Stdout,
                _ => ignored.push(format!("Ignoring INTAKECARE_LOG_MODE={v:?}")),
            }
        }

        if let Some(v) = lookup("INTAKECARE_LOG_FILE") {
            let v = v.trim();
            if !v.is_empty() {
                cfg.log_file = PathBuf::from(v);
            }
        }

        if let Some(v) = lookup("INTAKECARE_DASHBOARD_LIMIT") {
            match v.trim().parse::<usize>() {
                Ok(n) if n > 0 => cfg.dashboard_limit = n,
                _ => ignored.push(format!("Ignoring INTAKECARE_DASHBOARD_LIMIT={v:?}")),
            }
        }

        (cfg, ignored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned()).0
    }

    #[test]
    fn test_defaults() {
        let cfg = config_from(&[]);
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.db_path, PathBuf::from("intakecare.db"));
        assert_eq!(cfg.dashboard_limit, 1000);
    }

    #[test]
    fn test_overrides() {
        let cfg = config_from(&[
            ("INTAKECARE_DB_PATH", "/data/clinic.db"),
            ("INTAKECARE_STORAGE", "Memory"),
            ("INTAKECARE_LOG_MODE", "stdout"),
            ("INTAKECARE_LOG_FILE", "/var/log/intake.log"),
            ("INTAKECARE_DASHBOARD_LIMIT", "250"),
        ]);
        assert_eq!(cfg.db_path, PathBuf::from("/data/clinic.db"));
        assert_eq!(cfg.storage, StorageBackend::Memory);
        assert_eq!(cfg.log_mode, LogMode::Stdout);
        assert_eq!(cfg.log_file, PathBuf::from("/var/log/intake.log"));
        assert_eq!(cfg.dashboard_limit, 250);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let cfg = config_from(&[
            ("INTAKECARE_STORAGE", "postgres"),
            ("INTAKECARE_LOG_MODE", "syslog"),
            ("INTAKECARE_DASHBOARD_LIMIT", "0"),
            ("INTAKECARE_DB_PATH", "  "),
        ]);
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_ignored_values_are_reported() {
        let env: HashMap<&str, &str> = [
            ("INTAKECARE_STORAGE", "postgres"),
            ("INTAKECARE_LOG_MODE", "syslog"),
            ("INTAKECARE_DASHBOARD_LIMIT", "many"),
            ("INTAKECARE_LOG_FILE", "run.log"),
        ]
        .into_iter()
        .collect();
        let (cfg, ignored) = AppConfig::from_lookup(|key| env.get(key).map(|v| (*v).to_string()));

        assert_eq!(cfg.log_file, PathBuf::from("run.log"));
        assert_eq!(
            ignored,
            vec![
                "Ignoring INTAKECARE_STORAGE=\"postgres\"",
                "Ignoring INTAKECARE_LOG_MODE=\"syslog\"",
                "Ignoring INTAKECARE_DASHBOARD_LIMIT=\"many\"",
            ]
        );

        let (_, clean) = AppConfig::from_lookup(|_| None);
        assert!(clean.is_empty());
    }

    #[test]
    fn test_log_mode_resolution() {
        assert!(LogMode::Auto.use_file(true));
        assert!(!LogMode::Auto.use_file(false));
        assert!(LogMode::File.use_file(false));
        assert!(!LogMode::Stdout.use_file(true));
    }
}
