//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Service integration

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::adapters::{MemoryStore, SqliteStore, StorageError};
use crate::application::{AnalyticsService, Dashboard, HomeStats, IntakeService, SessionLog};
use crate::config::{AppConfig, StorageBackend};
use crate::ports::PatientStore;

use super::ui::{
    dashboard::render_dashboard,
    home::render_home,
    intake::{render_intake_form, IntakeFormState},
    render_disclaimer,
    results::{render_results, ResultsState},
    signin::{render_signin, SignInState},
};

/// Primary store as selected at startup.
type DynStore = dyn PatientStore<Error = StorageError>;

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    SignIn,
    Home,
    Intake,
    Results,
    Dashboard,
}

/// Main application state
pub struct App {
    /// Current screen
    screen: Screen,

    /// Whether the app should quit
    should_quit: bool,

    intake_service: IntakeService<DynStore, MemoryStore>,
    analytics_service: AnalyticsService<DynStore, MemoryStore>,

    /// Records accepted in this run
    session: SessionLog,

    /// Health-worker label from the sign-in screen
    operator: Option<String>,

    signin_state: SignInState,
    form_state: IntakeFormState,
    results_state: Option<ResultsState>,
    dashboard: Option<Dashboard>,
}

impl App {
    /// Create a new application instance from configuration.
    ///
    /// A SQLite store that cannot be opened is replaced by an in-memory
    /// store so intake keeps working.
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        let (primary, fallback) = open_stores(config);
        Self::with_dependencies(primary, fallback, config.dashboard_limit)
    }

    /// Create application with injected stores (Composition Root pattern).
    ///
    /// # Arguments
    /// * `primary` - Store that receives records first
    /// * `fallback` - Store tried when the primary rejects a record
    /// * `dashboard_limit` - Maximum stored rows per store in the dashboard
    #[must_use]
    pub fn with_dependencies(
        primary: Arc<DynStore>,
        fallback: Option<Arc<MemoryStore>>,
        dashboard_limit: usize,
    ) -> Self {
        Self {
            screen: Screen::SignIn,
            should_quit: false,
            intake_service: IntakeService::new(primary.clone(), fallback.clone()),
            analytics_service: AnalyticsService::new(primary, fallback, dashboard_limit),
            session: SessionLog::new(),
            operator: None,
            signin_state: SignInState::default(),
            form_state: IntakeFormState::default(),
            results_state: None,
            dashboard: None,
        }
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    #[must_use]
    pub fn session(&self) -> &SessionLog {
        &self.session
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Main loop
        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(f.area());

                let content_area = chunks[0];
                let disclaimer_area = chunks[1];

                match (self.screen, &self.results_state) {
                    (Screen::SignIn, _) => render_signin(f, content_area, &self.signin_state),
                    (Screen::Intake, _) => render_intake_form(f, content_area, &self.form_state),
                    (Screen::Results, Some(results)) => render_results(f, content_area, results),
                    (Screen::Dashboard, _) => {
                        render_dashboard(f, content_area, self.dashboard.as_ref())
                    }
                    (Screen::Home | Screen::Results, _) => render_home(
                        f,
                        content_area,
                        self.operator.as_deref().unwrap_or_default(),
                        self.home_stats(),
                        self.session.records(),
                    ),
                }

                render_disclaimer(f, disclaimer_area);
            })?;

            // Handle input (short poll to stay responsive)
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn home_stats(&self) -> HomeStats {
        self.dashboard.as_ref().map(|d| d.home).unwrap_or_default()
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if modifiers.contains(KeyModifiers::CONTROL) && matches!(key, KeyCode::Char('q' | 'c')) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::SignIn => self.handle_signin_key(key),
            Screen::Home => self.handle_home_key(key),
            Screen::Intake => self.handle_intake_key(key),
            Screen::Results => self.handle_results_key(key),
            Screen::Dashboard => self.handle_dashboard_key(key),
        }
    }

    fn handle_signin_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(c) => self.signin_state.input_char(c),
            KeyCode::Backspace => self.signin_state.delete_char(),
            KeyCode::Enter => {
                if let Some(id) = self.signin_state.take_identifier() {
                    self.operator = Some(id);
                    tracing::info!("Session started");
                    self.show_home();
                }
            }
            _ => {}
        }
    }

    fn handle_home_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('n') | KeyCode::Char('N') => self.start_intake(),
            KeyCode::Char('d') | KeyCode::Char('D') => self.show_dashboard(),
            KeyCode::Char('r') | KeyCode::Char('R') => {
                if self.results_state.is_some() {
                    self.screen = Screen::Results;
                }
            }
            KeyCode::Char('l') | KeyCode::Char('L') => {
                self.operator = None;
                self.screen = Screen::SignIn;
                tracing::info!("Session signed out");
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            _ => {}
        }
    }

    fn handle_intake_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.form_state.clear_sensitive();
                self.show_home();
            }
            KeyCode::Up | KeyCode::BackTab => self.form_state.prev_focus(),
            KeyCode::Down | KeyCode::Tab => self.form_state.next_focus(),
            KeyCode::Left => self.form_state.move_left(),
            KeyCode::Right => self.form_state.move_right(),
            KeyCode::F(2) => self.form_state.load_sample_data(),
            KeyCode::Char(c) => self.form_state.input_char(c),
            KeyCode::Backspace => self.form_state.delete_char(),
            KeyCode::Delete => self.form_state.clear_field(),
            KeyCode::Enter => self.submit_intake_form(),
            _ => {}
        }
    }

    fn handle_results_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('s') | KeyCode::Char('S') => {
                if let Some(results) = self.results_state.as_mut() {
                    results.toggle_summary();
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') => self.start_intake(),
            KeyCode::Char('d') | KeyCode::Char('D') => self.show_dashboard(),
            KeyCode::Esc | KeyCode::Enter => self.show_home(),
            _ => {}
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('r') | KeyCode::Char('R') => self.refresh_dashboard(),
            KeyCode::Char('n') | KeyCode::Char('N') => self.start_intake(),
            KeyCode::Esc => self.show_home(),
            _ => {}
        }
    }

    fn start_intake(&mut self) {
        self.form_state.clear_sensitive();
        self.screen = Screen::Intake;
    }

    fn show_home(&mut self) {
        self.refresh_dashboard();
        self.screen = Screen::Home;
    }

    fn show_dashboard(&mut self) {
        self.refresh_dashboard();
        self.screen = Screen::Dashboard;
    }

    fn refresh_dashboard(&mut self) {
        self.dashboard = Some(self.analytics_service.dashboard(&self.session));
    }

    fn submit_intake_form(&mut self) {
        let reading = self.form_state.to_reading();

        match self.intake_service.submit(&mut self.session, reading) {
            Ok(submission) => {
                self.results_state = Some(ResultsState::new(
                    submission.record,
                    submission.store,
                    submission.used_fallback,
                ));

                // Clear plaintext buffers from the UI immediately.
                self.form_state.clear_sensitive();
                self.screen = Screen::Results;
            }
            Err(e) => {
                self.form_state.error_message = Some(e.to_string());
            }
        }
    }
}

/// Open the SQLite store, creating its parent directory if needed.
fn open_sqlite(path: &Path) -> crate::Result<SqliteStore> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(SqliteStore::new(path)?)
}

/// Build the primary and fallback stores for `config`.
fn open_stores(config: &AppConfig) -> (Arc<DynStore>, Option<Arc<MemoryStore>>) {
    match config.storage {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory patient store");
            (Arc::new(MemoryStore::new()), None)
        }
        StorageBackend::Sqlite => match open_sqlite(&config.db_path) {
            Ok(store) => {
                tracing::info!("Opened patient store at {}", config.db_path.display());
                (Arc::new(store), Some(Arc::new(MemoryStore::new())))
            }
            Err(e) => {
                tracing::error!(
                    "Could not open {}, using in-memory store: {}",
                    config.db_path.display(),
                    e
                );
                (Arc::new(MemoryStore::new()), None)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::DataSource;
    use crate::domain::RiskLevel;
    use crate::REQUIRED_FIELDS_MESSAGE;

    fn test_app() -> App {
        let primary: Arc<DynStore> = Arc::new(SqliteStore::in_memory().expect("Should create db"));
        App::with_dependencies(primary, Some(Arc::new(MemoryStore::new())), 100)
    }

    fn press(app: &mut App, key: KeyCode) {
        app.handle_key(key, KeyModifiers::NONE);
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn signed_in_app() -> App {
        let mut app = test_app();
        type_text(&mut app, "asha-042");
        press(&mut app, KeyCode::Enter);
        app
    }

    #[test]
    fn test_signin_requires_identifier() {
        let mut app = test_app();
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen(), Screen::SignIn);

        type_text(&mut app, "asha-042");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen(), Screen::Home);
        assert_eq!(app.operator.as_deref(), Some("asha-042"));
    }

    #[test]
    fn test_submit_flow_reaches_results_and_dashboard() {
        let mut app = signed_in_app();

        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.screen(), Screen::Intake);
        press(&mut app, KeyCode::F(2));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen(), Screen::Results);
        assert_eq!(app.session().len(), 1);
        let results = app.results_state.as_ref().expect("Should have results");
        assert_eq!(results.record.risk_level(), RiskLevel::Medium);
        assert_eq!(results.store, "sqlite");
        assert!(app.form_state.fields.iter().all(|f| f.value.is_empty()));

        press(&mut app, KeyCode::Char('s'));
        assert!(app.results_state.as_ref().is_some_and(|r| r.show_summary));

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.screen(), Screen::Dashboard);
        let dashboard = app.dashboard.as_ref().expect("Should load dashboard");
        assert_eq!(dashboard.source, DataSource::Stored);
        assert_eq!(dashboard.summary.total, 1);
        assert_eq!(dashboard.summary.by_risk.medium, 1);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen(), Screen::Home);
        assert_eq!(app.home_stats().total, 1);
    }

    #[test]
    fn test_incomplete_form_shows_error() {
        let mut app = signed_in_app();
        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "Ravi");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen(), Screen::Intake);
        assert_eq!(app.form_state.error_message.as_deref(), Some(REQUIRED_FIELDS_MESSAGE));
        assert!(app.session().is_empty());
        // Typed values survive a rejected submit.
        assert_eq!(app.form_state.fields[0].value, "Ravi");
    }

    #[test]
    fn test_sign_out_and_quit() {
        let mut app = signed_in_app();
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.screen(), Screen::SignIn);
        assert!(app.operator.is_none());

        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
    }

    #[test]
    fn test_memory_backend_has_no_fallback() {
        let config = AppConfig {
            storage: StorageBackend::Memory,
            ..AppConfig::default()
        };
        let (primary, fallback) = open_stores(&config);
        assert_eq!(primary.name(), "memory");
        assert!(fallback.is_none());
    }

    #[test]
    fn test_sqlite_opens_in_new_directory() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let config = AppConfig {
            db_path: dir.path().join("clinic").join("intake.db"),
            ..AppConfig::default()
        };
        let (primary, fallback) = open_stores(&config);
        assert_eq!(primary.name(), "sqlite");
        assert!(fallback.is_some());
    }

    #[test]
    fn test_unopenable_sqlite_degrades_to_memory() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").expect("Should write file");
        let db_path = blocker.join("sub").join("intake.db");

        let err = open_sqlite(&db_path).err().expect("Should fail to open");
        assert!(matches!(err, crate::IntakeError::Io(_)));

        let config = AppConfig {
            db_path,
            ..AppConfig::default()
        };
        let (primary, fallback) = open_stores(&config);
        assert_eq!(primary.name(), "memory");
        assert!(fallback.is_none());
    }
}
