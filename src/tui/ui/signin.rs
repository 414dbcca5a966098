//! Sign-in view: labels the session with a health-worker identifier.
//!
//! Any non-empty identifier is accepted. Nothing is checked against a
//! credential store and the screen says so.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::tui::styles::{MedicalTheme, APP_NAME};

#[derive(Debug, Default)]
pub struct SignInState {
    pub identifier: String,
    pub error_message: Option<String>,
}

impl SignInState {
    pub fn input_char(&mut self, c: char) {
        if !c.is_control() {
            self.identifier.push(c);
            self.error_message = None;
        }
    }

    pub fn delete_char(&mut self) {
        self.identifier.pop();
    }

    /// Take the trimmed identifier, wiping the input buffer.
    ///
    /// Returns `None` and sets an error if the identifier is blank.
    pub fn take_identifier(&mut self) -> Option<String> {
        let id = self.identifier.trim().to_string();
        self.identifier.zeroize();

        if id.is_empty() {
            self.error_message = Some("Enter your health worker ID".to_string());
            None
        } else {
            self.error_message = None;
            Some(id)
        }
    }
}

pub fn render_signin(f: &mut Frame, area: Rect, state: &SignInState) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Length(12),
            Constraint::Min(0),
        ])
        .split(area);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(50),
            Constraint::Percentage(25),
        ])
        .split(outer[1]);

    let block = Block::default()
        .title(Span::styled(format!(" {APP_NAME} "), MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border_focused());

    let status = match &state.error_message {
        Some(err) => Line::from(Span::styled(format!("! {err}"), MedicalTheme::danger())),
        None => Line::from(""),
    };

    let lines = vec![
        Line::from(Span::styled("Patient Intake & Triage", MedicalTheme::title())),
        Line::from(""),
        Line::from(Span::styled("Health Worker ID", MedicalTheme::text_secondary())),
        Line::from(vec![
            Span::styled(state.identifier.as_str(), MedicalTheme::text()),
            Span::styled("▌", MedicalTheme::cursor()),
        ]),
        Line::from(""),
        status,
        Line::from(Span::styled(
            "Session label only. This is not authentication.",
            MedicalTheme::warning(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Sign in ", MedicalTheme::key_desc()),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Quit", MedicalTheme::key_desc()),
        ]),
    ];

    let p = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(block);
    f.render_widget(p, middle[1]);
}
