//! Home view: headline numbers, this session's submissions, actions.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::application::HomeStats;
use crate::domain::ClassifiedRecord;
use crate::tui::styles::{MedicalTheme, APP_NAME};

const RECENT_LIMIT: usize = 8;

pub fn render_home(
    f: &mut Frame,
    area: Rect,
    operator: &str,
    stats: HomeStats,
    session: &[ClassifiedRecord],
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
        ])
        .split(area);

    render_header(f, chunks[0], operator);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);

    render_status_panels(f, columns[0], stats);
    render_session(f, columns[1], session);
}

fn render_header(f: &mut Frame, area: Rect, operator: &str) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled(APP_NAME, MedicalTheme::title()),
        Span::styled(" │ ", MedicalTheme::text_muted()),
        Span::styled("Patient Intake & Triage", MedicalTheme::text_secondary()),
        Span::styled(" │ ", MedicalTheme::text_muted()),
        Span::styled(format!(" {operator} "), MedicalTheme::header()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_status_panels(f: &mut Frame, area: Rect, stats: HomeStats) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Stats
            Constraint::Min(0),    // Quick actions
        ])
        .margin(1)
        .split(area);

    let stat = |label: &'static str, value: usize, style| {
        Line::from(vec![
            Span::styled(format!("  {label:<16}"), MedicalTheme::text_secondary()),
            Span::styled(value.to_string(), style),
        ])
    };

    let stats_block = Block::default()
        .title(Span::styled(" Patients ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    let stats_list = Paragraph::new(vec![
        stat("Total", stats.total, MedicalTheme::text()),
        stat("High risk", stats.high_risk, MedicalTheme::danger()),
        stat("Today", stats.today, MedicalTheme::info()),
    ])
    .block(stats_block);
    f.render_widget(stats_list, chunks[0]);

    let action = |key: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(key, MedicalTheme::key_hint()),
            Span::styled(desc, MedicalTheme::key_desc()),
        ])
    };

    let actions = vec![
        action("[N] ", "New Intake"),
        action("[D] ", "Dashboard"),
        action("[R] ", "Last Result"),
        action("[L] ", "Sign Out"),
        action("[Q] ", "Quit"),
    ];

    let actions_block = Block::default()
        .title(Span::styled(" Quick Actions ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    f.render_widget(Paragraph::new(actions).block(actions_block), chunks[1]);
}

fn render_session(f: &mut Frame, area: Rect, session: &[ClassifiedRecord]) {
    let block = Block::default()
        .title(Span::styled(" This Session ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    if session.is_empty() {
        let empty_msg = Paragraph::new(Line::from(vec![Span::styled(
            "No patients yet. Press [N] to start.",
            MedicalTheme::text_muted(),
        )]))
        .block(block);
        f.render_widget(empty_msg, area);
        return;
    }

    let lines: Vec<Line> = session
        .iter()
        .rev()
        .take(RECENT_LIMIT)
        .map(|record| {
            let level = record.risk_level();
            Line::from(vec![
                Span::styled(
                    record
                        .submitted_at()
                        .with_timezone(&Local)
                        .format("%H:%M ")
                        .to_string(),
                    MedicalTheme::text_muted(),
                ),
                Span::styled(format!("{:<7}", level.to_string()), MedicalTheme::risk_level(level)),
                Span::styled(
                    format!("{:<22}", record.reading().full_name),
                    MedicalTheme::text(),
                ),
                Span::styled(record.disease(), MedicalTheme::text_secondary()),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), area);
}
