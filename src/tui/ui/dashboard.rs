//! Dashboard view: grouped counts over patient records.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::application::{Dashboard, DataSource, GroupCounts};
use crate::domain::RiskLevel;
use crate::tui::styles::MedicalTheme;

const BAR_WIDTH: usize = 24;

/// Render the dashboard view.
pub fn render_dashboard(f: &mut Frame, area: Rect, dashboard: Option<&Dashboard>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_header(f, chunks[0], dashboard);

    match dashboard {
        Some(d) if d.summary.total > 0 => render_main_content(f, chunks[1], d),
        _ => render_empty(f, chunks[1]),
    }

    render_footer(f, chunks[2]);
}

fn render_header(f: &mut Frame, area: Rect, dashboard: Option<&Dashboard>) {
    let mut spans = vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Dashboard", MedicalTheme::title()),
    ];

    if let Some(d) = dashboard {
        spans.push(Span::styled(
            format!(" │ {} patients", d.summary.total),
            MedicalTheme::text_secondary(),
        ));
        if d.source == DataSource::Session {
            spans.push(Span::styled(
                " │ store unavailable, showing this session only",
                MedicalTheme::warning(),
            ));
        }
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_empty(f: &mut Frame, area: Rect) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("No patients recorded yet", MedicalTheme::text_muted())),
        Line::from(""),
        Line::from(Span::styled(
            "Press [N] to start an intake",
            MedicalTheme::text_secondary(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(content, area);
}

fn render_main_content(f: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
        ])
        .split(rows[0]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    let summary = &dashboard.summary;

    let risk = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];
    let risk_max = risk.iter().map(|l| summary.by_risk.get(*l)).max().unwrap_or(0);
    let risk_lines: Vec<Line> = risk
        .iter()
        .map(|&level| {
            bar_line(
                level.as_str(),
                summary.by_risk.get(level),
                risk_max,
                MedicalTheme::risk_level(level),
            )
        })
        .collect();
    render_panel(f, top[0], " By Risk ", risk_lines);

    let gender = &summary.by_gender;
    let gender_max = gender.male.max(gender.female);
    render_panel(
        f,
        top[1],
        " By Gender ",
        vec![
            bar_line("Male", gender.male, gender_max, MedicalTheme::info()),
            bar_line("Female", gender.female, gender_max, MedicalTheme::info()),
        ],
    );

    let age = &summary.by_age;
    let age_max = age.child.max(age.adult).max(age.senior);
    render_panel(
        f,
        top[2],
        " By Age ",
        vec![
            bar_line("<18", age.child, age_max, MedicalTheme::success()),
            bar_line("18-60", age.adult, age_max, MedicalTheme::success()),
            bar_line(">60", age.senior, age_max, MedicalTheme::success()),
        ],
    );

    render_panel(f, bottom[0], " By Disease ", group_lines(&summary.by_disease, MedicalTheme::warning()));
    render_panel(f, bottom[1], " By Location ", group_lines(&summary.by_location, MedicalTheme::info()));
}

fn group_lines(groups: &GroupCounts, style: Style) -> Vec<Line<'_>> {
    let max = groups.iter().map(|(_, n)| n).max().unwrap_or(0);
    groups
        .iter()
        .map(|(key, n)| bar_line(key, n, max, style))
        .collect()
}

fn bar_line(label: &str, count: usize, max: usize, style: Style) -> Line<'_> {
    Line::from(vec![
        Span::styled(format!(" {label:<22}"), MedicalTheme::text_secondary()),
        Span::styled(format!("{count:>4} "), MedicalTheme::text()),
        Span::styled(MedicalTheme::bar(count, max, BAR_WIDTH), style),
    ])
}

fn render_panel(f: &mut Frame, area: Rect, title: &str, lines: Vec<Line<'_>>) {
    let block = Block::default()
        .title(Span::styled(title.to_string(), MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_footer(f: &mut Frame, area: Rect) {
    let content = Line::from(vec![
        Span::styled("[R] ", MedicalTheme::key_hint()),
        Span::styled("Refresh ", MedicalTheme::key_desc()),
        Span::styled("[N] ", MedicalTheme::key_hint()),
        Span::styled("New Intake ", MedicalTheme::key_desc()),
        Span::styled("[Esc] ", MedicalTheme::key_hint()),
        Span::styled("Home", MedicalTheme::key_desc()),
    ]);

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}
