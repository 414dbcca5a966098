//! Results view: triage outcome for the record just submitted.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::domain::{ClassifiedRecord, NormalizedVitals, RiskLevel};
use crate::tui::styles::MedicalTheme;

/// Results state
#[derive(Debug, Clone)]
pub struct ResultsState {
    pub record: ClassifiedRecord,
    /// Store that accepted the row
    pub store: &'static str,
    pub used_fallback: bool,
    pub show_summary: bool,
}

impl ResultsState {
    #[must_use]
    pub fn new(record: ClassifiedRecord, store: &'static str, used_fallback: bool) -> Self {
        Self {
            record,
            store,
            used_fallback,
            show_summary: false,
        }
    }

    pub fn toggle_summary(&mut self) {
        self.show_summary = !self.show_summary;
    }
}

/// Render the results view
pub fn render_results(f: &mut Frame, area: Rect, state: &ResultsState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_results_header(f, chunks[0], state);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    render_assessment(f, columns[0], &state.record);
    if state.show_summary {
        render_share_summary(f, columns[1], &state.record);
    } else {
        render_recommendations(f, columns[1], &state.record);
    }

    render_results_footer(f, chunks[2], state);
}

fn render_results_header(f: &mut Frame, area: Rect, state: &ResultsState) {
    let mut spans = vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Assessment", MedicalTheme::title()),
        Span::styled(
            format!(" │ {}", state.record.reading().full_name),
            MedicalTheme::text_secondary(),
        ),
    ];
    if state.used_fallback {
        spans.push(Span::styled(
            format!(" │ saved to {} fallback", state.store),
            MedicalTheme::warning(),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_assessment(f: &mut Frame, area: Rect, record: &ClassifiedRecord) {
    let assessment = record.assessment();
    let level = assessment.risk_level;
    let risk_style = MedicalTheme::risk_level(level);

    let block = Block::default()
        .title(Span::styled(" Risk Assessment ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(risk_style);

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Risk level
            Constraint::Length(3), // Confidence
            Constraint::Min(0),    // Vitals & symptoms
        ])
        .margin(1)
        .split(inner);

    let icon = match level {
        RiskLevel::Low => "OK",
        RiskLevel::Medium | RiskLevel::High => "!",
    };

    let risk_display = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("{icon} {level} RISK"),
            risk_style.add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(level.description(), MedicalTheme::text_secondary())),
    ])
    .alignment(Alignment::Center);
    f.render_widget(risk_display, chunks[0]);

    let confidence = level.display_confidence();
    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(Span::styled(
                    format!(" {} ", assessment.disease),
                    MedicalTheme::text_secondary(),
                ))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .gauge_style(risk_style)
        .percent(u16::from(confidence))
        .label(format!("{confidence}% confidence"));
    f.render_widget(gauge, chunks[1]);

    let reading = record.reading();
    let vitals = NormalizedVitals::from_reading(reading);
    let row = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label:<14}"), MedicalTheme::text_secondary()),
            Span::styled(value, MedicalTheme::text()),
        ])
    };

    let symptoms = if reading.symptoms.is_empty() {
        "none reported".to_string()
    } else {
        reading.symptoms.joined()
    };

    let details = Paragraph::new(vec![
        row("Temperature", format!("{:.1} °F", vitals.temperature)),
        row("Oxygen", format!("{:.0} %", vitals.oxygen)),
        row("Heart Rate", format!("{:.0} bpm", vitals.heart_rate)),
        row("Blood Pressure", reading.blood_pressure()),
        row("Age / Gender", format!("{} / {}", reading.age, reading.gender)),
        row("Location", reading.location.clone()),
        Line::from(""),
        row("Symptoms", format!("{} selected", vitals.symptom_count)),
        Line::from(Span::styled(symptoms, MedicalTheme::text())),
    ])
    .wrap(Wrap { trim: true });
    f.render_widget(details, chunks[2]);
}

fn render_recommendations(f: &mut Frame, area: Rect, record: &ClassifiedRecord) {
    let assessment = record.assessment();
    let style = MedicalTheme::risk_level(assessment.risk_level);

    let lines: Vec<Line> = assessment
        .recommendations
        .iter()
        .enumerate()
        .flat_map(|(i, rec)| {
            [
                Line::from(vec![
                    Span::styled(format!("{}. ", i + 1), style),
                    Span::styled(rec.clone(), MedicalTheme::text()),
                ]),
                Line::from(""),
            ]
        })
        .collect();

    let block = Block::default()
        .title(Span::styled(" Recommendations ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), area);
}

fn render_share_summary(f: &mut Frame, area: Rect, record: &ClassifiedRecord) {
    let lines: Vec<Line> = record
        .share_summary()
        .lines()
        .map(|l| Line::from(Span::styled(l.to_string(), MedicalTheme::text())))
        .collect();

    let block = Block::default()
        .title(Span::styled(" Share Summary ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border_focused());

    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

fn render_results_footer(f: &mut Frame, area: Rect, state: &ResultsState) {
    let summary_label = if state.show_summary {
        "Recommendations "
    } else {
        "Share Summary "
    };

    let content = Line::from(vec![
        Span::styled("[S] ", MedicalTheme::key_hint()),
        Span::styled(summary_label, MedicalTheme::key_desc()),
        Span::styled("[N] ", MedicalTheme::key_hint()),
        Span::styled("New Intake ", MedicalTheme::key_desc()),
        Span::styled("[D] ", MedicalTheme::key_hint()),
        Span::styled("Dashboard ", MedicalTheme::key_desc()),
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
