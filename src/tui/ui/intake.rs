//! Intake form: patient details, vitals and symptom checklist.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::{Gender, Symptom, SymptomSet, VitalReading};
use crate::tui::styles::MedicalTheme;

pub const FULL_NAME: usize = 0;
pub const AGE: usize = 1;
pub const LOCATION: usize = 2;
pub const WEIGHT: usize = 3;
pub const HEIGHT: usize = 4;
pub const BP_SYSTOLIC: usize = 5;
pub const BP_DIASTOLIC: usize = 6;
pub const TEMPERATURE: usize = 7;
pub const OXYGEN: usize = 8;
pub const HEART_RATE: usize = 9;

const SYMPTOM_COLUMNS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Digits, `.` and `-` only
    Numeric,
}

/// Form field definition
#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub hint: &'static str,
    pub kind: FieldKind,
    pub value: String,
}

impl FormField {
    fn new(label: &'static str, hint: &'static str, kind: FieldKind) -> Self {
        Self {
            label,
            hint,
            kind,
            value: String::new(),
        }
    }
}

/// What the cursor is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Field(usize),
    Gender,
    Symptoms,
}

const FOCUS_ORDER: [Focus; 12] = [
    Focus::Field(FULL_NAME),
    Focus::Field(AGE),
    Focus::Gender,
    Focus::Field(LOCATION),
    Focus::Field(WEIGHT),
    Focus::Field(HEIGHT),
    Focus::Field(BP_SYSTOLIC),
    Focus::Field(BP_DIASTOLIC),
    Focus::Field(TEMPERATURE),
    Focus::Field(OXYGEN),
    Focus::Field(HEART_RATE),
    Focus::Symptoms,
];

/// Intake form state
pub struct IntakeFormState {
    pub fields: Vec<FormField>,
    pub gender: Gender,
    pub symptoms: SymptomSet,
    focus_index: usize,
    pub symptom_cursor: usize,
    pub error_message: Option<String>,
}

impl Default for IntakeFormState {
    fn default() -> Self {
        Self {
            fields: vec![
                FormField::new("Full Name", "required", FieldKind::Text),
                FormField::new("Age", "years, required", FieldKind::Numeric),
                FormField::new("Location", "City, State (required)", FieldKind::Text),
                FormField::new("Weight", "kg", FieldKind::Numeric),
                FormField::new("Height", "cm", FieldKind::Numeric),
                FormField::new("BP Systolic", "mmHg", FieldKind::Numeric),
                FormField::new("BP Diastolic", "mmHg", FieldKind::Numeric),
                FormField::new("Temperature", "°F (default 98.6)", FieldKind::Numeric),
                FormField::new("Oxygen", "% SpO2 (default 98)", FieldKind::Numeric),
                FormField::new("Heart Rate", "bpm (default 70)", FieldKind::Numeric),
            ],
            gender: Gender::default(),
            symptoms: SymptomSet::new(),
            focus_index: 0,
            symptom_cursor: 0,
            error_message: None,
        }
    }
}

impl IntakeFormState {
    #[must_use]
    pub fn focus(&self) -> Focus {
        FOCUS_ORDER[self.focus_index]
    }

    pub fn next_focus(&mut self) {
        self.focus_index = (self.focus_index + 1) % FOCUS_ORDER.len();
    }

    pub fn prev_focus(&mut self) {
        if self.focus_index == 0 {
            self.focus_index = FOCUS_ORDER.len() - 1;
        } else {
            self.focus_index -= 1;
        }
    }

    /// Type into the focused field. Space toggles the gender or the
    /// symptom under the cursor.
    pub fn input_char(&mut self, c: char) {
        match self.focus() {
            Focus::Field(i) => {
                let field = &mut self.fields[i];
                let accepted = match field.kind {
                    FieldKind::Text => !c.is_control(),
                    FieldKind::Numeric => c.is_ascii_digit() || c == '.' || c == '-',
                };
                if accepted {
                    field.value.push(c);
                    self.error_message = None;
                }
            }
            Focus::Gender if c == ' ' => self.gender = self.gender.toggled(),
            Focus::Symptoms if c == ' ' => self.toggle_current_symptom(),
            _ => {}
        }
    }

    pub fn delete_char(&mut self) {
        if let Focus::Field(i) = self.focus() {
            self.fields[i].value.pop();
        }
    }

    pub fn clear_field(&mut self) {
        if let Focus::Field(i) = self.focus() {
            self.fields[i].value.zeroize();
        }
    }

    pub fn move_left(&mut self) {
        match self.focus() {
            Focus::Gender => self.gender = self.gender.toggled(),
            Focus::Symptoms => {
                self.symptom_cursor =
                    (self.symptom_cursor + Symptom::ALL.len() - 1) % Symptom::ALL.len();
            }
            Focus::Field(_) => {}
        }
    }

    pub fn move_right(&mut self) {
        match self.focus() {
            Focus::Gender => self.gender = self.gender.toggled(),
            Focus::Symptoms => {
                self.symptom_cursor = (self.symptom_cursor + 1) % Symptom::ALL.len();
            }
            Focus::Field(_) => {}
        }
    }

    fn toggle_current_symptom(&mut self) {
        self.symptoms.toggle(Symptom::ALL[self.symptom_cursor]);
    }

    /// Snapshot the form as a reading.
    #[must_use]
    pub fn to_reading(&self) -> VitalReading {
        let value = |i: usize| self.fields[i].value.clone();
        VitalReading {
            full_name: value(FULL_NAME),
            age: value(AGE),
            gender: self.gender,
            location: value(LOCATION),
            weight: value(WEIGHT),
            height: value(HEIGHT),
            blood_pressure_sys: value(BP_SYSTOLIC),
            blood_pressure_dia: value(BP_DIASTOLIC),
            temperature: value(TEMPERATURE),
            oxygen: value(OXYGEN),
            heart_rate: value(HEART_RATE),
            symptoms: self.symptoms.clone(),
        }
    }

    /// Wipe all field buffers and reset the form.
    ///
    /// Called right after a successful submit so typed patient details do
    /// not stay in UI state.
    pub fn clear_sensitive(&mut self) {
        for field in self.fields.iter_mut() {
            field.value.zeroize();
        }
        self.gender = Gender::default();
        self.symptoms = SymptomSet::new();
        self.focus_index = 0;
        self.symptom_cursor = 0;
        self.error_message = None;
    }

    /// Load a febrile sample patient for demos.
    pub fn load_sample_data(&mut self) {
        let sample = [
            (FULL_NAME, "Ravi Kumar"),
            (AGE, "34"),
            (LOCATION, "Mumbai, Maharashtra"),
            (WEIGHT, "68"),
            (HEIGHT, "172"),
            (BP_SYSTOLIC, "124"),
            (BP_DIASTOLIC, "82"),
            (TEMPERATURE, "101.4"),
            (OXYGEN, "96"),
            (HEART_RATE, "88"),
        ];
        for (i, val) in sample {
            self.fields[i].value = val.to_string();
        }
        self.gender = Gender::Male;
        self.symptoms = [Symptom::Fever, Symptom::Cough, Symptom::Headache]
            .into_iter()
            .collect();
    }
}

/// Render the intake form
pub fn render_intake_form(f: &mut Frame, area: Rect, state: &IntakeFormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);

    render_details(f, columns[0], state);
    render_symptoms(f, columns[1], state);
    render_form_footer(f, chunks[2], state);
}

fn render_form_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("New Patient Intake", MedicalTheme::title()),
        Span::styled(" │ Details, Vitals, Symptoms", MedicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn field_line<'a>(field: &'a FormField, focused: bool) -> Line<'a> {
    let label_style = if focused {
        MedicalTheme::focused()
    } else {
        MedicalTheme::text_secondary()
    };

    let value = if field.value.is_empty() && !focused {
        Span::styled(field.hint, MedicalTheme::text_muted())
    } else {
        Span::styled(field.value.as_str(), MedicalTheme::text())
    };

    let mut spans = vec![
        Span::styled(if focused { "> " } else { "  " }, MedicalTheme::focused()),
        Span::styled(format!("{:<13}", field.label), label_style),
        value,
    ];
    if focused {
        spans.push(Span::styled("▌", MedicalTheme::cursor()));
    }
    Line::from(spans)
}

fn gender_line(gender: Gender, focused: bool) -> Line<'static> {
    let label_style = if focused {
        MedicalTheme::focused()
    } else {
        MedicalTheme::text_secondary()
    };

    let option = |g: Gender| {
        let style = if g == gender {
            MedicalTheme::selected()
        } else {
            MedicalTheme::text_muted()
        };
        Span::styled(format!(" {} ", g.label()), style)
    };

    Line::from(vec![
        Span::styled(if focused { "> " } else { "  " }, MedicalTheme::focused()),
        Span::styled(format!("{:<13}", "Gender"), label_style),
        option(Gender::Male),
        Span::raw(" "),
        option(Gender::Female),
    ])
}

fn render_details(f: &mut Frame, area: Rect, state: &IntakeFormState) {
    let focus = state.focus();
    let mut lines = vec![Line::from(Span::styled(
        "Personal Information",
        MedicalTheme::subtitle(),
    ))];

    for target in FOCUS_ORDER {
        match target {
            Focus::Field(i) => {
                if i == WEIGHT {
                    lines.push(Line::from(""));
                    lines.push(Line::from(Span::styled("Vital Signs", MedicalTheme::subtitle())));
                }
                lines.push(field_line(&state.fields[i], focus == target));
            }
            Focus::Gender => lines.push(gender_line(state.gender, focus == target)),
            Focus::Symptoms => {}
        }
    }

    let block = Block::default()
        .title(Span::styled(" Patient ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(if matches!(focus, Focus::Symptoms) {
            MedicalTheme::border()
        } else {
            MedicalTheme::border_focused()
        });

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_symptoms(f: &mut Frame, area: Rect, state: &IntakeFormState) {
    let focused = state.focus() == Focus::Symptoms;

    let block = Block::default()
        .title(Span::styled(
            format!(" Symptoms ({} selected) ", state.symptoms.len()),
            MedicalTheme::subtitle(),
        ))
        .borders(Borders::ALL)
        .border_style(if focused {
            MedicalTheme::border_focused()
        } else {
            MedicalTheme::border()
        });

    let lines: Vec<Line> = Symptom::ALL
        .chunks(SYMPTOM_COLUMNS)
        .enumerate()
        .map(|(row, symptoms)| {
            let spans: Vec<Span> = symptoms
                .iter()
                .enumerate()
                .map(|(col, symptom)| {
                    let index = row * SYMPTOM_COLUMNS + col;
                    let checked = state.symptoms.contains(*symptom);
                    let mark = if checked { "[x]" } else { "[ ]" };
                    let style = if focused && index == state.symptom_cursor {
                        MedicalTheme::focused()
                    } else if checked {
                        MedicalTheme::selected()
                    } else {
                        MedicalTheme::text()
                    };
                    Span::styled(format!("{mark} {:<20}", symptom.name()), style)
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &IntakeFormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", MedicalTheme::danger()),
            Span::styled(err.as_str(), MedicalTheme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓/Tab] ", MedicalTheme::key_hint()),
            Span::styled("Field ", MedicalTheme::key_desc()),
            Span::styled("[←→ Space] ", MedicalTheme::key_hint()),
            Span::styled("Select ", MedicalTheme::key_desc()),
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Submit ", MedicalTheme::key_desc()),
            Span::styled("[F2] ", MedicalTheme::key_hint()),
            Span::styled("Sample ", MedicalTheme::key_desc()),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Cancel", MedicalTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn focus_on(state: &mut IntakeFormState, target: Focus) {
        while state.focus() != target {
            state.next_focus();
        }
    }

    #[test]
    fn test_numeric_fields_filter_input() {
        let mut state = IntakeFormState::default();
        focus_on(&mut state, Focus::Field(TEMPERATURE));
        for c in "10a1.5F".chars() {
            state.input_char(c);
        }
        assert_eq!(state.fields[TEMPERATURE].value, "101.5");

        focus_on(&mut state, Focus::Field(LOCATION));
        for c in "Pune, MH".chars() {
            state.input_char(c);
        }
        assert_eq!(state.fields[LOCATION].value, "Pune, MH");
    }

    #[test]
    fn test_symptom_toggle_and_cursor_wrap() {
        let mut state = IntakeFormState::default();
        focus_on(&mut state, Focus::Symptoms);

        state.input_char(' ');
        assert!(state.symptoms.contains(Symptom::Fever));
        state.input_char(' ');
        assert!(state.symptoms.is_empty());

        state.move_left();
        assert_eq!(state.symptom_cursor, Symptom::ALL.len() - 1);
        state.input_char(' ');
        assert!(state.symptoms.contains(Symptom::Insomnia));
        state.move_right();
        assert_eq!(state.symptom_cursor, 0);
    }

    #[test]
    fn test_gender_toggle() {
        let mut state = IntakeFormState::default();
        focus_on(&mut state, Focus::Gender);
        state.move_right();
        assert_eq!(state.gender, Gender::Female);
        state.input_char(' ');
        assert_eq!(state.gender, Gender::Male);
    }

    #[test]
    fn test_focus_wraps_backwards() {
        let mut state = IntakeFormState::default();
        state.prev_focus();
        assert_eq!(state.focus(), Focus::Symptoms);
        state.next_focus();
        assert_eq!(state.focus(), Focus::Field(FULL_NAME));
    }

    #[test]
    fn test_to_reading_and_clear() {
        let mut state = IntakeFormState::default();
        state.load_sample_data();

        let reading = state.to_reading();
        assert_eq!(reading.full_name, "Ravi Kumar");
        assert_eq!(reading.blood_pressure(), "124/82");
        assert_eq!(reading.symptoms.len(), 3);
        assert!(reading.missing_required().is_empty());

        state.clear_sensitive();
        assert!(state.fields.iter().all(|f| f.value.is_empty()));
        assert!(state.symptoms.is_empty());
        assert_eq!(state.focus(), Focus::Field(FULL_NAME));
    }
}
