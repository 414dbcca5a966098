//! Vital reading types collected by the intake form.
//!
//! Every numeric-looking field is kept as the raw text the operator typed.
//! Interpretation happens in the classifier, which never rejects a reading.

use serde::{Deserialize, Serialize};

/// Biological sex as captured on the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    /// Parse the exact dashboard labels. Anything else is not a recognized gender.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Male" => Some(Self::Male),
            "Female" => Some(Self::Female),
            _ => None,
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }

    /// Flip between the two form options.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Male => Self::Female,
            Self::Female => Self::Male,
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The fixed symptom vocabulary offered by the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symptom {
    Fever,
    Cough,
    Headache,
    Fatigue,
    Nausea,
    Dizziness,
    Chills,
    SoreThroat,
    JointPain,
    Vomiting,
    ChestPain,
    ShortnessOfBreath,
    AbdominalPain,
    Diarrhea,
    LossOfAppetite,
    MusclePain,
    Weakness,
    Sweating,
    Rash,
    RunnyNose,
    Sneezing,
    BackPain,
    Constipation,
    Confusion,
    Swelling,
    Numbness,
    BlurredVision,
    EarPain,
    Anxiety,
    Insomnia,
}

impl Symptom {
    /// All symptoms in form display order.
    pub const ALL: [Symptom; 30] = [
        Self::Fever,
        Self::Cough,
        Self::Headache,
        Self::Fatigue,
        Self::Nausea,
        Self::Dizziness,
        Self::Chills,
        Self::SoreThroat,
        Self::JointPain,
        Self::Vomiting,
        Self::ChestPain,
        Self::ShortnessOfBreath,
        Self::AbdominalPain,
        Self::Diarrhea,
        Self::LossOfAppetite,
        Self::MusclePain,
        Self::Weakness,
        Self::Sweating,
        Self::Rash,
        Self::RunnyNose,
        Self::Sneezing,
        Self::BackPain,
        Self::Constipation,
        Self::Confusion,
        Self::Swelling,
        Self::Numbness,
        Self::BlurredVision,
        Self::EarPain,
        Self::Anxiety,
        Self::Insomnia,
    ];

    /// Display name, as shown on the form and written to the store.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fever => "Fever",
            Self::Cough => "Cough",
            Self::Headache => "Headache",
            Self::Fatigue => "Fatigue",
            Self::Nausea => "Nausea",
            Self::Dizziness => "Dizziness",
            Self::Chills => "Chills",
            Self::SoreThroat => "Sore Throat",
            Self::JointPain => "Joint Pain",
            Self::Vomiting => "Vomiting",
            Self::ChestPain => "Chest Pain",
            Self::ShortnessOfBreath => "Shortness of Breath",
            Self::AbdominalPain => "Abdominal Pain",
            Self::Diarrhea => "Diarrhea",
            Self::LossOfAppetite => "Loss of Appetite",
            Self::MusclePain => "Muscle Pain",
            Self::Weakness => "Weakness",
            Self::Sweating => "Sweating",
            Self::Rash => "Rash",
            Self::RunnyNose => "Runny Nose",
            Self::Sneezing => "Sneezing",
            Self::BackPain => "Back Pain",
            Self::Constipation => "Constipation",
            Self::Confusion => "Confusion",
            Self::Swelling => "Swelling",
            Self::Numbness => "Numbness",
            Self::BlurredVision => "Blurred Vision",
            Self::EarPain => "Ear Pain",
            Self::Anxiety => "Anxiety",
            Self::Insomnia => "Insomnia",
        }
    }

    /// Look up a symptom by its exact display name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.name() == name)
    }
}

impl std::fmt::Display for Symptom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Selected symptoms, in the order they were ticked.
///
/// Membership is toggled, never appended, so a symptom appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct SymptomSet {
    selected: Vec<Symptom>,
}

impl SymptomSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the symptom if absent, remove it if present.
    pub fn toggle(&mut self, symptom: Symptom) {
        if let Some(pos) = self.selected.iter().position(|s| *s == symptom) {
            self.selected.remove(pos);
        } else {
            self.selected.push(symptom);
        }
    }

    #[must_use]
    pub fn contains(&self, symptom: Symptom) -> bool {
        self.selected.contains(&symptom)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Symptom> + '_ {
        self.selected.iter().copied()
    }

    /// Display names joined with `", "`.
    #[must_use]
    pub fn joined(&self) -> String {
        self.selected
            .iter()
            .map(Symptom::name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.selected.iter().map(|s| s.name().to_string()).collect()
    }
}

impl FromIterator<Symptom> for SymptomSet {
    fn from_iter<I: IntoIterator<Item = Symptom>>(iter: I) -> Self {
        let mut set = Self::new();
        for symptom in iter {
            if !set.contains(symptom) {
                set.selected.push(symptom);
            }
        }
        set
    }
}

impl TryFrom<Vec<String>> for SymptomSet {
    type Error = String;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        names
            .iter()
            .map(|n| Symptom::from_name(n).ok_or_else(|| format!("Unknown symptom: {n}")))
            .collect::<Result<Vec<_>, _>>()
            .map(|list| list.into_iter().collect())
    }
}

impl From<SymptomSet> for Vec<String> {
    fn from(set: SymptomSet) -> Self {
        set.names()
    }
}

/// One intake form submission, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalReading {
    pub full_name: String,
    pub age: String,
    pub gender: Gender,
    /// Free text, optionally "City, State".
    pub location: String,
    pub weight: String,
    pub height: String,
    pub blood_pressure_sys: String,
    pub blood_pressure_dia: String,
    /// Body temperature in °F.
    pub temperature: String,
    /// Oxygen saturation in %.
    pub oxygen: String,
    /// Pulse in bpm.
    pub heart_rate: String,
    pub symptoms: SymptomSet,
}

impl VitalReading {
    /// Names of required fields that are still empty.
    ///
    /// Name, age and location must be filled before a submission is accepted.
    #[must_use]
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.full_name.trim().is_empty() {
            missing.push("Name");
        }
        if self.age.trim().is_empty() {
            missing.push("Age");
        }
        if self.location.trim().is_empty() {
            missing.push("Location");
        }
        missing
    }

    /// Blood pressure as `"sys/dia"`.
    #[must_use]
    pub fn blood_pressure(&self) -> String {
        format!("{}/{}", self.blood_pressure_sys, self.blood_pressure_dia)
    }

    /// Split `"City, State"` into its parts.
    ///
    /// Either part falls back to the whole location text when missing.
    #[must_use]
    pub fn city_and_state(&self) -> (String, String) {
        let mut parts = self.location.split(',').map(str::trim);
        let city = parts.next().filter(|s| !s.is_empty());
        let state = parts.next().filter(|s| !s.is_empty());
        (
            city.unwrap_or(self.location.as_str()).to_string(),
            state.unwrap_or(self.location.as_str()).to_string(),
        )
    }
}

/// Parse the longest numeric prefix of `raw` as a float.
///
/// Leading whitespace is skipped and trailing garbage ignored, so `"101.5F"`
/// reads as `101.5`. Returns `None` when no digits lead the text.
#[must_use]
pub fn leading_float(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    if s[end..].starts_with("Infinity") {
        return Some(if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if digits > 0 || j > frac_start {
            digits += j - frac_start;
            end = j;
        }
    }
    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut j = end + 1;
        if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            end = j;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// Parse the leading base-10 integer of `raw` (`"45.7"` reads as `45`).
#[must_use]
pub fn leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    s[..end].parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symptom_vocabulary() {
        assert_eq!(Symptom::ALL.len(), 30);
        for symptom in Symptom::ALL {
            assert_eq!(Symptom::from_name(symptom.name()), Some(symptom));
        }
        assert_eq!(Symptom::from_name("Shortness of Breath"), Some(Symptom::ShortnessOfBreath));
        assert_eq!(Symptom::from_name("fever"), None);
    }

    #[test]
    fn test_symptom_toggle_never_duplicates() {
        let mut set = SymptomSet::new();
        set.toggle(Symptom::Cough);
        set.toggle(Symptom::Fever);
        assert_eq!(set.joined(), "Cough, Fever");

        set.toggle(Symptom::Cough);
        assert_eq!(set.len(), 1);
        assert!(!set.contains(Symptom::Cough));

        let collected: SymptomSet = [Symptom::Rash, Symptom::Rash, Symptom::Chills]
            .into_iter()
            .collect();
        assert_eq!(collected.len(), 2);
    }

    #[test]
    fn test_symptom_set_serde() {
        let set: SymptomSet = [Symptom::SoreThroat, Symptom::Fever].into_iter().collect();
        let json = serde_json::to_string(&set).expect("Should serialize");
        assert_eq!(json, r#"["Sore Throat","Fever"]"#);

        let back: SymptomSet = serde_json::from_str(&json).expect("Should deserialize");
        assert_eq!(back, set);

        let bad: Result<SymptomSet, _> = serde_json::from_str(r#"["Hiccups"]"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_leading_float() {
        assert_eq!(leading_float("101.5"), Some(101.5));
        assert_eq!(leading_float("  99F"), Some(99.0));
        assert_eq!(leading_float(".5"), Some(0.5));
        assert_eq!(leading_float("1e2x"), Some(100.0));
        assert_eq!(leading_float("-3"), Some(-3.0));
        assert_eq!(leading_float(""), None);
        assert_eq!(leading_float("abc"), None);
        assert_eq!(leading_float("."), None);
        assert_eq!(leading_float("Infinity"), Some(f64::INFINITY));
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int("45"), Some(45));
        assert_eq!(leading_int("45.9"), Some(45));
        assert_eq!(leading_int(" 12abc"), Some(12));
        assert_eq!(leading_int("abc"), None);
        assert_eq!(leading_int(""), None);
        assert_eq!(leading_int("-"), None);
    }

    #[test]
    fn test_missing_required() {
        let mut reading = VitalReading::default();
        assert_eq!(reading.missing_required(), vec!["Name", "Age", "Location"]);

        reading.full_name = "Asha".into();
        reading.age = "30".into();
        reading.location = "Pune".into();
        assert!(reading.missing_required().is_empty());
    }

    #[test]
    fn test_city_and_state() {
        let mut reading = VitalReading {
            location: "Mumbai, Maharashtra".into(),
            ..Default::default()
        };
        assert_eq!(
            reading.city_and_state(),
            ("Mumbai".to_string(), "Maharashtra".to_string())
        );

        reading.location = "Delhi".into();
        assert_eq!(reading.city_and_state(), ("Delhi".to_string(), "Delhi".to_string()));
    }

    #[test]
    fn test_gender_labels() {
        assert_eq!(Gender::from_label("Female"), Some(Gender::Female));
        assert_eq!(Gender::from_label("female"), None);
        assert_eq!(Gender::Male.toggled(), Gender::Female);
    }
}
