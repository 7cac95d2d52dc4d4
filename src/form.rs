// src/form.rs
use std::borrow::Cow;
use std::str::FromStr;

use crate::errors::{PredictError, Result};

/// A categorical input with a closed set of wire values.
pub trait Choice: Sized + Copy + PartialEq + 'static {
    const ALL: &'static [Self];

    /// The exact string the prediction service expects.
    fn as_str(&self) -> &'static str;

    /// Human readable option text.
    fn label(&self) -> &'static str;

    fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sex {
    #[default]
    Male,
    Female,
}

impl Choice for Sex {
    const ALL: &'static [Self] = &[Sex::Male, Sex::Female];

    fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChestPainType {
    #[default]
    AtypicalAngina,
    NonAnginalPain,
    Asymptomatic,
    TypicalAngina,
}

impl Choice for ChestPainType {
    const ALL: &'static [Self] = &[
        ChestPainType::AtypicalAngina,
        ChestPainType::NonAnginalPain,
        ChestPainType::Asymptomatic,
        ChestPainType::TypicalAngina,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            ChestPainType::AtypicalAngina => "ATA",
            ChestPainType::NonAnginalPain => "NAP",
            ChestPainType::Asymptomatic => "ASY",
            ChestPainType::TypicalAngina => "TA",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ChestPainType::AtypicalAngina => "Atypical Angina (ATA)",
            ChestPainType::NonAnginalPain => "Non-Anginal Pain (NAP)",
            ChestPainType::Asymptomatic => "Asymptomatic (ASY)",
            ChestPainType::TypicalAngina => "Typical Angina (TA)",
        }
    }
}

/// Fasting blood sugar above 120 mg/dl. Sent to the service as an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FastingBs {
    #[default]
    No,
    Yes,
}

impl FastingBs {
    pub fn as_i64(&self) -> i64 {
        match self {
            FastingBs::No => 0,
            FastingBs::Yes => 1,
        }
    }
}

impl Choice for FastingBs {
    const ALL: &'static [Self] = &[FastingBs::No, FastingBs::Yes];

    fn as_str(&self) -> &'static str {
        match self {
            FastingBs::No => "0",
            FastingBs::Yes => "1",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            FastingBs::No => "No (0)",
            FastingBs::Yes => "Yes (1)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestingEcg {
    #[default]
    Normal,
    StTWaveAbnormality,
    LeftVentricularHypertrophy,
}

impl Choice for RestingEcg {
    const ALL: &'static [Self] = &[
        RestingEcg::Normal,
        RestingEcg::StTWaveAbnormality,
        RestingEcg::LeftVentricularHypertrophy,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            RestingEcg::Normal => "Normal",
            RestingEcg::StTWaveAbnormality => "ST",
            RestingEcg::LeftVentricularHypertrophy => "LVH",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            RestingEcg::Normal => "Normal",
            RestingEcg::StTWaveAbnormality => "ST-T Wave Abnormality",
            RestingEcg::LeftVentricularHypertrophy => "Left Ventricular Hypertrophy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExerciseAngina {
    #[default]
    No,
    Yes,
}

impl Choice for ExerciseAngina {
    const ALL: &'static [Self] = &[ExerciseAngina::No, ExerciseAngina::Yes];

    fn as_str(&self) -> &'static str {
        match self {
            ExerciseAngina::No => "N",
            ExerciseAngina::Yes => "Y",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ExerciseAngina::No => "No",
            ExerciseAngina::Yes => "Yes",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StSlope {
    #[default]
    Up,
    Flat,
    Down,
}

impl Choice for StSlope {
    const ALL: &'static [Self] = &[StSlope::Up, StSlope::Flat, StSlope::Down];

    fn as_str(&self) -> &'static str {
        match self {
            StSlope::Up => "Up",
            StSlope::Flat => "Flat",
            StSlope::Down => "Down",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            StSlope::Up => "Upsloping",
            StSlope::Flat => "Flat",
            StSlope::Down => "Downsloping",
        }
    }
}

/// The eleven clinical inputs, in the order they are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Age,
    Sex,
    ChestPainType,
    RestingBp,
    Cholesterol,
    FastingBs,
    RestingEcg,
    MaxHr,
    ExerciseAngina,
    Oldpeak,
    StSlope,
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::Age,
        Field::Sex,
        Field::ChestPainType,
        Field::RestingBp,
        Field::Cholesterol,
        Field::FastingBs,
        Field::RestingEcg,
        Field::MaxHr,
        Field::ExerciseAngina,
        Field::Oldpeak,
        Field::StSlope,
    ];

    /// Wire name, shared by the form and the JSON payload.
    pub fn name(&self) -> &'static str {
        match self {
            Field::Age => "Age",
            Field::Sex => "Sex",
            Field::ChestPainType => "ChestPainType",
            Field::RestingBp => "RestingBP",
            Field::Cholesterol => "Cholesterol",
            Field::FastingBs => "FastingBS",
            Field::RestingEcg => "RestingECG",
            Field::MaxHr => "MaxHR",
            Field::ExerciseAngina => "ExerciseAngina",
            Field::Oldpeak => "Oldpeak",
            Field::StSlope => "ST_Slope",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Age => "Age",
            Field::Sex => "Sex",
            Field::ChestPainType => "Chest Pain Type",
            Field::RestingBp => "Resting BP (mm Hg)",
            Field::Cholesterol => "Cholesterol (mm/dl)",
            Field::FastingBs => "Fasting Blood Sugar > 120 mg/dl?",
            Field::RestingEcg => "Resting ECG",
            Field::MaxHr => "Max Heart Rate",
            Field::ExerciseAngina => "Exercise Induced Angina?",
            Field::Oldpeak => "Oldpeak (ST Depression)",
            Field::StSlope => "ST Slope",
        }
    }

    /// Allowed wire values for categorical fields, `None` for numeric ones.
    pub fn choices(&self) -> Option<Vec<(&'static str, &'static str)>> {
        fn options<C: Choice>() -> Vec<(&'static str, &'static str)> {
            C::ALL.iter().map(|c| (c.as_str(), c.label())).collect()
        }

        match self {
            Field::Sex => Some(options::<Sex>()),
            Field::ChestPainType => Some(options::<ChestPainType>()),
            Field::FastingBs => Some(options::<FastingBs>()),
            Field::RestingEcg => Some(options::<RestingEcg>()),
            Field::ExerciseAngina => Some(options::<ExerciseAngina>()),
            Field::StSlope => Some(options::<StSlope>()),
            _ => None,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Field {
    type Err = PredictError;

    fn from_str(s: &str) -> Result<Self> {
        Field::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or_else(|| PredictError::UnknownField(s.to_string()))
    }
}

/// Current raw values of the form.
///
/// Numeric inputs are kept exactly as typed; categorical inputs can only ever
/// hold one of their enumerated values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormState {
    pub age: String,
    pub sex: Sex,
    pub chest_pain_type: ChestPainType,
    pub resting_bp: String,
    pub cholesterol: String,
    pub fasting_bs: FastingBs,
    pub resting_ecg: RestingEcg,
    pub max_hr: String,
    pub exercise_angina: ExerciseAngina,
    pub oldpeak: String,
    pub st_slope: StSlope,
}

fn parse_choice<C: Choice>(field: Field, value: &str) -> Result<C> {
    C::parse(value.trim()).ok_or_else(|| PredictError::InvalidChoice {
        field: field.name().to_string(),
        value: value.to_string(),
    })
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value of a field as it would appear in an input widget.
    pub fn get(&self, field: Field) -> Cow<'_, str> {
        match field {
            Field::Age => Cow::Borrowed(&self.age),
            Field::Sex => Cow::Borrowed(self.sex.as_str()),
            Field::ChestPainType => Cow::Borrowed(self.chest_pain_type.as_str()),
            Field::RestingBp => Cow::Borrowed(&self.resting_bp),
            Field::Cholesterol => Cow::Borrowed(&self.cholesterol),
            Field::FastingBs => Cow::Borrowed(self.fasting_bs.as_str()),
            Field::RestingEcg => Cow::Borrowed(self.resting_ecg.as_str()),
            Field::MaxHr => Cow::Borrowed(&self.max_hr),
            Field::ExerciseAngina => Cow::Borrowed(self.exercise_angina.as_str()),
            Field::Oldpeak => Cow::Borrowed(&self.oldpeak),
            Field::StSlope => Cow::Borrowed(self.st_slope.as_str()),
        }
    }

    /// Replace the value of one field.
    ///
    /// Numeric fields accept any text. Categorical fields reject values outside
    /// their set and keep their previous value.
    pub fn set(&mut self, field: Field, value: &str) -> Result<()> {
        match field {
            Field::Age => self.age = value.to_string(),
            Field::Sex => self.sex = parse_choice(field, value)?,
            Field::ChestPainType => self.chest_pain_type = parse_choice(field, value)?,
            Field::RestingBp => self.resting_bp = value.to_string(),
            Field::Cholesterol => self.cholesterol = value.to_string(),
            Field::FastingBs => self.fasting_bs = parse_choice(field, value)?,
            Field::RestingEcg => self.resting_ecg = parse_choice(field, value)?,
            Field::MaxHr => self.max_hr = value.to_string(),
            Field::ExerciseAngina => self.exercise_angina = parse_choice(field, value)?,
            Field::Oldpeak => self.oldpeak = value.to_string(),
            Field::StSlope => self.st_slope = parse_choice(field, value)?,
        }
        Ok(())
    }

    pub fn set_by_name(&mut self, name: &str, value: &str) -> Result<()> {
        let field: Field = name.parse()?;
        self.set(field, value)
    }

    /// All fields with their raw values, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, Cow<'_, str>)> + '_ {
        Field::ALL.iter().map(move |f| (*f, self.get(*f)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_initial_form() {
        let form = FormState::new();
        let values: Vec<(String, String)> = form
            .iter()
            .map(|(f, v)| (f.name().to_string(), v.into_owned()))
            .collect();

        assert_eq!(
            values,
            vec![
                ("Age".into(), "".into()),
                ("Sex".into(), "M".into()),
                ("ChestPainType".into(), "ATA".into()),
                ("RestingBP".into(), "".into()),
                ("Cholesterol".into(), "".into()),
                ("FastingBS".into(), "0".into()),
                ("RestingECG".into(), "Normal".into()),
                ("MaxHR".into(), "".into()),
                ("ExerciseAngina".into(), "N".into()),
                ("Oldpeak".into(), "".into()),
                ("ST_Slope".into(), "Up".into()),
            ]
        );
    }

    #[test]
    fn test_last_edit_wins_and_others_keep_defaults() {
        let mut form = FormState::new();
        form.set(Field::Age, "40").unwrap();
        form.set(Field::Age, "41").unwrap();
        form.set(Field::StSlope, "Flat").unwrap();
        form.set(Field::StSlope, "Down").unwrap();

        assert_eq!(form.get(Field::Age), "41");
        assert_eq!(form.st_slope, StSlope::Down);
        assert_eq!(form.sex, Sex::Male);
        assert_eq!(form.resting_bp, "");
    }

    #[test]
    fn test_invalid_choice_keeps_previous_value() {
        let mut form = FormState::new();
        form.set(Field::ChestPainType, "ASY").unwrap();

        let err = form.set(Field::ChestPainType, "XYZ").unwrap_err();
        assert!(matches!(err, PredictError::InvalidChoice { .. }));
        assert_eq!(form.chest_pain_type, ChestPainType::Asymptomatic);
    }

    #[test]
    fn test_numeric_fields_hold_any_text() {
        let mut form = FormState::new();
        form.set(Field::Oldpeak, "abc").unwrap();
        assert_eq!(form.oldpeak, "abc");
    }

    #[test]
    fn test_set_by_wire_name() {
        let mut form = FormState::new();
        form.set_by_name("ST_Slope", "Flat").unwrap();
        form.set_by_name("FastingBS", "1").unwrap();
        assert_eq!(form.st_slope, StSlope::Flat);
        assert_eq!(form.fasting_bs.as_i64(), 1);

        let err = form.set_by_name("st_slope", "Flat").unwrap_err();
        assert!(matches!(err, PredictError::UnknownField(name) if name == "st_slope"));
    }

    #[test]
    fn test_field_choices() {
        assert!(Field::Age.choices().is_none());
        assert_eq!(Field::RestingEcg.choices().unwrap().len(), 3);
    }
}
