// src/payload.rs
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::form::{Choice, Field, FormState};

/// The body POSTed to the prediction service.
///
/// Numeric fields use `None` as the not-a-number sentinel. It is serialized as
/// JSON `null` and still transmitted; the service decides what to do with it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestPayload {
    #[serde(rename = "Age")]
    pub age: Option<i64>,
    #[serde(rename = "Sex")]
    pub sex: String,
    #[serde(rename = "ChestPainType")]
    pub chest_pain_type: String,
    #[serde(rename = "RestingBP")]
    pub resting_bp: Option<i64>,
    #[serde(rename = "Cholesterol")]
    pub cholesterol: Option<i64>,
    #[serde(rename = "FastingBS")]
    pub fasting_bs: i64,
    #[serde(rename = "RestingECG")]
    pub resting_ecg: String,
    #[serde(rename = "MaxHR")]
    pub max_hr: Option<i64>,
    #[serde(rename = "ExerciseAngina")]
    pub exercise_angina: String,
    #[serde(rename = "Oldpeak")]
    pub oldpeak: Option<f64>,
    #[serde(rename = "ST_Slope")]
    pub st_slope: String,
}

impl RequestPayload {
    /// Coerce the form without validating it. Unparsable numbers become sentinels.
    pub fn from_form(form: &FormState) -> Self {
        Self {
            age: parse_int_prefix(&form.age),
            sex: form.sex.as_str().to_string(),
            chest_pain_type: form.chest_pain_type.as_str().to_string(),
            resting_bp: parse_int_prefix(&form.resting_bp),
            cholesterol: parse_int_prefix(&form.cholesterol),
            fasting_bs: form.fasting_bs.as_i64(),
            resting_ecg: form.resting_ecg.as_str().to_string(),
            max_hr: parse_int_prefix(&form.max_hr),
            exercise_angina: form.exercise_angina.as_str().to_string(),
            oldpeak: parse_decimal_prefix(&form.oldpeak),
            st_slope: form.st_slope.as_str().to_string(),
        }
    }

    /// Numeric fields that will be sent as sentinels.
    pub fn sentinel_fields(&self) -> Vec<Field> {
        let mut fields = Vec::new();
        if self.age.is_none() {
            fields.push(Field::Age);
        }
        if self.resting_bp.is_none() {
            fields.push(Field::RestingBp);
        }
        if self.cholesterol.is_none() {
            fields.push(Field::Cholesterol);
        }
        if self.max_hr.is_none() {
            fields.push(Field::MaxHr);
        }
        if self.oldpeak.is_none() {
            fields.push(Field::Oldpeak);
        }
        fields
    }
}

/// Integer coercion with browser `parseInt` rules: skip leading whitespace,
/// take an optional sign and the longest run of digits, ignore the rest.
/// A digit run that does not fit in `i64` is treated as unparsable.
pub fn parse_int_prefix(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    s[..end].parse().ok()
}

/// Decimal coercion with browser `parseFloat` rules: the longest prefix that
/// reads as a decimal literal, with an optional exponent.
pub fn parse_decimal_prefix(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let mut mantissa_digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        mantissa_digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
            mantissa_digits += 1;
        }
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return None;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    s[..end].parse().ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    Empty,
    NotAnInteger,
    NotANumber,
    NotPositive,
    Negative,
}

/// A single field that failed strict validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub kind: FieldErrorKind,
    pub value: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = self.field.label();
        match self.kind {
            FieldErrorKind::Empty => write!(f, "{} is required", label),
            FieldErrorKind::NotAnInteger => {
                write!(f, "{} must be a whole number (got '{}')", label, self.value)
            }
            FieldErrorKind::NotANumber => {
                write!(f, "{} must be a number (got '{}')", label, self.value)
            }
            FieldErrorKind::NotPositive => write!(f, "{} must be greater than zero", label),
            FieldErrorKind::Negative => write!(f, "{} cannot be negative", label),
        }
    }
}

/// A payload whose numeric fields all parsed cleanly.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPayload {
    pub age: i64,
    pub resting_bp: i64,
    pub cholesterol: i64,
    pub max_hr: i64,
    pub oldpeak: f64,
    categorical: RequestPayload,
}

impl From<ValidatedPayload> for RequestPayload {
    fn from(valid: ValidatedPayload) -> Self {
        RequestPayload {
            age: Some(valid.age),
            resting_bp: Some(valid.resting_bp),
            cholesterol: Some(valid.cholesterol),
            max_hr: Some(valid.max_hr),
            oldpeak: Some(valid.oldpeak),
            ..valid.categorical
        }
    }
}

#[derive(Clone, Copy)]
enum Lower {
    Positive,
    NonNegative,
}

fn strict_int(
    form: &FormState,
    field: Field,
    lower: Lower,
    errors: &mut Vec<FieldError>,
) -> Option<i64> {
    let raw = form.get(field);
    let trimmed = raw.trim();
    let fail = |kind| FieldError {
        field,
        kind,
        value: raw.to_string(),
    };

    if trimmed.is_empty() {
        errors.push(fail(FieldErrorKind::Empty));
        return None;
    }
    let Ok(value) = trimmed.parse::<i64>() else {
        errors.push(fail(FieldErrorKind::NotAnInteger));
        return None;
    };
    match lower {
        Lower::Positive if value <= 0 => {
            errors.push(fail(FieldErrorKind::NotPositive));
            None
        }
        Lower::NonNegative if value < 0 => {
            errors.push(fail(FieldErrorKind::Negative));
            None
        }
        _ => Some(value),
    }
}

/// Strict counterpart of [`RequestPayload::from_form`]: every numeric field must
/// parse in full. Returns all field errors at once.
pub fn validate(form: &FormState) -> Result<ValidatedPayload, Vec<FieldError>> {
    let mut errors = Vec::new();

    let age = strict_int(form, Field::Age, Lower::Positive, &mut errors);
    let resting_bp = strict_int(form, Field::RestingBp, Lower::Positive, &mut errors);
    let cholesterol = strict_int(form, Field::Cholesterol, Lower::NonNegative, &mut errors);
    let max_hr = strict_int(form, Field::MaxHr, Lower::Positive, &mut errors);

    let raw_oldpeak = form.oldpeak.trim();
    let oldpeak = if raw_oldpeak.is_empty() {
        errors.push(FieldError {
            field: Field::Oldpeak,
            kind: FieldErrorKind::Empty,
            value: form.oldpeak.clone(),
        });
        None
    } else {
        match raw_oldpeak.parse::<f64>() {
            Ok(v) if v.is_finite() => Some(v),
            _ => {
                errors.push(FieldError {
                    field: Field::Oldpeak,
                    kind: FieldErrorKind::NotANumber,
                    value: form.oldpeak.clone(),
                });
                None
            }
        }
    };

    match (age, resting_bp, cholesterol, max_hr, oldpeak) {
        (Some(age), Some(resting_bp), Some(cholesterol), Some(max_hr), Some(oldpeak))
            if errors.is_empty() =>
        {
            Ok(ValidatedPayload {
                age,
                resting_bp,
                cholesterol,
                max_hr,
                oldpeak,
                categorical: RequestPayload::from_form(form),
            })
        }
        _ => Err(errors),
    }
}

/// A non-blocking note about a value that is parseable but clinically odd.
#[derive(Debug, Clone, PartialEq)]
pub struct Advisory {
    pub field: Field,
    pub message: String,
}

static ONE_DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[+-]?\d*(\.\d)?\s*$").expect("static pattern"));

const TYPICAL_RANGES: [(Field, i64, i64); 4] = [
    (Field::Age, 1, 120),
    (Field::RestingBp, 50, 250),
    (Field::Cholesterol, 0, 600),
    (Field::MaxHr, 60, 220),
];

/// Advisories for the current form. They never alter the payload or block a submission.
pub fn advisories(form: &FormState) -> Vec<Advisory> {
    let payload = RequestPayload::from_form(form);
    let mut notes = Vec::new();

    for (field, low, high) in TYPICAL_RANGES {
        let value = match field {
            Field::Age => payload.age,
            Field::RestingBp => payload.resting_bp,
            Field::Cholesterol => payload.cholesterol,
            Field::MaxHr => payload.max_hr,
            _ => None,
        };
        if let Some(v) = value {
            if v < low || v > high {
                notes.push(Advisory {
                    field,
                    message: format!(
                        "{} of {} is outside the typical range {}-{}",
                        field.label(),
                        v,
                        low,
                        high
                    ),
                });
            }
        }
    }

    if payload.cholesterol == Some(0) {
        notes.push(Advisory {
            field: Field::Cholesterol,
            message: "Cholesterol of 0 is medically implausible".to_string(),
        });
    }

    if let Some(oldpeak) = payload.oldpeak {
        if !(-5.0..=10.0).contains(&oldpeak) {
            notes.push(Advisory {
                field: Field::Oldpeak,
                message: format!(
                    "{} of {} is outside the typical range -5.0-10.0",
                    Field::Oldpeak.label(),
                    oldpeak
                ),
            });
        }
        if !ONE_DECIMAL.is_match(&form.oldpeak) {
            notes.push(Advisory {
                field: Field::Oldpeak,
                message: format!(
                    "{} is expected with one decimal place (got '{}')",
                    Field::Oldpeak.label(),
                    form.oldpeak.trim()
                ),
            });
        }
    }

    notes
}
