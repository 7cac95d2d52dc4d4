// src/models.rs
use serde::{Deserialize, Serialize};

/// Probability as returned by the service: either a bare number or a preformatted
/// string such as `"12.0%"`. Display-only; no bounds are enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Probability {
    Value(f64),
    Text(String),
}

impl Probability {
    /// Best-effort numeric reading in `0.0..=1.0` terms.
    pub fn as_fraction(&self) -> Option<f64> {
        match self {
            Probability::Value(v) => Some(*v),
            Probability::Text(text) => {
                let text = text.trim();
                match text.strip_suffix('%') {
                    Some(percent) => percent.trim().parse::<f64>().ok().map(|p| p / 100.0),
                    None => text.parse().ok(),
                }
            }
        }
    }
}

impl std::fmt::Display for Probability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Probability::Value(v) => write!(f, "{:.1}%", v * 100.0),
            Probability::Text(text) => write!(f, "{}", text),
        }
    }
}

/// Risk tier tag. Only used to pick a display style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Other(String),
}

impl From<String> for RiskLevel {
    fn from(tag: String) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "low" => RiskLevel::Low,
            "moderate" | "medium" => RiskLevel::Moderate,
            "high" => RiskLevel::High,
            _ => RiskLevel::Other(tag),
        }
    }
}

impl From<RiskLevel> for String {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Low => "Low".to_string(),
            RiskLevel::Moderate => "Moderate".to_string(),
            RiskLevel::High => "High".to_string(),
            RiskLevel::Other(tag) => tag,
        }
    }
}

impl RiskLevel {
    /// RGB color used when rendering the result card.
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            RiskLevel::Low => (16, 185, 129),     // emerald
            RiskLevel::Moderate => (251, 191, 36), // amber
            RiskLevel::High => (244, 63, 94),     // rose
            RiskLevel::Other(_) => (148, 163, 184),
        }
    }

    pub fn badge(&self) -> String {
        match self {
            RiskLevel::Low => "LOW RISK".to_string(),
            RiskLevel::Moderate => "MODERATE RISK".to_string(),
            RiskLevel::High => "HIGH RISK".to_string(),
            RiskLevel::Other(tag) => format!("{} RISK", tag.to_uppercase()),
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from(self.clone()))
    }
}

/// Response body of the prediction endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction: String,
    pub probability: Probability,
    pub risk_level: RiskLevel,
}

/// What the form should currently show. Exactly one applies at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DisplayState<'a> {
    Idle,
    Pending,
    Success(&'a PredictionResult),
    Failure(&'a str),
}
