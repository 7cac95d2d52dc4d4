// src/view.rs
use std::fmt::Write;

use crate::controller::FormSubmissionController;
use crate::form::FormState;
use crate::models::{DisplayState, PredictionResult};
use crate::payload::Advisory;

/// Renders the form, one line per field, in declaration order.
pub fn render_form(form: &FormState) -> String {
    let width = form.iter().map(|(f, _)| f.label().len()).max().unwrap_or(0);
    let mut out = String::new();

    for (field, value) in form.iter() {
        let shown = match field.choices() {
            Some(choices) => choices
                .iter()
                .find(|(wire, _)| *wire == value)
                .map(|(_, label)| label.to_string())
                .unwrap_or_else(|| value.to_string()),
            None if value.is_empty() => "-".to_string(),
            None => value.to_string(),
        };
        let _ = writeln!(out, "  {:<width$}  {}", field.label(), shown, width = width);
    }
    out
}

pub fn render_advisories(advisories: &[Advisory]) -> String {
    let mut out = String::new();
    for advisory in advisories {
        let _ = writeln!(out, "  ⚠️  {}", advisory.message);
    }
    out
}

fn render_result(result: &PredictionResult, color: bool) -> String {
    let badge = result.risk_level.badge();
    let badge = if color {
        let (r, g, b) = result.risk_level.color();
        format!("\x1b[1;38;2;{};{};{}m{}\x1b[0m", r, g, b, badge)
    } else {
        badge
    };
    format!(
        "Result: {}\nProbability: {}\n{}\n",
        result.prediction, result.probability, badge
    )
}

/// Renders the current display state. `color` enables ANSI truecolor for the risk badge.
pub fn render_state(state: DisplayState<'_>, color: bool) -> String {
    match state {
        DisplayState::Idle => "Fill in the form and submit to get a prediction.\n".to_string(),
        DisplayState::Pending => "⏳ Analyzing...\n".to_string(),
        DisplayState::Success(result) => render_result(result, color),
        DisplayState::Failure(message) => format!("❌ {}\n", message),
    }
}

/// Full screen for a controller: form, advisories, then the display state.
pub fn render(controller: &FormSubmissionController, color: bool) -> String {
    let mut out = String::new();
    out.push_str(&render_form(controller.form()));

    let advisories = controller.advisories();
    if !advisories.is_empty() {
        out.push('\n');
        out.push_str(&render_advisories(&advisories));
    }
    for error in controller.field_errors() {
        let _ = writeln!(out, "  • {}", error);
    }

    out.push('\n');
    out.push_str(&render_state(controller.display(), color));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::Field;
    use crate::models::{Probability, RiskLevel};

    #[test]
    fn test_form_uses_option_labels() {
        let mut form = FormState::new();
        form.set(Field::ChestPainType, "NAP").unwrap();
        let text = render_form(&form);

        assert!(text.contains("Non-Anginal Pain (NAP)"));
        assert!(text.contains("No (0)"));
        assert_eq!(text.lines().count(), 11);
        assert!(text.lines().next().unwrap().trim_start().starts_with("Age"));
    }

    #[test]
    fn test_state_rendering() {
        assert!(render_state(DisplayState::Pending, false).contains("Analyzing"));
        assert_eq!(
            render_state(DisplayState::Failure("boom"), false),
            "❌ boom\n"
        );

        let result = PredictionResult {
            prediction: "Heart Disease".to_string(),
            probability: Probability::Value(0.875),
            risk_level: RiskLevel::High,
        };
        let plain = render_state(DisplayState::Success(&result), false);
        assert_eq!(plain, "Result: Heart Disease\nProbability: 87.5%\nHIGH RISK\n");

        let colored = render_state(DisplayState::Success(&result), true);
        assert!(colored.contains("\x1b[1;38;2;244;63;94mHIGH RISK"));
    }
}
