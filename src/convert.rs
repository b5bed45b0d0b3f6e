//! Quetzal/dollar conversion math and the two-field converter form.

use crate::models::rate::DailyRate;

/// Convert quetzales to dollars at `rate` GTQ per USD, rounded to 2 decimals.
#[must_use]
pub fn quetzales_to_dollars(quetzales: f64, rate: f64) -> f64 {
    round_display(quetzales / rate)
}

/// Convert dollars to quetzales at `rate` GTQ per USD, rounded to 2 decimals.
#[must_use]
pub fn dollars_to_quetzales(dollars: f64, rate: f64) -> f64 {
    round_display(dollars * rate)
}

/// Round to the 2-decimal display precision used by both form fields.
#[must_use]
pub fn round_display(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format an amount the way the form fields render it.
#[must_use]
pub fn format_amount(value: f64) -> String {
    format!("{value:.2}")
}

/// Parse a form field into a finite amount. Empty and non-numeric input
/// yield `None` rather than an error.
#[must_use]
pub fn parse_amount(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => None,
    }
}

/// Two-field converter form: editing either side re-derives the other.
///
/// Mirrors the interactive form semantics: empty input, non-numeric input,
/// or an unavailable rate clears the derived field without raising an error.
#[derive(Debug, Clone, Default)]
pub struct ConverterForm {
    quetzales: String,
    dollars: String,
    rate: Option<DailyRate>,
}

impl ConverterForm {
    /// Create a form bound to the day's rate, or to no rate when the
    /// lookup failed (conversions then clear the derived field).
    #[must_use]
    pub fn new(rate: Option<DailyRate>) -> Self {
        Self {
            quetzales: String::new(),
            dollars: String::new(),
            rate,
        }
    }

    /// The day's rate, when available.
    #[must_use]
    pub fn rate(&self) -> Option<&DailyRate> {
        self.rate.as_ref()
    }

    /// Current quetzales field contents.
    #[must_use]
    pub fn quetzales(&self) -> &str {
        &self.quetzales
    }

    /// Current dollars field contents.
    #[must_use]
    pub fn dollars(&self) -> &str {
        &self.dollars
    }

    /// Edit the quetzales field, re-deriving the dollars field.
    pub fn set_quetzales(&mut self, input: &str) {
        self.quetzales = input.to_owned();
        self.dollars = match (parse_amount(input), &self.rate) {
            (Some(amount), Some(rate)) => format_amount(quetzales_to_dollars(amount, rate.valor)),
            _ => String::new(),
        };
    }

    /// Edit the dollars field, re-deriving the quetzales field.
    pub fn set_dollars(&mut self, input: &str) {
        self.dollars = input.to_owned();
        self.quetzales = match (parse_amount(input), &self.rate) {
            (Some(amount), Some(rate)) => format_amount(dollars_to_quetzales(amount, rate.valor)),
            _ => String::new(),
        };
    }
}
