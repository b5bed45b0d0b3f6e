//! Daily exchange-rate payload model and validation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{AppError, Result};

/// Daily GTQ-per-USD reference rate as published by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyRate {
    /// Publication date, verbatim from the backend.
    pub fecha: String,
    /// Quetzales per one US dollar.
    pub valor: f64,
}

impl DailyRate {
    /// Extract and validate a rate from the `tipo-cambio/dia` envelope:
    /// `{"success": bool, "data": {"fecha": string, "valor": number}}`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Rate` when `success` is absent or false, `data`
    /// is missing, or `valor` is missing, non-numeric, or non-positive.
    pub fn from_envelope(body: &Value) -> Result<Self> {
        let success = body
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if !success {
            return Err(AppError::Rate(
                "backend reported an unsuccessful rate lookup".into(),
            ));
        }

        let data = match body.get("data") {
            Some(value) if value.is_object() => value,
            _ => return Err(AppError::Rate("payload is missing the data object".into())),
        };

        let valor = data
            .get("valor")
            .and_then(Value::as_f64)
            .ok_or_else(|| AppError::Rate("valor is missing or not numeric".into()))?;
        if !valor.is_finite() || valor <= 0.0 {
            return Err(AppError::Rate(format!("valor {valor} is out of range")));
        }

        // fecha is display-only; tolerate its absence.
        let fecha = data
            .get("fecha")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();

        Ok(Self { fecha, valor })
    }
}
