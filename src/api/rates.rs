//! Daily exchange-rate endpoint.

use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use super::ApiClient;
use crate::models::rate::DailyRate;
use crate::{AppError, Result};

impl ApiClient {
    /// Fetch the day's GTQ-per-USD reference rate.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Auth` on 401 (the session credential expired),
    /// `AppError::Rate` when the payload is malformed, and `AppError::Http`
    /// on other non-2xx statuses or transport failure.
    pub async fn daily_rate(&self) -> Result<DailyRate> {
        let response = self
            .http
            .get(self.url("/api/v1/tipo-cambio/dia"))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(AppError::Auth(
                "session expired, log in again to fetch the rate".into(),
            ));
        }
        if !status.is_success() {
            return Err(AppError::Http(format!(
                "rate lookup failed with status {status}"
            )));
        }

        let body: Value = response.json().await?;
        let rate = DailyRate::from_envelope(&body)?;
        debug!(fecha = %rate.fecha, valor = rate.valor, "daily rate fetched");
        Ok(rate)
    }
}
