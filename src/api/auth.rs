//! Authentication endpoints: login, register, logout, refresh, verify.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::ApiClient;
use crate::{AppError, Result};

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

/// Expiry instant carried by login (always) and verify (optionally).
#[derive(Debug, Deserialize)]
struct ExpiryBody {
    #[serde(rename = "expiresAt")]
    expires_at: Option<i64>,
}

/// Error body shape shared by all auth endpoints.
#[derive(Debug, Deserialize)]
struct MessageBody {
    message: Option<String>,
}

/// Outcome of the startup credential check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The stored credential is still valid. The expiry instant is present
    /// only when the backend includes it in the verify response.
    Valid {
        /// Expiry instant reported by the backend, when available.
        expires_at: Option<DateTime<Utc>>,
    },
    /// No valid credential. Covers network failure as well — the check is
    /// silent and never surfaces an error.
    NotAuthenticated,
}

impl ApiClient {
    /// Log in with the given credentials and return the session expiry.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Auth` with the backend's message on rejection, or
    /// when a 2xx response omits the expiry; `AppError::Http` on transport
    /// failure.
    pub async fn login(&self, username: &str, password: &str) -> Result<DateTime<Utc>> {
        let response = self
            .http
            .post(self.url("/api/v1/auth/login"))
            .json(&Credentials { username, password })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response, "login").await);
        }

        let body: ExpiryBody = response.json().await?;
        let millis = body.expires_at.ok_or_else(|| {
            AppError::Auth("server response did not include an expiry".into())
        })?;
        expiry_from_millis(millis)
    }

    /// Register a new account. The user logs in separately afterwards.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Auth` with the backend's message on rejection, or
    /// `AppError::Http` on transport failure.
    pub async fn register(&self, username: &str, password: &str) -> Result<()> {
        let response = self
            .http
            .post(self.url("/api/v1/auth/register"))
            .json(&Credentials { username, password })
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(rejection(response, "register").await)
        }
    }

    /// Best-effort logout notification. Failures are logged and swallowed —
    /// local logout must never wait on the network.
    pub async fn logout(&self) {
        match self.http.post(self.url("/api/v1/auth/logout")).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("logout acknowledged by backend");
            }
            Ok(response) => {
                warn!(status = %response.status(), "logout endpoint rejected the request");
            }
            Err(err) => {
                warn!(%err, "logout request failed");
            }
        }
    }

    /// Ask the backend to refresh the session credential.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Auth` on rejection or `AppError::Http` on
    /// transport failure. Callers treat any error as fatal for the session.
    pub async fn refresh(&self) -> Result<()> {
        let response = self
            .http
            .post(self.url("/api/v1/auth/refresh"))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(rejection(response, "refresh").await)
        }
    }

    /// Startup check for an already-valid session credential.
    ///
    /// Infallible: any transport failure or non-2xx status means "not
    /// authenticated" and falls back to the login screen silently.
    pub async fn verify(&self) -> VerifyOutcome {
        let response = match self.http.get(self.url("/api/v1/auth/verify")).send().await {
            Ok(response) => response,
            Err(err) => {
                debug!(%err, "verify request failed, treating as unauthenticated");
                return VerifyOutcome::NotAuthenticated;
            }
        };

        if !response.status().is_success() {
            debug!(status = %response.status(), "no valid credential on load");
            return VerifyOutcome::NotAuthenticated;
        }

        // Older backends answer a bare 2xx without a body.
        let expires_at = response
            .json::<ExpiryBody>()
            .await
            .ok()
            .and_then(|body| body.expires_at)
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single());

        VerifyOutcome::Valid { expires_at }
    }
}

/// Map a non-2xx auth response to an error carrying the backend's message.
async fn rejection(response: reqwest::Response, action: &str) -> AppError {
    let status = response.status();
    let message = response
        .json::<MessageBody>()
        .await
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_else(|| format!("{action} failed with status {status}"));
    AppError::Auth(message)
}

fn expiry_from_millis(millis: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| AppError::Auth(format!("invalid session expiry timestamp {millis}")))
}
