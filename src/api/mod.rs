//! HTTP client for the converter backend.
//!
//! A single cookie-holding `reqwest::Client` serves both the authentication
//! and exchange-rate endpoints, so the session cookie issued at login flows
//! to every subsequent request. Requests carry no client-side timeout; the
//! transport's defaults apply.

pub mod auth;
pub mod rates;

use crate::{AppError, Result};

/// Client for the converter backend REST API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client for the given base URL (trailing slash tolerated).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(concat!("quetzal-console/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| AppError::Config(format!("failed to build http client: {err}")))?;
        Ok(Self { http, base_url })
    }

    /// The base URL this client targets.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}
