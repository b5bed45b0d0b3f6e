//! Screen selection and route guarding.
//!
//! The converter screen is reachable only with a live session; the login
//! and register screens only without one. `resolve` is the single guard
//! applied whenever the application navigates.

use serde::{Deserialize, Serialize};

/// Top-level screens of the application.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    /// Login form (unauthenticated entry point).
    Login,
    /// Registration form.
    Register,
    /// Currency converter (authenticated entry point, default destination).
    #[default]
    Converter,
}

/// Apply the route guards to a requested screen.
///
/// Unauthenticated access to the converter redirects to login; an
/// authenticated user asking for login or register is sent straight to
/// the converter.
#[must_use]
pub fn resolve(requested: Screen, authenticated: bool) -> Screen {
    match (requested, authenticated) {
        (Screen::Converter, false) => Screen::Login,
        (Screen::Login | Screen::Register, true) => Screen::Converter,
        (screen, _) => screen,
    }
}
