//! Session model and lifecycle phases.

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle phase for a client session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Startup state, before the stored credential has been checked.
    Unverified,
    /// Credential accepted; expiry timers armed.
    Authenticated,
    /// Inside the warning window; logout remains scheduled.
    WarningShown,
    /// Session ended. Terminal — a fresh login produces a new session.
    LoggedOut,
}

impl SessionPhase {
    /// Determine whether a lifecycle transition is permitted.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Unverified, Self::Authenticated | Self::LoggedOut)
                | (Self::Authenticated, Self::WarningShown | Self::LoggedOut)
                | (Self::WarningShown, Self::Authenticated | Self::LoggedOut)
        )
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogoutReason {
    /// The user chose to log out.
    UserRequested,
    /// The expiry timer fired before the session was extended.
    Expired,
    /// A refresh attempt failed; the session can no longer be trusted.
    RefreshFailed,
}

impl Display for LogoutReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserRequested => write!(f, "user requested"),
            Self::Expired => write!(f, "session expired"),
            Self::RefreshFailed => write!(f, "refresh failed"),
        }
    }
}

/// Point-in-time snapshot of the client session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Session {
    /// Whether a valid credential is currently held.
    pub authenticated: bool,
    /// Instant at which the credential expires, when known.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Snapshot for a session that has not (yet) authenticated.
    #[must_use]
    pub fn unauthenticated() -> Self {
        Self {
            authenticated: false,
            expires_at: None,
        }
    }
}
