//! Session lifecycle: expiry timers, warning window, renewal.

mod lifecycle;

pub use lifecycle::{SessionEvent, SessionLifecycleManager};

use std::time::Duration;

/// Fixed scheduling policy for the session lifecycle.
///
/// The warning lead and extension window are product constants, not
/// configuration — the struct exists so tests can compress time.
#[derive(Debug, Clone, Copy)]
pub struct SessionPolicy {
    /// How long before the scheduled logout the warning fires.
    pub warning_lead: Duration,
    /// Session lifetime granted by a successful refresh.
    pub extension_window: Duration,
    /// Seconds the warning countdown display starts from.
    pub warning_countdown_secs: u32,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            warning_lead: Duration::from_secs(30),
            extension_window: Duration::from_secs(3 * 60),
            warning_countdown_secs: 30,
        }
    }
}
