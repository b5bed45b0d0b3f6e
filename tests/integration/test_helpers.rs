//! Shared test helpers for client and lifecycle integration tests.
//!
//! Provides reusable construction of the API client, a time-compressed
//! session policy, and event-channel plumbing so individual test modules
//! can focus on behaviour rather than boilerplate.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use quetzal_console::api::ApiClient;
use quetzal_console::session::{SessionEvent, SessionLifecycleManager, SessionPolicy};

/// A base URL on a closed port, for exercising transport failures.
pub const UNREACHABLE: &str = "http://127.0.0.1:9";

/// Build an API client against the given base URL.
pub fn api(base_url: &str) -> Arc<ApiClient> {
    Arc::new(ApiClient::new(base_url).expect("api client"))
}

/// Session policy with sub-second durations so timer tests run quickly.
/// The countdown seed keeps its production value — it is display-only.
pub fn short_policy() -> SessionPolicy {
    SessionPolicy {
        warning_lead: Duration::from_millis(300),
        extension_window: Duration::from_secs(2),
        warning_countdown_secs: 30,
    }
}

/// Build a lifecycle manager plus the receiving end of its event channel.
pub fn manager(
    base_url: &str,
    policy: SessionPolicy,
) -> (SessionLifecycleManager, mpsc::Receiver<SessionEvent>) {
    let (event_tx, event_rx) = mpsc::channel(16);
    (
        SessionLifecycleManager::new(api(base_url), policy, event_tx),
        event_rx,
    )
}

/// Receive the next session event, or `None` when `ms` elapses first.
pub async fn recv_timeout(
    events: &mut mpsc::Receiver<SessionEvent>,
    ms: u64,
) -> Option<SessionEvent> {
    tokio::time::timeout(Duration::from_millis(ms), events.recv())
        .await
        .ok()
        .flatten()
}
