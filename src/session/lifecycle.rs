//! Expiry timers with a warning/extend/logout flow.
//!
//! [`SessionLifecycleManager`] owns two delayed actions derived from the
//! session expiry instant: a warning that opens the extend window, and the
//! logout itself. Arming always replaces the previous pair, so at most one
//! warning and one logout from the *latest* arm call can ever fire. Events
//! are delivered via a `tokio::sync::mpsc` channel so the presentation
//! layer can react (show the countdown, navigate away).

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::SessionPolicy;
use crate::api::ApiClient;
use crate::models::session::{LogoutReason, Session, SessionPhase};
use crate::{AppError, Result};

/// Events emitted by the lifecycle timers for presentation handling.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The warning window opened; the user may extend or log out.
    WarningDue {
        /// Seconds the countdown display starts from.
        seconds_remaining: u32,
    },
    /// A refresh succeeded and the timers were re-armed.
    Extended {
        /// The new expiry instant.
        expires_at: DateTime<Utc>,
    },
    /// The session ended (timer fired, extend failed, or user choice).
    LoggedOut {
        /// Why the session ended.
        reason: LogoutReason,
    },
}

/// A cancellable delayed action backed by a spawned timer task.
///
/// Cancelling an action that has already fired or been cancelled is a
/// safe no-op.
struct DelayedAction {
    cancel: CancellationToken,
}

impl DelayedAction {
    fn schedule<F>(delay: Duration, action: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => {}
                () = tokio::time::sleep(delay) => action.await,
            }
        });
        Self { cancel }
    }

    fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Drop for DelayedAction {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// The warning/logout pair armed for a single expiry instant.
///
/// Invariant: either no timers are armed, or exactly this pair is — the
/// handles are set and cleared together.
struct TimerPair {
    /// Absent when arming happened inside the warning window.
    warning: Option<DelayedAction>,
    logout: DelayedAction,
}

impl TimerPair {
    fn cancel(&self) {
        if let Some(warning) = &self.warning {
            warning.cancel();
        }
        self.logout.cancel();
    }
}

struct LifecycleState {
    phase: SessionPhase,
    expires_at: Option<DateTime<Utc>>,
    timers: Option<TimerPair>,
}

/// Owns the session expiry timers and drives the extend/logout flow.
pub struct SessionLifecycleManager {
    api: Arc<ApiClient>,
    policy: SessionPolicy,
    state: Arc<Mutex<LifecycleState>>,
    event_tx: mpsc::Sender<SessionEvent>,
}

impl SessionLifecycleManager {
    /// Construct a manager in the `Unverified` phase with no timers armed.
    #[must_use]
    pub fn new(api: Arc<ApiClient>, policy: SessionPolicy, event_tx: mpsc::Sender<SessionEvent>) -> Self {
        Self {
            api,
            policy,
            state: Arc::new(Mutex::new(LifecycleState {
                phase: SessionPhase::Unverified,
                expires_at: None,
                timers: None,
            })),
            event_tx,
        }
    }

    /// The scheduling policy in effect.
    #[must_use]
    pub fn policy(&self) -> SessionPolicy {
        self.policy
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        lock(&self.state).phase
    }

    /// Whether a live session is held (authenticated or warned).
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session().authenticated
    }

    /// Point-in-time snapshot of the session.
    #[must_use]
    pub fn session(&self) -> Session {
        let state = lock(&self.state);
        Session {
            authenticated: matches!(
                state.phase,
                SessionPhase::Authenticated | SessionPhase::WarningShown
            ),
            expires_at: state.expires_at,
        }
    }

    /// Start a session: mark authenticated and arm the expiry timers.
    ///
    /// Called on successful login and on a valid verify-on-load. Calling
    /// it after a logout starts a fresh session instance.
    pub fn login_success(&self, expires_at: DateTime<Utc>) {
        {
            let mut state = lock(&self.state);
            state.phase = SessionPhase::Authenticated;
        }
        self.arm(expires_at);
        info!(%expires_at, "session authenticated");
    }

    /// Arm the warning/logout pair for `expires_at`, replacing any pair
    /// armed earlier.
    ///
    /// The warning fires `warning_lead` before the expiry and is skipped
    /// when the expiry is already inside that window; the logout always
    /// fires at the expiry (immediately when it lies in the past). After
    /// this returns no stale action from a prior arm can fire.
    pub fn arm(&self, expires_at: DateTime<Utc>) {
        let mut state = lock(&self.state);
        if let Some(previous) = state.timers.take() {
            previous.cancel();
        }

        let time_left = (expires_at - Utc::now()).to_std().unwrap_or(Duration::ZERO);

        let warning = if time_left > self.policy.warning_lead {
            let delay = time_left - self.policy.warning_lead;
            let shared = Arc::clone(&self.state);
            let event_tx = self.event_tx.clone();
            let seconds_remaining = self.policy.warning_countdown_secs;
            Some(DelayedAction::schedule(delay, async move {
                fire_warning(&shared, &event_tx, seconds_remaining).await;
            }))
        } else {
            debug!(?time_left, "expiry already inside warning window, warning skipped");
            None
        };

        let logout = {
            let api = Arc::clone(&self.api);
            let shared = Arc::clone(&self.state);
            let event_tx = self.event_tx.clone();
            DelayedAction::schedule(time_left, async move {
                finish_session(&api, &shared, &event_tx, LogoutReason::Expired).await;
            })
        };

        state.expires_at = Some(expires_at);
        state.timers = Some(TimerPair { warning, logout });
        debug!(%expires_at, ?time_left, "expiry timers armed");
    }

    /// Cancel both pending actions unconditionally.
    pub fn disarm(&self) {
        let mut state = lock(&self.state);
        if let Some(timers) = state.timers.take() {
            timers.cancel();
        }
        state.expires_at = None;
    }

    /// Ask the backend to refresh the session, then re-arm.
    ///
    /// Success re-arms with `now + extension_window` and closes the warning
    /// window. Any failure is fatal for the session (fail-closed): a forced
    /// logout runs before the error is returned. The scheduled logout timer
    /// stays armed for the whole call, so a hung refresh cannot outlive it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` when no live session is held or the
    /// session expired while refreshing, or the refresh error itself.
    pub async fn extend(&self) -> Result<DateTime<Utc>> {
        {
            let state = lock(&self.state);
            if matches!(
                state.phase,
                SessionPhase::Unverified | SessionPhase::LoggedOut
            ) {
                return Err(AppError::Session(format!(
                    "cannot extend a session in phase {:?}",
                    state.phase
                )));
            }
        }

        match self.api.refresh().await {
            Ok(()) => {
                let expires_at = Utc::now() + self.policy.extension_window;
                {
                    let mut state = lock(&self.state);
                    // The old logout timer may have fired while the refresh
                    // call was in flight.
                    if state.phase == SessionPhase::LoggedOut {
                        return Err(AppError::Session(
                            "session logged out during refresh".into(),
                        ));
                    }
                    state.phase = SessionPhase::Authenticated;
                }
                self.arm(expires_at);
                let _ = self.event_tx.send(SessionEvent::Extended { expires_at }).await;
                info!(%expires_at, "session extended");
                Ok(expires_at)
            }
            Err(err) => {
                warn!(%err, "refresh failed, forcing logout");
                finish_session(
                    &self.api,
                    &self.state,
                    &self.event_tx,
                    LogoutReason::RefreshFailed,
                )
                .await;
                Err(err)
            }
        }
    }

    /// End the session: disarm, clear local state, best-effort notify the
    /// backend, and emit [`SessionEvent::LoggedOut`]. Idempotent.
    pub async fn logout(&self, reason: LogoutReason) {
        finish_session(&self.api, &self.state, &self.event_tx, reason).await;
    }
}

fn lock(state: &Mutex<LifecycleState>) -> MutexGuard<'_, LifecycleState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Warning action body: open the warning window and notify presentation.
/// The logout action stays scheduled at the original expiry.
async fn fire_warning(
    state: &Mutex<LifecycleState>,
    event_tx: &mpsc::Sender<SessionEvent>,
    seconds_remaining: u32,
) {
    {
        let mut state = lock(state);
        if !state.phase.can_transition_to(SessionPhase::WarningShown) {
            debug!(phase = ?state.phase, "warning fired outside a live session, ignored");
            return;
        }
        state.phase = SessionPhase::WarningShown;
    }
    info!(seconds_remaining, "session expiry warning");
    let _ = event_tx
        .send(SessionEvent::WarningDue { seconds_remaining })
        .await;
}

/// Shared logout path for the expiry timer, extend failure, and user choice.
async fn finish_session(
    api: &ApiClient,
    state: &Mutex<LifecycleState>,
    event_tx: &mpsc::Sender<SessionEvent>,
    reason: LogoutReason,
) {
    {
        let mut state = lock(state);
        if state.phase == SessionPhase::LoggedOut {
            return;
        }
        if let Some(timers) = state.timers.take() {
            timers.cancel();
        }
        state.phase = SessionPhase::LoggedOut;
        state.expires_at = None;
    }
    info!(%reason, "session ended");

    // Local state is the source of truth once logout is decided; the
    // endpoint call cannot block or fail it.
    api.logout().await;

    let _ = event_tx.send(SessionEvent::LoggedOut { reason }).await;
}
