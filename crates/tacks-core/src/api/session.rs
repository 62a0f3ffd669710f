//! Session signal gating synchronization.
//!
//! The engine and scheduler never talk to the auth flow directly; they watch
//! a [`SessionStatus`] channel published by whoever owns the sign-in flow.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

/// Authenticated user identity plus the bearer token for API calls.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// Account email
    pub email: String,
    /// Bearer token presented to the API
    pub access_token: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Session")
            .field("email", &self.email)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Tri-state session signal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// No user signed in; all scheduling is gated off
    #[default]
    Unauthenticated,
    /// Sign-in flow in progress
    Loading,
    /// Signed in; synchronization may run
    Authenticated(Session),
}

impl SessionStatus {
    /// Whether synchronization may run.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// The active session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(session) => Some(session),
            _ => None,
        }
    }
}

/// Publisher side of the session signal.
///
/// Owned by the sign-in flow; the engine and scheduler hold subscriptions.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: Arc<watch::Sender<SessionStatus>>,
}

impl SessionHandle {
    /// Create a handle starting in the unauthenticated state.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionStatus::Unauthenticated);
        Self { tx: Arc::new(tx) }
    }

    /// Subscribe to status updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.tx.subscribe()
    }

    /// Mark the sign-in flow as in progress.
    pub fn set_loading(&self) {
        self.tx.send_replace(SessionStatus::Loading);
    }

    /// Publish a signed-in session.
    pub fn sign_in(&self, session: Session) {
        tracing::info!(email = %session.email, "session established");
        self.tx.send_replace(SessionStatus::Authenticated(session));
    }

    /// Clear the session; subscribers discard per-session state.
    pub fn sign_out(&self) {
        tracing::info!("session cleared");
        self.tx.send_replace(SessionStatus::Unauthenticated);
    }

    /// Current status snapshot.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.tx.borrow().clone()
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}
