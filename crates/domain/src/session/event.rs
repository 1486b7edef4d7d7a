//! Session lifecycle notifications.

use super::SessionState;

/// Notification published to session subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A response introduced a new session token. Carries the session as
    /// persisted after the token was stored.
    Login(Box<SessionState>),
    /// Stored credentials were rejected, or the user logged out; the session
    /// token has been cleared.
    Logout,
}

impl SessionEvent {
    /// Channel name of this notification.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Login(_) => "login",
            Self::Logout => "logout",
        }
    }

    /// Creates a login notification from a session snapshot.
    #[must_use]
    pub fn login(state: SessionState) -> Self {
        Self::Login(Box::new(state))
    }
}
