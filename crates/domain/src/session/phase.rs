//! Coarse session state for display and branching.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the client stands with respect to authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No session token is stored.
    #[default]
    LoggedOut,
    /// A login with stored credentials is in flight.
    LoggingIn,
    /// A session token is stored.
    LoggedIn,
}

impl SessionPhase {
    /// Phase implied by the stored token alone.
    #[must_use]
    pub const fn from_token_present(present: bool) -> Self {
        if present { Self::LoggedIn } else { Self::LoggedOut }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LoggedOut => "logged out",
            Self::LoggingIn => "logging in",
            Self::LoggedIn => "logged in",
        })
    }
}
