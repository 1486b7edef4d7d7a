//! Session lifecycle: stored-credential login, logout, phase.

use std::sync::atomic::{AtomicBool, Ordering};

use peach_domain::{SessionEvent, SessionPatch, SessionPhase};

use super::PeachClient;
use super::dispatcher::Credentials;
use crate::error::{ClientError, ClientResult};

/// What [`PeachClient::init`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// No complete credentials were stored; nothing was sent.
    NotAttempted,
    /// The stored credentials were accepted.
    LoggedIn,
}

/// Marks an init login as in flight until dropped.
struct LoggingIn<'a>(&'a AtomicBool);

impl<'a> LoggingIn<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for LoggingIn<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl PeachClient {
    /// Logs in with the stored email and password, if both are present.
    ///
    /// On rejection the stored token is cleared, a `logout` event is
    /// published, and the stored credentials are left in place.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidCredentials`] wrapping the login
    /// failure, or [`ClientError::Store`] if the session cannot be read.
    pub async fn init(&self) -> ClientResult<InitOutcome> {
        let state = self.store.get().await?;
        let Some((email, password)) = state.stored_credentials() else {
            tracing::debug!(namespace = self.store.namespace(), "no stored credentials, skipping login");
            return Ok(InitOutcome::NotAttempted);
        };
        let credentials = Credentials::new(email, password);

        let _guard = LoggingIn::enter(&self.logging_in);
        tracing::info!(email = %credentials.email, "logging in with stored credentials");

        match self.login(&credentials).await {
            Ok(_) => Ok(InitOutcome::LoggedIn),
            Err(error) => {
                tracing::warn!(%error, "stored credentials rejected");
                self.store.set(SessionPatch::new().clear_token()).await?;
                self.publish(SessionEvent::Logout);
                Err(ClientError::InvalidCredentials(Box::new(error)))
            }
        }
    }

    /// Drops the session token and publishes a `logout` event.
    ///
    /// Nothing is sent to the server. Stored credentials are kept.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Store`] if the session cannot be saved.
    pub async fn logout(&self) -> ClientResult<()> {
        self.store.set(SessionPatch::new().clear_token()).await?;
        tracing::info!(namespace = self.store.namespace(), "logged out");
        self.publish(SessionEvent::Logout);
        Ok(())
    }

    /// Returns true if a non-empty token is stored.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Store`] if the session cannot be read.
    pub async fn is_logged_in(&self) -> ClientResult<bool> {
        Ok(self.store.get().await?.is_logged_in())
    }

    /// Current lifecycle phase.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Store`] if the session cannot be read.
    pub async fn phase(&self) -> ClientResult<SessionPhase> {
        if self.logging_in.load(Ordering::SeqCst) {
            return Ok(SessionPhase::LoggingIn);
        }
        Ok(SessionPhase::from_token_present(self.is_logged_in().await?))
    }
}
