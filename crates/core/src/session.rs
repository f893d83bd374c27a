//! Client-side session state.
//!
//! A session is the token the server issued plus the email it was issued
//! for. Having a non-empty token persisted is the only thing that makes the
//! client "signed in"; the token is never inspected or refreshed.

use core::fmt;

use crate::storage::{KeyValueStore, StorageError, keys};

/// A persisted sign-in.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub email: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("email", &self.email)
            .finish()
    }
}

/// Reads and writes the session in a [`KeyValueStore`].
pub struct SessionGate<'a, S: KeyValueStore + ?Sized> {
    storage: &'a S,
}

impl<'a, S: KeyValueStore + ?Sized> SessionGate<'a, S> {
    #[must_use]
    pub const fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    /// Whether a non-empty token is persisted.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// The current session, if signed in.
    ///
    /// The email is empty if only the token survived.
    #[must_use]
    pub fn current(&self) -> Option<Session> {
        let token = self.token()?;
        let email = self.read_text(keys::EMAIL).unwrap_or_default();
        Some(Session { token, email })
    }

    /// Persist a session returned by the server.
    ///
    /// The token is written last, so a failed write never leaves the client
    /// signed in under a stale email.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if either value cannot be written.
    pub fn establish(&self, session: &Session) -> Result<(), StorageError> {
        self.storage.set(keys::EMAIL, session.email.as_bytes())?;
        self.storage.set(keys::TOKEN, session.token.as_bytes())?;
        tracing::debug!(email = %session.email, "session established");
        Ok(())
    }

    /// Forget the persisted session.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if either value cannot be deleted.
    pub fn logout(&self) -> Result<(), StorageError> {
        self.storage.delete(keys::TOKEN)?;
        self.storage.delete(keys::EMAIL)?;
        Ok(())
    }

    fn token(&self) -> Option<String> {
        self.read_text(keys::TOKEN)
            .filter(|token| !token.trim().is_empty())
    }

    fn read_text(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(bytes) => bytes.and_then(|b| String::from_utf8(b).ok()),
            Err(e) => {
                tracing::warn!(error = %e, key, "failed to read session state");
                None
            }
        }
    }
}
