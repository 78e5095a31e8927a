//! Bearer token storage for an [`APIClient`](crate::APIClient).

use secrecy::{ExposeSecret, SecretString};
use std::sync::{Arc, PoisonError, RwLock};

/// The authentication state of one simulated user.
///
/// Cloning a session shares the token: every client built from the same
/// session sees a token as soon as it is set. Separate sessions are fully
/// independent, so several users can be driven from one process.
#[derive(Clone, Default)]
pub struct Session {
    token: Arc<RwLock<Option<SecretString>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.set_token(token);
        session
    }

    /// Replace the stored token. Takes effect for the next request.
    pub fn set_token(&self, token: impl Into<String>) {
        let token: String = token.into();
        *self.token.write().unwrap_or_else(PoisonError::into_inner) =
            Some(SecretString::from(token));
    }

    pub fn clear(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// The value of the `Authorization` header, if a token is set.
    pub(crate) fn authorization(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|token| format!("Bearer {}", token.expose_secret()))
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("is_authenticated", &self.is_authenticated())
            .finish()
    }
}
