use payloads::ClientError;
use reqwest::StatusCode;
use std::sync::Arc;

pub const GENERIC_ERROR_MESSAGE: &str =
    "An unexpected error occurred. Please try again.";

/// Errors surfaced by queries and mutations.
///
/// Cloneable so that one failed request can be handed to every caller that
/// was waiting on it and kept in the cache entry.
#[derive(Debug, Clone, thiserror::Error)]
pub enum QueryError {
    #[error(transparent)]
    Client(Arc<ClientError>),
    #[error("Request was cancelled")]
    Cancelled,
    /// The query has no id to look up and never fetches.
    #[error("Query is disabled")]
    Disabled,
    #[error("{0}")]
    InvalidInput(String),
    #[error("Cached value for {0} has an unexpected type")]
    TypeMismatch(String),
}

impl From<ClientError> for QueryError {
    fn from(e: ClientError) -> Self {
        Self::Client(Arc::new(e))
    }
}

impl QueryError {
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            Self::Client(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.client_error().is_some_and(ClientError::is_not_found)
    }

    /// Text for a toast or alert after a failed action.
    pub fn user_message(&self) -> String {
        match self {
            Self::Client(e) => match e.as_ref() {
                ClientError::APIError(StatusCode::CONFLICT, _) => {
                    "Email already exists or invalid credentials.".into()
                }
                ClientError::APIError(_, text) if !text.trim().is_empty() => {
                    text.clone()
                }
                ClientError::Network(_) => {
                    "Failed to connect to the server.".into()
                }
                _ => GENERIC_ERROR_MESSAGE.into(),
            },
            Self::InvalidInput(message) => message.clone(),
            Self::Cancelled | Self::Disabled | Self::TypeMismatch(_) => {
                GENERIC_ERROR_MESSAGE.into()
            }
        }
    }
}
