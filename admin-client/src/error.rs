use keycloak::KeycloakError;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::error::Error),
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Request failed ({status}): {text}")]
    Http { status: u16, text: String },
    #[error("Not authorized")]
    NotAuthorized,
    #[error("{0} not found")]
    NotFound(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    fn from_status(status: u16, text: String) -> Self {
        match StatusCode::from_u16(status) {
            Ok(StatusCode::UNAUTHORIZED) => Self::NotAuthorized,
            _ => Self::Http { status, text },
        }
    }

    /// Build an error from a non-success response.
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        Self::from_status(status.as_u16(), text)
    }

    /// Check if the provider rejected the request because of missing authentication.
    pub fn is_not_authorized(&self) -> bool {
        matches!(self, Self::NotAuthorized)
    }

    /// The HTTP status the provider responded with, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::NotAuthorized => Some(StatusCode::UNAUTHORIZED.as_u16()),
            _ => None,
        }
    }
}

impl From<KeycloakError> for Error {
    fn from(err: KeycloakError) -> Self {
        match err {
            KeycloakError::ReqwestFailure(err) => Self::Transport(err),
            KeycloakError::HttpFailure { status, text, .. } => Self::from_status(status, text),
        }
    }
}
