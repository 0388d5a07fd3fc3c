//! Errors surfaced to request-handling code

use thiserror::Error;

use crate::{cookie::CookieEncodeError, session::SessionState, CatalogueError};

/// Errors from the session lifecycle.
///
/// Authentication failures and an unreachable service are separate variants so that callers can
/// tell "bad credentials" from "service unavailable".
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session id was missing or rejected while resuming. Recover by logging in.
    #[error("No valid session to resume")]
    Invalid,

    /// The credentials were rejected
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The catalogue service could not be reached or did not answer in time
    #[error("The catalogue service is unavailable: {0}")]
    RemoteUnavailable(String),

    /// The catalogue service dropped an active session mid-request
    #[error("The session has expired")]
    Expired,

    /// An operation needing an active session was called on one that is not
    #[error("The session is not active (state: {0:?})")]
    NotActive(SessionState),

    /// The operation is not allowed from the current state
    #[error("Cannot {operation} a session in state {state:?}")]
    InvalidState {
        /// What was attempted
        operation: &'static str,
        /// State at the time
        state: SessionState,
    },

    /// Resuming failed and no credentials were supplied to log in with
    #[error("No valid session and no credentials to log in with")]
    NoCredentials,

    /// The catalogue service refused an operation for a reason other than the session
    #[error("Catalogue error {code}: {message}")]
    Service {
        /// ICAT error code or HTTP status
        code: String,
        /// Message from the server
        message: String,
    },

    /// The session id could not be written into a cookie
    #[error(transparent)]
    Cookie(#[from] CookieEncodeError),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<CatalogueError> for SessionError {
    fn from(e: CatalogueError) -> Self {
        match e {
            CatalogueError::AuthenticationFailed(message) => Self::Authentication(message),
            CatalogueError::SessionExpired => Self::Expired,
            CatalogueError::Unavailable(message) => Self::RemoteUnavailable(message),
            CatalogueError::Server { code, message } => Self::Service { code, message },
            CatalogueError::Response { status, message } if status.is_server_error() => {
                Self::RemoteUnavailable(format!("[{status}] {message}"))
            }
            CatalogueError::Response { status, message } => Self::Service {
                code: status.as_u16().to_string(),
                message,
            },
            CatalogueError::Serde(e) => {
                Self::RemoteUnavailable(format!("unexpected response from server: {e}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    #[test]
    fn catalogue_errors_are_classified() {
        assert!(matches!(
            SessionError::from(CatalogueError::AuthenticationFailed("nope".into())),
            SessionError::Authentication(message) if message == "nope"
        ));
        assert!(matches!(
            SessionError::from(CatalogueError::SessionExpired),
            SessionError::Expired
        ));
        assert!(matches!(
            SessionError::from(CatalogueError::Unavailable("timed out".into())),
            SessionError::RemoteUnavailable(_)
        ));
        assert!(matches!(
            SessionError::from(CatalogueError::Response {
                status: StatusCode::SERVICE_UNAVAILABLE,
                message: String::new(),
            }),
            SessionError::RemoteUnavailable(_)
        ));
        assert!(matches!(
            SessionError::from(CatalogueError::Response {
                status: StatusCode::BAD_REQUEST,
                message: "bad".into(),
            }),
            SessionError::Service { code, .. } if code == "400"
        ));
        assert!(matches!(
            SessionError::from(CatalogueError::Server {
                code: "BAD_PARAMETER".into(),
                message: "bad".into(),
            }),
            SessionError::Service { code, .. } if code == "BAD_PARAMETER"
        ));
    }

    #[test]
    fn authentication_and_unavailable_messages_differ() {
        let auth = SessionError::Authentication("wrong password".into()).to_string();
        let unavailable = SessionError::RemoteUnavailable("timed out".into()).to_string();
        assert_eq!(auth, "Authentication failed: wrong password");
        assert_eq!(
            unavailable,
            "The catalogue service is unavailable: timed out"
        );
    }
}
