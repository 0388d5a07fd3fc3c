use reqwest::StatusCode;
use thiserror::Error;

/// ICAT error code for session and authentication failures.
pub const SESSION_ERROR_CODE: &str = "SESSION";

/// Failures reported by a [`CatalogueService`](super::CatalogueService).
///
/// Messages never contain a session id.
#[derive(Debug, Error)]
pub enum CatalogueError {
    /// The credentials were rejected
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The session id is no longer known to the catalogue service
    #[error("The session has expired or was invalidated")]
    SessionExpired,

    /// The catalogue service could not be reached or did not answer in time
    #[error("The catalogue service is unavailable: {0}")]
    Unavailable(String),

    /// The catalogue service answered with an ICAT error
    #[error("Catalogue error {code}: {message}")]
    Server {
        /// ICAT error code, e.g. `BAD_PARAMETER`
        code: String,
        /// Human readable message from the server
        message: String,
    },

    /// The catalogue service answered with an HTTP error that is not an ICAT error
    #[error("Received error message from server: [{status}] {message}")]
    Response {
        /// HTTP status
        status: StatusCode,
        /// Response body
        message: String,
    },

    /// A request or response body could not be (de)serialized
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

// The URL is dropped because ICAT puts the session id in the path
impl From<reqwest::Error> for CatalogueError {
    fn from(e: reqwest::Error) -> Self {
        Self::Unavailable(e.without_url().to_string())
    }
}

impl CatalogueError {
    /// Whether the server signalled an ICAT `SESSION` error or an equivalent HTTP status.
    pub fn is_session_error(&self) -> bool {
        match self {
            Self::SessionExpired => true,
            Self::Server { code, .. } => code == SESSION_ERROR_CODE,
            Self::Response { status, .. } => {
                *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN
            }
            _ => false,
        }
    }
}
