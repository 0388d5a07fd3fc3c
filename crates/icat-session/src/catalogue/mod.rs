//! The catalogue service as seen by the session layer.
//!
//! [`CatalogueService`] is the only seam between session lifecycle logic and a concrete remote
//! client. [`RestCatalogueClient`](crate::RestCatalogueClient) implements it over the ICAT REST
//! API; tests substitute in-memory fakes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

mod catalogue_error;
mod credentials;
mod session_id;

pub use catalogue_error::{CatalogueError, SESSION_ERROR_CODE};
pub use credentials::Credentials;
pub use session_id::SessionId;

/// What the catalogue service knows about a live session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    /// Authenticated user, as `plugin/name` or plain name depending on the server
    pub user_name: String,
    /// Minutes until the session expires unless refreshed
    pub remaining_minutes: f64,
}

/// Outcome of asking the catalogue service whether a session id is still live.
#[derive(Clone, Debug, PartialEq)]
pub enum Validation {
    /// The session is live
    Valid(SessionInfo),
    /// The session id is unknown, expired or was invalidated
    Invalid,
}

/// A catalogue request issued on behalf of an authenticated session.
#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    /// JPQL-style or concise ICAT search
    Search {
        /// Query text
        query: String,
    },
    /// Create or update entities, given as ICAT JSON
    Write {
        /// Entities to write
        entities: serde_json::Value,
    },
    /// Delete entities, given as ICAT JSON
    Delete {
        /// Entities to delete
        entities: serde_json::Value,
    },
}

/// Remote capability needed to keep a cookie-carried session alive.
///
/// Implementations bound every call with their own timeout and report a timeout as
/// [`CatalogueError::Unavailable`].
#[async_trait::async_trait]
pub trait CatalogueService: Send + Sync {
    /// Logs in and returns a fresh session id.
    ///
    /// Fails with [`CatalogueError::AuthenticationFailed`] for bad credentials.
    async fn authenticate(&self, credentials: &Credentials) -> Result<SessionId, CatalogueError>;

    /// Checks whether `session_id` still denotes a live session.
    ///
    /// A rejected session id is `Ok(Validation::Invalid)`, not an error.
    async fn validate(&self, session_id: &SessionId) -> Result<Validation, CatalogueError>;

    /// Logs out. Callers treat this as best-effort.
    async fn invalidate(&self, session_id: &SessionId) -> Result<(), CatalogueError>;

    /// Extends the lifetime of a live session.
    async fn refresh(&self, session_id: &SessionId) -> Result<(), CatalogueError>;

    /// Runs `operation` as the session's user.
    ///
    /// Fails with [`CatalogueError::SessionExpired`] when the session is gone.
    async fn invoke(
        &self,
        session_id: &SessionId,
        operation: Operation,
    ) -> Result<serde_json::Value, CatalogueError>;
}

#[async_trait::async_trait]
impl<T: CatalogueService + ?Sized> CatalogueService for Arc<T> {
    async fn authenticate(&self, credentials: &Credentials) -> Result<SessionId, CatalogueError> {
        (**self).authenticate(credentials).await
    }

    async fn validate(&self, session_id: &SessionId) -> Result<Validation, CatalogueError> {
        (**self).validate(session_id).await
    }

    async fn invalidate(&self, session_id: &SessionId) -> Result<(), CatalogueError> {
        (**self).invalidate(session_id).await
    }

    async fn refresh(&self, session_id: &SessionId) -> Result<(), CatalogueError> {
        (**self).refresh(session_id).await
    }

    async fn invoke(
        &self,
        session_id: &SessionId,
        operation: Operation,
    ) -> Result<serde_json::Value, CatalogueError> {
        (**self).invoke(session_id, operation).await
    }
}
