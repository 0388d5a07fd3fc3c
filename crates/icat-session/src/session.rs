//! Lifecycle of one authenticated catalogue session.

use tracing::{debug, info, warn};

use crate::{
    CatalogueError, CatalogueService, Credentials, Operation, SessionError, SessionId,
    SessionInfo, Validation,
};

/// Where a [`Session`] is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No session id and no remote session
    Unauthenticated,
    /// A session id from the client is being validated
    Resuming,
    /// The catalogue service accepted the session id
    Active,
    /// The session id was rejected or a remote call failed. Only login is possible from here.
    Invalid,
    /// Logged out. The handle must not be reused.
    Closed,
}

/// One authenticated connection to the catalogue service, for the duration of one request.
///
/// A session holds at most one [`SessionId`] at a time. Nothing is kept between invocations:
/// the id travels to the client in a cookie and comes back on the next request, where
/// [`resume`](Self::resume) turns it into an active session again.
///
/// Remote calls are never retried. A failed resume is recovered by [`login`](Self::login).
pub struct Session<C> {
    client: C,
    state: SessionState,
    session_id: Option<SessionId>,
    info: Option<SessionInfo>,
}

impl<C: CatalogueService> Session<C> {
    /// Creates an unauthenticated session using `client` for remote calls.
    pub fn new(client: C) -> Self {
        Self {
            client,
            state: SessionState::Unauthenticated,
            session_id: None,
            info: None,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the session can be used for catalogue calls
    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    /// The underlying catalogue client
    pub fn client(&self) -> &C {
        &self.client
    }

    /// User name reported by the last successful validation, if any.
    ///
    /// Known after [`resume`](Self::resume) or [`info`](Self::info), not right after
    /// [`login`](Self::login).
    pub fn user_name(&self) -> Option<&str> {
        self.info.as_ref().map(|info| info.user_name.as_str())
    }

    /// What the last successful validation reported, without another remote call.
    pub fn cached_info(&self) -> Option<&SessionInfo> {
        self.info.as_ref()
    }

    /// Picks up the session named by a session id the client sent back.
    ///
    /// Only allowed on an unauthenticated session. Asks the catalogue service whether the id is
    /// still live and never creates a new remote session. An absent or rejected id fails with
    /// [`SessionError::Invalid`], a transport failure or timeout with
    /// [`SessionError::RemoteUnavailable`]; both leave the session [`SessionState::Invalid`].
    pub async fn resume(&mut self, session_id: Option<SessionId>) -> Result<(), SessionError> {
        if self.state != SessionState::Unauthenticated {
            return Err(SessionError::InvalidState {
                operation: "resume",
                state: self.state,
            });
        }

        let Some(session_id) = session_id else {
            debug!("No session id to resume");
            self.invalidate_locally();
            return Err(SessionError::Invalid);
        };

        self.state = SessionState::Resuming;
        match self.client.validate(&session_id).await {
            Ok(Validation::Valid(info)) => {
                info!(user = %info.user_name, "Resumed catalogue session");
                self.session_id = Some(session_id);
                self.info = Some(info);
                self.state = SessionState::Active;
                Ok(())
            }
            Ok(Validation::Invalid) | Err(CatalogueError::SessionExpired) => {
                info!("Catalogue service rejected the presented session");
                self.invalidate_locally();
                Err(SessionError::Invalid)
            }
            Err(e) => {
                warn!(error = %e, "Could not validate session");
                self.invalidate_locally();
                Err(e.into())
            }
        }
    }

    /// Logs in and binds the freshly issued session id.
    ///
    /// Allowed on an unauthenticated or invalid session. Any previous session id is discarded
    /// first. Bad credentials fail with [`SessionError::Authentication`], an unreachable service
    /// with [`SessionError::RemoteUnavailable`]; both leave the session
    /// [`SessionState::Invalid`].
    pub async fn login(&mut self, credentials: &Credentials) -> Result<&SessionId, SessionError> {
        match self.state {
            SessionState::Unauthenticated | SessionState::Invalid => {}
            state => {
                return Err(SessionError::InvalidState {
                    operation: "log in",
                    state,
                })
            }
        }

        self.session_id = None;
        self.info = None;

        match self.client.authenticate(credentials).await {
            Ok(session_id) => {
                info!(
                    plugin = %credentials.plugin,
                    user = credentials.username().unwrap_or_default(),
                    "Logged in to catalogue service"
                );
                self.state = SessionState::Active;
                Ok(self.session_id.insert(session_id))
            }
            Err(e) => {
                warn!(error = %e, plugin = %credentials.plugin, "Login failed");
                self.state = SessionState::Invalid;
                Err(e.into())
            }
        }
    }

    /// The bound session id. Fails unless the session is active.
    pub fn identifier(&self) -> Result<&SessionId, SessionError> {
        match (self.state, &self.session_id) {
            (SessionState::Active, Some(session_id)) => Ok(session_id),
            (state, _) => Err(SessionError::NotActive(state)),
        }
    }

    /// Logs out and marks the session closed.
    ///
    /// The remote logout is best-effort: if it fails the session is still closed locally, since
    /// what matters is that the client stops presenting the id. Closing a session that is not
    /// active makes no remote call, and closing twice is a no-op.
    pub async fn close(&mut self) {
        if let (SessionState::Active, Some(session_id)) = (self.state, self.session_id.take()) {
            match self.client.invalidate(&session_id).await {
                Ok(()) => debug!("Logged out of catalogue service"),
                Err(e) => warn!(error = %e, "Logout failed, discarding session locally"),
            }
        }
        self.session_id = None;
        self.info = None;
        self.state = SessionState::Closed;
    }

    /// Runs a catalogue operation as the session's user.
    ///
    /// If the catalogue service reports the session gone, the session becomes
    /// [`SessionState::Invalid`] and [`SessionError::Expired`] is returned; log in again or give
    /// up on the request. Transport failures leave the session active.
    pub async fn invoke(
        &mut self,
        operation: Operation,
    ) -> Result<serde_json::Value, SessionError> {
        let result = {
            let session_id = self.identifier()?;
            self.client.invoke(session_id, operation).await
        };
        self.check_expiry(result)
    }

    /// Extends the remote session lifetime.
    pub async fn refresh(&mut self) -> Result<(), SessionError> {
        let result = {
            let session_id = self.identifier()?;
            self.client.refresh(session_id).await
        };
        self.check_expiry(result)?;
        debug!("Refreshed catalogue session");
        Ok(())
    }

    /// Asks the catalogue service who the session belongs to and how long it has left.
    pub async fn info(&mut self) -> Result<SessionInfo, SessionError> {
        let result = {
            let session_id = self.identifier()?;
            self.client.validate(session_id).await
        };
        match result {
            Ok(Validation::Valid(info)) => {
                self.info = Some(info.clone());
                Ok(info)
            }
            Ok(Validation::Invalid) => self.check_expiry(Err(CatalogueError::SessionExpired)),
            Err(e) => self.check_expiry(Err(e)),
        }
    }

    fn check_expiry<T>(&mut self, result: Result<T, CatalogueError>) -> Result<T, SessionError> {
        match result {
            Err(CatalogueError::SessionExpired) => {
                warn!("Catalogue session expired mid-request");
                self.invalidate_locally();
                Err(SessionError::Expired)
            }
            other => other.map_err(SessionError::from),
        }
    }

    fn invalidate_locally(&mut self) {
        self.session_id = None;
        self.info = None;
        self.state = SessionState::Invalid;
    }
}

impl<C> std::fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("session_id", &self.session_id)
            .field("info", &self.info)
            .finish()
    }
}
