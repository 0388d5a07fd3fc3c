//! One request's worth of session handling.

use tracing::{debug, info};

use crate::{CatalogueService, Credentials, Session, SessionCookie, SessionError};

/// An active session ready for use by the rest of the request.
#[derive(Debug)]
pub struct Established<C> {
    /// The active session
    pub session: Session<C>,
    /// Whether the session id from the incoming cookie was reused
    pub resumed: bool,
    /// `Set-Cookie` header value to send back. Only present when a new session id was issued.
    pub set_cookie: Option<String>,
}

/// Resumes the session named by the incoming `Cookie` header, or logs in when that fails.
///
/// Without `credentials` a failed resume is returned as is, or as
/// [`SessionError::NoCredentials`] when there was nothing to resume. A session id that cannot be
/// written into the cookie is logged out again before the error is returned.
pub async fn resume_or_login<C: CatalogueService>(
    client: C,
    cookie: &SessionCookie,
    cookie_header: Option<&str>,
    credentials: Option<&Credentials>,
) -> Result<Established<C>, SessionError> {
    let mut session = Session::new(client);
    let presented = cookie.decode(cookie_header);
    let had_cookie = presented.is_some();

    let resume_error = match session.resume(presented).await {
        Ok(()) => {
            return Ok(Established {
                session,
                resumed: true,
                set_cookie: None,
            })
        }
        Err(e) => e,
    };

    let Some(credentials) = credentials else {
        debug!(error = %resume_error, "Not logging in, no credentials supplied");
        return Err(if had_cookie {
            resume_error
        } else {
            SessionError::NoCredentials
        });
    };

    // Only an absent or rejected id is worth replacing; an unreachable service stays unreachable
    if !matches!(resume_error, SessionError::Invalid) {
        return Err(resume_error);
    }

    info!("Logging in to replace missing or rejected session");
    let encoded = {
        let session_id = session.login(credentials).await?;
        cookie.encode(session_id)
    };
    match encoded {
        Ok(set_cookie) => Ok(Established {
            session,
            resumed: false,
            set_cookie: Some(set_cookie),
        }),
        Err(e) => {
            session.close().await;
            Err(e.into())
        }
    }
}

/// Closes `session` and returns the `Set-Cookie` header value that clears the client's cookie.
pub async fn logout<C: CatalogueService>(
    session: &mut Session<C>,
    cookie: &SessionCookie,
) -> String {
    session.close().await;
    cookie.clear()
}
