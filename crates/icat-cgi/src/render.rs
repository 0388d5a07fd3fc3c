use std::fmt;

use icat_session::{SessionError, SET_COOKIE_HEADER};

/// A complete CGI response: optional status, headers, a blank line, then the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CgiResponse {
    pub status: Option<&'static str>,
    pub headers: Vec<(&'static str, String)>,
    pub content_type: &'static str,
    pub body: String,
}

impl CgiResponse {
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            status: None,
            headers: Vec::new(),
            content_type: "text/plain; charset=utf-8",
            body: body.into(),
        }
    }

    pub fn json(value: &serde_json::Value) -> Self {
        Self {
            content_type: "application/json",
            ..Self::text(format!("{value:#}\n"))
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: &'static str) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_set_cookie(mut self, set_cookie: Option<String>) -> Self {
        if let Some(set_cookie) = set_cookie {
            self.headers.push((SET_COOKIE_HEADER, set_cookie));
        }
        self
    }

    /// The response for a failed session operation.
    pub fn from_error(e: &SessionError) -> Self {
        let status = match e {
            SessionError::Invalid
            | SessionError::NoCredentials
            | SessionError::Authentication(_)
            | SessionError::Expired => "401 Unauthorized",
            SessionError::RemoteUnavailable(_) => "503 Service Unavailable",
            SessionError::Service { .. } => "502 Bad Gateway",
            _ => "500 Internal Server Error",
        };
        Self::text(format!("{e}\n")).with_status(status)
    }
}

impl fmt::Display for CgiResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(status) = self.status {
            writeln!(f, "Status: {status}")?;
        }
        for (name, value) in &self.headers {
            writeln!(f, "{name}: {value}")?;
        }
        writeln!(f, "Content-Type: {}", self.content_type)?;
        writeln!(f)?;
        f.write_str(&self.body)
    }
}
