use http::HeaderValue;

use super::{
    value::{is_token_char, quote, unquote},
    CookieDecodeError, CookieEncodeError, CookieOptions, Expiry,
};
use crate::SessionId;

/// Cookie name used when none is configured.
pub const DEFAULT_COOKIE_NAME: &str = "ICATSESSIONID";

/// Name of the response header carrying [`SessionCookie::encode`] output.
pub const SET_COOKIE_HEADER: &str = "Set-Cookie";

const CLEARED_EXPIRY: &str = "Expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=0";

/// Carries a [`SessionId`] in a named HTTP cookie.
///
/// The name and attributes are validated once, when the codec is built, so that
/// [`clear`](Self::clear) cannot fail and [`encode`](Self::encode) can only fail on the session
/// id itself.
#[derive(Clone, Debug)]
pub struct SessionCookie {
    name: String,
    options: CookieOptions,
}

impl SessionCookie {
    /// Creates a codec for the cookie `name` with the given attributes.
    ///
    /// Enforces the `__Host-` prefix rules of RFC 6265bis and logs warnings for attributes weaker
    /// than the defaults.
    pub fn new(name: impl Into<String>, options: CookieOptions) -> Result<Self, CookieEncodeError> {
        let name = name.into();
        if name.is_empty() || !name.bytes().all(is_token_char) {
            return Err(CookieEncodeError::InvalidName(name));
        }
        options.validate()?;

        if name.starts_with("__Host-") {
            if options.path != "/" {
                return Err(CookieEncodeError::InvalidAttribute {
                    attribute: "Path",
                    reason: "cookies with the __Host- prefix must have Path=/".to_string(),
                });
            }
            if options.domain.is_some() {
                return Err(CookieEncodeError::InvalidAttribute {
                    attribute: "Domain",
                    reason: "cookies with the __Host- prefix cannot set a domain".to_string(),
                });
            }
        }
        if (name.starts_with("__Host-") || name.starts_with("__Secure-")) && !options.secure {
            return Err(CookieEncodeError::InvalidAttribute {
                attribute: "Secure",
                reason: "prefixed cookies must be Secure".to_string(),
            });
        }

        options.warn_if_weak(&name);
        Ok(Self { name, options })
    }

    /// Cookie name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cookie attributes
    pub fn options(&self) -> &CookieOptions {
        &self.options
    }

    /// Extracts the candidate session id from a raw `Cookie` header.
    ///
    /// Returns `None` when the header is absent, the session cookie is missing, or its value is
    /// malformed. Unrelated cookies in the same header are ignored. The id is not checked against
    /// the catalogue service.
    pub fn decode(&self, header: Option<&str>) -> Option<SessionId> {
        match self.parse(header) {
            Ok(session_id) => Some(session_id),
            Err(e) => {
                tracing::debug!(cookie_name = %self.name, reason = %e, "No usable session cookie");
                None
            }
        }
    }

    pub(crate) fn parse(&self, header: Option<&str>) -> Result<SessionId, CookieDecodeError> {
        let header = strip_header_name(header.ok_or(CookieDecodeError::MissingHeader)?);

        for pair in header.split(';') {
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            if name.trim() == self.name {
                return unquote(value.trim()).map(SessionId::new);
            }
        }

        Err(CookieDecodeError::NotFound {
            name: self.name.clone(),
        })
    }

    /// Renders the `Set-Cookie` header value that hands `session_id` to the client.
    pub fn encode(&self, session_id: &SessionId) -> Result<String, CookieEncodeError> {
        let value = quote(session_id.expose())?;
        let expiry = match &self.options.expiry {
            Expiry::Session => None,
            Expiry::At(at) => Some(format!(
                "Expires={}",
                at.format("%a, %d %b %Y %H:%M:%S GMT")
            )),
            Expiry::MaxAge(max_age) => Some(format!("Max-Age={}", max_age.num_seconds())),
        };
        Ok(self.render(&value, expiry.as_deref()))
    }

    /// Like [`encode`](Self::encode), as an [`http::HeaderValue`].
    pub fn to_header_value(
        &self,
        session_id: &SessionId,
    ) -> Result<HeaderValue, CookieEncodeError> {
        let rendered = self.encode(session_id)?;
        HeaderValue::from_str(&rendered).map_err(|_| CookieEncodeError::UnrepresentableValue {
            reason: "not a valid header value",
        })
    }

    /// Renders a `Set-Cookie` header value that makes the client discard the session cookie.
    ///
    /// Path, domain and security attributes match [`encode`](Self::encode), otherwise the
    /// browser would treat it as a different cookie.
    pub fn clear(&self) -> String {
        self.render("", Some(CLEARED_EXPIRY))
    }

    fn render(&self, value: &str, expiry: Option<&str>) -> String {
        let mut header = format!("{}={}", self.name, value);
        if self.options.secure {
            header.push_str("; Secure");
        }
        header.push_str("; Path=");
        header.push_str(&self.options.path);
        if let Some(domain) = &self.options.domain {
            header.push_str("; Domain=");
            header.push_str(domain);
        }
        if let Some(expiry) = expiry {
            header.push_str("; ");
            header.push_str(expiry);
        }
        if self.options.http_only {
            header.push_str("; HttpOnly");
        }
        header.push_str("; SameSite=");
        header.push_str(&self.options.same_site.to_string());
        header
    }
}

impl Default for SessionCookie {
    fn default() -> Self {
        Self {
            name: DEFAULT_COOKIE_NAME.to_string(),
            options: CookieOptions::default(),
        }
    }
}

/// Accepts both the bare header value and a full `Cookie: ...` line.
fn strip_header_name(header: &str) -> &str {
    let trimmed = header.trim_start();
    match trimmed.split_once(':') {
        Some((label, rest)) if label.trim().eq_ignore_ascii_case("cookie") => rest,
        _ => trimmed,
    }
}
