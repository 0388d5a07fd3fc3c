use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CookieEncodeError;

/// When the browser should discard the session cookie.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expiry {
    /// No `Expires`/`Max-Age`; the cookie lives until the browser session ends
    Session,
    /// Absolute expiry, rendered as `Expires=<IMF-fixdate>`
    At(DateTime<Utc>),
    /// Relative expiry, rendered as `Max-Age=<seconds>`
    MaxAge(chrono::Duration),
}

/// SameSite cookie attribute for cross-site request policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SameSite {
    /// Cookie only sent to same-site requests
    Strict,
    /// Cookie sent to same-site and top-level navigation
    Lax,
    /// Cookie sent to all requests (requires Secure=true in most browsers)
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        })
    }
}

/// Attributes attached to every `Set-Cookie` header for the session cookie.
///
/// The defaults are the most restrictive choice: a browser-session cookie scoped to the host
/// only, sent over HTTPS only, hidden from scripts and withheld from cross-site requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CookieOptions {
    /// Cookie expiration policy
    pub expiry: Expiry,
    /// Cookie path
    pub path: String,
    /// Cookie domain, `None` for a host-only cookie
    pub domain: Option<String>,
    /// Secure attribute (HTTPS-only)
    pub secure: bool,
    /// HttpOnly attribute (prevents JavaScript access)
    pub http_only: bool,
    /// SameSite attribute (CSRF protection)
    pub same_site: SameSite,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            expiry: Expiry::Session,
            path: "/".to_string(),
            domain: None,
            secure: true,
            http_only: true,
            same_site: SameSite::Strict,
        }
    }
}

impl CookieOptions {
    /// Checks that every attribute can be rendered into a header.
    pub(super) fn validate(&self) -> Result<(), CookieEncodeError> {
        if !self.path.starts_with('/') {
            return Err(CookieEncodeError::InvalidAttribute {
                attribute: "Path",
                reason: "must start with '/'".to_string(),
            });
        }
        check_attribute_value("Path", &self.path)?;

        if let Some(domain) = &self.domain {
            if domain.is_empty() {
                return Err(CookieEncodeError::InvalidAttribute {
                    attribute: "Domain",
                    reason: "must not be empty".to_string(),
                });
            }
            check_attribute_value("Domain", domain)?;
        }

        if let Expiry::MaxAge(max_age) = &self.expiry {
            if *max_age < chrono::Duration::zero() {
                return Err(CookieEncodeError::InvalidAttribute {
                    attribute: "Max-Age",
                    reason: "must not be negative".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Logs warnings for options weaker than the defaults.
    pub(super) fn warn_if_weak(&self, cookie_name: &str) {
        if !self.secure {
            tracing::warn!(
                cookie_name = %cookie_name,
                "Session cookie missing Secure attribute - vulnerable to non-HTTPS transmission"
            );
        }
        if !self.http_only {
            tracing::warn!(
                cookie_name = %cookie_name,
                "Session cookie missing HttpOnly attribute - vulnerable to JavaScript access"
            );
        }
        if self.same_site == SameSite::None {
            tracing::warn!(
                cookie_name = %cookie_name,
                "Session cookie using SameSite=None - vulnerable to cross-site requests"
            );
        }
    }
}

// av-octet from RFC 6265: any CHAR except CTLs or ";"
fn check_attribute_value(attribute: &'static str, value: &str) -> Result<(), CookieEncodeError> {
    if value.bytes().all(|b| (0x20..=0x7E).contains(&b) && b != b';') {
        Ok(())
    } else {
        Err(CookieEncodeError::InvalidAttribute {
            attribute,
            reason: "contains control characters, non-ASCII characters or ';'".to_string(),
        })
    }
}
