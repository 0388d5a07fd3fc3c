use serde::{Deserialize, Serialize};

/// Opaque session token issued by the catalogue service at login.
///
/// It is a bearer secret: `Debug` output is redacted and there is no `Display` impl, so it cannot
/// end up in a log line by accident. Use [`expose`](Self::expose) where the raw value is required.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wraps a raw session token.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw token.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

// We manually implement Debug to make sure we don't print the token
impl std::fmt::Debug for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SessionId").field(&"[REDACTED]").finish()
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}
