/// Reasons an incoming `Cookie` header did not yield a session id.
///
/// These never leave the codec: [`SessionCookie::decode`](super::SessionCookie::decode) logs them
/// and reports "no candidate session".
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CookieDecodeError {
    /// The request carried no `Cookie` header at all
    #[error("No Cookie header present")]
    MissingHeader,

    /// The header carried cookies, but not the session cookie
    #[error("Cookie not found: {name}")]
    NotFound {
        /// Name of the cookie that was looked for
        name: String,
    },

    /// The session cookie was present with an empty value
    #[error("Cookie value is empty")]
    EmptyValue,

    /// The value contains octets not allowed in a cookie value
    #[error("Cookie value contains illegal characters")]
    IllegalOctet,

    /// A quoted value is missing its closing quote
    #[error("Cookie value has an unterminated quoted string")]
    UnterminatedQuote,

    /// A quoted value contains a malformed escape sequence
    #[error("Cookie value has a malformed escape sequence")]
    BadEscape,
}

/// Errors rendering a `Set-Cookie` header.
///
/// Messages never contain the cookie value.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CookieEncodeError {
    /// The cookie name is not an RFC 6265 token
    #[error("Invalid cookie name: {0:?}")]
    InvalidName(String),

    /// The session id cannot be carried in a cookie value
    #[error("Session id cannot be represented as a cookie value: {reason}")]
    UnrepresentableValue {
        /// Why the value was refused
        reason: &'static str,
    },

    /// A cookie attribute (path, domain, max-age) is not usable
    #[error("Invalid cookie attribute {attribute}: {reason}")]
    InvalidAttribute {
        /// Attribute name as it appears in the header
        attribute: &'static str,
        /// Why the attribute was refused
        reason: String,
    },
}
