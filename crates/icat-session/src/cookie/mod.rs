//! Session cookie codec.
//!
//! Translates between the `Cookie` / `Set-Cookie` header text exchanged with the browser and the
//! [`SessionId`](crate::SessionId) it carries. Nothing in here talks to the catalogue service.

mod cookie_error;
mod options;
mod session_cookie;
mod value;

pub use cookie_error::{CookieDecodeError, CookieEncodeError};
pub use options::{CookieOptions, Expiry, SameSite};
pub use session_cookie::{SessionCookie, DEFAULT_COOKIE_NAME, SET_COOKIE_HEADER};
