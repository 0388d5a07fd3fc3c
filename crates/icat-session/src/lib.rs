#![doc = include_str!("../README.md")]

mod catalogue;
pub mod cookie;
mod error;
mod request;
mod rest;
mod session;
mod settings;

pub use catalogue::{
    CatalogueError, CatalogueService, Credentials, Operation, SessionId, SessionInfo, Validation,
    SESSION_ERROR_CODE,
};
pub use cookie::{CookieOptions, Expiry, SameSite, SessionCookie, SET_COOKIE_HEADER};
pub use error::SessionError;
pub use request::{logout, resume_or_login, Established};
pub use rest::RestCatalogueClient;
pub use session::{Session, SessionState};
pub use settings::{CatalogueSettings, CookieSettings};
