use std::{env, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    cookie::{CookieEncodeError, CookieOptions, Expiry, SameSite, DEFAULT_COOKIE_NAME},
    SessionCookie, SessionError,
};

/// Where the catalogue service lives and how to talk to it.
///
/// Defaults to
///
/// ```
/// # use icat_session::{CatalogueSettings, CookieSettings};
/// let settings = CatalogueSettings {
///     url: "https://localhost:8181".to_string(),
///     timeout_secs: 30,
///     user_agent: concat!("icat-session/", env!("CARGO_PKG_VERSION")).to_string(),
///     check_cert: true,
///     cookie: CookieSettings::default(),
/// };
/// let default = CatalogueSettings::default();
/// # assert_eq!(settings, default);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct CatalogueSettings {
    /// Base URL of the ICAT server, without the `/icat` suffix
    pub url: String,
    /// Upper bound in seconds for every remote call
    pub timeout_secs: u64,
    /// User agent sent with every request
    pub user_agent: String,
    /// Verify the server's TLS certificate. Only disable for test servers.
    pub check_cert: bool,
    /// Session cookie name and attributes
    pub cookie: CookieSettings,
}

impl Default for CatalogueSettings {
    fn default() -> Self {
        Self {
            url: "https://localhost:8181".into(),
            timeout_secs: 30,
            user_agent: concat!("icat-session/", env!("CARGO_PKG_VERSION")).into(),
            check_cert: true,
            cookie: CookieSettings::default(),
        }
    }
}

impl CatalogueSettings {
    /// Reads settings from `ICAT_*` environment variables, falling back to the defaults.
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `ICAT_URL` | `url` |
    /// | `ICAT_TIMEOUT` | `timeout_secs` |
    /// | `ICAT_CHECK_CERT` | `check_cert` |
    /// | `ICAT_COOKIE_NAME` | `cookie.name` |
    /// | `ICAT_COOKIE_PATH` | `cookie.path` |
    /// | `ICAT_COOKIE_DOMAIN` | `cookie.domain` |
    /// | `ICAT_COOKIE_INSECURE` | `!cookie.secure` |
    pub fn from_env() -> Result<Self, SessionError> {
        Self::default().with_env()
    }

    /// Applies the `ICAT_*` environment variables listed in [`from_env`](Self::from_env) on top
    /// of `self`, so that settings loaded from a file can be overridden per deployment.
    pub fn with_env(self) -> Result<Self, SessionError> {
        self.with_lookup(|key| env::var(key).ok())
    }

    /// Like [`with_env`](Self::with_env), reading variables through `lookup`.
    pub fn with_lookup(
        self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, SessionError> {
        let mut settings = self;

        if let Some(url) = lookup("ICAT_URL") {
            settings.url = url;
        }
        if let Some(timeout) = lookup("ICAT_TIMEOUT") {
            settings.timeout_secs = timeout.trim().parse().map_err(|_| {
                SessionError::Configuration(format!(
                    "ICAT_TIMEOUT must be a whole number of seconds, got {timeout:?}"
                ))
            })?;
        }
        if let Some(check_cert) = lookup("ICAT_CHECK_CERT") {
            settings.check_cert = parse_flag("ICAT_CHECK_CERT", &check_cert)?;
        }
        if let Some(name) = lookup("ICAT_COOKIE_NAME") {
            settings.cookie.name = name;
        }
        if let Some(path) = lookup("ICAT_COOKIE_PATH") {
            settings.cookie.path = path;
        }
        if let Some(domain) = lookup("ICAT_COOKIE_DOMAIN") {
            settings.cookie.domain = Some(domain).filter(|d| !d.is_empty());
        }
        if let Some(insecure) = lookup("ICAT_COOKIE_INSECURE") {
            settings.cookie.secure = !parse_flag("ICAT_COOKIE_INSECURE", &insecure)?;
        }

        Ok(settings)
    }

    /// Timeout applied to each remote call
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, SessionError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(SessionError::Configuration(format!(
            "{key} must be true or false, got {value:?}"
        ))),
    }
}

/// Serializable form of a [`SessionCookie`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct CookieSettings {
    /// Cookie name. Defaults to `ICATSESSIONID`.
    pub name: String,
    /// `Path` attribute. Defaults to `/`.
    pub path: String,
    /// `Domain` attribute. Host-only when unset.
    pub domain: Option<String>,
    /// `Secure` attribute
    pub secure: bool,
    /// `HttpOnly` attribute
    pub http_only: bool,
    /// `SameSite` attribute
    pub same_site: SameSite,
    /// Persist the cookie for this many minutes instead of for the browser session.
    pub max_age_minutes: Option<i64>,
}

impl Default for CookieSettings {
    fn default() -> Self {
        let options = CookieOptions::default();
        Self {
            name: DEFAULT_COOKIE_NAME.into(),
            path: options.path,
            domain: options.domain,
            secure: options.secure,
            http_only: options.http_only,
            same_site: options.same_site,
            max_age_minutes: None,
        }
    }
}

impl CookieSettings {
    /// Builds and validates the cookie codec.
    pub fn to_session_cookie(&self) -> Result<SessionCookie, CookieEncodeError> {
        let expiry = match self.max_age_minutes {
            Some(minutes) => {
                let max_age = chrono::Duration::try_minutes(minutes).ok_or_else(|| {
                    CookieEncodeError::InvalidAttribute {
                        attribute: "Max-Age",
                        reason: format!("{minutes} minutes is out of range"),
                    }
                })?;
                Expiry::MaxAge(max_age)
            }
            None => Expiry::Session,
        };
        SessionCookie::new(
            self.name.clone(),
            CookieOptions {
                expiry,
                path: self.path.clone(),
                domain: self.domain.clone(),
                secure: self.secure,
                http_only: self.http_only,
                same_site: self.same_site,
            },
        )
    }
}
