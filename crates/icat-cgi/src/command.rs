use std::path::PathBuf;

use clap::{Parser, Subcommand};
use icat_session::{CatalogueSettings, Credentials, SessionError};
use inquire::{error::InquireResult, Password};

use crate::config::LoginDefaults;

/// Environment variable a CGI server uses for the incoming `Cookie` header.
pub const COOKIE_ENV: &str = "HTTP_COOKIE";

const DEFAULT_AUTH: &str = "simple";

#[derive(Parser, Clone, Debug)]
#[command(
    name = "icat-cgi",
    version,
    about = "Keep an ICAT session alive across CGI requests",
    long_about = None
)]
pub struct Cli {
    // Optional as a workaround for https://github.com/clap-rs/clap/issues/3572
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(
        short = 'c',
        long,
        global = true,
        env = "ICAT_CFG",
        requires = "section",
        help = "TOML configuration file"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        short = 's',
        long,
        global = true,
        env = "ICAT_CFG_SECTION",
        help = "Section of the configuration file to use"
    )]
    pub section: Option<String>,

    #[arg(
        long,
        global = true,
        help = "Base URL of the ICAT server. Overrides ICAT_URL."
    )]
    pub url: Option<String>,

    #[arg(
        long,
        global = true,
        env = COOKIE_ENV,
        help = "Incoming Cookie header"
    )]
    pub cookie: Option<String>,

    #[arg(
        short = 'a',
        long,
        global = true,
        env = "ICAT_AUTH",
        help = "Authentication plugin [default: simple]"
    )]
    pub auth: Option<String>,

    #[arg(short = 'u', long, global = true, env = "ICAT_USER", help = "User name")]
    pub user: Option<String>,

    #[arg(
        short = 'p',
        long,
        global = true,
        env = "ICAT_PASS",
        hide_env_values = true,
        help = "Password"
    )]
    pub pass: Option<String>,

    #[arg(
        short = 'P',
        long,
        global = true,
        help = "Prompt for the password when it is not given"
    )]
    pub prompt_pass: bool,
}

#[derive(Subcommand, Clone, Debug, PartialEq, Eq)]
pub enum Commands {
    #[command(long_about = "Resume the session from the cookie, or log in and set the cookie.")]
    Login,

    #[command(long_about = "Show who the session from the cookie belongs to. Never logs in.")]
    Whoami,

    #[command(long_about = "Run an ICAT search, logging in first if the cookie is stale.")]
    Search {
        #[arg(help = "JPQL or concise ICAT query")]
        query: String,
    },

    #[command(long_about = "Log out of the session from the cookie and clear the cookie.")]
    Logout,
}

impl Cli {
    /// Settings from `file`, overridden by `ICAT_*` variables read through `lookup`, overridden
    /// in turn by flags.
    pub fn settings(
        &self,
        file: CatalogueSettings,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<CatalogueSettings, SessionError> {
        let mut settings = file.with_lookup(lookup)?;
        if let Some(url) = &self.url {
            settings.url = url.clone();
        }
        Ok(settings)
    }

    /// Credentials to log in with, if a user was given and a password is available.
    ///
    /// Flags and their environment variables take precedence over `defaults` from the
    /// configuration file.
    pub fn credentials(&self, defaults: &LoginDefaults) -> InquireResult<Option<Credentials>> {
        let Some(user) = self.user.as_ref().or(defaults.username.as_ref()) else {
            return Ok(None);
        };
        let auth = self
            .auth
            .as_deref()
            .or(defaults.auth.as_deref())
            .unwrap_or(DEFAULT_AUTH);
        let prompt_pass = self.prompt_pass || defaults.prompt_pass;

        let password = match (self.pass.as_ref().or(defaults.password.as_ref()), prompt_pass) {
            (Some(pass), _) => pass.clone(),
            (None, true) => Password::new("Password").without_confirmation().prompt()?,
            (None, false) => return Ok(None),
        };
        Ok(Some(Credentials::username_password(auth, user, password)))
    }
}
