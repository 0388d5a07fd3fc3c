//! Named sections of a TOML configuration file.
//!
//! ```toml
//! [example_root]
//! url = "https://icat.example.com"
//! checkCert = false
//! auth = "simple"
//! username = "root"
//! promptPass = true
//!
//! [example_root.cookie]
//! name = "JSESSIONID"
//! ```
//!
//! Connection and cookie keys are [`CatalogueSettings`] fields. The login keys `auth`,
//! `username`, `password` and `promptPass` are defaults for the matching command line flags.

use std::{fs, path::Path};

use color_eyre::eyre::{eyre, Result, WrapErr};
use icat_session::CatalogueSettings;
use serde::Deserialize;

const LOGIN_KEYS: [&str; 4] = ["auth", "username", "password", "promptPass"];

/// One section of a configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileConfig {
    pub settings: CatalogueSettings,
    pub login: LoginDefaults,
}

/// Login values a configuration section may provide.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginDefaults {
    pub auth: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub prompt_pass: bool,
}

impl std::fmt::Debug for LoginDefaults {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginDefaults")
            .field("auth", &self.auth)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("prompt_pass", &self.prompt_pass)
            .finish()
    }
}

impl FileConfig {
    /// Reads `section` from the file at `path`.
    pub fn load(path: &Path, section: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content, section)
            .wrap_err_with(|| format!("Invalid config file {}", path.display()))
    }

    /// Parses `section` out of TOML `content`.
    pub fn parse(content: &str, section: &str) -> Result<Self> {
        let mut sections: toml::Table = toml::from_str(content)?;
        let Some(toml::Value::Table(mut table)) = sections.remove(section) else {
            return Err(eyre!("No section [{section}]"));
        };

        let login: toml::Table = LOGIN_KEYS
            .iter()
            .filter_map(|key| table.remove(*key).map(|value| (key.to_string(), value)))
            .collect();

        Ok(Self {
            settings: toml::Value::Table(table)
                .try_into()
                .wrap_err_with(|| format!("Section [{section}]"))?,
            login: toml::Value::Table(login)
                .try_into()
                .wrap_err_with(|| format!("Section [{section}]"))?,
        })
    }
}
