/// Login credentials for one ICAT authentication plugin.
///
/// ICAT passes credentials to the authenticator named by `plugin` (`simple`, `db`, `ldap`, ...)
/// as an ordered list of key/value pairs, normally `username` and `password`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Authentication plugin name
    pub plugin: String,
    /// Key/value credential entries, in the order they are sent
    pub entries: Vec<(String, String)>,
}

impl Credentials {
    /// Creates credentials for `plugin` with no entries.
    pub fn new(plugin: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            entries: Vec::new(),
        }
    }

    /// The usual username/password pair.
    pub fn username_password(
        plugin: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self::new(plugin)
            .with("username", username)
            .with("password", password)
    }

    /// Appends a credential entry.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    /// The `username` entry, if any.
    pub fn username(&self) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == "username")
            .map(|(_, value)| value.as_str())
    }
}

// Only the username is shown; every other value may be a secret
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries: Vec<(&str, &str)> = self
            .entries
            .iter()
            .map(|(key, value)| {
                if key == "username" {
                    (key.as_str(), value.as_str())
                } else {
                    (key.as_str(), "[REDACTED]")
                }
            })
            .collect();
        f.debug_struct("Credentials")
            .field("plugin", &self.plugin)
            .field("entries", &entries)
            .finish()
    }
}
