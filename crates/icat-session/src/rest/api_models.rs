use serde::{Deserialize, Serialize};

use crate::Credentials;

/// Body of `POST /icat/session`, sent as the `json` form field.
#[derive(Serialize, Debug)]
pub(super) struct LoginRequest<'a> {
    pub plugin: &'a str,
    /// Each entry is a single-key object, e.g. `{"username": "root"}`
    pub credentials: Vec<serde_json::Map<String, serde_json::Value>>,
}

impl<'a> From<&'a Credentials> for LoginRequest<'a> {
    fn from(credentials: &'a Credentials) -> Self {
        Self {
            plugin: &credentials.plugin,
            credentials: credentials
                .entries
                .iter()
                .map(|(key, value)| {
                    let mut entry = serde_json::Map::new();
                    entry.insert(key.clone(), serde_json::Value::String(value.clone()));
                    entry
                })
                .collect(),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(super) struct LoginResponse {
    pub session_id: String,
}

/// Error body returned by ICAT for every failed call.
#[derive(Deserialize, Debug)]
pub(super) struct IcatErrorResponse {
    pub code: String,
    pub message: String,
}
