//! [`CatalogueService`] over the ICAT REST API.

use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{
    CatalogueError, CatalogueService, CatalogueSettings, Credentials, Operation, SessionError,
    SessionId, SessionInfo, Validation, SESSION_ERROR_CODE,
};

mod api_models;

use api_models::{IcatErrorResponse, LoginRequest, LoginResponse};

const REDACTED: &str = "[REDACTED]";

/// Talks to an ICAT server's `/icat` REST endpoints.
///
/// Every request is bounded by [`CatalogueSettings::timeout`]. A timeout is reported as
/// [`CatalogueError::Unavailable`] like any other transport failure.
#[derive(Clone, Debug)]
pub struct RestCatalogueClient {
    client: reqwest::Client,
    base_url: Url,
}

impl RestCatalogueClient {
    /// Builds a client from `settings`.
    ///
    /// Fails with [`SessionError::Configuration`] when the URL is not an http(s) URL or the
    /// HTTP client cannot be built.
    pub fn new(settings: &CatalogueSettings) -> Result<Self, SessionError> {
        let base_url = Url::parse(&settings.url).map_err(|e| {
            SessionError::Configuration(format!("Invalid catalogue URL {:?}: {e}", settings.url))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(SessionError::Configuration(format!(
                "Catalogue URL must be http or https, got {:?}",
                settings.url
            )));
        }
        if !settings.check_cert {
            warn!("TLS certificate checking is disabled for the catalogue service");
        }

        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .user_agent(settings.user_agent.as_str())
            .danger_accept_invalid_certs(!settings.check_cert)
            .build()
            .map_err(|e| SessionError::Configuration(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// `<base>/icat/<segments...>`, with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("icat").extend(segments);
        }
        url
    }

    fn session_request(&self, method: Method, session_id: &SessionId) -> reqwest::RequestBuilder {
        debug!(%method, "Calling /icat/session");
        self.client
            .request(method, self.endpoint(&["session", session_id.expose()]))
            .header(reqwest::header::ACCEPT, "application/json")
    }

    fn entity_manager(&self, method: Method) -> reqwest::RequestBuilder {
        debug!(%method, "Calling /icat/entityManager");
        self.client
            .request(method, self.endpoint(&["entityManager"]))
            .header(reqwest::header::ACCEPT, "application/json")
    }
}

#[async_trait::async_trait]
impl CatalogueService for RestCatalogueClient {
    async fn authenticate(&self, credentials: &Credentials) -> Result<SessionId, CatalogueError> {
        let login = serde_json::to_string(&LoginRequest::from(credentials))?;

        debug!(method = %Method::POST, "Calling /icat/session");
        let response = self
            .client
            .post(self.endpoint(&["session"]))
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[("json", login.as_str())])
            .send()
            .await?;

        match parse_json::<LoginResponse>(response, None).await {
            Ok(LoginResponse { session_id }) => Ok(SessionId::new(session_id)),
            Err(CatalogueError::Server { code, message }) if code == SESSION_ERROR_CODE => {
                Err(CatalogueError::AuthenticationFailed(message))
            }
            Err(e) if e.is_session_error() => {
                Err(CatalogueError::AuthenticationFailed(e.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    async fn validate(&self, session_id: &SessionId) -> Result<Validation, CatalogueError> {
        let response = self
            .session_request(Method::GET, session_id)
            .send()
            .await?;

        match parse_json::<SessionInfo>(response, Some(session_id)).await {
            Ok(info) => Ok(Validation::Valid(info)),
            Err(e) if e.is_session_error() || is_not_found(&e) => Ok(Validation::Invalid),
            Err(e) => Err(e),
        }
    }

    async fn invalidate(&self, session_id: &SessionId) -> Result<(), CatalogueError> {
        let response = self
            .session_request(Method::DELETE, session_id)
            .send()
            .await?;
        check_status(response, Some(session_id)).await?;
        Ok(())
    }

    async fn refresh(&self, session_id: &SessionId) -> Result<(), CatalogueError> {
        let response = self
            .session_request(Method::PUT, session_id)
            .send()
            .await?;
        check_status(response, Some(session_id))
            .await
            .map_err(expired_if_session_error)?;
        Ok(())
    }

    async fn invoke(
        &self,
        session_id: &SessionId,
        operation: Operation,
    ) -> Result<serde_json::Value, CatalogueError> {
        let request = match &operation {
            Operation::Search { query } => self
                .entity_manager(Method::GET)
                .query(&[("sessionId", session_id.expose()), ("query", query.as_str())]),
            Operation::Write { entities } => self.entity_manager(Method::POST).form(&[
                ("sessionId", session_id.expose()),
                ("entities", entities.to_string().as_str()),
            ]),
            Operation::Delete { entities } => self.entity_manager(Method::DELETE).query(&[
                ("sessionId", session_id.expose()),
                ("entities", entities.to_string().as_str()),
            ]),
        };

        let response = request.send().await?;
        parse_json::<serde_json::Value>(response, Some(session_id))
            .await
            .map_err(expired_if_session_error)
    }
}

fn expired_if_session_error(e: CatalogueError) -> CatalogueError {
    if e.is_session_error() {
        CatalogueError::SessionExpired
    } else {
        e
    }
}

fn is_not_found(e: &CatalogueError) -> bool {
    matches!(e, CatalogueError::Response { status, .. } if *status == StatusCode::NOT_FOUND)
}

/// Turns a non-2xx response into the matching [`CatalogueError`].
async fn check_status(
    response: reqwest::Response,
    session_id: Option<&SessionId>,
) -> Result<reqwest::Response, CatalogueError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let body = match session_id {
        Some(session_id) if !session_id.expose().is_empty() => {
            body.replace(session_id.expose(), REDACTED)
        }
        _ => body,
    };

    Err(match serde_json::from_str::<IcatErrorResponse>(&body) {
        Ok(IcatErrorResponse { code, message }) => CatalogueError::Server { code, message },
        Err(_) => CatalogueError::Response {
            status,
            message: body,
        },
    })
}

/// Parses a successful response body. An empty body is JSON `null`.
async fn parse_json<T: DeserializeOwned>(
    response: reqwest::Response,
    session_id: Option<&SessionId>,
) -> Result<T, CatalogueError> {
    let response = check_status(response, session_id).await?;
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(serde_json::from_value(serde_json::Value::Null)?);
    }
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str) -> Result<RestCatalogueClient, SessionError> {
        RestCatalogueClient::new(&CatalogueSettings {
            url: url.to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn endpoint_appends_icat_path() {
        let rest = client("https://icat.example.org:8181").unwrap();
        assert_eq!(
            rest.endpoint(&["session"]).as_str(),
            "https://icat.example.org:8181/icat/session"
        );

        let rest = client("https://icat.example.org/prefix/").unwrap();
        assert_eq!(
            rest.endpoint(&["entityManager"]).as_str(),
            "https://icat.example.org/prefix/icat/entityManager"
        );
    }

    #[test]
    fn endpoint_escapes_session_id() {
        let rest = client("https://icat.example.org").unwrap();
        assert_eq!(
            rest.endpoint(&["session", "a/b c"]).as_str(),
            "https://icat.example.org/icat/session/a%2Fb%20c"
        );
    }

    #[test]
    fn rejects_bad_urls() {
        assert!(matches!(
            client("not a url"),
            Err(SessionError::Configuration(_))
        ));
        assert!(matches!(
            client("ftp://icat.example.org"),
            Err(SessionError::Configuration(_))
        ));
    }

    #[test]
    fn not_found_detection() {
        assert!(is_not_found(&CatalogueError::Response {
            status: StatusCode::NOT_FOUND,
            message: String::new(),
        }));
        assert!(!is_not_found(&CatalogueError::SessionExpired));
    }
}
