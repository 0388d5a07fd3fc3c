#![doc = include_str!("../README.md")]

use serde_json::json;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, ResponseTemplate,
};

/// Starts a mock ICAT server with `mocks` registered and returns it with its base URL.
///
/// The base URL is what goes into the catalogue settings; requests land under `<base>/icat`.
///
/// Warning: when using `Mock::expect` ensure `server` is not dropped before the test completes,
pub async fn start_api_mock(mocks: Vec<Mock>) -> (wiremock::MockServer, String) {
    let server = wiremock::MockServer::start().await;

    for mock in mocks {
        server.register(mock).await;
    }

    let url = server.uri();
    (server, url)
}

/// ICAT's JSON error body with the given HTTP status.
pub fn icat_error(status: u16, code: &str, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "code": code,
        "message": message,
    }))
}

/// `POST /icat/session` succeeds with `session_id`.
pub fn login_ok(session_id: &str) -> Mock {
    Mock::given(method("POST"))
        .and(path("/icat/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sessionId": session_id })))
}

/// `POST /icat/session` fails the way ICAT reports bad credentials.
pub fn login_rejected() -> Mock {
    Mock::given(method("POST"))
        .and(path("/icat/session"))
        .respond_with(icat_error(
            403,
            "SESSION",
            "The username and password do not match",
        ))
}

/// `GET /icat/session/{session_id}` reports a live session owned by `user_name`.
pub fn session_live(session_id: &str, user_name: &str) -> Mock {
    Mock::given(method("GET"))
        .and(path(format!("/icat/session/{session_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "userName": user_name,
            "remainingMinutes": 119.8,
        })))
}

/// `GET /icat/session/{session_id}` reports an unknown session.
pub fn session_unknown(session_id: &str) -> Mock {
    Mock::given(method("GET"))
        .and(path(format!("/icat/session/{session_id}")))
        .respond_with(icat_error(
            403,
            "SESSION",
            &format!("Unable to find user by sessionid: {session_id}"),
        ))
}

/// `PUT /icat/session/{session_id}` succeeds.
pub fn refresh_ok(session_id: &str) -> Mock {
    Mock::given(method("PUT"))
        .and(path(format!("/icat/session/{session_id}")))
        .respond_with(ResponseTemplate::new(204))
}

/// `DELETE /icat/session/{session_id}` succeeds.
pub fn logout_ok(session_id: &str) -> Mock {
    Mock::given(method("DELETE"))
        .and(path(format!("/icat/session/{session_id}")))
        .respond_with(ResponseTemplate::new(204))
}

/// `GET /icat/entityManager` for `session_id` answers with `response`.
pub fn search(session_id: &str, response: ResponseTemplate) -> Mock {
    Mock::given(method("GET"))
        .and(path("/icat/entityManager"))
        .and(query_param("sessionId", session_id))
        .respond_with(response)
}
