use std::time::Duration;

use icat_session::{
    CatalogueError, CatalogueService, CatalogueSettings, Credentials, Operation,
    RestCatalogueClient, SessionId, Validation,
};
use icat_test::{
    icat_error, login_ok, login_rejected, logout_ok, refresh_ok, search, session_live,
    session_unknown, start_api_mock,
};
use reqwest::StatusCode;
use wiremock::{
    matchers::{body_string_contains, method, path, query_param},
    Mock, ResponseTemplate,
};

fn client_for(url: String) -> RestCatalogueClient {
    RestCatalogueClient::new(&CatalogueSettings {
        url,
        timeout_secs: 1,
        ..Default::default()
    })
    .unwrap()
}

fn root() -> Credentials {
    Credentials::username_password("simple", "root", "secret")
}

#[tokio::test]
async fn authenticate_posts_plugin_and_credentials() {
    let (_server, url) = start_api_mock(vec![Mock::given(method("POST"))
        .and(path("/icat/session"))
        // json={"plugin":"simple","credentials":[{"username":"root"},...
        .and(body_string_contains(
            "json=%7B%22plugin%22%3A%22simple%22%2C%22credentials%22%3A%5B%7B%22username%22%3A%22root%22%7D",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "sessionId": "xyz789"
        })))
        .expect(1)])
    .await;

    let session_id = client_for(url).authenticate(&root()).await.unwrap();

    assert_eq!(session_id.expose(), "xyz789");
}

#[tokio::test]
async fn authenticate_with_bad_credentials() {
    let (_server, url) = start_api_mock(vec![login_rejected()]).await;

    let result = client_for(url).authenticate(&root()).await;

    assert!(matches!(
        result,
        Err(CatalogueError::AuthenticationFailed(message))
            if message == "The username and password do not match"
    ));
}

#[tokio::test]
async fn authenticate_with_garbled_response() {
    let (_server, url) = start_api_mock(vec![Mock::given(method("POST"))
        .and(path("/icat/session"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))])
    .await;

    let result = client_for(url).authenticate(&root()).await;

    assert!(matches!(result, Err(CatalogueError::Serde(_))));
}

#[tokio::test]
async fn validate_live_session() {
    let (_server, url) = start_api_mock(vec![session_live("abc123", "simple/root")]).await;

    let validation = client_for(url)
        .validate(&SessionId::new("abc123"))
        .await
        .unwrap();

    let Validation::Valid(info) = validation else {
        panic!("expected a valid session, got {validation:?}");
    };
    assert_eq!(info.user_name, "simple/root");
    assert!(info.remaining_minutes > 119.0);
}

#[tokio::test]
async fn validate_unknown_session() {
    let (_server, url) = start_api_mock(vec![session_unknown("stale000")]).await;

    let validation = client_for(url)
        .validate(&SessionId::new("stale000"))
        .await
        .unwrap();

    assert_eq!(validation, Validation::Invalid);
}

#[tokio::test]
async fn validate_not_found_is_invalid() {
    let (_server, url) = start_api_mock(vec![]).await;

    let validation = client_for(url)
        .validate(&SessionId::new("stale000"))
        .await
        .unwrap();

    assert_eq!(validation, Validation::Invalid);
}

#[tokio::test]
async fn validate_server_failure_is_an_error() {
    let (_server, url) = start_api_mock(vec![Mock::given(method("GET"))
        .and(path("/icat/session/abc123"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))])
    .await;

    let result = client_for(url).validate(&SessionId::new("abc123")).await;

    assert!(matches!(
        result,
        Err(CatalogueError::Response { status, .. }) if status == StatusCode::BAD_GATEWAY
    ));
}

#[tokio::test]
async fn validate_times_out() {
    let (_server, url) = start_api_mock(vec![Mock::given(method("GET"))
        .and(path("/icat/session/abc123"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))])
    .await;

    let result = client_for(url).validate(&SessionId::new("abc123")).await;

    let Err(CatalogueError::Unavailable(message)) = result else {
        panic!("expected a transport failure, got {result:?}");
    };
    assert!(!message.contains("abc123"));
}

#[tokio::test]
async fn unreachable_server_is_unavailable() {
    // Bind then release a port so nothing is listening on it
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let result = client_for(url).authenticate(&root()).await;

    assert!(matches!(result, Err(CatalogueError::Unavailable(_))));
}

#[tokio::test]
async fn refresh_and_invalidate() {
    let (_server, url) = start_api_mock(vec![
        refresh_ok("abc123").expect(1),
        logout_ok("abc123").expect(1),
    ])
    .await;
    let client = client_for(url);
    let session_id = SessionId::new("abc123");

    client.refresh(&session_id).await.unwrap();
    client.invalidate(&session_id).await.unwrap();
}

#[tokio::test]
async fn refresh_of_expired_session() {
    let (_server, url) = start_api_mock(vec![Mock::given(method("PUT"))
        .and(path("/icat/session/stale000"))
        .respond_with(icat_error(403, "SESSION", "Session id stale000 has expired"))])
    .await;

    let result = client_for(url).refresh(&SessionId::new("stale000")).await;

    assert!(matches!(result, Err(CatalogueError::SessionExpired)));
}

#[tokio::test]
async fn error_messages_do_not_echo_the_session_id() {
    let (_server, url) = start_api_mock(vec![Mock::given(method("DELETE"))
        .and(path("/icat/session/abc123"))
        .respond_with(icat_error(
            500,
            "INTERNAL",
            "Failed to remove session abc123",
        ))])
    .await;

    let result = client_for(url).invalidate(&SessionId::new("abc123")).await;

    let Err(CatalogueError::Server { code, message }) = result else {
        panic!("expected an ICAT error, got {result:?}");
    };
    assert_eq!(code, "INTERNAL");
    assert_eq!(message, "Failed to remove session [REDACTED]");
}

#[tokio::test]
async fn search_returns_json() {
    let (_server, url) = start_api_mock(vec![Mock::given(method("GET"))
        .and(path("/icat/entityManager"))
        .and(query_param("sessionId", "abc123"))
        .and(query_param("query", "SELECT i FROM Investigation i"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"Investigation": {"id": 42, "name": "12100409-ST"}}
        ])))
        .expect(1)])
    .await;

    let result = client_for(url)
        .invoke(
            &SessionId::new("abc123"),
            Operation::Search {
                query: "SELECT i FROM Investigation i".to_string(),
            },
        )
        .await
        .unwrap();

    assert_eq!(result[0]["Investigation"]["name"], "12100409-ST");
}

#[tokio::test]
async fn search_on_expired_session() {
    let (_server, url) = start_api_mock(vec![search(
        "abc123",
        icat_error(403, "SESSION", "Unable to find user by sessionid: abc123"),
    )])
    .await;

    let result = client_for(url)
        .invoke(
            &SessionId::new("abc123"),
            Operation::Search {
                query: "SELECT i FROM Investigation i".to_string(),
            },
        )
        .await;

    assert!(matches!(result, Err(CatalogueError::SessionExpired)));
}

#[tokio::test]
async fn search_with_bad_query() {
    let (_server, url) = start_api_mock(vec![search(
        "abc123",
        icat_error(400, "BAD_PARAMETER", "Invalid query"),
    )])
    .await;

    let result = client_for(url)
        .invoke(
            &SessionId::new("abc123"),
            Operation::Search {
                query: "SELEC".to_string(),
            },
        )
        .await;

    assert!(matches!(
        result,
        Err(CatalogueError::Server { code, .. }) if code == "BAD_PARAMETER"
    ));
}

#[tokio::test]
async fn write_posts_entities_form() {
    let (_server, url) = start_api_mock(vec![Mock::given(method("POST"))
        .and(path("/icat/entityManager"))
        .and(body_string_contains("sessionId=abc123"))
        .and(body_string_contains("entities=%7B%22Dataset%22"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([101])))
        .expect(1)])
    .await;

    let result = client_for(url)
        .invoke(
            &SessionId::new("abc123"),
            Operation::Write {
                entities: serde_json::json!({"Dataset": {"name": "d1"}}),
            },
        )
        .await
        .unwrap();

    assert_eq!(result, serde_json::json!([101]));
}

#[tokio::test]
async fn delete_with_empty_response() {
    let (_server, url) = start_api_mock(vec![Mock::given(method("DELETE"))
        .and(path("/icat/entityManager"))
        .and(query_param("sessionId", "abc123"))
        .and(query_param("entities", r#"{"Dataset":{"id":7}}"#))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)])
    .await;

    let result = client_for(url)
        .invoke(
            &SessionId::new("abc123"),
            Operation::Delete {
                entities: serde_json::json!({"Dataset": {"id": 7}}),
            },
        )
        .await
        .unwrap();

    assert_eq!(result, serde_json::Value::Null);
}

#[tokio::test]
async fn login_ok_helper_matches_client() {
    let (_server, url) = start_api_mock(vec![login_ok("xyz789")]).await;

    let session_id = client_for(url).authenticate(&root()).await.unwrap();

    assert_eq!(session_id, SessionId::new("xyz789"));
}
