use std::time::Duration;

use icat_session::{
    logout, resume_or_login, CatalogueSettings, CookieSettings, Credentials, Operation,
    RestCatalogueClient, SessionCookie, SessionError, SessionState,
};
use icat_test::{
    icat_error, login_ok, logout_ok, search, session_live, session_unknown, start_api_mock,
};
use wiremock::{
    matchers::{method, path},
    Mock, ResponseTemplate,
};

fn setup(url: String) -> (RestCatalogueClient, SessionCookie) {
    let settings = CatalogueSettings {
        url,
        timeout_secs: 1,
        cookie: CookieSettings {
            name: "JSESSIONID".to_string(),
            ..Default::default()
        },
        ..Default::default()
    };
    let cookie = settings.cookie.to_session_cookie().unwrap();
    (RestCatalogueClient::new(&settings).unwrap(), cookie)
}

fn root() -> Credentials {
    Credentials::username_password("simple", "root", "secret")
}

#[tokio::test]
async fn first_request_logs_in_and_sets_cookie() {
    let (_server, url) = start_api_mock(vec![login_ok("xyz789").expect(1)]).await;
    let (client, cookie) = setup(url);

    let established = resume_or_login(client, &cookie, None, Some(&root()))
        .await
        .unwrap();

    assert!(!established.resumed);
    assert!(established
        .set_cookie
        .unwrap()
        .starts_with("JSESSIONID=xyz789; Secure; Path=/"));
    assert_eq!(established.session.state(), SessionState::Active);
}

#[tokio::test]
async fn later_request_resumes_and_searches() {
    let (_server, url) = start_api_mock(vec![
        session_live("abc123", "simple/root").expect(1),
        search(
            "abc123",
            ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"Facility": {"id": 1, "name": "ISIS"}}
            ])),
        ),
    ])
    .await;
    let (client, cookie) = setup(url);

    let mut established = resume_or_login(
        client,
        &cookie,
        Some("Cookie: theme=dark; JSESSIONID=abc123"),
        Some(&root()),
    )
    .await
    .unwrap();

    assert!(established.resumed);
    assert_eq!(established.set_cookie, None);
    assert_eq!(established.session.user_name(), Some("simple/root"));

    let facilities = established
        .session
        .invoke(Operation::Search {
            query: "SELECT f FROM Facility f".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(facilities[0]["Facility"]["name"], "ISIS");
}

#[tokio::test]
async fn stale_cookie_is_replaced_with_a_fresh_session() {
    let (_server, url) = start_api_mock(vec![
        session_unknown("stale000").expect(1),
        login_ok("fresh111").expect(1),
    ])
    .await;
    let (client, cookie) = setup(url);

    let established = resume_or_login(
        client,
        &cookie,
        Some("JSESSIONID=stale000"),
        Some(&root()),
    )
    .await
    .unwrap();

    assert!(!established.resumed);
    assert_eq!(
        established.session.identifier().unwrap().expose(),
        "fresh111"
    );
    assert_eq!(
        established.set_cookie.as_deref(),
        Some("JSESSIONID=fresh111; Secure; Path=/; HttpOnly; SameSite=Strict")
    );
}

#[tokio::test]
async fn stale_cookie_without_credentials() {
    let (_server, url) = start_api_mock(vec![session_unknown("stale000")]).await;
    let (client, cookie) = setup(url);

    let result = resume_or_login(client, &cookie, Some("JSESSIONID=stale000"), None).await;

    assert!(matches!(result, Err(SessionError::Invalid)));
}

#[tokio::test]
async fn session_expiring_mid_request_is_reported() {
    let (_server, url) = start_api_mock(vec![
        session_live("abc123", "simple/root"),
        search(
            "abc123",
            icat_error(403, "SESSION", "Session id abc123 has expired"),
        ),
    ])
    .await;
    let (client, cookie) = setup(url);

    let mut established = resume_or_login(client, &cookie, Some("JSESSIONID=abc123"), None)
        .await
        .unwrap();

    let result = established
        .session
        .invoke(Operation::Search {
            query: "SELECT f FROM Facility f".to_string(),
        })
        .await;

    assert!(matches!(result, Err(SessionError::Expired)));
    assert_eq!(established.session.state(), SessionState::Invalid);
}

#[tokio::test]
async fn logout_invalidates_remotely_and_clears_cookie() {
    let (_server, url) = start_api_mock(vec![
        session_live("abc123", "simple/root"),
        logout_ok("abc123").expect(1),
    ])
    .await;
    let (client, cookie) = setup(url);

    let mut established = resume_or_login(client, &cookie, Some("JSESSIONID=abc123"), None)
        .await
        .unwrap();
    let cleared = logout(&mut established.session, &cookie).await;

    assert_eq!(established.session.state(), SessionState::Closed);
    assert!(cleared.starts_with("JSESSIONID=; Secure; Path=/; Expires=Thu, 01 Jan 1970"));
}

#[tokio::test]
async fn logout_still_closes_when_remote_times_out() {
    let (_server, url) = start_api_mock(vec![
        session_live("abc123", "simple/root"),
        Mock::given(method("DELETE"))
            .and(path("/icat/session/abc123"))
            .respond_with(ResponseTemplate::new(204).set_delay(Duration::from_secs(3))),
    ])
    .await;
    let (client, cookie) = setup(url);

    let mut established = resume_or_login(client, &cookie, Some("JSESSIONID=abc123"), None)
        .await
        .unwrap();
    let cleared = logout(&mut established.session, &cookie).await;

    assert_eq!(established.session.state(), SessionState::Closed);
    assert!(established.session.identifier().is_err());
    assert!(cleared.contains("Max-Age=0"));
}
