#![allow(clippy::non_ascii_literal)]

//! Session, locale and pipeline working together over one storage file.

use std::sync::Arc;

use bookstore_http::HttpClient;
use bookstore_session::storage::keys;
use bookstore_session::{
    Credentials, GuardDecision, JsonFileStore, KeyValueStore, LOGIN_ROUTE, RecordingNavigator,
    Storefront, TextDirection,
};
use httpmock::prelude::*;
use serde_json::json;
use tracing_test::traced_test;

fn storefront(server: &MockServer, storage: Arc<dyn KeyValueStore>) -> Storefront {
    Storefront::new(
        storage,
        HttpClient::builder().allow_insecure_http(),
        &server.url("/api"),
        "ar",
    )
    .unwrap()
}

fn mock_login(server: &MockServer) {
    server.mock(|when, then| {
        when.method(POST).path("/api/Account/Login");
        then.status(200).json_body(json!({
            "data": {"token": "tok-file", "id": "u-1", "email": "reader@example.com"},
            "succeeded": true
        }));
    });
}

#[tokio::test]
async fn login_then_requests_carry_token_locale_and_session_id() {
    let server = MockServer::start();
    mock_login(&server);
    let cart = server.mock(|when, then| {
        when.method(GET)
            .path("/api/Cart")
            .header("authorization", "Bearer tok-file")
            .header("accept-language", "en")
            .header_exists("x-session-id");
        then.status(200)
            .json_body(json!({"data": [], "succeeded": true}));
    });

    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(JsonFileStore::open(dir.path().join("session.json")).unwrap());
    let app = storefront(&server, storage);

    assert!(app.session.login(&Credentials::new("reader@example.com", "pw")).await.is_success());
    app.locale.set_language("en").unwrap();
    app.context.ensure_session_id().unwrap();

    let items: Vec<serde_json::Value> = app.api.get_data("Cart").await.unwrap();
    assert!(items.is_empty());
    cart.assert();
}

#[tokio::test]
async fn session_and_locale_survive_a_restart() {
    let server = MockServer::start();
    mock_login(&server);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    {
        let app = storefront(&server, Arc::new(JsonFileStore::open(&path).unwrap()));
        app.session
            .login(&Credentials::new("reader@example.com", "pw"))
            .await;
        app.locale.set_language("en").unwrap();
    }

    let app = storefront(&server, Arc::new(JsonFileStore::open(&path).unwrap()));
    let user = app.session.user().unwrap();
    assert_eq!(user.id, "u-1");
    assert_eq!(user.email, "reader@example.com");
    assert_eq!(app.locale.direction(), TextDirection::Ltr);
    assert!(app.auth_guard().check("/orders").is_allowed());
}

#[tokio::test]
async fn expired_token_logs_out_redirects_and_guards_close() {
    let server = MockServer::start();
    mock_login(&server);
    server.mock(|when, then| {
        when.method(GET).path("/api/Orders");
        then.status(401);
    });

    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(JsonFileStore::open(dir.path().join("session.json")).unwrap());
    let app = storefront(&server, storage.clone());
    app.session
        .login(&Credentials::new("reader@example.com", "pw"))
        .await;

    let err = app
        .api
        .get_data::<serde_json::Value>("Orders")
        .await
        .unwrap_err();
    let nav = RecordingNavigator::new();

    assert!(app.session.handle_api_error(&err, &nav));
    assert_eq!(nav.current().as_deref(), Some(LOGIN_ROUTE));
    assert_eq!(storage.get(keys::AUTH_TOKEN).unwrap(), None);
    assert_eq!(
        app.auth_guard().check("/orders"),
        GuardDecision::Redirect {
            to: LOGIN_ROUTE.to_owned(),
            return_url: Some("/orders".to_owned()),
        }
    );
}

#[tokio::test]
async fn unreachable_backend_fails_login_with_network_message() {
    let storage = Arc::new(bookstore_session::MemoryStore::new());
    let app = Storefront::new(
        storage,
        HttpClient::builder().allow_insecure_http(),
        "http://127.0.0.1:1/api",
        "ar",
    )
    .unwrap();

    let outcome = app
        .session
        .login(&Credentials::new("reader@example.com", "pw"))
        .await;

    assert_eq!(
        outcome.message(),
        "لا يمكن الاتصال بالخادم. تأكد من اتصالك بالإنترنت"
    );
    assert!(!app.session.is_logged_in());
}

#[tokio::test]
#[traced_test]
async fn credentials_and_email_never_reach_the_logs() {
    let server = MockServer::start();
    mock_login(&server);
    let app = storefront(&server, Arc::new(bookstore_session::MemoryStore::new()));

    app.session
        .login(&Credentials::new("reader@example.com", "s3cret-pw"))
        .await;

    assert!(logs_contain("login succeeded"));
    assert!(!logs_contain("tok-file"));
    assert!(!logs_contain("s3cret-pw"));
    assert!(!logs_contain("reader@example.com"));
}
