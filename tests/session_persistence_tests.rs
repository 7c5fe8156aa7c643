//! A file-backed client resumes and clears the session across instances.

use std::sync::Arc;

use authflight::auth::{FileTokenStore, Session, TokenStore, TokenStoreConfig};
use authflight::{AuthClient, ClientConfig};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer, dir: &TempDir) -> ClientConfig {
    ClientConfig::new(server.uri()).with_token_dir(dir.path())
}

#[tokio::test]
async fn login_persists_for_next_client() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "a1",
            "refresh_token": "r1"
        })))
        .mount(&server)
        .await;
    let dir = TempDir::new().expect("tempdir");

    let first = AuthClient::with_file_store(config(&server, &dir)).expect("client");
    first.login("1234@1234.com", "1234").await.expect("login");

    let second = AuthClient::with_file_store(config(&server, &dir)).expect("client");
    assert_eq!(second.access_token().as_deref(), Some("a1"));
    assert_eq!(second.refresh_token().as_deref(), Some("r1"));

    second.logout().expect("logout");
    let third = AuthClient::with_file_store(config(&server, &dir)).expect("client");
    assert!(!third.is_logged_in());
}

#[tokio::test]
async fn refreshed_session_is_written_to_disk() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(wiremock::matchers::header("authorization", "Bearer old"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(wiremock::matchers::header("authorization", "Bearer new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("me"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new",
            "refresh_token": "r2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("tempdir");
    let store = Arc::new(FileTokenStore::new(TokenStoreConfig::new(dir.path().to_path_buf())));
    store.write(&Session::new("old", "r1")).expect("seed");

    let client = AuthClient::new(config(&server, &dir), store.clone()).expect("client");
    assert_eq!(client.get("/me").await.expect("me").text(), "me");

    let on_disk = store.read().expect("read").expect("session");
    assert_eq!(on_disk.access_token, "new");
    assert_eq!(on_disk.refresh_token, "r2");
}
