#![allow(clippy::unwrap_used)]
// Integration tests for `DataClient` using wiremock.

use std::sync::Arc;

use reqwest::cookie::Jar;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tracker_api::{DataClient, Entry, Error, Kind, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, DataClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = DataClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

/// A client with a real cookie jar, for CSRF and session tests.
async fn setup_with_jar() -> (MockServer, DataClient, Arc<Jar>) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let transport = TransportConfig::default().with_cookie_jar();
    let jar = transport.cookie_jar.clone().unwrap();
    let client = DataClient::new(base_url, &transport).unwrap();
    (server, client, jar)
}

fn dataset_entry(id: &str, title: &str) -> Entry {
    let mut entry = Entry::new();
    entry.id = id.into();
    entry.title = title.into();
    entry
}

// ── Fetch tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn fetch_list_unwraps_pluralized_key() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/dataset/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "datasets": [{"id": "d1", "title": "T1"}]
        })))
        .mount(&server)
        .await;

    let entries = client.fetch_list(Kind::Dataset).await.unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, "d1");
    assert_eq!(entries[0].title, "T1");
}

#[tokio::test]
async fn fetch_one_unwraps_singular_key() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/order/o-77/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "order": {
                "id": "o-77",
                "title": "Plates",
                "tags": ["urgent"],
                "properties": {"site": "lab-1"}
            }
        })))
        .mount(&server)
        .await;

    let entry = client.fetch_one(Kind::Order, "o-77").await.unwrap();

    assert_eq!(entry.id, "o-77");
    assert!(entry.tags.contains("urgent"));
    assert_eq!(entry.properties.get("site").map(String::as_str), Some("lab-1"));
}

#[tokio::test]
async fn fetch_one_maps_404_to_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/dataset/d-missing/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = client.fetch_one(Kind::Dataset, "d-missing").await;

    assert!(matches!(result, Err(Error::NotFound { .. })));
}

#[tokio::test]
async fn fetch_user_list_hits_scoped_path() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/collection/user/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "collections": []
        })))
        .mount(&server)
        .await;

    let entries = client.fetch_user_list(Kind::Collection).await.unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn fetch_structure_clears_server_stamped_id() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/dataset/structure/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dataset": {
                "id": "d-fresh-uuid",
                "title": "",
                "description": "",
                "tags": [],
                "properties": {}
            }
        })))
        .mount(&server)
        .await;

    let entry = client.fetch_structure(Kind::Dataset).await.unwrap();

    assert!(entry.is_new());
    assert!(entry.title.is_empty());
}

// ── Save dispatch tests ─────────────────────────────────────────────

#[tokio::test]
async fn save_new_entry_posts_without_id() {
    let (server, client) = setup().await;

    // Exact body match: the transmitted payload must not carry an id key.
    Mock::given(method("POST"))
        .and(path("/api/v1/dataset/"))
        .and(body_json(json!({
            "title": "New set",
            "description": "",
            "tags": [],
            "properties": {}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "d-new"})))
        .expect(1)
        .mount(&server)
        .await;

    let entry = dataset_entry("", "New set");
    let response = client.save(Kind::Dataset, &entry).await.unwrap();

    assert_eq!(response, json!({"id": "d-new"}));
}

#[tokio::test]
async fn save_existing_entry_patches_item_path_without_id() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/api/v1/order/o-123/"))
        .and(body_json(json!({
            "title": "Renamed",
            "description": "",
            "tags": [],
            "properties": {}
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut entry = Entry::new();
    entry.id = "o-123".into();
    entry.title = "Renamed".into();

    client.save(Kind::Order, &entry).await.unwrap();
}

#[tokio::test]
async fn delete_hits_item_path() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/user/u-9/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.delete(Kind::User, "u-9").await.unwrap();
}

// ── CSRF tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn mutating_request_echoes_csrf_cookie_in_header() {
    let (server, client, _jar) = setup_with_jar().await;

    // Login response sets the CSRF cookie in the client's jar.
    Mock::given(method("POST"))
        .and(path("/api/v1/login/apikey/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "_csrf_token=tok-abc123; Path=/"),
        )
        .mount(&server)
        .await;

    // The subsequent mutating call must carry the paired header.
    Mock::given(method("DELETE"))
        .and(path("/api/v1/dataset/d-1/"))
        .and(header("X-CSRFToken", "tok-abc123"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let key: secrecy::SecretString = "key".to_string().into();
    client.login_api_key("robot", &key).await.unwrap();
    client.delete(Kind::Dataset, "d-1").await.unwrap();
}

#[tokio::test]
async fn missing_csrf_cookie_sends_no_header() {
    let (server, client) = setup().await;

    // Matcher rejects any request carrying the header; the mock only
    // matches when the header is absent.
    Mock::given(method("POST"))
        .and(path("/api/v1/collection/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let entry = Entry::new();
    let received = client.save(Kind::Collection, &entry).await;
    assert!(received.is_ok());

    let requests = server.received_requests().await.unwrap();
    assert!(
        requests[0].headers.get("X-CSRFToken").is_none(),
        "no CSRF header expected without a session cookie"
    );
}

// ── Auth tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn login_failure_reports_authentication_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/login/apikey/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let key: secrecy::SecretString = "wrong".to_string().into();
    let result = client.login_api_key("robot", &key).await;

    assert!(matches!(result, Err(Error::Authentication { .. })));
}

#[tokio::test]
async fn current_user_unwraps_user_key() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/user/me/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {
                "id": "u-42",
                "name": "Robin",
                "permissions": ["ORDERS"]
            }
        })))
        .mount(&server)
        .await;

    let user = client.current_user().await.unwrap();

    assert_eq!(user.id, "u-42");
    assert_eq!(user.extra.get("permissions"), Some(&json!(["ORDERS"])));
}

#[tokio::test]
async fn session_expiry_surfaces_as_authentication_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.fetch_list(Kind::Order).await;

    assert!(matches!(result, Err(Error::Authentication { .. })));
}

#[tokio::test]
async fn generate_api_key_returns_plaintext_key() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/user/u-3/apikey/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"key": "s3cr3t"})))
        .mount(&server)
        .await;

    let key = client.generate_api_key(Some("u-3")).await.unwrap();
    assert_eq!(key, "s3cr3t");
}

// ── Audit feed tests ────────────────────────────────────────────────

#[tokio::test]
async fn entry_log_unwraps_logs_key() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/user/u-1/log/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "logs": [
                {"action": "edit", "comment": "User updated", "user": "u-1"},
                {"action": "add", "comment": "User added", "user": "u-0"}
            ]
        })))
        .mount(&server)
        .await;

    let logs = client.entry_log(Kind::User, "u-1").await.unwrap();

    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].action, "edit");
    assert_eq!(logs[1].user.as_deref(), Some("u-0"));
}

#[tokio::test]
async fn missing_envelope_key_is_a_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/dataset/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": []})))
        .mount(&server)
        .await;

    let result = client.fetch_list(Kind::Dataset).await;

    assert!(matches!(result, Err(Error::Deserialization { .. })));
}
