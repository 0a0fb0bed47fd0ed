//! Token refresh behavior against a mock backend.
//!
//! Covers single-flight refresh, FIFO replay of queued requests, failure
//! handling and the one-retry limit.

use std::time::Duration;

use ledgerdesk_client::{
    ApiClient, Error, FileStorage, KeyValueStorage, MemoryStorage, RefreshRotation, TokenStore,
};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn client_for(server: &MockServer, tokens: TokenStore) -> ApiClient {
    ApiClient::builder()
        .base_url(format!("{}/api/v1", server.uri()))
        .token_store(tokens)
        .build()
        .unwrap()
}

fn logged_in() -> TokenStore {
    let tokens = TokenStore::in_memory();
    tokens.set_tokens("A1", "R1").unwrap();
    tokens
}

/// 401 for the old token, 200 echoing the path for the new one.
async fn mount_protected(server: &MockServer, resource: &str) {
    let full_path = format!("/api/v1/{}", resource);

    Mock::given(method("GET"))
        .and(path(full_path.as_str()))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "token expired"})))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(full_path.as_str()))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"resource": resource})))
        .mount(server)
        .await;
}

fn refresh_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": "A2",
        "token_type": "bearer",
        "expires_in": 900
    }))
}

async fn refresh_calls(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/api/v1/auth/refresh")
        .count()
}

/// Paths requested with the given bearer token, in arrival order.
async fn paths_sent_with(server: &MockServer, token: &str) -> Vec<String> {
    let expected = format!("Bearer {}", token);
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| {
            r.headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                == Some(expected.as_str())
        })
        .map(|r| r.url.path().to_string())
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Successful refresh
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_expired_token_is_refreshed_and_request_retried() {
    let server = MockServer::start().await;
    mount_protected(&server, "clients").await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .and(body_json(json!({"refresh_token": "R1"})))
        .respond_with(refresh_ok())
        .expect(1)
        .mount(&server)
        .await;

    let tokens = logged_in();
    let client = client_for(&server, tokens.clone());

    let body: Value = client.get("clients").await.unwrap();
    assert_eq!(body["resource"], "clients");

    // Only the access token is replaced
    assert_eq!(tokens.access_token().as_deref(), Some("A2"));
    assert_eq!(tokens.refresh_token().as_deref(), Some("R1"));
    assert!(!client.is_refreshing());
}

#[tokio::test]
async fn test_requests_after_refresh_use_new_token() {
    let server = MockServer::start().await;
    mount_protected(&server, "clients").await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(refresh_ok())
        .expect(1)
        .mount(&server)
        .await;

    // Only reachable with the refreshed token
    Mock::given(method("GET"))
        .and(path("/api/v1/licenses"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, logged_in());
    let _: Value = client.get("clients").await.unwrap();

    let licenses: Vec<Value> = client.get("licenses").await.unwrap();
    assert!(licenses.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_401s_trigger_single_refresh() {
    let server = MockServer::start().await;
    for resource in ["clients", "licenses", "obligations"] {
        mount_protected(&server, resource).await;
    }

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(refresh_ok().set_delay(Duration::from_millis(300)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, logged_in());

    let (clients, licenses, obligations) = tokio::join!(
        client.get::<Value>("clients"),
        client.get::<Value>("licenses"),
        client.get::<Value>("obligations"),
    );

    assert_eq!(clients.unwrap()["resource"], "clients");
    assert_eq!(licenses.unwrap()["resource"], "licenses");
    assert_eq!(obligations.unwrap()["resource"], "obligations");
    assert_eq!(refresh_calls(&server).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_concurrent_401s_trigger_single_refresh() {
    let server = MockServer::start().await;
    mount_protected(&server, "clients").await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(refresh_ok().set_delay(Duration::from_millis(200)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, logged_in());

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.get::<Value>("clients").await })
        })
        .collect();

    for handle in handles {
        let body = handle.await.unwrap().unwrap();
        assert_eq!(body["resource"], "clients");
    }
    assert_eq!(refresh_calls(&server).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_queued_requests_replay_in_arrival_order() {
    let server = MockServer::start().await;
    for resource in ["trigger", "a", "b", "c"] {
        mount_protected(&server, resource).await;
    }

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(refresh_ok().set_delay(Duration::from_millis(600)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, logged_in());

    let mut handles = Vec::new();
    for resource in ["trigger", "a", "b", "c"] {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client.get::<Value>(resource).await
        }));
        // Each request gets its 401 before the next one starts
        tokio::time::sleep(Duration::from_millis(60)).await;
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let replayed: Vec<String> = paths_sent_with(&server, "A2")
        .await
        .into_iter()
        .filter(|p| !p.ends_with("/trigger"))
        .collect();
    assert_eq!(replayed, vec!["/api/v1/a", "/api/v1/b", "/api/v1/c"]);
}

#[tokio::test]
async fn test_late_401_after_refresh_retries_without_new_refresh() {
    let server = MockServer::start().await;

    // Slow request: its 401 arrives after the refresh has completed
    Mock::given(method("GET"))
        .and(path("/api/v1/slow"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(400)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/slow"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"resource": "slow"})))
        .mount(&server)
        .await;
    mount_protected(&server, "fast").await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(refresh_ok())
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, logged_in());

    let slow_client = client.clone();
    let slow = tokio::spawn(async move { slow_client.get::<Value>("slow").await });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let fast: Value = client.get("fast").await.unwrap();
    assert_eq!(fast["resource"], "fast");

    let slow = slow.await.unwrap().unwrap();
    assert_eq!(slow["resource"], "slow");
    assert_eq!(refresh_calls(&server).await, 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Refresh failure
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_refresh_failure_clears_tokens_and_rejects_waiters() {
    let server = MockServer::start().await;
    for resource in ["clients", "licenses", "obligations"] {
        mount_protected(&server, resource).await;
    }

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"detail": "refresh token revoked"}))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let temp = tempfile::tempdir().unwrap();
    let token_file = temp.path().join("tokens.json");
    let tokens = TokenStore::new(FileStorage::new(&token_file));
    tokens.set_tokens("A1", "R1").unwrap();
    let client = client_for(&server, tokens.clone());

    let (clients, licenses, obligations) = tokio::join!(
        client.get::<Value>("clients"),
        client.get::<Value>("licenses"),
        client.get::<Value>("obligations"),
    );

    for result in [clients, licenses, obligations] {
        let err = result.unwrap_err();
        assert!(matches!(err, Error::RefreshFailed(_)), "got {err:?}");
        // The refresh error, not the original 401
        assert_eq!(err.status(), Some(400));
        assert!(err.is_session_ended());
    }

    assert_eq!(tokens.access_token(), None);
    assert_eq!(tokens.refresh_token(), None);

    // Persisted state is gone too
    let reloaded = TokenStore::new(FileStorage::new(&token_file));
    assert!(!reloaded.is_authenticated());
    assert!(!client.is_refreshing());
}

#[tokio::test]
async fn test_refresh_endpoint_401_is_not_intercepted() {
    let server = MockServer::start().await;
    mount_protected(&server, "clients").await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = logged_in();
    let client = client_for(&server, tokens.clone());

    let err = client.get::<Value>("clients").await.unwrap_err();
    assert!(matches!(err, Error::RefreshFailed(_)));
    assert_eq!(err.status(), Some(401));
    assert!(!tokens.is_authenticated());
}

#[tokio::test]
async fn test_refresh_timeout_is_a_refresh_failure() {
    let server = MockServer::start().await;
    mount_protected(&server, "clients").await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(refresh_ok().set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let tokens = logged_in();
    let client = ApiClient::builder()
        .base_url(format!("{}/api/v1", server.uri()))
        .token_store(tokens.clone())
        .refresh_timeout(Duration::from_millis(200))
        .build()
        .unwrap();

    let err = client.get::<Value>("clients").await.unwrap_err();
    assert!(matches!(err, Error::RefreshFailed(_)));
    assert!(err.is_timeout());
    assert!(!tokens.is_authenticated());
}

#[tokio::test]
async fn test_client_usable_again_after_failed_refresh() {
    let server = MockServer::start().await;
    mount_protected(&server, "clients").await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(400))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let tokens = logged_in();
    let client = client_for(&server, tokens.clone());
    assert!(client.get::<Value>("clients").await.is_err());

    // New session: the coordinator is idle and accepts the new tokens
    tokens.set_tokens("A2", "R2").unwrap();
    let body: Value = client.get("clients").await.unwrap();
    assert_eq!(body["resource"], "clients");
}

/// Token storage whose deletes always fail, like a read-only token file.
#[derive(Debug, Default)]
struct UndeletableStorage(MemoryStorage);

impl KeyValueStorage for UndeletableStorage {
    fn get(&self, key: &str) -> ledgerdesk_client::Result<Option<String>> {
        self.0.get(key)
    }

    fn set(&self, key: &str, value: &str) -> ledgerdesk_client::Result<()> {
        self.0.set(key, value)
    }

    fn remove(&self, _key: &str) -> ledgerdesk_client::Result<()> {
        Err(Error::Storage("permission denied".to_string()))
    }
}

#[tokio::test]
async fn test_failed_refresh_ends_session_even_if_storage_keeps_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/clients"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "token expired"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"detail": "revoked"})))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = TokenStore::new(UndeletableStorage::default());
    tokens.set_tokens("A1", "R1").unwrap();
    let client = client_for(&server, tokens.clone());

    let err = client.get::<Value>("clients").await.unwrap_err();
    assert!(matches!(err, Error::RefreshFailed(_)), "got {err:?}");
    assert_eq!(tokens.access_token(), None);
    assert!(!tokens.is_authenticated());

    // The revoked refresh token is not sent again
    let err = client.get::<Value>("clients").await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(!matches!(err, Error::RefreshFailed(_)));
    assert_eq!(refresh_calls(&server).await, 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Retry limits
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_retry_401_is_surfaced_without_second_refresh() {
    let server = MockServer::start().await;

    // Rejects every token
    Mock::given(method("GET"))
        .and(path("/api/v1/clients"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "nope"})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(refresh_ok())
        .expect(1)
        .mount(&server)
        .await;

    let tokens = logged_in();
    let client = client_for(&server, tokens.clone());

    let err = client.get::<Value>("clients").await.unwrap_err();
    assert!(matches!(err, Error::Api { status: 401, .. }));
    assert_eq!(refresh_calls(&server).await, 1);

    // The retry went out with the new token and the session is kept
    assert_eq!(paths_sent_with(&server, "A2").await, vec!["/api/v1/clients"]);
    assert!(tokens.is_authenticated());
}

#[tokio::test]
async fn test_retry_server_error_is_surfaced_as_is() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/clients"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/clients"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "db down"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(refresh_ok())
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, logged_in());
    let err = client.get::<Value>("clients").await.unwrap_err();

    assert!(err.is_server_error());
    assert_eq!(err.data().unwrap()["detail"], "db down");
}

#[tokio::test]
async fn test_no_refresh_token_surfaces_401_immediately() {
    let server = MockServer::start().await;
    mount_protected(&server, "clients").await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(refresh_ok())
        .expect(0)
        .mount(&server)
        .await;

    let tokens = TokenStore::in_memory();
    tokens.set_access_token("A1").unwrap();
    let client = client_for(&server, tokens.clone());

    let err = client.get::<Value>("clients").await.unwrap_err();
    match err {
        Error::Api { status, data } => {
            assert_eq!(status, 401);
            assert_eq!(data.unwrap()["detail"], "token expired");
        }
        other => panic!("expected API error, got {other:?}"),
    }

    // Left untouched
    assert_eq!(tokens.access_token().as_deref(), Some("A1"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Refresh-token rotation
// ─────────────────────────────────────────────────────────────────────────────

async fn rotating_server() -> MockServer {
    let server = MockServer::start().await;
    mount_protected(&server, "clients").await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "A2",
            "refresh_token": "R2",
            "token_type": "bearer",
            "expires_in": 900
        })))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_rotated_refresh_token_is_accepted_by_default() {
    let server = rotating_server().await;
    let tokens = logged_in();
    let client = client_for(&server, tokens.clone());

    let _: Value = client.get("clients").await.unwrap();
    assert_eq!(tokens.refresh_token().as_deref(), Some("R2"));
}

#[tokio::test]
async fn test_rotated_refresh_token_can_be_ignored() {
    let server = rotating_server().await;
    let tokens = logged_in();
    let client = ApiClient::builder()
        .base_url(format!("{}/api/v1", server.uri()))
        .token_store(tokens.clone())
        .refresh_rotation(RefreshRotation::Keep)
        .build()
        .unwrap();

    let _: Value = client.get("clients").await.unwrap();
    assert_eq!(tokens.access_token().as_deref(), Some("A2"));
    assert_eq!(tokens.refresh_token().as_deref(), Some("R1"));
}
