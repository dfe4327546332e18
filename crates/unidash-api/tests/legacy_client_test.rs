#![allow(clippy::unwrap_used)]
// Integration tests for `LegacyClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use unidash_api::legacy::models::{NewNetwork, NewWlan};
use unidash_api::{ControllerPlatform, Error, LegacyClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, LegacyClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = LegacyClient::with_client(
        reqwest::Client::new(),
        base_url,
        ControllerPlatform::ClassicController,
    );
    (server, client)
}

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "meta": { "rc": "ok" }, "data": data }))
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_login_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_partial_json(json!({ "username": "admin" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "test-password".to_string().into();
    client.login("admin", &secret).await.unwrap();
}

#[tokio::test]
async fn test_login_failure() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(400).set_body_string("api.err.Invalid"))
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "wrong-password".to_string().into();
    let result = client.login("admin", &secret).await;

    match result {
        Err(Error::Authentication { ref message }) => {
            assert!(
                !message.contains("api.err.Invalid"),
                "vendor payload leaked into message: {message}"
            );
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_login_without_session_cookie_fails() {
    let server = MockServer::start().await;
    let client = LegacyClient::new(
        Url::parse(&server.uri()).unwrap(),
        ControllerPlatform::ClassicController,
        &TransportConfig::default(),
    )
    .unwrap();

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "pw".to_string().into();
    let result = client.login("admin", &secret).await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_session_cookie_is_replayed() {
    let server = MockServer::start().await;
    let client = LegacyClient::new(
        Url::parse(&server.uri()).unwrap(),
        ControllerPlatform::ClassicController,
        &TransportConfig::default(),
    )
    .unwrap();

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", "unifises=abc123; Path=/")
                .set_body_json(json!({})),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/self/sites"))
        .and(header("cookie", "unifises=abc123"))
        .respond_with(ok(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "pw".to_string().into();
    client.login("admin", &secret).await.unwrap();
    assert_eq!(client.cookie_header().as_deref(), Some("unifises=abc123"));
    let sites = client.list_sites().await.unwrap();
    assert!(sites.is_empty());
}

#[tokio::test]
async fn test_detect_classic_platform() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let platform = LegacyClient::detect_platform(
        &Url::parse(&server.uri()).unwrap(),
        &TransportConfig::default(),
    )
    .await
    .unwrap();
    assert_eq!(platform, ControllerPlatform::ClassicController);
}

// ── Site / device tests ─────────────────────────────────────────────

#[tokio::test]
async fn test_list_sites() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/self/sites"))
        .respond_with(ok(json!([
            { "_id": "s1", "name": "default", "desc": "Head Office" },
            { "_id": "s2", "name": "k3x9a1", "desc": "Warehouse", "role": "admin" }
        ])))
        .mount(&server)
        .await;

    let sites = client.list_sites().await.unwrap();

    assert_eq!(sites.len(), 2);
    assert_eq!(sites[1].name, "k3x9a1");
    assert_eq!(sites[1].desc.as_deref(), Some("Warehouse"));
}

#[tokio::test]
async fn test_list_devices_for_site() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/s/k3x9a1/stat/device"))
        .respond_with(ok(json!([{
            "_id": "abc123",
            "mac": "aa:bb:cc:dd:ee:ff",
            "type": "uap",
            "name": "AP-Lobby",
            "model": "U7PG2",
            "board_rev": 33,
            "adopted": true,
            "state": 1
        }])))
        .mount(&server)
        .await;

    let devices = client.list_devices("k3x9a1").await.unwrap();

    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].mac, "aa:bb:cc:dd:ee:ff");
    assert_eq!(devices[0].name.as_deref(), Some("AP-Lobby"));
    assert_eq!(devices[0].board_rev, Some(33));
    assert!(devices[0].adopted);
}

// ── Provisioning tests ──────────────────────────────────────────────

#[tokio::test]
async fn test_create_network_posts_vlan_only() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/s/default/rest/networkconf"))
        .and(body_partial_json(json!({
            "name": "Tenant-120",
            "purpose": "vlan-only",
            "vlan_enabled": true,
            "vlan": 120
        })))
        .respond_with(ok(json!([{ "_id": "net120", "name": "Tenant-120", "vlan": 120 }])))
        .expect(1)
        .mount(&server)
        .await;

    let created = client
        .create_network("default", &NewNetwork::vlan_only("Tenant-120", 120))
        .await
        .unwrap();
    assert_eq!(created.id, "net120");
}

#[tokio::test]
async fn test_create_wlan_binds_network() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/s/default/rest/wlanconf"))
        .and(body_partial_json(json!({
            "name": "Tenant WiFi",
            "networkconf_id": "net120",
            "security": "wpapsk"
        })))
        .respond_with(ok(json!([{ "_id": "wlan1", "name": "Tenant WiFi" }])))
        .expect(1)
        .mount(&server)
        .await;

    let wlan = NewWlan::wpa2_personal("Tenant WiFi", "correct-horse", "net120");
    let created = client.create_wlan("default", &wlan).await.unwrap();
    assert_eq!(created.id, "wlan1");
}

#[tokio::test]
async fn test_create_network_empty_response_is_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/s/default/rest/networkconf"))
        .respond_with(ok(json!([])))
        .mount(&server)
        .await;

    let result = client
        .create_network("default", &NewNetwork::vlan_only("x", 5))
        .await;
    assert!(matches!(result, Err(Error::LegacyApi { .. })));
}

#[tokio::test]
async fn test_delete_network() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/s/default/rest/networkconf/net30"))
        .respond_with(ok(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_network("default", "net30").await.unwrap();
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_session_expired() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.list_devices("default").await;

    match result {
        Err(Error::Authentication { ref message }) => {
            assert!(
                message.contains("session expired"),
                "expected auth error message, got: {message}"
            );
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_legacy_api_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "rc": "error", "msg": "api.err.NoSiteContext" },
            "data": []
        })))
        .mount(&server)
        .await;

    let result = client.list_devices("default").await;

    match result {
        Err(Error::LegacyApi { ref message, .. }) => {
            assert!(
                message.contains("NoSiteContext"),
                "expected 'NoSiteContext' in message, got: {message}"
            );
        }
        other => panic!("expected LegacyApi error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_payload_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/self/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let result = client.list_sites().await;
    assert!(matches!(result, Err(Error::Deserialization { .. })));
}

#[tokio::test]
async fn test_unifi_os_error_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/self/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": { "code": 401, "message": "Unauthorized" }
        })))
        .mount(&server)
        .await;

    let result = client.list_sites().await;
    assert!(matches!(result, Err(Error::Authentication { .. })));
}

#[tokio::test]
async fn test_server_error_carries_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/s/default/rest/wlanconf"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let result = client.list_wlans("default").await;
    match result {
        Err(Error::LegacyApi { status, .. }) => assert_eq!(status, Some(502)),
        other => panic!("expected LegacyApi error, got: {other:?}"),
    }
}

// ── UniFi OS ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_detect_unifi_os_platform() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let platform = LegacyClient::detect_platform(
        &Url::parse(&server.uri()).unwrap(),
        &TransportConfig::default(),
    )
    .await
    .unwrap();
    assert_eq!(platform, ControllerPlatform::UnifiOs);
}

#[tokio::test]
async fn test_unifi_os_csrf_token_sent_on_create() {
    let server = MockServer::start().await;
    let client = LegacyClient::new(
        Url::parse(&server.uri()).unwrap(),
        ControllerPlatform::UnifiOs,
        &TransportConfig::default(),
    )
    .unwrap();

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", "TOKEN=jwt; Path=/")
                .insert_header("X-CSRF-Token", "csrf-1")
                .set_body_json(json!({})),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/proxy/network/api/s/default/rest/networkconf"))
        .and(header("x-csrf-token", "csrf-1"))
        .respond_with(ok(json!([{ "_id": "n7", "name": "Lab", "vlan": 7 }])))
        .expect(1)
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "pw".to_string().into();
    client.login("admin", &secret).await.unwrap();
    let created = client
        .create_network("default", &NewNetwork::vlan_only("Lab", 7))
        .await
        .unwrap();
    assert_eq!(created.id, "n7");
}
