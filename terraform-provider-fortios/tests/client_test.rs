// Tests for `FortiClient` against a mock FortiOS REST API.

use serde_json::{json, Map, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fortios_common::FirmwareVersion;
use terraform_provider_fortios::{ClientError, Endpoint, FortiClient};

const IPS_SENSOR: Endpoint = Endpoint::new("ips", "sensor");
const ROUTER_RIP: Endpoint = Endpoint::new("router", "rip");

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, FortiClient) {
    let server = MockServer::start().await;
    let client = FortiClient::new(&server.uri())
        .unwrap()
        .with_token("api-token")
        .with_vdom("root");
    (server, client)
}

fn success(results: Value) -> Value {
    json!({
        "http_method": "GET",
        "results": results,
        "vdom": "root",
        "status": "success",
        "http_status": 200,
        "version": "v7.2.4"
    })
}

fn object(value: Value) -> Map<String, Value> {
    value.as_object().unwrap().clone()
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_read_table_object() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/cmdb/ips/sensor/sensor1"))
        .and(query_param("vdom", "root"))
        .and(header("authorization", "Bearer api-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(success(json!([{"name": "sensor1", "comment": "c"}]))),
        )
        .mount(&server)
        .await;

    let found = client.read(&IPS_SENSOR, Some("sensor1"), None).await.unwrap();
    assert_eq!(found, Some(object(json!({"name": "sensor1", "comment": "c"}))));
    assert_eq!(client.firmware_version(), Some(FirmwareVersion::new(7, 2, 4)));
}

#[tokio::test]
async fn test_read_global_object() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/cmdb/router/rip"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(success(json!({"default-metric": 5}))),
        )
        .mount(&server)
        .await;

    let found = client.read(&ROUTER_RIP, None, None).await.unwrap();
    assert_eq!(found, Some(object(json!({"default-metric": 5}))));
}

#[tokio::test]
async fn test_resource_vdom_overrides_default() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/cmdb/ips/sensor/sensor1"))
        .and(query_param("vdom", "customer1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(json!([{"name": "sensor1"}]))))
        .mount(&server)
        .await;

    let found = client.read(&IPS_SENSOR, Some("sensor1"), Some("customer1")).await.unwrap();
    assert!(found.is_some());
}

#[tokio::test]
async fn test_mkey_is_percent_encoded() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v2/cmdb/ips/sensor/web%20sensor%2F1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .expect(1)
        .mount(&server)
        .await;

    client.delete(&IPS_SENSOR, "web sensor/1", None).await.unwrap();
}

#[tokio::test]
async fn test_create_posts_object() {
    let (server, client) = setup().await;
    let body = json!({"name": "sensor1", "comment": "created"});

    Mock::given(method("POST"))
        .and(path("/api/v2/cmdb/ips/sensor"))
        .and(query_param("vdom", "root"))
        .and(body_json(&body))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "success", "mkey": "sensor1", "http_status": 200})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = client.create(&IPS_SENSOR, &object(body), None).await.unwrap();
    assert_eq!(response.mkey, Some(json!("sensor1")));
}

#[tokio::test]
async fn test_update_global_object_has_no_mkey() {
    let (server, client) = setup().await;
    let body = json!({"default-metric": null});

    Mock::given(method("PUT"))
        .and(path("/api/v2/cmdb/router/rip"))
        .and(body_json(&body))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .expect(1)
        .mount(&server)
        .await;

    client.update(&ROUTER_RIP, None, &object(body), None).await.unwrap();
}

#[tokio::test]
async fn test_list_with_filter() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/cmdb/ips/sensor"))
        .and(query_param("format", "name"))
        .and(query_param("filter", "name=@lan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(json!([
            {"name": "lan-default"},
            {"name": "lan-strict"}
        ]))))
        .mount(&server)
        .await;

    let keys = client.list(&IPS_SENSOR, "name", Some("name=@lan"), None).await.unwrap();
    assert_eq!(keys, vec![json!("lan-default"), json!("lan-strict")]);
}

#[tokio::test]
async fn test_detect_firmware_version_asks_once() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/monitor/system/status"))
        .and(header("authorization", "Bearer api-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(json!({
            "model_name": "FortiGate",
            "hostname": "fgt1"
        }))))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(client.firmware_version(), None);
    assert_eq!(client.detect_firmware_version().await, Some(FirmwareVersion::new(7, 2, 4)));
    assert_eq!(client.detect_firmware_version().await, Some(FirmwareVersion::new(7, 2, 4)));
}

#[tokio::test]
async fn test_detect_firmware_version_unavailable() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/monitor/system/status"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(client.detect_firmware_version().await, None);
    assert_eq!(client.detect_firmware_version().await, None);
}

// ── Error-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_read_not_found_is_none() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/cmdb/ips/sensor/missing"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"status": "error", "http_status": 404, "error": -3})),
        )
        .mount(&server)
        .await;

    let found = client.read(&IPS_SENSOR, Some("missing"), None).await.unwrap();
    assert_eq!(found, None);
}

#[tokio::test]
async fn test_delete_not_found_is_error() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v2/cmdb/ips/sensor/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string(""))
        .mount(&server)
        .await;

    let err = client.delete(&IPS_SENSOR, "missing", None).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)), "{err}");
}

#[tokio::test]
async fn test_error_envelope_mapped() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/cmdb/ips/sensor"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "status": "error",
            "http_status": 500,
            "error": -5,
            "cli_error": "entry already exists"
        })))
        .mount(&server)
        .await;

    let err = client
        .create(&IPS_SENSOR, &object(json!({"name": "dup"})), None)
        .await
        .unwrap_err();

    match err {
        ClientError::Api {
            status,
            code,
            message,
        } => {
            assert_eq!(status, 500);
            assert_eq!(code, Some(-5));
            assert!(message.contains("A duplicate entry already exists"), "{message}");
            assert!(message.contains("entry already exists"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_error_status_with_http_200() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/v2/cmdb/router/rip"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "error", "error": -651})),
        )
        .mount(&server)
        .await;

    let err = client
        .update(&ROUTER_RIP, None, &object(json!({"default-metric": 99})), None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Input value is invalid"), "{err}");
}

#[tokio::test]
async fn test_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client.read(&ROUTER_RIP, None, None).await.unwrap_err();
    assert!(matches!(err, ClientError::AuthFailed));
}

#[tokio::test]
async fn test_plain_text_error_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let err = client.read(&ROUTER_RIP, None, None).await.unwrap_err();
    match err {
        ClientError::Api { status, message, .. } => {
            assert_eq!(status, 502);
            assert!(message.contains("Bad Gateway"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
}
