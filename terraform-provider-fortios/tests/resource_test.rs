// End-to-end resource and data source operations against a mock FortiOS.

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use terraform_provider_fortios::resources::{get_all_data_sources, get_all_resources};
use terraform_provider_fortios::{DataSource, FortiClient, Resource, ResourceState};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, FortiClient) {
    let server = MockServer::start().await;
    let client = FortiClient::new(&server.uri())
        .unwrap()
        .with_token("api-token")
        .with_vdom("root");
    (server, client)
}

fn resource(type_name: &str) -> Box<dyn Resource> {
    get_all_resources()
        .into_iter()
        .find(|r| r.type_name() == type_name)
        .unwrap()
}

fn data_source(type_name: &str) -> Box<dyn DataSource> {
    get_all_data_sources()
        .into_iter()
        .find(|d| d.type_name() == type_name)
        .unwrap()
}

fn state(value: Value) -> ResourceState {
    ResourceState::from_value(&value).unwrap()
}

fn ok(results: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "status": "success",
        "http_status": 200,
        "results": results,
        "version": "v7.2.4"
    }))
}

fn not_found() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({"status": "error", "http_status": 404}))
}

// ── Table objects ───────────────────────────────────────────────────

#[tokio::test]
async fn test_create_table_object() {
    let (server, client) = setup().await;
    let sensor = resource("fortios_ips_sensor");

    Mock::given(method("POST"))
        .and(path("/api/v2/cmdb/ips/sensor"))
        .and(query_param("vdom", "root"))
        .and(body_json(json!({
            "name": "sensor1",
            "comment": "lab",
            "entries": [{"id": 1, "severity": "critical", "action": "block"}]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "success", "mkey": "sensor1"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v2/cmdb/ips/sensor/sensor1"))
        .respond_with(ok(json!([{
            "name": "sensor1",
            "comment": "lab",
            "extended-log": "disable",
            "entries": [{"id": 1, "severity": "critical", "action": "block"}],
            "filter": [{"name": "f1"}]
        }])))
        .mount(&server)
        .await;

    let planned = state(json!({
        "name": "sensor1",
        "comment": "lab",
        "entries": [{"id": 1, "severity": "critical", "action": "block"}],
        "dynamic_sort_subtable": "false",
        "get_all_tables": "false"
    }));

    let created = sensor.create(&client, &planned).await.unwrap();
    assert_eq!(created.id().as_deref(), Some("sensor1"));
    assert_eq!(created.get_string("vdomparam").as_deref(), Some("root"));
    assert_eq!(created.get_string("extended_log").as_deref(), Some("disable"));
    assert_eq!(created.get("entries").unwrap()[0]["action"], json!("block"));
    // Not configured, so not pulled into state.
    assert_eq!(created.get("filter"), None);
}

#[tokio::test]
async fn test_create_failure_reports_resource() {
    let (server, client) = setup().await;
    let sensor = resource("fortios_ips_sensor");

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "status": "error",
            "http_status": 500,
            "error": -5
        })))
        .mount(&server)
        .await;

    let diags = sensor
        .create(&client, &state(json!({"name": "sensor1"})))
        .await
        .unwrap_err();
    assert!(
        diags[0].summary.starts_with("Error creating IpsSensor resource:"),
        "{}",
        diags[0].summary
    );
}

#[tokio::test]
async fn test_read_missing_object_clears_state() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/cmdb/system/link-monitor/wan-check"))
        .respond_with(not_found())
        .mount(&server)
        .await;

    let current = state(json!({"id": "wan-check", "name": "wan-check"}));
    let refreshed = resource("fortios_system_linkmonitor")
        .read(&client, &current)
        .await
        .unwrap();
    assert_eq!(refreshed.id(), None);
}

#[tokio::test]
async fn test_read_keeps_sensitive_and_uses_resource_vdom() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/cmdb/system/link-monitor/wan-check"))
        .and(query_param("vdom", "customer1"))
        .respond_with(ok(json!([{
            "name": "wan-check",
            "srcintf": "wan1",
            "password": "ENC abcdef",
            "server": [{"address": "8.8.8.8"}]
        }])))
        .mount(&server)
        .await;

    let current = state(json!({
        "id": "wan-check",
        "name": "wan-check",
        "password": "hunter2",
        "vdomparam": "customer1",
        "get_all_tables": "true"
    }));
    let refreshed = resource("fortios_system_linkmonitor")
        .read(&client, &current)
        .await
        .unwrap();

    assert_eq!(refreshed.get_string("password").as_deref(), Some("hunter2"));
    assert_eq!(refreshed.get_string("srcintf").as_deref(), Some("wan1"));
    assert_eq!(refreshed.get("server"), Some(&json!([{"address": "8.8.8.8"}])));
    assert_eq!(refreshed.get_string("vdomparam").as_deref(), Some("customer1"));
}

#[tokio::test]
async fn test_update_numeric_mkey() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/v2/cmdb/firewall/policy6/12"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "success", "mkey": 12})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v2/cmdb/firewall/policy6/12"))
        .respond_with(ok(json!([{"policyid": 12, "action": "deny", "schedule": "always"}])))
        .mount(&server)
        .await;

    let current = state(json!({"id": "12", "policyid": 12, "action": "accept"}));
    let planned = state(json!({"id": "12", "policyid": 12, "action": "deny"}));

    let updated = resource("fortios_firewall_policy6")
        .update(&client, &current, &planned)
        .await
        .unwrap();
    assert_eq!(updated.id().as_deref(), Some("12"));
    assert_eq!(updated.get_string("action").as_deref(), Some("deny"));
}

#[tokio::test]
async fn test_delete_table_object() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v2/cmdb/system/replacemsg-group/grp1"))
        .and(query_param("vdom", "root"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .expect(1)
        .mount(&server)
        .await;

    resource("fortios_system_replacemsggroup")
        .delete(&client, &state(json!({"id": "grp1", "name": "grp1"})))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_already_gone() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .respond_with(not_found())
        .mount(&server)
        .await;

    resource("fortios_extendercontroller_extender")
        .delete(&client, &state(json!({"id": "fx1", "name": "fx1"})))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_import_reads_all_tables() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/cmdb/ips/sensor/sensor1"))
        .respond_with(ok(json!([{
            "name": "sensor1",
            "filter": [{"name": "f1", "action": "pass"}]
        }])))
        .mount(&server)
        .await;

    let imported = resource("fortios_ips_sensor").import(&client, "sensor1").await.unwrap();
    assert_eq!(imported.id().as_deref(), Some("sensor1"));
    assert_eq!(imported.get("filter").unwrap()[0]["name"], json!("f1"));
}

// ── Global objects ──────────────────────────────────────────────────

#[tokio::test]
async fn test_create_global_object_sets_it() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/v2/cmdb/router/rip"))
        .and(body_json(json!({"default-metric": 5})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v2/cmdb/router/rip"))
        .respond_with(ok(json!({"default-metric": 5, "version": "2"})))
        .mount(&server)
        .await;

    let created = resource("fortios_router_rip")
        .create(&client, &state(json!({"default_metric": 5})))
        .await
        .unwrap();
    assert_eq!(created.id().as_deref(), Some("RouterRip"));
    assert_eq!(created.get_i64("default_metric"), Some(5));
    assert_eq!(created.get_string("version").as_deref(), Some("2"));
}

#[tokio::test]
async fn test_first_write_skips_fields_newer_than_device() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/monitor/system/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "http_status": 200,
            "results": {"model_name": "FortiGate"},
            "version": "v6.4.0"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/v2/cmdb/system/ha"))
        .and(body_json(json!({"mode": "a-p"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v2/cmdb/system/ha"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "results": {"mode": "a-p"},
            "version": "v6.4.0"
        })))
        .mount(&server)
        .await;

    let ha = resource("fortios_system_ha");
    let planned = state(json!({"mode": "a-p", "logical_sn": "enable"}));

    // Same body both times, and the device is asked for its version once.
    ha.create(&client, &planned).await.unwrap();
    ha.create(&client, &planned).await.unwrap();
}

#[tokio::test]
async fn test_create_rejects_fractional_integer() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .expect(0)
        .mount(&server)
        .await;

    let rip = resource("fortios_router_rip");
    let planned = state(json!({"default_metric": 5.7}));

    let diags = rip.validate(&planned);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].attribute, Some(vec!["default_metric".to_string()]));

    let errors = rip.create(&client, &planned).await.unwrap_err();
    assert_eq!(errors[0].attribute, Some(vec!["default_metric".to_string()]));
}

#[tokio::test]
async fn test_delete_global_object_resets_fields() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/v2/cmdb/system/ha"))
        .and(body_json(json!({"group-name": null, "mode": null, "password": null})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .expect(1)
        .mount(&server)
        .await;

    let current = state(json!({
        "id": "SystemHa",
        "group_name": "cluster1",
        "mode": "a-p",
        "password": "secret",
        "vdomparam": "root"
    }));
    resource("fortios_system_ha").delete(&client, &current).await.unwrap();
}

#[tokio::test]
async fn test_delete_global_object_on_older_firmware() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/monitor/system/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "version": "v6.4.0"
        })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/v2/cmdb/system/ha"))
        .and(body_json(json!({"mode": null})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .expect(1)
        .mount(&server)
        .await;

    let current = state(json!({"id": "SystemHa", "mode": "a-p", "logical_sn": "enable"}));
    resource("fortios_system_ha").delete(&client, &current).await.unwrap();
}

// ── Data sources ────────────────────────────────────────────────────

#[tokio::test]
async fn test_data_source_reads_object() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/cmdb/firewall/policy6/3"))
        .respond_with(ok(json!([{
            "policyid": 3,
            "action": "accept",
            "srcintf": [{"name": "port1"}]
        }])))
        .mount(&server)
        .await;

    let found = data_source("fortios_firewall_policy6")
        .read(&client, &state(json!({"policyid": 3})))
        .await
        .unwrap();
    assert_eq!(found.id().as_deref(), Some("3"));
    assert_eq!(found.get_string("action").as_deref(), Some("accept"));
    assert_eq!(found.get("srcintf"), Some(&json!([{"name": "port1"}])));
}

#[tokio::test]
async fn test_data_source_missing_object() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(not_found())
        .mount(&server)
        .await;

    let found = data_source("fortios_ips_sensor")
        .read(&client, &state(json!({"name": "nope"})))
        .await
        .unwrap();
    assert_eq!(found.id(), None);
}

#[tokio::test]
async fn test_list_data_source() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/cmdb/system/link-monitor"))
        .and(query_param("format", "name"))
        .and(query_param("filter", "name=@wan"))
        .respond_with(ok(json!([{"name": "wan1-check"}, {"name": "wan2-check"}])))
        .mount(&server)
        .await;

    let found = data_source("fortios_system_linkmonitorlist")
        .read(&client, &state(json!({"filter": "name=@wan"})))
        .await
        .unwrap();
    assert_eq!(found.id().as_deref(), Some("SystemLinkMonitorListname=@wan"));
    assert_eq!(found.get("namelist"), Some(&json!(["wan1-check", "wan2-check"])));
}
