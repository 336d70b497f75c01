//! Link health monitors (`system/link-monitor`)

use crate::client::Endpoint;
use crate::objects::{FieldSpec, Mkey, ObjectSpec};
use fortios_common::FirmwareVersion;

const ADDR_MODE: &[&str] = &["ipv4", "ipv6"];
const PROTOCOL: &[&str] = &["ping", "tcp-echo", "udp-echo", "http", "twamp", "ping6"];
const SECURITY_MODE: &[&str] = &["none", "authentication"];
const SERVER_CONFIG: &[&str] = &["default", "individual"];

pub fn spec() -> ObjectSpec {
    ObjectSpec {
        type_name: "fortios_system_linkmonitor",
        label: "SystemLinkMonitor",
        endpoint: Endpoint::new("system", "link-monitor"),
        mkey: Mkey::Field("name"),
        description: "Configure Link Health Monitor.",
        fields: vec![
            FieldSpec::string("name", 35).force_new(),
            FieldSpec::choice("addr_mode", ADDR_MODE),
            FieldSpec::string("srcintf", 15),
            FieldSpec::choice("server_config", SERVER_CONFIG)
                .since(FirmwareVersion::new(6, 4, 0)),
            FieldSpec::table("server", vec![FieldSpec::string("address", 64)])
                .sort_by("address"),
            FieldSpec::choice("protocol", PROTOCOL),
            FieldSpec::int("port", 1, 65535),
            FieldSpec::string("gateway_ip", 15),
            FieldSpec::string("gateway_ip6", 43),
            FieldSpec::table("route", vec![FieldSpec::string("subnet", 79)]).sort_by("subnet"),
            FieldSpec::string("source_ip", 15),
            FieldSpec::string("source_ip6", 43),
            FieldSpec::string("http_get", 1024),
            FieldSpec::string("http_agent", 1024),
            FieldSpec::string("http_match", 1024),
            FieldSpec::int("interval", 500, 3_600_000),
            FieldSpec::int("timeout", 1, 255),
            FieldSpec::int("failtime", 1, 3600),
            FieldSpec::int("recoverytime", 1, 3600),
            FieldSpec::int("probe_count", 5, 30),
            FieldSpec::choice("security_mode", SECURITY_MODE),
            FieldSpec::text("password").sensitive(),
            FieldSpec::int("packet_size", 64, 1024),
            FieldSpec::int("ha_priority", 1, 50),
            FieldSpec::int("fail_weight", 0, 255),
            FieldSpec::toggle("update_cascade_interface"),
            FieldSpec::toggle("update_static_route"),
            FieldSpec::toggle("update_policy_route"),
            FieldSpec::toggle("status"),
            FieldSpec::toggle("diffservcode"),
            FieldSpec::string("class_id", 10),
            FieldSpec::toggle("service_detection"),
        ],
    }
}
