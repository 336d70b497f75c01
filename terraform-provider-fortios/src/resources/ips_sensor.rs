//! IPS sensors (`ips/sensor`)
//!
//! A sensor is a list of `entries` selecting signatures (by rule, CVE or
//! filter attributes) plus legacy `filter` and `override` tables kept for
//! configurations migrated from FortiOS 5.x.

use crate::client::Endpoint;
use crate::objects::{FieldSpec, Mkey, ObjectSpec};

const BLOCK_MALICIOUS_URL: &[&str] = &["disable", "enable"];
const SCAN_BOTNET: &[&str] = &["disable", "block", "monitor"];
const EXTENDED_LOG: &[&str] = &["enable", "disable"];
const STATUS: &[&str] = &["disable", "enable", "default"];
const ACTION: &[&str] = &["pass", "block", "reset", "default"];
const QUARANTINE: &[&str] = &["none", "attacker"];
const RATE_TRACK: &[&str] = &["none", "src-ip", "dest-ip", "dhcp-client", "dns-domain"];

fn exempt_ip() -> FieldSpec {
    FieldSpec::table(
        "exempt_ip",
        vec![
            FieldSpec::uint32("id"),
            FieldSpec::ipmask("src_ip"),
            FieldSpec::ipmask("dst_ip"),
        ],
    )
    .sort_by("id")
}

/// Signature selection and the action applied to it, shared by every table.
fn action_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::choice("status", STATUS),
        FieldSpec::toggle("log"),
        FieldSpec::toggle("log_packet"),
        FieldSpec::toggle("log_attack_context"),
        FieldSpec::choice("action", ACTION),
        FieldSpec::choice("quarantine", QUARANTINE),
        FieldSpec::uint32("quarantine_expiry"),
        FieldSpec::toggle("quarantine_log"),
    ]
}

fn selectors() -> Vec<FieldSpec> {
    vec![
        FieldSpec::text("location"),
        FieldSpec::text("severity"),
        FieldSpec::text("protocol"),
        FieldSpec::text("os"),
        FieldSpec::text("application"),
    ]
}

fn entries() -> FieldSpec {
    let mut fields = vec![
        FieldSpec::uint32("id"),
        FieldSpec::table("rule", vec![FieldSpec::uint32("id")]).sort_by("id"),
        FieldSpec::table("cve", vec![FieldSpec::string("cve_entry", 19)]).sort_by("cve_entry"),
    ];
    fields.extend(selectors());
    fields.extend(action_fields());
    fields.extend([
        FieldSpec::uint32("rate_count"),
        FieldSpec::uint32("rate_duration"),
        FieldSpec::choice("rate_mode", &["periodical", "continuous"]),
        FieldSpec::choice("rate_track", RATE_TRACK),
        exempt_ip(),
    ]);
    FieldSpec::table("entries", fields).sort_by("id")
}

fn filter() -> FieldSpec {
    let mut fields = vec![FieldSpec::string("name", 63)];
    fields.extend(selectors());
    fields.extend(action_fields());
    FieldSpec::table("filter", fields).sort_by("name")
}

fn rule_override() -> FieldSpec {
    let mut fields = vec![FieldSpec::uint32("rule_id")];
    fields.extend(action_fields());
    fields.push(exempt_ip());
    FieldSpec::table("override", fields).sort_by("rule_id")
}

pub fn spec() -> ObjectSpec {
    ObjectSpec {
        type_name: "fortios_ips_sensor",
        label: "IpsSensor",
        endpoint: Endpoint::new("ips", "sensor"),
        mkey: Mkey::Field("name"),
        description: "Configure IPS sensor.",
        fields: vec![
            FieldSpec::string("name", 35).required().force_new(),
            FieldSpec::string("comment", 255),
            FieldSpec::string("replacemsg_group", 35),
            FieldSpec::choice("block_malicious_url", BLOCK_MALICIOUS_URL),
            FieldSpec::choice("scan_botnet_connections", SCAN_BOTNET),
            FieldSpec::choice("extended_log", EXTENDED_LOG),
            entries(),
            filter(),
            rule_override(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marshal::{expand_object, flatten_object, ExpandMode, FlattenOptions};
    use crate::resources::ResourceState;
    use fortios_common::SortMode;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn read(prior: serde_json::Value, wire: serde_json::Value, sort: SortMode) -> ResourceState {
        let prior = ResourceState::from_value(&prior).unwrap();
        let options = FlattenOptions {
            sort,
            ..Default::default()
        };
        flatten_object(&spec(), wire.as_object().unwrap(), &prior, &options)
    }

    #[test]
    fn test_expand_entries_with_nested_tables() {
        let state = ResourceState::from_value(&json!({
            "name": "sensor1",
            "entries": [{
                "id": 1,
                "rule": [{"id": 40000}],
                "severity": "high critical",
                "action": "block",
                "exempt_ip": [{"id": 1, "src_ip": "10.0.0.0/8", "dst_ip": "0.0.0.0/0"}]
            }]
        }))
        .unwrap();

        let expanded = expand_object(&spec(), &state, ExpandMode::Values, None).unwrap();
        assert_eq!(
            expanded.object.get("entries"),
            Some(&json!([{
                "id": 1,
                "rule": [{"id": 40000}],
                "severity": "high critical",
                "action": "block",
                "exempt-ip": [{"id": 1, "src-ip": "10.0.0.0/8", "dst-ip": "0.0.0.0/0"}]
            }]))
        );
    }

    #[test]
    fn test_entries_sorted_by_id() {
        let state = read(
            json!({"name": "s", "entries": [{"id": 1}]}),
            json!({"name": "s", "entries": [{"id": 10}, {"id": 2}, {"id": 1}]}),
            SortMode::Natural,
        );
        let ids: Vec<_> = state.get("entries").unwrap().as_array().unwrap()
            .iter()
            .map(|row| row["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2, 10]);
    }

    #[test]
    fn test_device_order_kept_without_sorting() {
        let state = read(
            json!({"name": "s", "filter": [{"name": "a"}]}),
            json!({"name": "s", "filter": [{"name": "web"}, {"name": "dns"}]}),
            SortMode::Off,
        );
        let names: Vec<_> = state.get("filter").unwrap().as_array().unwrap()
            .iter()
            .map(|row| row["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["web", "dns"]);
    }

    #[test]
    fn test_filter_sorted_by_name() {
        let state = read(
            json!({"name": "s", "filter": [{"name": "a"}]}),
            json!({"name": "s", "filter": [{"name": "web"}, {"name": "dns"}]}),
            SortMode::Lexical,
        );
        let names: Vec<_> = state.get("filter").unwrap().as_array().unwrap()
            .iter()
            .map(|row| row["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["dns", "web"]);
    }

    #[test]
    fn test_exempt_ip_read_as_cidr() {
        let state = read(
            json!({"name": "s", "entries": [{"id": 1, "exempt_ip": [{"id": 1, "src_ip": "10.0.0.0/8"}]}]}),
            json!({"name": "s", "entries": [{
                "id": 1,
                "exempt-ip": [{"id": 1, "src-ip": "10.0.0.0 255.0.0.0", "dst-ip": "0.0.0.0 0.0.0.0"}]
            }]}),
            SortMode::Off,
        );
        let exempt = &state.get("entries").unwrap()[0]["exempt_ip"][0];
        assert_eq!(exempt["src_ip"], json!("10.0.0.0/8"));
        // Not configured as CIDR, so the device form stays.
        assert_eq!(exempt["dst_ip"], json!("0.0.0.0 0.0.0.0"));
    }
}
