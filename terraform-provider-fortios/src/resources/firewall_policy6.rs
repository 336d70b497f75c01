//! IPv6 firewall policies (`firewall/policy6`)

use crate::client::Endpoint;
use crate::objects::{FieldSpec, Mkey, ObjectSpec};
use fortios_common::FirmwareVersion;

const ACTIONS: &[&str] = &["accept", "deny", "ipsec"];
const LOGTRAFFIC: &[&str] = &["all", "utm", "disable"];
const INSPECTION_MODES: &[&str] = &["proxy", "flow"];
const PROFILE_TYPES: &[&str] = &["single", "group"];
const SCHEDULE_TIMEOUT: &[&str] = &["enable", "disable"];
const FIREWALL_SESSION_DIRTY: &[&str] = &["check-all", "check-new"];

pub fn spec() -> ObjectSpec {
    ObjectSpec {
        type_name: "fortios_firewall_policy6",
        label: "FirewallPolicy6",
        endpoint: Endpoint::new("firewall", "policy6"),
        mkey: Mkey::Field("policyid"),
        description: "Configure IPv6 policies.",
        fields: vec![
            FieldSpec::uint32("policyid").force_new(),
            FieldSpec::string("name", 35),
            FieldSpec::string("uuid", 36),
            FieldSpec::names("srcintf", 79).required(),
            FieldSpec::names("dstintf", 79).required(),
            FieldSpec::names("srcaddr", 79).required(),
            FieldSpec::names("dstaddr", 79).required(),
            FieldSpec::toggle("srcaddr_negate"),
            FieldSpec::toggle("dstaddr_negate"),
            FieldSpec::choice("action", ACTIONS),
            FieldSpec::toggle("status"),
            FieldSpec::string("schedule", 35).required(),
            FieldSpec::choice("schedule_timeout", SCHEDULE_TIMEOUT),
            FieldSpec::names("service", 79),
            FieldSpec::toggle("service_negate"),
            FieldSpec::choice("inspection_mode", INSPECTION_MODES),
            FieldSpec::toggle("utm_status"),
            FieldSpec::choice("profile_type", PROFILE_TYPES),
            FieldSpec::string("profile_group", 35),
            FieldSpec::string("av_profile", 35),
            FieldSpec::string("webfilter_profile", 35),
            FieldSpec::string("dnsfilter_profile", 35),
            FieldSpec::string("application_list", 35),
            FieldSpec::string("ips_sensor", 35),
            FieldSpec::string("ssl_ssh_profile", 35),
            FieldSpec::choice("logtraffic", LOGTRAFFIC),
            FieldSpec::toggle("logtraffic_start"),
            FieldSpec::toggle("nat"),
            FieldSpec::toggle("ippool"),
            FieldSpec::names("poolname", 79),
            FieldSpec::toggle("fixedport"),
            FieldSpec::string("vpntunnel", 35),
            FieldSpec::toggle("inbound"),
            FieldSpec::toggle("outbound"),
            FieldSpec::int("session_ttl", 0, 2_147_483_647),
            FieldSpec::choice("firewall_session_dirty", FIREWALL_SESSION_DIRTY),
            FieldSpec::string("traffic_shaper", 35),
            FieldSpec::string("traffic_shaper_reverse", 35),
            FieldSpec::names("groups", 79),
            FieldSpec::names("users", 79),
            FieldSpec::names("custom_log_fields", 35),
            FieldSpec::toggle("anti_replay"),
            FieldSpec::toggle("tcp_session_without_syn"),
            FieldSpec::text("comments"),
            FieldSpec::string("cifs_profile", 35).since(FirmwareVersion::new(6, 2, 0)),
            FieldSpec::int("tos_mask", 0, 255),
            FieldSpec::string("decrypted_traffic_mirror", 35).since(FirmwareVersion::new(6, 4, 0)),
        ],
    }
}
