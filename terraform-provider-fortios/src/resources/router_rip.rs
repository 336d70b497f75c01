//! RIP routing (`router/rip`), a global object

use crate::client::Endpoint;
use crate::objects::{FieldSpec, Mkey, ObjectSpec};

const DIRECTION: &[&str] = &["in", "out"];
const REDISTRIBUTE: &[&str] = &["connected", "static", "ospf", "bgp", "isis"];
const AUTH_MODE: &[&str] = &["none", "text", "md5"];
const RIP_VERSION: &[&str] = &["1", "2"];
const VERSION_PAIR: &[&str] = &["global", "1", "2", "1 2"];
const SPLIT_HORIZON: &[&str] = &["poisoned", "regular"];

fn distance() -> FieldSpec {
    FieldSpec::table(
        "distance",
        vec![
            FieldSpec::uint32("id"),
            FieldSpec::ipmask("prefix"),
            FieldSpec::int("distance", 1, 255),
            FieldSpec::string("access_list", 35),
        ],
    )
    .sort_by("id")
}

fn distribute_list() -> FieldSpec {
    FieldSpec::table(
        "distribute_list",
        vec![
            FieldSpec::uint32("id"),
            FieldSpec::toggle("status"),
            FieldSpec::choice("direction", DIRECTION),
            FieldSpec::string("listname", 35),
            FieldSpec::string("interface", 15),
        ],
    )
    .sort_by("id")
}

fn offset_list() -> FieldSpec {
    FieldSpec::table(
        "offset_list",
        vec![
            FieldSpec::uint32("id"),
            FieldSpec::toggle("status"),
            FieldSpec::choice("direction", DIRECTION),
            FieldSpec::string("access_list", 35),
            FieldSpec::int("offset", 1, 16),
            FieldSpec::string("interface", 15),
        ],
    )
    .sort_by("id")
}

fn redistribute() -> FieldSpec {
    FieldSpec::table(
        "redistribute",
        vec![
            FieldSpec::choice("name", REDISTRIBUTE),
            FieldSpec::toggle("status"),
            FieldSpec::int("metric", 1, 16),
            FieldSpec::string("routemap", 35),
        ],
    )
    .sort_by("name")
}

fn interface() -> FieldSpec {
    FieldSpec::table(
        "interface",
        vec![
            FieldSpec::string("name", 35),
            FieldSpec::string("auth_keychain", 35),
            FieldSpec::choice("auth_mode", AUTH_MODE),
            FieldSpec::string("auth_string", 16).sensitive(),
            FieldSpec::choice("receive_version", VERSION_PAIR),
            FieldSpec::choice("send_version", VERSION_PAIR),
            FieldSpec::toggle("send_version2_broadcast"),
            FieldSpec::choice("split_horizon_status", &["enable", "disable"]),
            FieldSpec::choice("split_horizon", SPLIT_HORIZON),
            FieldSpec::toggle("flags"),
        ],
    )
    .sort_by("name")
}

pub fn spec() -> ObjectSpec {
    ObjectSpec {
        type_name: "fortios_router_rip",
        label: "RouterRip",
        endpoint: Endpoint::new("router", "rip"),
        mkey: Mkey::Singleton,
        description: "Configure RIP.",
        fields: vec![
            FieldSpec::toggle("default_information_originate"),
            FieldSpec::int("default_metric", 1, 16),
            FieldSpec::int("max_out_metric", 0, 15),
            distance(),
            distribute_list(),
            FieldSpec::table(
                "neighbor",
                vec![FieldSpec::uint32("id"), FieldSpec::string("ip", 15)],
            )
            .sort_by("id"),
            FieldSpec::table(
                "network",
                vec![FieldSpec::uint32("id"), FieldSpec::ipmask("prefix")],
            )
            .sort_by("id"),
            offset_list(),
            FieldSpec::names("passive_interface", 79),
            redistribute(),
            FieldSpec::int("update_timer", 5, 2_147_483_647),
            FieldSpec::int("timeout_timer", 5, 2_147_483_647),
            FieldSpec::int("garbage_timer", 5, 2_147_483_647),
            FieldSpec::choice("version", RIP_VERSION),
            interface(),
        ],
    }
}
