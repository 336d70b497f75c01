//! HA cluster settings (`system/ha`), a global object

use crate::client::Endpoint;
use crate::objects::{FieldSpec, Mkey, ObjectSpec};
use fortios_common::FirmwareVersion;

const MODES: &[&str] = &["standalone", "a-a", "a-p"];
const SYNC_PACKET_BALANCE: &[&str] = &["enable", "disable"];
const SCHEDULES: &[&str] = &[
    "none",
    "leastconnection",
    "round-robin",
    "weight-round-robin",
    "random",
    "ip",
    "ipport",
];

fn mgmt_interface() -> Vec<FieldSpec> {
    vec![
        FieldSpec::uint32("id"),
        FieldSpec::string("interface", 15),
        FieldSpec::ipmask("dst"),
        FieldSpec::string("gateway", 15),
        FieldSpec::string("gateway6", 43),
    ]
}

fn vcluster() -> Vec<FieldSpec> {
    vec![
        FieldSpec::int("vcluster_id", 1, 30),
        FieldSpec::toggle("override"),
        FieldSpec::int("priority", 0, 255),
        FieldSpec::int("override_wait_time", 0, 3600),
        FieldSpec::toggle("monitor"),
        FieldSpec::string("pingserver_monitor_interface", 79),
        FieldSpec::int("pingserver_failover_threshold", 0, 50),
        FieldSpec::toggle("pingserver_slave_force_reset"),
        FieldSpec::names("vdom", 79),
    ]
}

fn secondary_vcluster() -> Vec<FieldSpec> {
    vec![
        FieldSpec::int("vcluster_id", 1, 30),
        FieldSpec::toggle("override"),
        FieldSpec::int("priority", 0, 255),
        FieldSpec::string("monitor", 79),
        FieldSpec::string("pingserver_monitor_interface", 79),
        FieldSpec::int("pingserver_failover_threshold", 0, 50),
        FieldSpec::toggle("pingserver_slave_force_reset"),
        FieldSpec::text("vdom"),
    ]
}

pub fn spec() -> ObjectSpec {
    ObjectSpec {
        type_name: "fortios_system_ha",
        label: "SystemHa",
        endpoint: Endpoint::new("system", "ha"),
        mkey: Mkey::Singleton,
        description: "Configure HA.",
        fields: vec![
            FieldSpec::int("group_id", 0, 1023),
            FieldSpec::string("group_name", 32),
            FieldSpec::choice("mode", MODES),
            FieldSpec::choice("sync_packet_balance", SYNC_PACKET_BALANCE),
            FieldSpec::text("password").sensitive(),
            FieldSpec::text("key").sensitive(),
            FieldSpec::text("hbdev"),
            FieldSpec::toggle("session_sync_dev"),
            FieldSpec::int("route_ttl", 5, 3600),
            FieldSpec::int("route_wait", 0, 3600),
            FieldSpec::int("route_hold", 0, 3600),
            FieldSpec::toggle("sync_config"),
            FieldSpec::toggle("encryption"),
            FieldSpec::toggle("authentication"),
            FieldSpec::int("hb_interval", 1, 20),
            FieldSpec::int("hb_lost_threshold", 1, 60),
            FieldSpec::int("hello_holddown", 5, 300),
            FieldSpec::toggle("gratuitous_arps"),
            FieldSpec::int("arps", 1, 60),
            FieldSpec::int("arps_interval", 1, 20),
            FieldSpec::toggle("session_pickup"),
            FieldSpec::toggle("session_pickup_connectionless"),
            FieldSpec::toggle("session_pickup_delay"),
            FieldSpec::toggle("link_failed_signal"),
            FieldSpec::toggle("uninterruptible_upgrade"),
            FieldSpec::toggle("ha_mgmt_status"),
            FieldSpec::table("ha_mgmt_interfaces", mgmt_interface()).sort_by("id"),
            FieldSpec::int("ha_eth_type", 0, 65535).since(FirmwareVersion::new(6, 0, 0)),
            FieldSpec::choice("schedule", SCHEDULES),
            FieldSpec::text("weight"),
            FieldSpec::toggle("override"),
            FieldSpec::int("priority", 0, 255),
            FieldSpec::int("override_wait_time", 0, 3600),
            FieldSpec::text("monitor"),
            FieldSpec::string("pingserver_monitor_interface", 79),
            FieldSpec::int("pingserver_failover_threshold", 0, 50),
            FieldSpec::toggle("pingserver_slave_force_reset"),
            FieldSpec::int("pingserver_flip_timeout", 6, 2_147_483_647),
            FieldSpec::toggle("vcluster_status"),
            FieldSpec::table("vcluster", vcluster())
                .sort_by("vcluster_id")
                .since(FirmwareVersion::new(7, 0, 2)),
            FieldSpec::toggle("vcluster2"),
            FieldSpec::text("vdom"),
            FieldSpec::complex("secondary_vcluster", secondary_vcluster()),
            FieldSpec::toggle("standalone_mgmt_vdom"),
            FieldSpec::toggle("ha_direct"),
            FieldSpec::toggle("memory_compatible_mode"),
            FieldSpec::toggle("standalone_config_sync"),
            FieldSpec::toggle("logical_sn").since(FirmwareVersion::new(7, 0, 0)),
        ],
    }
}
