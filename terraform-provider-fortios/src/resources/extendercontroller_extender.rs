//! FortiExtender units managed by the extender controller
//! (`extender-controller/extender`)

use crate::client::Endpoint;
use crate::objects::{FieldSpec, Mkey, ObjectSpec};
use fortios_common::FirmwareVersion;

const ROLE: &[&str] = &["none", "primary", "secondary"];
const MODE: &[&str] = &["standalone", "redundant"];
const DIALMODE: &[&str] = &["dial-on-demand", "always-connect"];
const REDIAL: &[&str] = &["none", "1", "2", "3", "4", "5", "6", "7", "8", "9", "10"];
const AUTH_TYPE: &[&str] = &["none", "pap", "chap"];
const EXT_NAME_MODE: &[&str] = &["none", "auto", "manual"];
const PREFERRED_CARRIER_MODE: &[&str] = &["disable", "enable"];
const MULTI_MODE: &[&str] = &["disable", "enable"];
const PPP_AUTH: &[&str] = &["none", "pap", "chap", "mschapv2"];
const CONN_STATUS: &[&str] = &["active", "disable"];

fn auto_switch() -> FieldSpec {
    FieldSpec::complex(
        "auto_switch",
        vec![
            FieldSpec::toggle("disconnect"),
            FieldSpec::int("disconnect_threshold", 1, 100),
            FieldSpec::int("disconnect_period", 600, 18000),
            FieldSpec::toggle("signal"),
            FieldSpec::toggle("dataplan"),
            FieldSpec::toggle("switch_back"),
            FieldSpec::string("switch_back_time", 31),
            FieldSpec::int("switch_back_timer", 3600, 2_147_483_647),
        ],
    )
}

fn modem(name: &'static str) -> FieldSpec {
    FieldSpec::complex(
        name,
        vec![
            FieldSpec::string("ifname", 15),
            FieldSpec::int("redundant_mode", 0, 1),
            FieldSpec::string("redundant_intf", 15),
            FieldSpec::toggle("conn_status"),
            FieldSpec::toggle("default_sim"),
            FieldSpec::toggle("gps"),
            FieldSpec::toggle("sim1_pin"),
            FieldSpec::toggle("sim2_pin"),
            FieldSpec::string("sim1_pin_code", 27).sensitive(),
            FieldSpec::string("sim2_pin_code", 27).sensitive(),
            FieldSpec::string("preferred_carrier", 31),
            auto_switch(),
        ],
    )
}

fn controller_report() -> FieldSpec {
    FieldSpec::complex(
        "controller_report",
        vec![
            FieldSpec::toggle("status"),
            FieldSpec::int("interval", 0, 2_147_483_647),
            FieldSpec::int("signal_threshold", 10, 50),
        ],
    )
    .since(FirmwareVersion::new(6, 4, 2))
}

pub fn spec() -> ObjectSpec {
    ObjectSpec {
        type_name: "fortios_extendercontroller_extender",
        label: "ExtenderControllerExtender",
        endpoint: Endpoint::new("extender-controller", "extender"),
        mkey: Mkey::Field("name"),
        description: "Extender controller configuration.",
        fields: vec![
            FieldSpec::string("name", 19).force_new(),
            FieldSpec::string("fosid", 19).required(),
            FieldSpec::toggle("authorized"),
            FieldSpec::string("ext_name", 31),
            FieldSpec::string("description", 31),
            FieldSpec::uint32("vdom"),
            FieldSpec::uint32("device_id"),
            FieldSpec::choice("extension_type", &["wan-extension", "lan-extension"])
                .since(FirmwareVersion::new(7, 0, 0)),
            FieldSpec::string("profile", 31).since(FirmwareVersion::new(7, 0, 0)),
            FieldSpec::choice("override_allowaccess", &["enable", "disable"]),
            FieldSpec::text("allowaccess"),
            FieldSpec::choice("override_login_password_change", &["enable", "disable"]),
            FieldSpec::choice("login_password_change", &["yes", "default", "no"]),
            FieldSpec::string("login_password", 27).sensitive(),
            FieldSpec::choice("override_enforce_bandwidth", &["enable", "disable"]),
            FieldSpec::toggle("enforce_bandwidth"),
            FieldSpec::int("bandwidth_limit", 1, 16_776_000),
            FieldSpec::string("wan_extension", 31),
            FieldSpec::string("admin", 15),
            FieldSpec::string("ifname", 15),
            FieldSpec::choice("role", ROLE),
            FieldSpec::choice("mode", MODE),
            FieldSpec::choice("dial_mode", DIALMODE),
            FieldSpec::choice("redial", REDIAL),
            FieldSpec::int("redundant_intf", 0, 1),
            FieldSpec::int("dial_status", 0, 2_147_483_647),
            FieldSpec::int("conn_status", 0, 2_147_483_647),
            FieldSpec::choice("ext_name_mode", EXT_NAME_MODE),
            FieldSpec::string("access_point_name", 63),
            FieldSpec::string("username", 63),
            FieldSpec::string("password", 27).sensitive(),
            FieldSpec::choice("auth_type", AUTH_TYPE),
            FieldSpec::choice("ppp_auth_protocol", PPP_AUTH),
            FieldSpec::string("ppp_username", 31),
            FieldSpec::string("ppp_password", 27).sensitive(),
            FieldSpec::int("at_dial_script", 0, 2_147_483_647),
            FieldSpec::choice("multi_mode", MULTI_MODE),
            FieldSpec::choice("preferred_carrier_mode", PREFERRED_CARRIER_MODE),
            FieldSpec::choice("status", CONN_STATUS),
            FieldSpec::int("allowed_carrier_count", 0, 2_147_483_647),
            FieldSpec::string("sim_pin", 27).sensitive(),
            modem("modem1"),
            modem("modem2"),
            controller_report(),
        ],
    }
}
