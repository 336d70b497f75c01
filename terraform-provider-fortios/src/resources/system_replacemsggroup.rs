//! Replacement message groups (`system/replacemsg-group`)

use crate::client::Endpoint;
use crate::objects::{FieldSpec, Mkey, ObjectSpec};
use fortios_common::FirmwareVersion;

const GROUP_TYPES: &[&str] = &["default", "utm", "auth", "ec"];
const HEADERS: &[&str] = &["none", "http", "8bit"];
const FORMATS: &[&str] = &["none", "text", "html", "wml"];

/// Message categories, each a table of `{msg_type, buffer, header, format}`.
const CATEGORIES: &[&str] = &[
    "mail",
    "http",
    "webproxy",
    "ftp",
    "fortiguard_wf",
    "spam",
    "alertmail",
    "admin",
    "auth",
    "sslvpn",
    "nac_quar",
    "traffic_quota",
    "utm",
    "custom_message",
    "icap",
];

fn message_table(name: &'static str) -> FieldSpec {
    FieldSpec::table(
        name,
        vec![
            FieldSpec::string("msg_type", 28),
            FieldSpec::string("buffer", 32768),
            FieldSpec::choice("header", HEADERS),
            FieldSpec::choice("format", FORMATS),
        ],
    )
    .sort_by("msg_type")
}

pub fn spec() -> ObjectSpec {
    let mut fields = vec![
        FieldSpec::string("name", 35).required().force_new(),
        FieldSpec::string("comment", 255),
        FieldSpec::choice("group_type", GROUP_TYPES).required(),
    ];
    fields.extend(CATEGORIES.iter().copied().map(message_table));
    fields.push(message_table("automation").since(FirmwareVersion::new(7, 0, 0)));

    ObjectSpec {
        type_name: "fortios_system_replacemsggroup",
        label: "SystemReplacemsgGroup",
        endpoint: Endpoint::new("system", "replacemsg-group"),
        mkey: Mkey::Field("name"),
        description: "Configure replacement message groups.",
        fields,
    }
}
