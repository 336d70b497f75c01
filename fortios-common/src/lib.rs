//! Helpers shared by the FortiOS provider crates
//!
//! Everything here is a stateless function or a plain value type: wire-name
//! translation, IP/mask normalisation, subtable sorting, loose JSON number
//! handling and firmware version parsing.

pub mod convert;
pub mod ipmask;
pub mod naming;
pub mod sort;
pub mod version;

pub use convert::{api_patch, config_to_int, mkey_to_string, value_to_int};
pub use ipmask::validate_conv_ipmask_to_cidr;
pub use naming::{object_wire_name, to_wire_name};
pub use sort::{dynamic_sort_subtable, SortMode};
pub use version::{FirmwareVersion, VersionError};

/// Environment switch that makes every read refresh nested tables, as needed
/// when importing existing objects.
pub const IMPORT_TABLE_ENV: &str = "FORTIOS_IMPORT_TABLE";

/// Whether the process runs in import-table mode.
pub fn is_import_table() -> bool {
    std::env::var(IMPORT_TABLE_ENV)
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
