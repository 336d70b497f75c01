//! Terraform ↔ FortiOS attribute name translation
//!
//! Terraform attributes are snake_case, the FortiOS REST API uses
//! hyphenated names. At the top level of an object the FortiOS `id` field is
//! exposed as `fosid`, because `id` is reserved by Terraform.

/// Terraform alias for a top-level FortiOS `id` field.
pub const FOSID: &str = "fosid";

/// `session_ttl` → `session-ttl`
pub fn to_wire_name(tf_name: &str) -> String {
    tf_name.replace('_', "-")
}

/// Wire name of a top-level attribute (`fosid` → `id`).
pub fn object_wire_name(tf_name: &str) -> String {
    if tf_name == FOSID {
        "id".to_string()
    } else {
        to_wire_name(tf_name)
    }
}
