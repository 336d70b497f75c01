//! Loose conversions for values coming back from FortiOS
//!
//! Depending on firmware, integers arrive as JSON numbers or as numeric
//! strings, and mkeys may be either.

use serde_json::Value;

/// Interpret a wire value as an integer.
pub fn value_to_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    }
}

/// Interpret a configured value as an integer.
///
/// Unlike [`value_to_int`] this rejects fractions, so a planned `5.7` is an
/// error rather than a silent `5`.
pub fn config_to_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Render an mkey returned by the device as a Terraform ID.
pub fn mkey_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(i.to_string()),
            None => n.as_f64().map(|f| format!("{}", f as i64)),
        },
        _ => None,
    }
}

/// Whether a read-back mismatch on this wire value can be tolerated.
///
/// Fields the device answered for are kept quiet when their shape does not
/// match the schema (older firmware); a missing value is a real error.
pub fn api_patch(value: Option<&Value>) -> bool {
    !matches!(value, None | Some(Value::Null))
}
