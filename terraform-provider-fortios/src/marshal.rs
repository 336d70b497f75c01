//! Expand/flatten between Terraform state and FortiOS wire objects
//!
//! Expand walks an [`ObjectSpec`] in declaration order and turns every
//! attribute set in Terraform state into its hyphenated wire field. Flatten
//! goes the other way for a device response, consulting the prior state for
//! write-only secrets, CIDR notation and which nested tables to refresh.

use crate::objects::{FieldKind, FieldSpec, ObjectSpec};
use crate::resources::ResourceState;
use crate::schema::Diagnostic;
use fortios_common::{
    api_patch, config_to_int, dynamic_sort_subtable, object_wire_name, to_wire_name,
    validate_conv_ipmask_to_cidr, value_to_int, FirmwareVersion, SortMode,
};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

/// What expand emits for each set attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandMode {
    /// The configured value.
    Values,
    /// An explicit `null`, which resets a global object's field.
    Nil,
}

/// Result of expanding a Terraform state into a wire object.
#[derive(Debug, Clone, Default)]
pub struct Expanded {
    pub object: Map<String, Value>,
    pub warnings: Vec<Diagnostic>,
}

/// Options controlling a refresh from a device response.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlattenOptions {
    pub sort: SortMode,
    /// Refresh nested tables even when they are not in prior state.
    pub all_tables: bool,
    pub version: Option<FirmwareVersion>,
}

/// A device value whose shape does not match the schema.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{path}: expected {expected}")]
pub struct Mismatch {
    pub path: String,
    pub expected: &'static str,
}

impl Mismatch {
    fn at(path: &str, expected: &'static str) -> Self {
        Self {
            path: path.to_string(),
            expected,
        }
    }
}

/// Whether a state value counts as set: present, not null, not an empty
/// string and not an empty list.
pub fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// Build the wire object for `state`.
pub fn expand_object(
    spec: &ObjectSpec,
    state: &ResourceState,
    mode: ExpandMode,
    version: Option<FirmwareVersion>,
) -> Result<Expanded, Vec<Diagnostic>> {
    let mut expanded = Expanded::default();
    let mut errors = Vec::new();

    for field in &spec.fields {
        let Some(value) = state.get(field.name).filter(|v| is_set(v)) else {
            continue;
        };

        if !field.is_supported(version) {
            let device = version.map(|v| v.to_string()).unwrap_or_default();
            expanded.warnings.push(
                Diagnostic::warning("Attribute not supported by device firmware")
                    .with_detail(&format!(
                        "{} is not available on FortiOS {device} and was not sent",
                        field.name
                    ))
                    .with_attribute_path(field.name),
            );
            continue;
        }

        let wire_name = object_wire_name(field.name);
        match mode {
            ExpandMode::Nil => {
                expanded.object.insert(wire_name, Value::Null);
            }
            ExpandMode::Values => match expand_value(field, value, field.name) {
                Ok(wire) => {
                    expanded.object.insert(wire_name, wire);
                }
                Err(e) => errors.push(e),
            },
        }
    }

    if errors.is_empty() {
        Ok(expanded)
    } else {
        Err(errors)
    }
}

fn type_error(path: &str, expected: &str) -> Diagnostic {
    Diagnostic::error("Invalid attribute value")
        .with_detail(&format!("{path} must be {expected}"))
        .with_attribute_path(path)
}

/// Expand one attribute value. `path` is the dotted state path
/// (`pre.index.field` inside tables).
pub fn expand_value(field: &FieldSpec, value: &Value, path: &str) -> Result<Value, Diagnostic> {
    match &field.kind {
        FieldKind::Text { .. } | FieldKind::Choice(_) | FieldKind::IpMask => match value {
            Value::String(s) => Ok(Value::String(s.clone())),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            _ => Err(type_error(path, "a string")),
        },
        FieldKind::Integer { .. } => config_to_int(value)
            .map(Value::from)
            .ok_or_else(|| type_error(path, "a number")),
        FieldKind::Table { fields, .. } => {
            let rows = value.as_array().ok_or_else(|| type_error(path, "a list"))?;
            rows.iter()
                .enumerate()
                .map(|(index, row)| expand_row(fields, row, &format!("{path}.{index}")))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        FieldKind::Complex { fields } => {
            let row = match value {
                Value::Array(rows) => rows.first(),
                Value::Object(_) => Some(value),
                _ => None,
            }
            .ok_or_else(|| type_error(path, "a single block"))?;
            expand_row(fields, row, &format!("{path}.0"))
        }
    }
}

fn expand_row(fields: &[FieldSpec], row: &Value, pre: &str) -> Result<Value, Diagnostic> {
    let row = row.as_object().ok_or_else(|| type_error(pre, "a block"))?;
    let mut out = Map::new();

    for field in fields {
        if let Some(value) = row.get(field.name).filter(|v| is_set(v)) {
            let path = format!("{pre}.{}", field.name);
            out.insert(to_wire_name(field.name), expand_value(field, value, &path)?);
        }
    }

    Ok(Value::Object(out))
}

/// Refresh `prior` from a device object.
///
/// Attributes the schema does not refresh (secrets, unconfigured tables,
/// fields the firmware predates) keep their prior value.
pub fn flatten_object(
    spec: &ObjectSpec,
    wire: &Map<String, Value>,
    prior: &ResourceState,
    options: &FlattenOptions,
) -> ResourceState {
    let mut state = prior.clone();

    for field in &spec.fields {
        if field.sensitive || !field.is_supported(options.version) {
            continue;
        }
        if field.is_nested() && !options.all_tables && !prior.is_set(field.name) {
            continue;
        }

        let wire_value = wire.get(&object_wire_name(field.name));
        let result = flatten_value(
            field,
            wire_value.unwrap_or(&Value::Null),
            prior.get(field.name),
            field.name,
            options.sort,
        );

        match result {
            Ok(value) => state.set(field.name, value),
            Err(mismatch) if api_patch(wire_value) => {
                warn!("{}: ignoring unexpected device value ({})", spec.label, mismatch);
            }
            Err(mismatch) => {
                warn!("{}: {}", spec.label, mismatch);
                state.set(field.name, Value::Null);
            }
        }
    }

    state
}

/// Flatten one device value. `prior` is the state value at the same path.
pub fn flatten_value(
    field: &FieldSpec,
    wire: &Value,
    prior: Option<&Value>,
    path: &str,
    sort: SortMode,
) -> Result<Value, Mismatch> {
    if wire.is_null() {
        return Ok(Value::Null);
    }

    match &field.kind {
        FieldKind::Text { .. } | FieldKind::Choice(_) => match wire {
            Value::String(s) => Ok(Value::String(s.clone())),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            _ => Err(Mismatch::at(path, "a string")),
        },
        FieldKind::IpMask => {
            let device = wire.as_str().ok_or_else(|| Mismatch::at(path, "a string"))?;
            let configured = prior.and_then(Value::as_str).unwrap_or_default();
            Ok(Value::String(validate_conv_ipmask_to_cidr(configured, device)))
        }
        FieldKind::Integer { .. } => value_to_int(wire)
            .map(Value::from)
            .ok_or_else(|| Mismatch::at(path, "a number")),
        FieldKind::Table { fields, sort_key } => {
            let rows = wire.as_array().ok_or_else(|| Mismatch::at(path, "a list"))?;
            let prior_rows = prior.and_then(Value::as_array);

            let mut out = rows
                .iter()
                .enumerate()
                .map(|(index, row)| {
                    let prior_row = prior_rows.and_then(|p| p.get(index));
                    flatten_row(fields, row, prior_row, &format!("{path}.{index}"), sort)
                })
                .collect::<Result<Vec<_>, _>>()?;

            if let Some(key) = sort_key {
                dynamic_sort_subtable(&mut out, key, sort);
            }

            Ok(Value::Array(out.into_iter().map(Value::Object).collect()))
        }
        FieldKind::Complex { fields } => {
            let prior_row = prior.and_then(Value::as_array).and_then(|rows| rows.first());
            let row = flatten_row(fields, wire, prior_row, &format!("{path}.0"), sort)?;
            Ok(Value::Array(vec![Value::Object(row)]))
        }
    }
}

fn flatten_row(
    fields: &[FieldSpec],
    row: &Value,
    prior_row: Option<&Value>,
    pre: &str,
    sort: SortMode,
) -> Result<Map<String, Value>, Mismatch> {
    let row = row.as_object().ok_or_else(|| Mismatch::at(pre, "an object"))?;
    let mut out = Map::new();

    for field in fields {
        let prior = prior_row.and_then(|p| p.get(field.name));
        let value = if field.sensitive {
            prior.filter(|v| is_set(v)).cloned().unwrap_or(Value::Null)
        } else {
            let path = format!("{pre}.{}", field.name);
            let wire = row.get(&to_wire_name(field.name)).unwrap_or(&Value::Null);
            flatten_value(field, wire, prior, &path, sort)?
        };
        out.insert(field.name.to_string(), value);
    }

    Ok(out)
}
