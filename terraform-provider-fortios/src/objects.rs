//! Declarative FortiOS object descriptions
//!
//! Every FortiOS configuration object is described once as an [`ObjectSpec`]:
//! its REST endpoint, its primary key and an ordered list of [`FieldSpec`]s.
//! The Terraform schema, config validation and the generic marshalling in
//! [`crate::marshal`] are all driven from that description.

use crate::client::Endpoint;
use crate::resources::ResourceState;
use crate::schema::{
    AttributeType, Diagnostic, NestedBlock, ResourceSchema, SchemaAttribute, SchemaBlock,
};
use fortios_common::{config_to_int, FirmwareVersion, SortMode};
use serde_json::Value;

/// Upper bound of FortiOS unsigned 32-bit integer fields.
pub const UINT32_MAX: i64 = 4_294_967_295;

/// Per-resource vdom override.
pub const VDOMPARAM: &str = "vdomparam";
/// Sorting of nested tables on read.
pub const DYNAMIC_SORT_SUBTABLE: &str = "dynamic_sort_subtable";
/// Refresh nested tables that are not in configuration.
pub const GET_ALL_TABLES: &str = "get_all_tables";
/// List data source filter expression.
pub const FILTER: &str = "filter";

const TOGGLE: &[&str] = &["enable", "disable"];

/// Shape and constraints of a single field.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Free-form string, optionally length-limited.
    Text { max_len: Option<usize> },
    /// Integer within an inclusive range.
    Integer { min: i64, max: i64 },
    /// One of a fixed set of strings.
    Choice(&'static [&'static str]),
    /// Address with netmask, normalised to CIDR on read.
    IpMask,
    /// Repeated rows.
    Table {
        fields: Vec<FieldSpec>,
        sort_key: Option<&'static str>,
    },
    /// A single nested object (at most one block in Terraform).
    Complex { fields: Vec<FieldSpec> },
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Terraform attribute name.
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub computed: bool,
    pub force_new: bool,
    pub sensitive: bool,
    /// First firmware release that knows the field.
    pub since: Option<FirmwareVersion>,
}

impl FieldSpec {
    fn of(name: &'static str, kind: FieldKind) -> Self {
        let nested = matches!(kind, FieldKind::Table { .. } | FieldKind::Complex { .. });
        Self {
            name,
            kind,
            required: false,
            computed: !nested,
            force_new: false,
            sensitive: false,
            since: None,
        }
    }

    pub fn string(name: &'static str, max_len: usize) -> Self {
        Self::of(name, FieldKind::Text { max_len: Some(max_len) })
    }

    /// String without a length limit.
    pub fn text(name: &'static str) -> Self {
        Self::of(name, FieldKind::Text { max_len: None })
    }

    pub fn int(name: &'static str, min: i64, max: i64) -> Self {
        Self::of(name, FieldKind::Integer { min, max })
    }

    pub fn uint32(name: &'static str) -> Self {
        Self::int(name, 0, UINT32_MAX)
    }

    pub fn choice(name: &'static str, options: &'static [&'static str]) -> Self {
        Self::of(name, FieldKind::Choice(options))
    }

    /// `enable` / `disable`.
    pub fn toggle(name: &'static str) -> Self {
        Self::choice(name, TOGGLE)
    }

    pub fn ipmask(name: &'static str) -> Self {
        Self::of(name, FieldKind::IpMask)
    }

    pub fn table(name: &'static str, fields: Vec<FieldSpec>) -> Self {
        Self::of(
            name,
            FieldKind::Table {
                fields,
                sort_key: None,
            },
        )
    }

    /// Table of `{name}` references, sorted by name.
    pub fn names(name: &'static str, max_len: usize) -> Self {
        Self::table(name, vec![Self::string("name", max_len)]).sort_by("name")
    }

    pub fn complex(name: &'static str, fields: Vec<FieldSpec>) -> Self {
        Self::of(name, FieldKind::Complex { fields })
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self.computed = false;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    /// Write-only secret.
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self.computed = false;
        self
    }

    pub fn sort_by(mut self, key: &'static str) -> Self {
        if let FieldKind::Table { sort_key, .. } = &mut self.kind {
            *sort_key = Some(key);
        }
        self
    }

    pub fn since(mut self, version: FirmwareVersion) -> Self {
        self.since = Some(version);
        self
    }

    pub fn is_nested(&self) -> bool {
        matches!(self.kind, FieldKind::Table { .. } | FieldKind::Complex { .. })
    }

    /// Whether a device running `version` knows this field. An unknown
    /// version is assumed to support everything.
    pub fn is_supported(&self, version: Option<FirmwareVersion>) -> bool {
        match (self.since, version) {
            (Some(since), Some(device)) => device >= since,
            _ => true,
        }
    }

    fn description(&self) -> String {
        match &self.kind {
            FieldKind::Text { max_len: Some(n) } => format!("String, at most {n} characters."),
            FieldKind::Text { max_len: None } => "String.".to_string(),
            FieldKind::Integer { min, max } => format!("Integer in range {min}-{max}."),
            FieldKind::Choice(options) => format!("One of: {}.", options.join(", ")),
            FieldKind::IpMask => "IP address and netmask.".to_string(),
            FieldKind::Table { .. } => "Table.".to_string(),
            FieldKind::Complex { .. } => "Single nested block.".to_string(),
        }
    }

    fn attribute(&self, computed_only: bool) -> SchemaAttribute {
        let attr = match self.kind {
            FieldKind::Integer { .. } => SchemaAttribute::number(),
            _ => SchemaAttribute::string(),
        }
        .with_description(&self.description());

        let attr = if computed_only {
            attr.computed()
        } else if self.required {
            attr.required()
        } else if self.computed {
            attr.optional().computed()
        } else {
            attr.optional()
        };

        if self.sensitive {
            attr.sensitive()
        } else {
            attr
        }
    }

    fn add_to(&self, block: SchemaBlock, computed_only: bool) -> SchemaBlock {
        match &self.kind {
            FieldKind::Table { fields, .. } => {
                block.with_block(self.name, NestedBlock::list(render_block(fields, computed_only)))
            }
            FieldKind::Complex { fields } => {
                block.with_block(self.name, NestedBlock::single(render_block(fields, computed_only)))
            }
            _ => block.with_attribute(self.name, self.attribute(computed_only)),
        }
    }

    fn validate(&self, value: &Value, path: &str, diags: &mut Vec<Diagnostic>) {
        match &self.kind {
            FieldKind::Text { max_len } => match value.as_str() {
                Some(s) => {
                    if let Some(max) = max_len {
                        if s.len() > *max {
                            diags.push(invalid(
                                path,
                                &format!("expected length of {path} to be at most {max}"),
                            ));
                        }
                    }
                }
                None => diags.push(invalid(path, &format!("{path} must be a string"))),
            },
            FieldKind::Integer { min, max } => match config_to_int(value) {
                Some(n) if n < *min || n > *max => diags.push(invalid(
                    path,
                    &format!("expected {path} to be in the range ({min} - {max}), got {n}"),
                )),
                Some(_) => {}
                None => diags.push(invalid(path, &format!("{path} must be a number"))),
            },
            FieldKind::Choice(options) => match value.as_str() {
                Some(s) if options.contains(&s) => {}
                Some(s) => diags.push(invalid(
                    path,
                    &format!(
                        "expected {path} to be one of [{}], got {s}",
                        options.join(", ")
                    ),
                )),
                None => diags.push(invalid(path, &format!("{path} must be a string"))),
            },
            FieldKind::IpMask => {
                if !value.is_string() {
                    diags.push(invalid(path, &format!("{path} must be a string")));
                }
            }
            FieldKind::Table { fields, .. } => match value.as_array() {
                Some(rows) => {
                    for (index, row) in rows.iter().enumerate() {
                        validate_row(fields, row, &format!("{path}.{index}"), diags);
                    }
                }
                None => diags.push(invalid(path, &format!("{path} must be a list"))),
            },
            FieldKind::Complex { fields } => match value.as_array() {
                Some(rows) if rows.len() > 1 => diags.push(invalid(
                    path,
                    &format!("{path}: at most 1 block allowed, got {}", rows.len()),
                )),
                Some(rows) => {
                    if let Some(row) = rows.first() {
                        validate_row(fields, row, &format!("{path}.0"), diags);
                    }
                }
                None => diags.push(invalid(path, &format!("{path} must be a list"))),
            },
        }
    }
}

fn invalid(path: &str, detail: &str) -> Diagnostic {
    Diagnostic::error("Invalid attribute value")
        .with_detail(detail)
        .with_attribute_path(path)
}

fn validate_row(fields: &[FieldSpec], row: &Value, pre: &str, diags: &mut Vec<Diagnostic>) {
    let Some(row) = row.as_object() else {
        diags.push(invalid(pre, &format!("{pre} must be a block")));
        return;
    };
    for field in fields {
        let path = format!("{pre}.{}", field.name);
        match row.get(field.name) {
            Some(value) if !value.is_null() => field.validate(value, &path, diags),
            _ if field.required => diags.push(
                Diagnostic::error("Missing required argument")
                    .with_detail(&format!("The argument \"{path}\" is required"))
                    .with_attribute_path(&path),
            ),
            _ => {}
        }
    }
}

fn render_block(fields: &[FieldSpec], computed_only: bool) -> SchemaBlock {
    fields
        .iter()
        .fold(SchemaBlock::new(), |block, field| field.add_to(block, computed_only))
}

/// How instances of an object type are addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mkey {
    /// Table object keyed by the named attribute.
    Field(&'static str),
    /// Global object; there is exactly one per vdom.
    Singleton,
}

#[derive(Debug, Clone)]
pub struct ObjectSpec {
    /// Terraform type name, e.g. `fortios_ips_sensor`.
    pub type_name: &'static str,
    /// Name used in messages and as the fallback ID, e.g. `IpsSensor`.
    pub label: &'static str,
    pub endpoint: Endpoint,
    pub mkey: Mkey,
    pub description: &'static str,
    pub fields: Vec<FieldSpec>,
}

impl ObjectSpec {
    pub fn is_singleton(&self) -> bool {
        self.mkey == Mkey::Singleton
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn mkey_field(&self) -> Option<&FieldSpec> {
        match self.mkey {
            Mkey::Field(name) => self.field(name),
            Mkey::Singleton => None,
        }
    }

    /// Type name of the list data source, e.g. `fortios_ips_sensorlist`.
    pub fn list_type_name(&self) -> String {
        format!("{}list", self.type_name)
    }

    /// Computed attribute of the list data source, e.g. `namelist`.
    pub fn list_attribute(&self) -> Option<String> {
        match self.mkey {
            Mkey::Field(name) => Some(format!("{name}list")),
            Mkey::Singleton => None,
        }
    }

    pub fn resource_schema(&self) -> ResourceSchema {
        let block = render_block(&self.fields, false)
            .with_attribute(
                "id",
                SchemaAttribute::string()
                    .with_description("Terraform resource ID (the object's mkey)")
                    .computed(),
            )
            .with_attribute(
                VDOMPARAM,
                SchemaAttribute::string()
                    .with_description("Virtual domain, overrides the provider vdom")
                    .optional()
                    .computed(),
            )
            .with_attribute(
                DYNAMIC_SORT_SUBTABLE,
                SchemaAttribute::string()
                    .with_description("Sort sub-tables on read: false, true or natural")
                    .optional()
                    .with_default(serde_json::json!("false")),
            )
            .with_attribute(
                GET_ALL_TABLES,
                SchemaAttribute::string()
                    .with_description("Read all sub-tables, including unconfigured ones: true or false")
                    .optional()
                    .with_default(serde_json::json!("false")),
            )
            .with_description(self.description);

        ResourceSchema::new(1, block)
    }

    pub fn data_source_schema(&self) -> ResourceSchema {
        let mut block = render_block(&self.fields, true)
            .with_attribute("id", SchemaAttribute::string().computed())
            .with_attribute(VDOMPARAM, SchemaAttribute::string().optional())
            .with_description(self.description);

        if let Some(field) = self.mkey_field() {
            block = block.with_attribute(field.name, field.attribute(false).required());
        }

        ResourceSchema::new(0, block)
    }

    pub fn list_data_source_schema(&self) -> ResourceSchema {
        let mut block = SchemaBlock::new()
            .with_attribute("id", SchemaAttribute::string().computed())
            .with_attribute(VDOMPARAM, SchemaAttribute::string().optional())
            .with_attribute(
                FILTER,
                SchemaAttribute::string()
                    .with_description("FortiOS filter expression, e.g. name=@lan")
                    .optional(),
            )
            .with_description(self.description);

        if let Some(list) = self.list_attribute() {
            let element = match self.mkey_field().map(|f| &f.kind) {
                Some(FieldKind::Integer { .. }) => AttributeType::Number,
                _ => AttributeType::String,
            };
            block = block.with_attribute(&list, SchemaAttribute::list(element).computed());
        }

        ResourceSchema::new(0, block)
    }

    /// Check a configuration against the field constraints.
    pub fn validate(&self, config: &ResourceState) -> Vec<Diagnostic> {
        let mut diags = Vec::new();

        for field in &self.fields {
            match config.get(field.name) {
                Some(value) if !value.is_null() => field.validate(value, field.name, &mut diags),
                _ if field.required => diags.push(
                    Diagnostic::error("Missing required argument")
                        .with_detail(&format!("The argument \"{}\" is required", field.name))
                        .with_attribute_path(field.name),
                ),
                _ => {}
            }
        }

        if let Some(mode) = config.get_string(DYNAMIC_SORT_SUBTABLE) {
            if let Err(e) = mode.parse::<SortMode>() {
                diags.push(invalid(DYNAMIC_SORT_SUBTABLE, &e.to_string()));
            }
        }

        if let Some(flag) = config.get_string(GET_ALL_TABLES) {
            if flag != "true" && flag != "false" {
                diags.push(invalid(
                    GET_ALL_TABLES,
                    &format!("expected {GET_ALL_TABLES} to be one of [true, false], got {flag}"),
                ));
            }
        }

        diags
    }

    /// Top-level attributes whose change forces a new object.
    pub fn force_new_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.force_new)
    }
}
