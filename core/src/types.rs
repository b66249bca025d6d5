//! Descriptor type definitions for JSON-shaped data.
//!
//! A [`Descriptor`] is an immutable tree describing the shape and constraints
//! of a JSON value. Each variant carries a per-kind record whose fields are
//! exactly the options that kind recognizes, so an option that does not apply
//! to a kind cannot be expressed through this API. Option bags coming from
//! files go through [`parse_definition`](crate::parse_definition), which
//! rejects unrecognized keys.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::error::DefinitionError;
use crate::provider::ReferenceSchema;

/// The scalar kinds a descriptor can take.
///
/// # Examples
///
/// ```
/// use jsonshape_core::PrimitiveKind;
///
/// assert_eq!(PrimitiveKind::Integer.name(), "integer");
/// assert_eq!("string".parse::<PrimitiveKind>(), Ok(PrimitiveKind::String));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Boolean,
    Integer,
    Number,
    Null,
    String,
    /// Any JSON value, including objects and arrays.
    Any,
}

impl PrimitiveKind {
    /// All primitive kinds, in declaration order.
    pub const ALL: [PrimitiveKind; 6] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Integer,
        PrimitiveKind::Number,
        PrimitiveKind::Null,
        PrimitiveKind::String,
        PrimitiveKind::Any,
    ];

    /// Returns the kind name used in definitions and JSON Schema `type`.
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Number => "number",
            PrimitiveKind::Null => "null",
            PrimitiveKind::String => "string",
            PrimitiveKind::Any => "any",
        }
    }
}

impl std::str::FromStr for PrimitiveKind {
    type Err = DefinitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrimitiveKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| DefinitionError::UnknownKind(s.to_string()))
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Well-known string formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringFormat {
    /// RFC 3339 timestamp (`"date-time"` in JSON Schema).
    DateTime,
    /// Email address (`"email"` in JSON Schema).
    Email,
}

impl StringFormat {
    /// Returns the name used in definitions (`datetime`, `email`).
    pub fn name(self) -> &'static str {
        match self {
            StringFormat::DateTime => "datetime",
            StringFormat::Email => "email",
        }
    }

    /// Returns the JSON Schema `format` keyword value.
    pub fn json_schema_format(self) -> &'static str {
        match self {
            StringFormat::DateTime => "date-time",
            StringFormat::Email => "email",
        }
    }

    /// Parses a definition name back into a format.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "datetime" => Some(StringFormat::DateTime),
            "email" => Some(StringFormat::Email),
            _ => None,
        }
    }
}

/// Name of a mapping field.
///
/// Field names are shared symbols: cloning one is a reference count bump, and
/// converted [`Record`](crate::Record)s are keyed by the very same symbol the
/// descriptor declares.
///
/// # Examples
///
/// ```
/// use jsonshape_core::FieldName;
///
/// let name = FieldName::from("email");
/// assert_eq!(name.as_str(), "email");
/// assert_eq!(name.to_string(), "email");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldName(Arc<str>);

impl FieldName {
    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldName {
    fn from(name: &str) -> Self {
        Self(Arc::from(name))
    }
}

impl From<String> for FieldName {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl Borrow<str> for FieldName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for FieldName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for FieldName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Options for a `boolean` descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BooleanSchema {
    /// Also accept `null`.
    pub nullable: bool,
}

impl BooleanSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the value as nullable.
    pub fn allow_null(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// Options for an `integer` descriptor.
///
/// # Examples
///
/// ```
/// use jsonshape_core::IntegerSchema;
///
/// let port = IntegerSchema::new().with_minimum(1).with_maximum(65535);
/// assert_eq!(port.minimum, Some(1));
/// assert!(port.enumeration.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegerSchema {
    /// Also accept `null`.
    pub nullable: bool,
    /// Inclusive lower bound.
    pub minimum: Option<i64>,
    /// Inclusive upper bound.
    pub maximum: Option<i64>,
    /// Allowed values; empty means unrestricted.
    pub enumeration: Vec<i64>,
}

impl IntegerSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the value as nullable.
    pub fn allow_null(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Sets the inclusive lower bound.
    pub fn with_minimum(mut self, minimum: i64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    /// Sets the inclusive upper bound.
    pub fn with_maximum(mut self, maximum: i64) -> Self {
        self.maximum = Some(maximum);
        self
    }

    /// Restricts the value to the given set.
    pub fn with_enum(mut self, values: impl IntoIterator<Item = i64>) -> Self {
        self.enumeration = values.into_iter().collect();
        self
    }
}

/// Options for a `number` descriptor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberSchema {
    /// Also accept `null`.
    pub nullable: bool,
    /// Inclusive lower bound.
    pub minimum: Option<f64>,
    /// Inclusive upper bound.
    pub maximum: Option<f64>,
}

impl NumberSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the value as nullable.
    pub fn allow_null(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Sets the inclusive lower bound.
    pub fn with_minimum(mut self, minimum: f64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    /// Sets the inclusive upper bound.
    pub fn with_maximum(mut self, maximum: f64) -> Self {
        self.maximum = Some(maximum);
        self
    }
}

/// Options for a `string` descriptor.
///
/// # Examples
///
/// ```
/// use jsonshape_core::{StringFormat, StringSchema};
///
/// let email = StringSchema::new()
///     .with_max_length(254)
///     .with_format(StringFormat::Email);
/// assert_eq!(email.max_length, Some(254));
/// assert_eq!(email.format, Some(StringFormat::Email));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringSchema {
    /// Also accept `null`.
    pub nullable: bool,
    /// Minimum length in characters.
    pub min_length: Option<u64>,
    /// Maximum length in characters.
    pub max_length: Option<u64>,
    /// Allowed values; empty means unrestricted.
    pub enumeration: Vec<String>,
    /// Expected format.
    pub format: Option<StringFormat>,
}

impl StringSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the value as nullable.
    pub fn allow_null(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Sets the minimum length.
    pub fn with_min_length(mut self, min_length: u64) -> Self {
        self.min_length = Some(min_length);
        self
    }

    /// Sets the maximum length.
    pub fn with_max_length(mut self, max_length: u64) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Restricts the value to the given set.
    pub fn with_enum<S: Into<String>>(mut self, values: impl IntoIterator<Item = S>) -> Self {
        self.enumeration = values.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the expected format.
    pub fn with_format(mut self, format: StringFormat) -> Self {
        self.format = Some(format);
        self
    }
}

/// Options for an `any` descriptor.
///
/// `nullable` is accepted for symmetry with the other kinds but has no effect
/// on the compiled document: `any` already admits `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnySchema {
    pub nullable: bool,
}

/// A declared mapping field: its descriptor plus field-level options.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Descriptor for the field's value.
    pub descriptor: Descriptor,
    /// The field may be absent from the mapping.
    pub optional: bool,
}

impl Field {
    /// Creates a mandatory field.
    pub fn required(descriptor: impl Into<Descriptor>) -> Self {
        Self {
            descriptor: descriptor.into(),
            optional: false,
        }
    }

    /// Creates an optional field.
    pub fn optional(descriptor: impl Into<Descriptor>) -> Self {
        Self {
            descriptor: descriptor.into(),
            optional: true,
        }
    }
}

/// A closed mapping with a fixed, ordered set of fields.
///
/// Compiled mappings never admit undeclared keys, and converting a value with
/// an undeclared key is a failure.
///
/// # Examples
///
/// ```
/// use jsonshape_core::{IntegerSchema, MappingSchema, StringSchema};
///
/// let user = MappingSchema::new()
///     .with_field("name", StringSchema::new())
///     .with_optional_field("age", IntegerSchema::new().with_minimum(0))
///     .with_field("email", StringSchema::new());
///
/// assert_eq!(user.fields.len(), 3);
/// assert_eq!(user.required_fields(), vec!["email", "name"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingSchema {
    /// Also accept `null`.
    pub nullable: bool,
    /// Declared fields in declaration order.
    pub fields: IndexMap<FieldName, Field>,
}

impl MappingSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the mapping as nullable.
    pub fn allow_null(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Declares a mandatory field. Redeclaring a name replaces the earlier field.
    pub fn with_field(self, name: impl Into<FieldName>, descriptor: impl Into<Descriptor>) -> Self {
        self.with_entry(name, Field::required(descriptor))
    }

    /// Declares an optional field.
    pub fn with_optional_field(
        self,
        name: impl Into<FieldName>,
        descriptor: impl Into<Descriptor>,
    ) -> Self {
        self.with_entry(name, Field::optional(descriptor))
    }

    /// Declares a field with explicit field options.
    pub fn with_entry(mut self, name: impl Into<FieldName>, field: Field) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    /// Looks up a declared field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Returns the sorted names of all non-optional fields.
    pub fn required_fields(&self) -> Vec<&str> {
        let mut required: Vec<&str> = self
            .fields
            .iter()
            .filter(|(_, field)| !field.optional)
            .map(|(name, _)| name.as_str())
            .collect();
        required.sort_unstable();
        required
    }
}

/// A homogeneous array: every element matches one descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema {
    /// Also accept `null`.
    pub nullable: bool,
    /// Descriptor applied to every element.
    pub items: Box<Descriptor>,
    /// Minimum number of elements.
    pub min_items: Option<u64>,
    /// Maximum number of elements.
    pub max_items: Option<u64>,
}

impl ArraySchema {
    /// Creates an array whose elements match `items`.
    pub fn of(items: impl Into<Descriptor>) -> Self {
        Self {
            nullable: false,
            items: Box::new(items.into()),
            min_items: None,
            max_items: None,
        }
    }

    /// Marks the array as nullable.
    pub fn allow_null(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Sets the minimum number of elements.
    pub fn with_min_items(mut self, min_items: u64) -> Self {
        self.min_items = Some(min_items);
        self
    }

    /// Sets the maximum number of elements.
    pub fn with_max_items(mut self, max_items: u64) -> Self {
        self.max_items = Some(max_items);
        self
    }
}

/// Schema descriptor tree.
///
/// Built once, then shared read-only between any number of compilations and
/// conversions.
///
/// # Examples
///
/// ```
/// use jsonshape_core::*;
///
/// let tags = Descriptor::from(ArraySchema::of(Descriptor::string()).with_min_items(1));
/// assert_eq!(tags.kind_name(), "array");
/// assert!(matches!(Descriptor::any(), Descriptor::Any(_)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Descriptor {
    Null,
    Boolean(BooleanSchema),
    Integer(IntegerSchema),
    Number(NumberSchema),
    String(StringSchema),
    Any(AnySchema),
    Mapping(MappingSchema),
    Array(ArraySchema),
    /// A fragment supplied by a [`SchemaProvider`](crate::SchemaProvider).
    Reference(ReferenceSchema),
}

impl Descriptor {
    pub fn null() -> Self {
        Descriptor::Null
    }

    pub fn boolean() -> Self {
        Descriptor::Boolean(BooleanSchema::default())
    }

    pub fn integer() -> Self {
        Descriptor::Integer(IntegerSchema::default())
    }

    pub fn number() -> Self {
        Descriptor::Number(NumberSchema::default())
    }

    pub fn string() -> Self {
        Descriptor::String(StringSchema::default())
    }

    pub fn any() -> Self {
        Descriptor::Any(AnySchema::default())
    }

    /// Returns the primitive kind, or `None` for mappings, arrays and references.
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            Descriptor::Null => Some(PrimitiveKind::Null),
            Descriptor::Boolean(_) => Some(PrimitiveKind::Boolean),
            Descriptor::Integer(_) => Some(PrimitiveKind::Integer),
            Descriptor::Number(_) => Some(PrimitiveKind::Number),
            Descriptor::String(_) => Some(PrimitiveKind::String),
            Descriptor::Any(_) => Some(PrimitiveKind::Any),
            Descriptor::Mapping(_) | Descriptor::Array(_) | Descriptor::Reference(_) => None,
        }
    }

    /// Returns the kind name; references report their provider's name.
    pub fn kind_name(&self) -> &str {
        match self {
            Descriptor::Mapping(_) => "mapping",
            Descriptor::Array(_) => "array",
            Descriptor::Reference(reference) => reference.provider_name(),
            primitive => primitive.primitive_kind().map_or("unknown", PrimitiveKind::name),
        }
    }
}

impl From<BooleanSchema> for Descriptor {
    fn from(schema: BooleanSchema) -> Self {
        Descriptor::Boolean(schema)
    }
}

impl From<IntegerSchema> for Descriptor {
    fn from(schema: IntegerSchema) -> Self {
        Descriptor::Integer(schema)
    }
}

impl From<NumberSchema> for Descriptor {
    fn from(schema: NumberSchema) -> Self {
        Descriptor::Number(schema)
    }
}

impl From<StringSchema> for Descriptor {
    fn from(schema: StringSchema) -> Self {
        Descriptor::String(schema)
    }
}

impl From<AnySchema> for Descriptor {
    fn from(schema: AnySchema) -> Self {
        Descriptor::Any(schema)
    }
}

impl From<MappingSchema> for Descriptor {
    fn from(schema: MappingSchema) -> Self {
        Descriptor::Mapping(schema)
    }
}

impl From<ArraySchema> for Descriptor {
    fn from(schema: ArraySchema) -> Self {
        Descriptor::Array(schema)
    }
}

impl From<ReferenceSchema> for Descriptor {
    fn from(schema: ReferenceSchema) -> Self {
        Descriptor::Reference(schema)
    }
}

impl Serialize for Descriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_definition().serialize(serializer)
    }
}
