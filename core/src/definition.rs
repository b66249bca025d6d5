//! Option-bag definitions of descriptors.
//!
//! Definitions are the JSON/YAML form of a descriptor, used to store schemas
//! in files and to fingerprint them:
//!
//! ```yaml
//! type: mapping
//! fields:
//!   name: { type: string, max_length: 64 }
//!   age: { type: integer, optional: true, minimum: 0 }
//!   tags: { type: array, items: { type: string }, min_items: 1 }
//!   price: { ref: money, currency: EUR }
//! ```
//!
//! Every key must be recognized for its kind; anything else is rejected with
//! [`DefinitionError::UnknownOption`] instead of being ignored. `optional` is
//! accepted everywhere and only matters for mapping fields.

use serde_json::{Map, Value, json};

use crate::error::DefinitionError;
use crate::provider::{ProviderOptions, ProviderRegistry};
use crate::types::*;

const TYPE: &str = "type";
const REF: &str = "ref";
const OPTIONAL: &str = "optional";

/// Parses a definition into a descriptor.
///
/// References (`ref`) are resolved against `registry` immediately.
///
/// # Examples
///
/// ```
/// use jsonshape_core::*;
/// use serde_json::json;
///
/// let registry = ProviderRegistry::new();
/// let schema = parse_definition(
///     &json!({"type": "array", "items": {"type": "integer"}, "min_items": 1}),
///     &registry,
/// )
/// .unwrap();
/// assert_eq!(
///     schema,
///     ArraySchema::of(Descriptor::integer()).with_min_items(1).into()
/// );
///
/// let err = parse_definition(&json!({"type": "boolean", "minimum": 0}), &registry).unwrap_err();
/// assert_eq!(
///     err,
///     DefinitionError::UnknownOption { kind: "boolean".into(), option: "minimum".into() }
/// );
/// ```
pub fn parse_definition(
    definition: &Value,
    registry: &ProviderRegistry,
) -> Result<Descriptor, DefinitionError> {
    parse_field(definition, registry).map(|field| field.descriptor)
}

/// Parses a definition together with its field-level options.
pub fn parse_field(definition: &Value, registry: &ProviderRegistry) -> Result<Field, DefinitionError> {
    let Value::Object(bag) = definition else {
        return Err(DefinitionError::NotAnObject);
    };

    if let Some(name) = bag.get(REF) {
        return parse_reference(name, bag, registry);
    }

    let kind = match bag.get(TYPE) {
        Some(Value::String(kind)) => kind.as_str(),
        Some(_) => {
            return Err(DefinitionError::InvalidOption {
                kind: "definition".into(),
                option: TYPE.into(),
                expected: "a string",
            });
        }
        None => return Err(DefinitionError::MissingKind),
    };

    let options = Options { kind, bag };
    let optional = options.flag(OPTIONAL)?;

    let descriptor = match kind {
        "null" => {
            options.check(&[])?;
            Descriptor::Null
        }
        "boolean" => {
            options.check(&["nullable"])?;
            Descriptor::Boolean(BooleanSchema {
                nullable: options.flag("nullable")?,
            })
        }
        "integer" => {
            options.check(&["nullable", "minimum", "maximum", "enum"])?;
            Descriptor::Integer(IntegerSchema {
                nullable: options.flag("nullable")?,
                minimum: options.integer("minimum")?,
                maximum: options.integer("maximum")?,
                enumeration: options.list("enum", Value::as_i64, "a list of integers")?,
            })
        }
        "number" => {
            options.check(&["nullable", "minimum", "maximum"])?;
            Descriptor::Number(NumberSchema {
                nullable: options.flag("nullable")?,
                minimum: options.number("minimum")?,
                maximum: options.number("maximum")?,
            })
        }
        "string" => {
            options.check(&["nullable", "min_length", "max_length", "enum", "format"])?;
            Descriptor::String(StringSchema {
                nullable: options.flag("nullable")?,
                min_length: options.count("min_length")?,
                max_length: options.count("max_length")?,
                enumeration: options.list(
                    "enum",
                    |value| value.as_str().map(String::from),
                    "a list of strings",
                )?,
                format: options.format()?,
            })
        }
        "any" => {
            options.check(&["nullable"])?;
            Descriptor::Any(AnySchema {
                nullable: options.flag("nullable")?,
            })
        }
        "mapping" => {
            options.check(&["nullable", "fields"])?;
            let mut mapping = MappingSchema::new();
            mapping.nullable = options.flag("nullable")?;
            match bag.get("fields") {
                None => {}
                Some(Value::Object(fields)) => {
                    for (name, field) in fields {
                        mapping = mapping.with_entry(name.as_str(), parse_field(field, registry)?);
                    }
                }
                Some(_) => return Err(options.invalid("fields", "an object of field definitions")),
            }
            Descriptor::Mapping(mapping)
        }
        "array" => {
            options.check(&["nullable", "items", "min_items", "max_items"])?;
            let items = bag.get("items").ok_or_else(|| DefinitionError::MissingOption {
                kind: kind.into(),
                option: "items".into(),
            })?;
            Descriptor::Array(ArraySchema {
                nullable: options.flag("nullable")?,
                items: Box::new(parse_definition(items, registry)?),
                min_items: options.count("min_items")?,
                max_items: options.count("max_items")?,
            })
        }
        other => return Err(DefinitionError::UnknownKind(other.to_string())),
    };

    Ok(Field {
        descriptor,
        optional,
    })
}

fn parse_reference(
    name: &Value,
    bag: &Map<String, Value>,
    registry: &ProviderRegistry,
) -> Result<Field, DefinitionError> {
    let Value::String(name) = name else {
        return Err(DefinitionError::InvalidOption {
            kind: "reference".into(),
            option: REF.into(),
            expected: "a provider name",
        });
    };

    let options = Options { kind: name, bag };
    let optional = options.flag(OPTIONAL)?;
    let provider_options: ProviderOptions = bag
        .iter()
        .filter(|(key, _)| *key != REF && *key != OPTIONAL)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(Field {
        descriptor: registry.reference(name, provider_options)?.into(),
        optional,
    })
}

/// Typed access to one definition's option bag.
struct Options<'a> {
    kind: &'a str,
    bag: &'a Map<String, Value>,
}

impl Options<'_> {
    /// Rejects any key outside `allowed`, `type` and `optional`.
    fn check(&self, allowed: &[&str]) -> Result<(), DefinitionError> {
        match self
            .bag
            .keys()
            .find(|key| *key != TYPE && *key != OPTIONAL && !allowed.contains(&key.as_str()))
        {
            Some(option) => Err(DefinitionError::UnknownOption {
                kind: self.kind.to_string(),
                option: option.clone(),
            }),
            None => Ok(()),
        }
    }

    fn invalid(&self, option: &str, expected: &'static str) -> DefinitionError {
        DefinitionError::InvalidOption {
            kind: self.kind.to_string(),
            option: option.to_string(),
            expected,
        }
    }

    fn get<T>(
        &self,
        option: &str,
        read: impl Fn(&Value) -> Option<T>,
        expected: &'static str,
    ) -> Result<Option<T>, DefinitionError> {
        match self.bag.get(option) {
            None => Ok(None),
            Some(value) => read(value).map(Some).ok_or_else(|| self.invalid(option, expected)),
        }
    }

    fn flag(&self, option: &str) -> Result<bool, DefinitionError> {
        Ok(self.get(option, Value::as_bool, "a boolean")?.unwrap_or(false))
    }

    fn integer(&self, option: &str) -> Result<Option<i64>, DefinitionError> {
        self.get(option, Value::as_i64, "an integer")
    }

    fn number(&self, option: &str) -> Result<Option<f64>, DefinitionError> {
        self.get(option, Value::as_f64, "a number")
    }

    fn count(&self, option: &str) -> Result<Option<u64>, DefinitionError> {
        self.get(option, Value::as_u64, "a non-negative integer")
    }

    fn list<T>(
        &self,
        option: &str,
        read: impl Fn(&Value) -> Option<T>,
        expected: &'static str,
    ) -> Result<Vec<T>, DefinitionError> {
        match self.bag.get(option) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| read(item).ok_or_else(|| self.invalid(option, expected)))
                .collect(),
            Some(_) => Err(self.invalid(option, expected)),
        }
    }

    fn format(&self) -> Result<Option<StringFormat>, DefinitionError> {
        self.get(
            "format",
            |value| value.as_str().and_then(StringFormat::from_name),
            "`datetime` or `email`",
        )
    }
}

impl Descriptor {
    /// Renders the descriptor as a definition.
    ///
    /// Options left at their defaults are omitted, so equal descriptors
    /// render to equal definitions.
    ///
    /// # Examples
    ///
    /// ```
    /// use jsonshape_core::*;
    /// use serde_json::json;
    ///
    /// let schema: Descriptor = MappingSchema::new()
    ///     .with_optional_field("age", IntegerSchema::new().with_minimum(0))
    ///     .into();
    /// assert_eq!(
    ///     schema.to_definition(),
    ///     json!({
    ///         "type": "mapping",
    ///         "fields": {"age": {"type": "integer", "optional": true, "minimum": 0}}
    ///     })
    /// );
    /// ```
    pub fn to_definition(&self) -> Value {
        let mut bag = Map::new();

        match self {
            Descriptor::Reference(reference) => {
                bag.insert(REF.into(), json!(reference.provider_name()));
                for (key, value) in reference.options() {
                    bag.insert(key.clone(), value.clone());
                }
                return Value::Object(bag);
            }
            Descriptor::Mapping(_) => {
                bag.insert(TYPE.into(), json!("mapping"));
            }
            Descriptor::Array(_) => {
                bag.insert(TYPE.into(), json!("array"));
            }
            primitive => {
                bag.insert(TYPE.into(), json!(primitive.kind_name()));
            }
        }

        match self {
            Descriptor::Null | Descriptor::Reference(_) => {}
            Descriptor::Boolean(schema) => {
                render_flag(&mut bag, "nullable", schema.nullable);
            }
            Descriptor::Integer(schema) => {
                render_flag(&mut bag, "nullable", schema.nullable);
                render_some(&mut bag, "minimum", schema.minimum);
                render_some(&mut bag, "maximum", schema.maximum);
                if !schema.enumeration.is_empty() {
                    bag.insert("enum".into(), json!(schema.enumeration));
                }
            }
            Descriptor::Number(schema) => {
                render_flag(&mut bag, "nullable", schema.nullable);
                render_some(&mut bag, "minimum", schema.minimum);
                render_some(&mut bag, "maximum", schema.maximum);
            }
            Descriptor::String(schema) => {
                render_flag(&mut bag, "nullable", schema.nullable);
                render_some(&mut bag, "min_length", schema.min_length);
                render_some(&mut bag, "max_length", schema.max_length);
                if !schema.enumeration.is_empty() {
                    bag.insert("enum".into(), json!(schema.enumeration));
                }
                render_some(&mut bag, "format", schema.format.map(StringFormat::name));
            }
            Descriptor::Any(schema) => {
                render_flag(&mut bag, "nullable", schema.nullable);
            }
            Descriptor::Mapping(mapping) => {
                render_flag(&mut bag, "nullable", mapping.nullable);
                let fields: Map<String, Value> = mapping
                    .fields
                    .iter()
                    .map(|(name, field)| (name.to_string(), field_definition(field)))
                    .collect();
                bag.insert("fields".into(), Value::Object(fields));
            }
            Descriptor::Array(array) => {
                render_flag(&mut bag, "nullable", array.nullable);
                bag.insert("items".into(), array.items.to_definition());
                render_some(&mut bag, "min_items", array.min_items);
                render_some(&mut bag, "max_items", array.max_items);
            }
        }

        Value::Object(bag)
    }
}

fn field_definition(field: &Field) -> Value {
    let mut definition = field.descriptor.to_definition();
    if field.optional {
        if let Value::Object(bag) = &mut definition {
            bag.insert(OPTIONAL.into(), Value::Bool(true));
        }
    }
    definition
}

fn render_flag(bag: &mut Map<String, Value>, option: &str, set: bool) {
    if set {
        bag.insert(option.to_string(), Value::Bool(true));
    }
}

fn render_some<T: Into<Value>>(bag: &mut Map<String, Value>, option: &str, value: Option<T>) {
    if let Some(value) = value {
        bag.insert(option.to_string(), value.into());
    }
}
