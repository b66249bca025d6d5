//! Descriptor to JSON Schema compilation.
//!
//! The compiled document uses only the keywords `type`, `properties`,
//! `required`, `additionalProperties`, `items`, `minimum`, `maximum`,
//! `minLength`, `maxLength`, `enum`, `minItems`, `maxItems` and `format`.
//! Unset options are omitted, never emitted as `null`.
//!
//! # Examples
//!
//! ```
//! use jsonshape_core::*;
//! use serde_json::json;
//!
//! let schema: Descriptor = MappingSchema::new()
//!     .with_field("a", Descriptor::string())
//!     .with_optional_field("b", IntegerSchema::new().allow_null())
//!     .into();
//!
//! assert_eq!(
//!     compile(&schema).unwrap(),
//!     json!({
//!         "type": "object",
//!         "additionalProperties": false,
//!         "properties": {
//!             "a": {"type": "string"},
//!             "b": {"type": ["integer", "null"]}
//!         },
//!         "required": ["a"]
//!     })
//! );
//! ```

use serde_json::{Map, Number, Value, json};

use crate::error::DefinitionError;
use crate::types::Descriptor;

/// A compiled JSON Schema document.
pub type Document = Value;

/// Every JSON type; the compiled form of `any`.
const ANY_TYPES: [&str; 7] = [
    "array", "boolean", "integer", "null", "number", "object", "string",
];

/// Compiles a descriptor into a JSON Schema document.
///
/// # Errors
///
/// Returns the [`DefinitionError`] reported by a referenced provider that
/// cannot resolve its options, or [`DefinitionError::InvalidOption`] for a
/// NaN or infinite number bound.
pub fn compile(descriptor: &Descriptor) -> Result<Document, DefinitionError> {
    let mut document = Map::new();

    match descriptor {
        Descriptor::Null => {
            document.insert("type".into(), json!("null"));
        }
        Descriptor::Boolean(schema) => {
            document.insert("type".into(), type_keyword("boolean", schema.nullable));
        }
        Descriptor::Integer(schema) => {
            document.insert("type".into(), type_keyword("integer", schema.nullable));
            insert_some(&mut document, "minimum", schema.minimum);
            insert_some(&mut document, "maximum", schema.maximum);
            if !schema.enumeration.is_empty() {
                document.insert("enum".into(), json!(schema.enumeration));
            }
        }
        Descriptor::Number(schema) => {
            document.insert("type".into(), type_keyword("number", schema.nullable));
            insert_bound(&mut document, "minimum", schema.minimum)?;
            insert_bound(&mut document, "maximum", schema.maximum)?;
        }
        Descriptor::String(schema) => {
            document.insert("type".into(), type_keyword("string", schema.nullable));
            insert_some(&mut document, "minLength", schema.min_length);
            insert_some(&mut document, "maxLength", schema.max_length);
            if !schema.enumeration.is_empty() {
                document.insert("enum".into(), json!(schema.enumeration));
            }
            if let Some(format) = schema.format {
                document.insert("format".into(), json!(format.json_schema_format()));
            }
        }
        Descriptor::Any(_) => {
            document.insert("type".into(), json!(ANY_TYPES));
        }
        Descriptor::Mapping(mapping) => {
            document.insert("type".into(), type_keyword("object", mapping.nullable));
            document.insert("additionalProperties".into(), Value::Bool(false));

            let mut properties = Map::with_capacity(mapping.fields.len());
            for (name, field) in &mapping.fields {
                properties.insert(name.to_string(), compile(&field.descriptor)?);
            }
            document.insert("properties".into(), Value::Object(properties));

            let required = mapping.required_fields();
            if !required.is_empty() {
                document.insert("required".into(), json!(required));
            }
        }
        Descriptor::Array(array) => {
            document.insert("type".into(), type_keyword("array", array.nullable));
            document.insert("items".into(), compile(&array.items)?);
            insert_some(&mut document, "minItems", array.min_items);
            insert_some(&mut document, "maxItems", array.max_items);
        }
        Descriptor::Reference(reference) => return compile(&reference.resolve()?),
    }

    Ok(Value::Object(document))
}

/// `"kind"`, or `["kind", "null"]` when nullable.
fn type_keyword(json_type: &str, nullable: bool) -> Value {
    if nullable {
        json!([json_type, "null"])
    } else {
        json!(json_type)
    }
}

fn insert_some<T: Into<Value>>(document: &mut Map<String, Value>, keyword: &str, value: Option<T>) {
    if let Some(value) = value {
        document.insert(keyword.to_string(), value.into());
    }
}

/// Number bounds have no JSON form unless finite.
fn insert_bound(
    document: &mut Map<String, Value>,
    keyword: &str,
    bound: Option<f64>,
) -> Result<(), DefinitionError> {
    let Some(bound) = bound else {
        return Ok(());
    };
    let number = Number::from_f64(bound).ok_or_else(|| DefinitionError::InvalidOption {
        kind: "number".into(),
        option: keyword.to_string(),
        expected: "a finite number",
    })?;
    document.insert(keyword.to_string(), Value::Number(number));
    Ok(())
}
