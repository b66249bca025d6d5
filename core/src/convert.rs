//! Conversion of validated JSON values into structured values.
//!
//! The input is assumed to already satisfy the compiled document, so ranges,
//! lengths and formats are not checked again. Conversion only reshapes:
//! mapping keys are resolved against the declared fields, arrays are
//! converted element by element, and `any` subtrees pass through untouched.
//!
//! Failures are accumulated across sibling fields and elements; a definition
//! error from a provider aborts the whole conversion.

use serde_json::Value;
use tracing::debug;

use crate::error::{ConversionFailure, ConvertError, DefinitionError, Location};
use crate::types::Descriptor;
use crate::value::{Record, Structured};

/// Converts `value` according to `descriptor`.
///
/// # Errors
///
/// Returns [`ConvertError::Failed`] with every failure found, in iteration
/// order, or [`ConvertError::Definition`] if a referenced provider cannot
/// resolve its schema.
///
/// # Examples
///
/// ```
/// use jsonshape_core::*;
/// use serde_json::json;
///
/// let schema: Descriptor = MappingSchema::new()
///     .with_field("a", Descriptor::string())
///     .into();
///
/// let record = convert(&schema, &json!({"a": "x"})).unwrap();
/// assert_eq!(record.get("a").and_then(Structured::as_str), Some("x"));
///
/// let err = convert(&schema, &json!({"a": "x", "z": 1})).unwrap_err();
/// assert!(matches!(
///     err.failures(),
///     [ConversionFailure::UnknownField { field, .. }] if field == "z"
/// ));
/// ```
pub fn convert(descriptor: &Descriptor, value: &Value) -> Result<Structured, ConvertError> {
    let mut failures = Vec::new();
    let converted = convert_at(descriptor, value, &Location::root(), &mut failures)?;

    if failures.is_empty() {
        Ok(converted)
    } else {
        Err(ConvertError::Failed(failures))
    }
}

fn convert_at(
    descriptor: &Descriptor,
    value: &Value,
    location: &Location,
    failures: &mut Vec<ConversionFailure>,
) -> Result<Structured, DefinitionError> {
    match descriptor {
        Descriptor::Null
        | Descriptor::Boolean(_)
        | Descriptor::Integer(_)
        | Descriptor::Number(_)
        | Descriptor::String(_)
        | Descriptor::Any(_) => Ok(Structured::from(value)),

        Descriptor::Mapping(mapping) => {
            let entries = match value {
                Value::Object(entries) => entries,
                Value::Null => return Ok(Structured::Null),
                other => {
                    failures.push(ConversionFailure::ExpectedMapping {
                        location: location.clone(),
                        found: json_type(other),
                    });
                    return Ok(Structured::Null);
                }
            };

            let mut record = Record::with_capacity(entries.len());
            for (key, entry) in entries {
                match mapping.fields.get_key_value(key.as_str()) {
                    Some((name, field)) => {
                        let converted =
                            convert_at(&field.descriptor, entry, &location.field(key), failures)?;
                        record.insert(name.clone(), converted);
                    }
                    None => failures.push(ConversionFailure::UnknownField {
                        location: location.clone(),
                        field: key.clone(),
                    }),
                }
            }
            Ok(Structured::Record(record))
        }

        Descriptor::Array(array) => {
            let elements = match value {
                Value::Array(elements) => elements,
                Value::Null => return Ok(Structured::Null),
                other => {
                    failures.push(ConversionFailure::ExpectedArray {
                        location: location.clone(),
                        found: json_type(other),
                    });
                    return Ok(Structured::Null);
                }
            };

            let mut items = Vec::with_capacity(elements.len());
            for (index, element) in elements.iter().enumerate() {
                items.push(convert_at(
                    &array.items,
                    element,
                    &location.index(index),
                    failures,
                )?);
            }
            Ok(Structured::List(items))
        }

        Descriptor::Reference(reference) => {
            let resolved = reference.resolve()?;
            match reference
                .provider()
                .convert_value(&resolved, reference.options(), value)
            {
                Ok(converted) => Ok(converted),
                Err(reason) => {
                    debug!(
                        provider = reference.provider_name(),
                        location = %location,
                        reason = %reason,
                        "provider rejected value"
                    );
                    failures.push(ConversionFailure::Provider {
                        location: location.clone(),
                        provider: reference.provider_name().to_string(),
                        reason,
                    });
                    Ok(Structured::Null)
                }
            }
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::*;

    fn user_schema() -> Descriptor {
        MappingSchema::new()
            .with_field("a", Descriptor::string())
            .with_optional_field("b", Descriptor::integer())
            .into()
    }

    #[test]
    fn test_mapping_round_trip() {
        let converted = convert(&user_schema(), &json!({"a": "x", "b": 5})).unwrap();
        assert_eq!(converted.into_value(), json!({"a": "x", "b": 5}));

        let converted = convert(&user_schema(), &json!({"a": "x"})).unwrap();
        let record = converted.as_record().unwrap();
        assert_eq!(record.len(), 1);
        assert!(!record.contains("b"));
    }

    #[test]
    fn test_record_keys_share_declared_symbols() {
        let schema = user_schema();
        let converted = convert(&schema, &json!({"a": "x"})).unwrap();
        let Descriptor::Mapping(mapping) = &schema else {
            unreachable!()
        };

        let declared = mapping.fields.get_key_value("a").unwrap().0;
        let produced = converted.as_record().unwrap().names().next().unwrap();
        assert_eq!(declared, produced);
    }

    #[test]
    fn test_unknown_field_is_reported_not_dropped() {
        let err = convert(&user_schema(), &json!({"a": "x", "z": 1})).unwrap_err();
        assert_eq!(
            err,
            ConvertError::Failed(vec![ConversionFailure::UnknownField {
                location: Location::root(),
                field: "z".into(),
            }])
        );
    }

    #[test]
    fn test_empty_field_name_is_located_apart_from_root() {
        let schema: Descriptor = MappingSchema::new()
            .with_field("", MappingSchema::new())
            .into();
        let err = convert(&schema, &json!({"": {"x": 1}, "y": 2})).unwrap_err();

        let locations: Vec<String> = err
            .failures()
            .iter()
            .map(|failure| failure.location().to_string())
            .collect();
        assert_eq!(locations, vec!["/", ""]);
    }

    #[test]
    fn test_failures_accumulate_across_siblings() {
        let schema: Descriptor = MappingSchema::new()
            .with_field(
                "inner",
                MappingSchema::new().with_field("ok", Descriptor::boolean()),
            )
            .with_field("list", ArraySchema::of(Descriptor::integer()))
            .into();

        let err = convert(
            &schema,
            &json!({"inner": {"ok": true, "bad": 1}, "list": "nope", "extra": null}),
        )
        .unwrap_err();

        let failures = err.failures();
        assert_eq!(failures.len(), 3);
        assert_eq!(
            failures[0],
            ConversionFailure::UnknownField {
                location: Location::root().field("inner"),
                field: "bad".into(),
            }
        );
        assert_eq!(
            failures[1],
            ConversionFailure::ExpectedArray {
                location: Location::root().field("list"),
                found: "string",
            }
        );
        assert!(matches!(
            &failures[2],
            ConversionFailure::UnknownField { field, .. } if field == "extra"
        ));
    }

    #[test]
    fn test_array_preserves_order() {
        let schema: Descriptor = ArraySchema::of(Descriptor::integer()).into();
        let converted = convert(&schema, &json!([3, 1, 2])).unwrap();
        assert_eq!(converted.into_value(), json!([3, 1, 2]));
    }

    #[test]
    fn test_array_failures_are_indexed() {
        let schema: Descriptor =
            ArraySchema::of(MappingSchema::new().with_field("id", Descriptor::integer())).into();
        let err = convert(&schema, &json!([{"id": 1}, {"id": 2, "x": 0}, {"y": 0}])).unwrap_err();

        let locations: Vec<String> = err
            .failures()
            .iter()
            .map(|failure| failure.location().to_string())
            .collect();
        assert_eq!(locations, vec!["/1", "/2"]);
    }

    #[test]
    fn test_any_passes_through_verbatim() {
        let schema: Descriptor = MappingSchema::new()
            .with_field("param", Descriptor::any())
            .into();
        let converted = convert(&schema, &json!({"param": {"nested": [1, 2, 3]}})).unwrap();

        assert_eq!(
            converted.get("param"),
            Some(&Structured::Raw(json!({"nested": [1, 2, 3]})))
        );
    }

    #[test]
    fn test_null_container_converts_to_null() {
        let schema: Descriptor = MappingSchema::new()
            .with_field("tags", ArraySchema::of(Descriptor::string()).allow_null())
            .into();
        let converted = convert(&schema, &json!({"tags": null})).unwrap();
        assert_eq!(converted.get("tags"), Some(&Structured::Null));
    }
}
