//! Structured values produced by the converter.
//!
//! Declared mapping fields become [`Record`] entries keyed by the
//! descriptor's own [`FieldName`] symbols. Values under an `any` descriptor
//! stay [`Structured::Raw`] and keep their original string keys.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};

use crate::types::FieldName;

/// A converted value.
///
/// # Examples
///
/// ```
/// use jsonshape_core::Structured;
/// use serde_json::json;
///
/// let raw = Structured::from(&json!({"nested": [1, 2, 3]}));
/// assert!(matches!(raw, Structured::Raw(_)));
///
/// let scalar = Structured::from(&json!(5));
/// assert_eq!(scalar.as_i64(), Some(5));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Structured {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// Elements of an array descriptor, in input order.
    List(Vec<Structured>),
    /// Fields of a mapping descriptor.
    Record(Record),
    /// An untouched JSON subtree (objects and arrays under `any`).
    Raw(Value),
}

impl Structured {
    /// Looks up a field when this value is a record.
    pub fn get(&self, field: &str) -> Option<&Structured> {
        self.as_record().and_then(|record| record.get(field))
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Structured::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Structured]> {
        match self {
            Structured::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Structured::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Structured::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Structured::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Structured::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_raw(&self) -> Option<&Value> {
        match self {
            Structured::Raw(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Structured::Null)
    }

    /// Turns the value back into plain JSON.
    pub fn into_value(self) -> Value {
        match self {
            Structured::Null => Value::Null,
            Structured::Bool(b) => Value::Bool(b),
            Structured::Number(n) => Value::Number(n),
            Structured::String(s) => Value::String(s),
            Structured::List(items) => {
                Value::Array(items.into_iter().map(Structured::into_value).collect())
            }
            Structured::Record(record) => Value::Object(
                record
                    .into_iter()
                    .map(|(name, value)| (name.to_string(), value.into_value()))
                    .collect::<Map<String, Value>>(),
            ),
            Structured::Raw(value) => value,
        }
    }

    /// Deserializes the value into a caller-defined type.
    ///
    /// # Examples
    ///
    /// ```
    /// use jsonshape_core::*;
    /// use serde::Deserialize;
    /// use serde_json::json;
    ///
    /// #[derive(Deserialize)]
    /// struct User {
    ///     name: String,
    ///     age: Option<u32>,
    /// }
    ///
    /// let schema: Descriptor = MappingSchema::new()
    ///     .with_field("name", Descriptor::string())
    ///     .with_optional_field("age", Descriptor::integer())
    ///     .into();
    ///
    /// let user: User = convert(&schema, &json!({"name": "ada"}))
    ///     .unwrap()
    ///     .deserialize_into()
    ///     .unwrap();
    /// assert_eq!(user.name, "ada");
    /// assert_eq!(user.age, None);
    /// ```
    pub fn deserialize_into<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.into_value())
    }
}

impl From<&Value> for Structured {
    /// Passes a value through unchanged: scalars map to their variants,
    /// objects and arrays stay raw.
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Structured::Null,
            Value::Bool(b) => Structured::Bool(*b),
            Value::Number(n) => Structured::Number(n.clone()),
            Value::String(s) => Structured::String(s.clone()),
            Value::Array(_) | Value::Object(_) => Structured::Raw(value.clone()),
        }
    }
}

impl Serialize for Structured {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Structured::Null => serializer.serialize_unit(),
            Structured::Bool(b) => serializer.serialize_bool(*b),
            Structured::Number(n) => n.serialize(serializer),
            Structured::String(s) => serializer.serialize_str(s),
            Structured::List(items) => items.serialize(serializer),
            Structured::Record(record) => record.serialize(serializer),
            Structured::Raw(value) => value.serialize(serializer),
        }
    }
}

/// Converted mapping fields in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: IndexMap<FieldName, Structured>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: IndexMap::with_capacity(capacity),
        }
    }

    /// Inserts a field, returning the previous value if any.
    pub fn insert(&mut self, name: FieldName, value: Structured) -> Option<Structured> {
        self.fields.insert(name, value)
    }

    pub fn get(&self, name: &str) -> Option<&Structured> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns an iterator over field names.
    pub fn names(&self) -> impl Iterator<Item = &FieldName> {
        self.fields.keys()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, FieldName, Structured> {
        self.fields.iter()
    }
}

impl IntoIterator for Record {
    type Item = (FieldName, Structured);
    type IntoIter = indexmap::map::IntoIter<FieldName, Structured>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a FieldName, &'a Structured);
    type IntoIter = indexmap::map::Iter<'a, FieldName, Structured>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
