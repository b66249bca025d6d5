//! Schema descriptors for JSON-shaped data.
//!
//! This crate describes the expected shape of external JSON with a
//! [`Descriptor`] tree and consumes it two ways:
//!
//! - [`compile`] turns a descriptor into a standard JSON Schema document,
//!   handed to any JSON Schema validator together with the raw input.
//! - [`convert`] turns input that passed validation into a [`Structured`]
//!   value whose mapping fields are keyed by the descriptor's declared
//!   [`FieldName`]s.
//!
//! Reusable, named fragments plug in through the [`SchemaProvider`] trait and
//! a [`ProviderRegistry`]. Descriptors can also be read from option-bag
//! definitions with [`parse_definition`].
//!
//! # Example
//!
//! ```
//! use jsonshape_core::*;
//! use serde_json::json;
//!
//! let schema: Descriptor = MappingSchema::new()
//!     .with_field("name", StringSchema::new().with_max_length(64))
//!     .with_optional_field("tags", ArraySchema::of(Descriptor::string()))
//!     .with_field("meta", Descriptor::any())
//!     .into();
//!
//! let document = compile(&schema).unwrap();
//! assert_eq!(document["required"], json!(["meta", "name"]));
//! assert_eq!(document["additionalProperties"], json!(false));
//!
//! let input = json!({"name": "ada", "meta": {"source": "import"}});
//! let value = convert(&schema, &input).unwrap();
//! assert_eq!(value.get("name").and_then(Structured::as_str), Some("ada"));
//! assert!(value.get("tags").is_none());
//! ```

mod compile;
mod convert;
mod definition;
mod error;
mod provider;
mod types;
mod value;

pub use compile::{Document, compile};
pub use convert::convert;
pub use definition::{parse_definition, parse_field};
pub use error::{ConversionFailure, ConvertError, DefinitionError, Location, Segment};
pub use provider::{ProviderOptions, ProviderRegistry, ReferenceSchema, SchemaProvider};
pub use types::*;
pub use value::{Record, Structured};
