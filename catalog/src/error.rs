//! Error types for catalog operations.
//!
//! Provides a unified error type covering all failure modes: I/O,
//! serialization, invalid definitions, compilation and conversion.

use jsonshape_core::{ConvertError, DefinitionError};
use thiserror::Error;

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A stored definition could not be turned into a descriptor.
    #[error("invalid definition for schema `{name}`: {source}")]
    InvalidDefinition {
        name: String,
        #[source]
        source: DefinitionError,
    },

    /// A descriptor failed to compile.
    #[error("definition error: {0}")]
    Definition(#[from] DefinitionError),

    /// Input failed conversion against a catalog schema.
    #[error("conversion error: {0}")]
    Conversion(#[from] ConvertError),

    /// Two definitions in one source share a name.
    #[error("duplicate schema in catalog: {0}")]
    DuplicateSchema(String),

    /// No schema with the requested name.
    #[error("unknown schema: {0}")]
    UnknownSchema(String),

    /// A configuration file declares a format version this crate cannot read.
    #[error("unsupported configuration version: {0}")]
    UnsupportedConfigVersion(String),

    /// All configured loader sources failed.
    #[error("no schema sources available")]
    NoSourcesAvailable,
}

/// Convenience alias for results with [`CatalogError`].
pub type Result<T> = std::result::Result<T, CatalogError>;
