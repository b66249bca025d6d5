//! Named schema catalogs on top of `jsonshape-core`.
//!
//! This crate loads schema definitions from directories of JSON/YAML files or
//! from single bundle files, filters them through a YAML configuration, and
//! memoizes compiled JSON Schema documents.
//!
//! # Quick start
//!
//! ```no_run
//! use jsonshape_catalog::{CatalogConfig, SchemaCatalog};
//! use jsonshape_core::ProviderRegistry;
//! use serde_json::json;
//!
//! // Load schemas from a directory
//! let catalog = SchemaCatalog::from_dir("schemas/", &ProviderRegistry::new()).unwrap();
//! let document = catalog.compile("order").unwrap();
//! println!("{document}");
//!
//! // Use the builder for fallback chains
//! let catalog = SchemaCatalog::builder()
//!     .with_config(CatalogConfig::default())
//!     .from_dir("schemas/")
//!     .from_bundle("schemas.json")
//!     .build()
//!     .unwrap();
//!
//! let order = catalog.convert("order", &json!({"id": 1})).unwrap();
//! ```

mod bundle;
mod cache;
mod config;
mod error;
mod loader;

pub use bundle::{BUNDLE_FORMAT_VERSION, SchemaBundle, SchemaFile};
pub use cache::{DocumentCache, fingerprint};
pub use config::{CONFIG_VERSION, CacheConfig, CatalogConfig};
pub use error::{CatalogError, Result};
pub use loader::{CatalogBuilder, CatalogSource, SchemaCatalog};
