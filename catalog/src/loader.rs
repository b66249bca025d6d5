//! Schema catalog loading with builder pattern and fallback chains.
//!
//! Provides [`SchemaCatalog`] for named descriptor lookup, compilation and
//! conversion, and [`CatalogBuilder`] for constructing a catalog from
//! multiple sources with automatic fallback.
//!
//! # Loading patterns
//!
//! ```no_run
//! use jsonshape_catalog::SchemaCatalog;
//! use jsonshape_core::ProviderRegistry;
//!
//! let registry = ProviderRegistry::new();
//!
//! // Load from a directory of JSON/YAML definition files
//! let catalog = SchemaCatalog::from_dir("schemas/", &registry).unwrap();
//! assert!(catalog.get("order").is_some());
//!
//! // Load from a single bundle
//! let catalog = SchemaCatalog::from_bundle("schemas.json", &registry).unwrap();
//!
//! // Use the builder for a fallback chain
//! let catalog = SchemaCatalog::builder()
//!     .with_registry(registry)
//!     .from_dir("schemas/")
//!     .from_bundle("schemas.json")
//!     .build()
//!     .unwrap();
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use jsonshape_core::{Descriptor, Document, ProviderRegistry, Structured, compile, convert, parse_definition};
use rayon::prelude::*;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::bundle::{SchemaBundle, SchemaFile};
use crate::cache::DocumentCache;
use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};

/// Describes where a [`SchemaCatalog`] was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// Loaded from a directory of individual definition files.
    Directory(PathBuf),
    /// Loaded from a single [`SchemaBundle`] file.
    Bundle(PathBuf),
    /// Assembled in memory.
    Memory,
    /// Loaded via a fallback chain of multiple sources.
    Multiple(Vec<CatalogSource>),
}

/// Named descriptors with compilation and conversion by name.
///
/// # Examples
///
/// ```
/// use jsonshape_catalog::SchemaCatalog;
/// use jsonshape_core::{Descriptor, MappingSchema};
/// use serde_json::json;
///
/// let mut catalog = SchemaCatalog::new();
/// catalog.insert(
///     "customer".into(),
///     MappingSchema::new().with_field("name", Descriptor::string()).into(),
/// );
///
/// let document = catalog.compile("customer").unwrap();
/// assert_eq!(document["required"], json!(["name"]));
///
/// let customer = catalog.convert("customer", &json!({"name": "Ada"})).unwrap();
/// assert_eq!(customer.get("name").and_then(|v| v.as_str()), Some("Ada"));
/// ```
#[derive(Debug)]
pub struct SchemaCatalog {
    schemas: HashMap<String, Descriptor>,
    source: CatalogSource,
    cache: Option<DocumentCache>,
}

impl Default for SchemaCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaCatalog {
    /// Creates an empty in-memory catalog with caching enabled.
    pub fn new() -> Self {
        Self {
            schemas: HashMap::new(),
            source: CatalogSource::Memory,
            cache: Some(DocumentCache::new()),
        }
    }

    /// Returns a new [`CatalogBuilder`] for configuring a fallback chain.
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// Loads definitions from a directory of `*.json`, `*.yaml` and `*.yml`
    /// files, each holding a [`SchemaFile`].
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::IoError`] if the directory or a file cannot be
    /// read, [`CatalogError::JsonError`]/[`CatalogError::YamlError`] for
    /// malformed files, [`CatalogError::InvalidDefinition`] for a definition
    /// that does not describe a valid descriptor, and
    /// [`CatalogError::DuplicateSchema`] if two files share a name.
    pub fn from_dir(path: impl AsRef<Path>, registry: &ProviderRegistry) -> Result<Self> {
        let path = path.as_ref();
        let mut schemas = HashMap::new();

        for entry in std::fs::read_dir(path)? {
            let file_path = entry?.path();
            let Some(format) = FileFormat::of(&file_path) else {
                continue;
            };

            let file: SchemaFile = format.read(&file_path)?;
            let descriptor = parse_named(&file.name, &file.schema, registry)?;
            if schemas.insert(file.name.clone(), descriptor).is_some() {
                return Err(CatalogError::DuplicateSchema(file.name));
            }
        }

        debug!(path = %path.display(), schemas = schemas.len(), "loaded schema directory");
        Ok(Self {
            schemas,
            source: CatalogSource::Directory(path.to_path_buf()),
            cache: Some(DocumentCache::new()),
        })
    }

    /// Loads definitions from a single [`SchemaBundle`] file (JSON, or YAML
    /// when the extension is `.yaml`/`.yml`).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::IoError`] if the file cannot be read,
    /// [`CatalogError::JsonError`]/[`CatalogError::YamlError`] if parsing
    /// fails, or [`CatalogError::InvalidDefinition`] for a bad definition.
    pub fn from_bundle(path: impl AsRef<Path>, registry: &ProviderRegistry) -> Result<Self> {
        let path = path.as_ref();
        let format = FileFormat::of(path).unwrap_or(FileFormat::Json);
        let bundle: SchemaBundle = format.read(path)?;

        let mut schemas = HashMap::with_capacity(bundle.schemas.len());
        for (name, definition) in &bundle.schemas {
            schemas.insert(name.clone(), parse_named(name, definition, registry)?);
        }

        debug!(
            path = %path.display(),
            version = %bundle.version,
            schemas = schemas.len(),
            "loaded schema bundle"
        );
        Ok(Self {
            schemas,
            source: CatalogSource::Bundle(path.to_path_buf()),
            cache: Some(DocumentCache::new()),
        })
    }

    /// Loads a catalog from any [`CatalogSource`].
    ///
    /// [`CatalogSource::Multiple`] is a fallback chain: the first member that
    /// loads wins and failures are logged. An empty or fully failing chain
    /// returns [`CatalogError::NoSourcesAvailable`].
    ///
    /// # Errors
    ///
    /// Returns the error of [`from_dir`](Self::from_dir) or
    /// [`from_bundle`](Self::from_bundle) for single sources.
    pub fn load(source: &CatalogSource, registry: &ProviderRegistry) -> Result<Self> {
        match source {
            CatalogSource::Directory(path) => Self::from_dir(path, registry),
            CatalogSource::Bundle(path) => Self::from_bundle(path, registry),
            CatalogSource::Memory => Ok(Self::new()),
            CatalogSource::Multiple(sources) => {
                for member in sources {
                    match Self::load(member, registry) {
                        Ok(mut catalog) => {
                            catalog.source = source.clone();
                            return Ok(catalog);
                        }
                        Err(err) => {
                            debug!(source = ?member, error = %err, "catalog source failed, trying next");
                        }
                    }
                }
                Err(CatalogError::NoSourcesAvailable)
            }
        }
    }

    /// Looks up a descriptor by name.
    pub fn get(&self, name: &str) -> Option<&Descriptor> {
        self.schemas.get(name)
    }

    /// Inserts a descriptor, replacing any existing entry with the same name.
    pub fn insert(&mut self, name: String, descriptor: Descriptor) {
        self.schemas.insert(name, descriptor);
    }

    /// Returns `true` if the catalog contains a schema named `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Returns the number of schemas in the catalog.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns `true` if the catalog contains no schemas.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Returns an iterator over schema names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(|s| s.as_str())
    }

    /// Returns a reference to the source metadata.
    pub fn source(&self) -> &CatalogSource {
        &self.source
    }

    /// Returns the compiled-document cache, if caching is enabled.
    pub fn cache(&self) -> Option<&DocumentCache> {
        self.cache.as_ref()
    }

    /// Bundles every schema in the catalog.
    pub fn to_bundle(&self, version: impl Into<String>, generated_at: impl Into<String>) -> SchemaBundle {
        let mut bundle = SchemaBundle::new(version, generated_at);
        let mut names: Vec<&String> = self.schemas.keys().collect();
        names.sort();
        for name in names {
            bundle.insert(name.clone(), &self.schemas[name]);
        }
        bundle
    }

    /// Compiles the schema named `name`, memoized when caching is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownSchema`] for an unknown name, or
    /// [`CatalogError::Definition`] if compilation fails.
    pub fn compile(&self, name: &str) -> Result<Arc<Document>> {
        let descriptor = self.require(name)?;
        let document = match &self.cache {
            Some(cache) => cache.get_or_compile(descriptor)?,
            None => Arc::new(compile(descriptor)?),
        };
        Ok(document)
    }

    /// Compiles every schema in parallel.
    ///
    /// # Errors
    ///
    /// Returns the first [`CatalogError::Definition`] encountered.
    pub fn compile_all(&self) -> Result<BTreeMap<String, Arc<Document>>> {
        self.schemas
            .par_iter()
            .map(|(name, _)| self.compile(name).map(|document| (name.clone(), document)))
            .collect()
    }

    /// Converts validated input with the schema named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownSchema`] for an unknown name, or
    /// [`CatalogError::Conversion`] carrying every conversion failure.
    pub fn convert(&self, name: &str, value: &Value) -> Result<Structured> {
        let descriptor = self.require(name)?;
        Ok(convert(descriptor, value)?)
    }

    fn require(&self, name: &str) -> Result<&Descriptor> {
        self.schemas
            .get(name)
            .ok_or_else(|| CatalogError::UnknownSchema(name.to_string()))
    }

    fn apply_config(&mut self, config: &CatalogConfig) {
        self.schemas.retain(|name, _| config.is_allowed(name));
        if !config.cache.enabled {
            self.cache = None;
        }
    }
}

fn parse_named(name: &str, definition: &Value, registry: &ProviderRegistry) -> Result<Descriptor> {
    parse_definition(definition, registry).map_err(|source| CatalogError::InvalidDefinition {
        name: name.to_string(),
        source,
    })
}

/// On-disk encoding of a definition file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Json,
    Yaml,
}

impl FileFormat {
    fn of(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Some(FileFormat::Json),
            Some("yaml" | "yml") => Some(FileFormat::Yaml),
            _ => None,
        }
    }

    fn read<T: DeserializeOwned>(self, path: &Path) -> Result<T> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(match self {
            FileFormat::Json => serde_json::from_reader(reader)?,
            FileFormat::Yaml => serde_yaml::from_reader(reader)?,
        })
    }
}

/// Builder for constructing a [`SchemaCatalog`] with a fallback chain.
///
/// Sources are tried in the order they are added. The first successful load
/// wins; if all fail, [`CatalogError::NoSourcesAvailable`] is returned.
///
/// # Example
///
/// ```no_run
/// use jsonshape_catalog::{CatalogConfig, SchemaCatalog};
///
/// let catalog = SchemaCatalog::builder()
///     .with_config(CatalogConfig::load("jsonshape.yml").unwrap())
///     .from_dir("/opt/schemas/")
///     .from_bundle("/opt/schemas.json")
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    sources: Vec<CatalogSource>,
    registry: ProviderRegistry,
    config: Option<CatalogConfig>,
}

impl CatalogBuilder {
    /// Creates a new builder with no sources and an empty provider registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the providers that `ref` definitions resolve against.
    pub fn with_registry(mut self, registry: ProviderRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Applies allow/exclude filtering and cache settings from `config`.
    pub fn with_config(mut self, config: CatalogConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Adds a directory of definition files as a source.
    pub fn from_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(CatalogSource::Directory(path.into()));
        self
    }

    /// Adds a [`SchemaBundle`] file as a source.
    pub fn from_bundle(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(CatalogSource::Bundle(path.into()));
        self
    }

    /// Attempts to load schemas from configured sources in order.
    ///
    /// Returns the first successfully loaded catalog. If all sources fail,
    /// returns [`CatalogError::NoSourcesAvailable`].
    pub fn build(self) -> Result<SchemaCatalog> {
        let mut catalog =
            SchemaCatalog::load(&CatalogSource::Multiple(self.sources), &self.registry)?;
        if let Some(config) = &self.config {
            catalog.apply_config(config);
        }
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonshape_core::MappingSchema;
    use serde_json::json;
    use std::io::Write;

    fn write_file(dir: &Path, file_name: &str, contents: &str) {
        let mut f = std::fs::File::create(dir.join(file_name)).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f.flush().unwrap();
    }

    fn write_schema(dir: &Path, name: &str, schema: Value) {
        let file = SchemaFile {
            name: name.to_string(),
            schema,
        };
        write_file(
            dir,
            &format!("{name}.json"),
            &serde_json::to_string_pretty(&file).unwrap(),
        );
    }

    #[test]
    fn test_from_dir_reads_json_and_yaml() {
        let dir = tempfile::tempdir().unwrap();
        write_schema(dir.path(), "id", json!({"type": "integer"}));
        write_file(
            dir.path(),
            "customer.yaml",
            "name: customer\nschema:\n  type: mapping\n  fields:\n    name: { type: string }\n",
        );
        write_file(dir.path(), "README.md", "not a schema");

        let catalog = SchemaCatalog::from_dir(dir.path(), &ProviderRegistry::new()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("id"), Some(&Descriptor::integer()));
        assert!(catalog.contains("customer"));
        assert_eq!(
            catalog.source(),
            &CatalogSource::Directory(dir.path().to_path_buf())
        );
    }

    #[test]
    fn test_from_dir_rejects_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        write_schema(dir.path(), "id", json!({"type": "integer"}));
        write_file(
            dir.path(),
            "id-again.yml",
            "name: id\nschema: { type: string }\n",
        );

        let err = SchemaCatalog::from_dir(dir.path(), &ProviderRegistry::new()).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateSchema(name) if name == "id"));
    }

    #[test]
    fn test_from_dir_names_the_broken_definition() {
        let dir = tempfile::tempdir().unwrap();
        write_schema(dir.path(), "flag", json!({"type": "boolean", "max_length": 3}));

        let err = SchemaCatalog::from_dir(dir.path(), &ProviderRegistry::new()).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidDefinition { name, .. } if name == "flag"));
    }

    #[test]
    fn test_from_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.json");

        let mut bundle = SchemaBundle::new("1.0.0", "2024-01-01T00:00:00Z");
        bundle.insert("id", &Descriptor::integer());
        bundle.insert(
            "customer",
            &MappingSchema::new()
                .with_field("name", Descriptor::string())
                .into(),
        );
        write_file(dir.path(), "bundle.json", &serde_json::to_string(&bundle).unwrap());

        let catalog = SchemaCatalog::from_bundle(&path, &ProviderRegistry::new()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains("id"));
        assert!(catalog.contains("customer"));
    }

    #[test]
    fn test_builder_fallback() {
        let dir = tempfile::tempdir().unwrap();
        write_schema(dir.path(), "id", json!({"type": "integer"}));

        let catalog = SchemaCatalog::builder()
            .from_bundle(dir.path().join("missing.json"))
            .from_dir(dir.path())
            .build()
            .unwrap();
        assert!(catalog.contains("id"));
        assert!(matches!(catalog.source(), CatalogSource::Multiple(sources) if sources.len() == 2));
    }

    #[test]
    fn test_builder_no_sources() {
        let result = SchemaCatalog::builder().build();
        assert!(matches!(result, Err(CatalogError::NoSourcesAvailable)));

        let result = SchemaCatalog::builder()
            .from_dir("/nonexistent/jsonshape/schemas")
            .build();
        assert!(matches!(result, Err(CatalogError::NoSourcesAvailable)));
    }

    #[test]
    fn test_builder_applies_config() {
        let dir = tempfile::tempdir().unwrap();
        write_schema(dir.path(), "id", json!({"type": "integer"}));
        write_schema(dir.path(), "legacy", json!({"type": "string"}));

        let config = CatalogConfig {
            exclude: vec!["legacy".into()],
            cache: crate::config::CacheConfig { enabled: false },
            ..CatalogConfig::default()
        };
        let catalog = SchemaCatalog::builder()
            .with_config(config)
            .from_dir(dir.path())
            .build()
            .unwrap();

        assert!(catalog.contains("id"));
        assert!(!catalog.contains("legacy"));
        assert!(catalog.cache().is_none());
        assert_eq!(*catalog.compile("id").unwrap(), json!({"type": "integer"}));
    }

    #[test]
    fn test_load_nested_chain() {
        let dir = tempfile::tempdir().unwrap();
        write_schema(dir.path(), "id", json!({"type": "integer"}));

        let chain = CatalogSource::Multiple(vec![
            CatalogSource::Multiple(vec![CatalogSource::Bundle(dir.path().join("missing.yaml"))]),
            CatalogSource::Directory(dir.path().to_path_buf()),
        ]);
        let catalog = SchemaCatalog::load(&chain, &ProviderRegistry::new()).unwrap();
        assert!(catalog.contains("id"));
        assert_eq!(catalog.source(), &chain);

        let memory = SchemaCatalog::load(&CatalogSource::Memory, &ProviderRegistry::new()).unwrap();
        assert!(memory.is_empty());
        assert_eq!(memory.source(), &CatalogSource::Memory);

        assert!(matches!(
            SchemaCatalog::load(&CatalogSource::Multiple(Vec::new()), &ProviderRegistry::new()),
            Err(CatalogError::NoSourcesAvailable)
        ));
    }

    #[test]
    fn test_unknown_schema() {
        let catalog = SchemaCatalog::new();
        assert!(matches!(
            catalog.compile("nope"),
            Err(CatalogError::UnknownSchema(name)) if name == "nope"
        ));
        assert!(matches!(
            catalog.convert("nope", &json!({})),
            Err(CatalogError::UnknownSchema(_))
        ));
    }
}
