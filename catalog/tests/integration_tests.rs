use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use jsonshape_catalog::{
    CacheConfig, CatalogConfig, CatalogError, SchemaBundle, SchemaCatalog, SchemaFile,
};
use jsonshape_core::{
    ConvertError, DefinitionError, Descriptor, MappingSchema, ProviderOptions, ProviderRegistry,
    SchemaProvider, StringSchema, Structured,
};
use serde_json::{Value, json};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Lower-case identifier of bounded length.
struct Slug;

impl SchemaProvider for Slug {
    fn name(&self) -> &str {
        "slug"
    }

    fn accepted_options(&self) -> &[&str] {
        &["max_length"]
    }

    fn resolve(&self, options: &ProviderOptions) -> Result<Descriptor, DefinitionError> {
        let mut schema = StringSchema::new().with_min_length(1);
        if let Some(max) = options.get("max_length") {
            let max = max.as_u64().ok_or_else(|| DefinitionError::ProviderRejected {
                provider: "slug".into(),
                reason: "max_length must be a count".into(),
            })?;
            schema = schema.with_max_length(max);
        }
        Ok(schema.into())
    }

    fn convert_value(
        &self,
        _resolved: &Descriptor,
        _options: &ProviderOptions,
        value: &Value,
    ) -> Result<Structured, String> {
        match value.as_str() {
            Some(s) if s.chars().all(|c| c.is_ascii_lowercase() || c == '-') => {
                Ok(Structured::String(s.to_string()))
            }
            _ => Err(format!("not a slug: {value}")),
        }
    }
}

fn registry() -> ProviderRegistry {
    ProviderRegistry::new().with_provider(Slug)
}

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
    let mut f = std::fs::File::create(dir.join(format!("{name}.json"))).unwrap();
    serde_json::to_writer_pretty(&mut f, &file).unwrap();
    f.flush().unwrap();
}

fn article_definition() -> Value {
    json!({
        "type": "mapping",
        "fields": {
            "slug": {"ref": "slug", "max_length": 32},
            "title": {"type": "string", "min_length": 1},
            "tags": {"type": "array", "items": {"ref": "slug"}, "optional": true}
        }
    })
}

fn populated_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_schema(dir.path(), "article", article_definition());
    write_file(
        dir.path(),
        "author.yaml",
        "name: author\nschema:\n  type: mapping\n  fields:\n    name: { type: string }\n    email: { type: string, format: email, nullable: true, optional: true }\n",
    );
    write_file(
        dir.path(),
        "legacy.yml",
        "name: legacy\nschema: { type: any }\n",
    );
    dir
}

// ---------------------------------------------------------------------------
// Directory loading
// ---------------------------------------------------------------------------

#[test]
fn test_directory_loading() {
    let dir = populated_dir();
    let catalog = SchemaCatalog::from_dir(dir.path(), &registry()).unwrap();

    assert_eq!(catalog.len(), 3);
    let mut names: Vec<&str> = catalog.names().collect();
    names.sort();
    assert_eq!(names, vec!["article", "author", "legacy"]);

    let Some(Descriptor::Mapping(author)) = catalog.get("author") else {
        panic!("author should be a mapping");
    };
    assert_eq!(author.required_fields(), vec!["name"]);
}

#[test]
fn test_directory_with_unregistered_provider() {
    let dir = populated_dir();
    let err = SchemaCatalog::from_dir(dir.path(), &ProviderRegistry::new()).unwrap_err();
    assert!(matches!(
        err,
        CatalogError::InvalidDefinition {
            name,
            source: DefinitionError::UnknownProvider(provider),
        } if name == "article" && provider == "slug"
    ));
}

// ---------------------------------------------------------------------------
// Bundle loading
// ---------------------------------------------------------------------------

#[test]
fn test_bundle_round_trip_through_yaml() {
    let dir = populated_dir();
    let loaded = SchemaCatalog::from_dir(dir.path(), &registry()).unwrap();

    let bundle = loaded.to_bundle("2.0.0", "2024-06-01T00:00:00Z");
    assert_eq!(bundle.schema_count(), 3);

    let path = dir.path().join("bundle.yaml");
    let f = std::fs::File::create(&path).unwrap();
    serde_yaml::to_writer(f, &bundle).unwrap();

    let reloaded = SchemaCatalog::from_bundle(&path, &registry()).unwrap();
    assert_eq!(reloaded.len(), 3);
    for name in ["article", "author", "legacy"] {
        assert_eq!(reloaded.get(name), loaded.get(name), "{name} differs");
    }
}

#[test]
fn test_bundle_with_bad_definition() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bundle.json");

    let mut bundle = SchemaBundle::new("1.0.0", "2024-01-01T00:00:00Z");
    bundle
        .schemas
        .insert("broken".into(), json!({"type": "integer", "format": "email"}));
    write_file(dir.path(), "bundle.json", &serde_json::to_string(&bundle).unwrap());

    let err = SchemaCatalog::from_bundle(&path, &registry()).unwrap_err();
    assert!(matches!(err, CatalogError::InvalidDefinition { name, .. } if name == "broken"));
}

// ---------------------------------------------------------------------------
// Builder and configuration
// ---------------------------------------------------------------------------

#[test]
fn test_builder_falls_back_and_filters() {
    let dir = populated_dir();
    let config_dir = tempfile::tempdir().unwrap();
    let config_path = config_dir.path().join("jsonshape.yml");
    write_file(
        config_dir.path(),
        "jsonshape.yml",
        "version: \"1.0\"\nexclude:\n  - legacy\n",
    );

    let catalog = SchemaCatalog::builder()
        .with_registry(registry())
        .with_config(CatalogConfig::load(&config_path).unwrap())
        .from_bundle(dir.path().join("missing.json"))
        .from_dir(dir.path())
        .build()
        .unwrap();

    assert!(catalog.contains("article"));
    assert!(catalog.contains("author"));
    assert!(!catalog.contains("legacy"));
    assert!(catalog.cache().is_some());
}

#[test]
fn test_builder_all_sources_fail() {
    let result = SchemaCatalog::builder()
        .from_dir("/nonexistent/jsonshape/a")
        .from_bundle("/nonexistent/jsonshape/b.json")
        .build();
    assert!(matches!(result, Err(CatalogError::NoSourcesAvailable)));
}

// ---------------------------------------------------------------------------
// Compilation
// ---------------------------------------------------------------------------

#[test]
fn test_compile_is_memoized() {
    let dir = populated_dir();
    let catalog = SchemaCatalog::from_dir(dir.path(), &registry()).unwrap();

    let first = catalog.compile("article").unwrap();
    let second = catalog.compile("article").unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    assert_eq!(
        first["properties"]["slug"],
        json!({"type": "string", "minLength": 1, "maxLength": 32})
    );
    assert_eq!(first["required"], json!(["slug", "title"]));
}

#[test]
fn test_compile_without_cache() {
    let dir = populated_dir();
    let config = CatalogConfig {
        cache: CacheConfig { enabled: false },
        ..CatalogConfig::default()
    };
    let catalog = SchemaCatalog::builder()
        .with_registry(registry())
        .with_config(config)
        .from_dir(dir.path())
        .build()
        .unwrap();

    let first = catalog.compile("legacy").unwrap();
    let second = catalog.compile("legacy").unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first, second);
}

#[test]
fn test_compile_all() {
    let dir = populated_dir();
    let catalog = SchemaCatalog::from_dir(dir.path(), &registry()).unwrap();

    let documents = catalog.compile_all().unwrap();
    assert_eq!(
        documents.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["article", "author", "legacy"]
    );
    assert_eq!(catalog.cache().map(|c| c.len()), Some(3));
    assert_eq!(
        documents["author"]["properties"]["email"],
        json!({"type": ["string", "null"], "format": "email"})
    );
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

#[test]
fn test_convert_by_name() {
    let dir = populated_dir();
    let catalog = SchemaCatalog::from_dir(dir.path(), &registry()).unwrap();

    let article = catalog
        .convert(
            "article",
            &json!({"slug": "hello-world", "title": "Hello", "tags": ["intro", "rust"]}),
        )
        .unwrap();
    assert_eq!(
        article.get("slug").and_then(Structured::as_str),
        Some("hello-world")
    );
    assert_eq!(
        article.get("tags").and_then(Structured::as_list).map(<[_]>::len),
        Some(2)
    );
}

#[test]
fn test_convert_reports_every_failure() {
    let dir = populated_dir();
    let catalog = SchemaCatalog::from_dir(dir.path(), &registry()).unwrap();

    let err = catalog
        .convert(
            "article",
            &json!({"slug": "Hello", "title": "Hi", "tags": ["ok", "NOT OK"], "draft": true}),
        )
        .unwrap_err();

    let CatalogError::Conversion(ConvertError::Failed(failures)) = err else {
        panic!("expected conversion failures, got {err:?}");
    };
    let locations: Vec<String> = failures.iter().map(|f| f.location().to_string()).collect();
    assert_eq!(locations, vec!["/slug", "/tags/1", ""]);
}

#[test]
fn test_in_memory_catalog() {
    let mut catalog = SchemaCatalog::new();
    assert!(catalog.is_empty());

    catalog.insert(
        "pair".into(),
        MappingSchema::new()
            .with_field("left", Descriptor::integer())
            .with_field("right", Descriptor::integer())
            .into(),
    );
    let pair = catalog.convert("pair", &json!({"left": 1, "right": 2})).unwrap();
    assert_eq!(pair.get("right").and_then(Structured::as_i64), Some(2));
}
