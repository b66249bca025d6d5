use indexmap::IndexMap;
use jsonshape_core::Descriptor;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Version of the bundle format.
pub const BUNDLE_FORMAT_VERSION: &str = "1.0.0";

/// Serializable bundle of named schema definitions.
///
/// A bundle groups many definitions with version metadata, making it suitable
/// for shipping a whole catalog as a single JSON or YAML file.
///
/// # Examples
///
/// ```
/// use jsonshape_catalog::SchemaBundle;
/// use jsonshape_core::{Descriptor, MappingSchema};
///
/// let mut bundle = SchemaBundle::new("1.0.0", "2024-01-15T10:30:00Z");
/// bundle.name = Some("orders".into());
/// bundle.insert("id", &Descriptor::integer());
/// bundle.insert(
///     "customer",
///     &MappingSchema::new().with_field("name", Descriptor::string()).into(),
/// );
///
/// assert_eq!(bundle.schema_count(), 2);
/// assert_eq!(bundle.version, "1.0.0");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaBundle {
    /// Bundle format version (populated from [`BUNDLE_FORMAT_VERSION`]).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_version: Option<String>,
    /// Version of the schemas in this bundle.
    pub version: String,
    /// Optional bundle name.
    #[serde(default)]
    pub name: Option<String>,
    /// Optional bundle description.
    #[serde(default)]
    pub description: Option<String>,
    /// ISO-8601 timestamp for bundle creation.
    pub generated_at: String,
    /// Definitions by schema name.
    #[serde(default)]
    pub schemas: IndexMap<String, Value>,
}

impl SchemaBundle {
    /// Creates a bundle with required fields.
    pub fn new(version: impl Into<String>, generated_at: impl Into<String>) -> Self {
        Self {
            format_version: Some(BUNDLE_FORMAT_VERSION.to_string()),
            version: version.into(),
            name: None,
            description: None,
            generated_at: generated_at.into(),
            schemas: IndexMap::new(),
        }
    }

    /// Adds the definition of `descriptor` under `name`.
    pub fn insert(&mut self, name: impl Into<String>, descriptor: &Descriptor) {
        self.schemas.insert(name.into(), descriptor.to_definition());
    }

    /// Returns the number of schemas in this bundle.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}

/// A single schema definition stored in its own file.
///
/// ```yaml
/// name: customer
/// schema:
///   type: mapping
///   fields:
///     name: { type: string }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaFile {
    /// Name the schema is registered under.
    pub name: String,
    /// The schema definition.
    pub schema: Value,
}
