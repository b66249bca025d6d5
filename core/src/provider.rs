//! Extension contract for reusable, named schema fragments.
//!
//! A [`SchemaProvider`] expands a reference into a concrete [`Descriptor`] and
//! owns the conversion of values matched by that reference. Providers are
//! registered by name in a [`ProviderRegistry`]; a reference resolves its
//! provider once, when the descriptor is built.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::DefinitionError;
use crate::types::Descriptor;
use crate::value::Structured;

/// Configuration handed to a provider by a reference.
pub type ProviderOptions = Map<String, Value>;

/// A reusable schema fragment supplied from outside the core.
///
/// Both operations are required; a type offering only schema resolution
/// cannot stand in for a provider:
///
/// ```compile_fail
/// use jsonshape_core::{DefinitionError, Descriptor, ProviderOptions, SchemaProvider};
///
/// struct SchemaOnly;
///
/// impl SchemaProvider for SchemaOnly {
///     fn name(&self) -> &str {
///         "schema_only"
///     }
///
///     fn resolve(&self, _options: &ProviderOptions) -> Result<Descriptor, DefinitionError> {
///         Ok(Descriptor::any())
///     }
/// }
/// ```
///
/// # Examples
///
/// ```
/// use jsonshape_core::*;
/// use serde_json::{Value, json};
///
/// /// A lowercase slug stored as a plain string.
/// struct Slug;
///
/// impl SchemaProvider for Slug {
///     fn name(&self) -> &str {
///         "slug"
///     }
///
///     fn accepted_options(&self) -> &[&str] {
///         &["max_length"]
///     }
///
///     fn resolve(&self, options: &ProviderOptions) -> Result<Descriptor, DefinitionError> {
///         let max = options.get("max_length").and_then(Value::as_u64).unwrap_or(64);
///         Ok(StringSchema::new().with_max_length(max).into())
///     }
///
///     fn convert_value(
///         &self,
///         _resolved: &Descriptor,
///         _options: &ProviderOptions,
///         value: &Value,
///     ) -> Result<Structured, String> {
///         match value.as_str() {
///             Some(s) => Ok(Structured::String(s.to_lowercase())),
///             None => Err("slug must be a string".into()),
///         }
///     }
/// }
///
/// let registry = ProviderRegistry::new().with_provider(Slug);
/// let slug = registry.reference("slug", ProviderOptions::new()).unwrap();
/// let document = compile(&slug.into()).unwrap();
/// assert_eq!(document, json!({"type": "string", "maxLength": 64}));
/// ```
pub trait SchemaProvider: Send + Sync {
    /// Name under which the provider is registered and referenced.
    fn name(&self) -> &str;

    /// Option keys a reference to this provider may carry.
    fn accepted_options(&self) -> &[&str] {
        &[]
    }

    /// Expands a reference into a concrete descriptor.
    fn resolve(&self, options: &ProviderOptions) -> Result<Descriptor, DefinitionError>;

    /// Converts a value matched by this provider's resolved descriptor.
    ///
    /// `Err` carries a human-readable reason and is reported as a
    /// [`ConversionFailure::Provider`](crate::ConversionFailure::Provider).
    fn convert_value(
        &self,
        resolved: &Descriptor,
        options: &ProviderOptions,
        value: &Value,
    ) -> Result<Structured, String>;
}

/// A descriptor node delegating to a [`SchemaProvider`].
#[derive(Clone)]
pub struct ReferenceSchema {
    provider: Arc<dyn SchemaProvider>,
    options: ProviderOptions,
}

impl ReferenceSchema {
    /// Binds `provider` with `options`.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::UnknownOption`] for an option the provider
    /// does not accept, or whatever the provider's
    /// [`resolve`](SchemaProvider::resolve) reports for these options.
    pub fn new(
        provider: Arc<dyn SchemaProvider>,
        options: ProviderOptions,
    ) -> Result<Self, DefinitionError> {
        let accepted = provider.accepted_options();
        if let Some(option) = options.keys().find(|key| !accepted.contains(&key.as_str())) {
            return Err(DefinitionError::UnknownOption {
                kind: provider.name().to_string(),
                option: option.clone(),
            });
        }

        let reference = Self { provider, options };
        reference.resolve()?;
        Ok(reference)
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn provider(&self) -> &dyn SchemaProvider {
        self.provider.as_ref()
    }

    pub fn options(&self) -> &ProviderOptions {
        &self.options
    }

    /// Asks the provider for the concrete descriptor behind this reference.
    pub fn resolve(&self) -> Result<Descriptor, DefinitionError> {
        debug!(provider = self.provider.name(), "resolving schema reference");
        self.provider.resolve(&self.options)
    }
}

impl fmt::Debug for ReferenceSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceSchema")
            .field("provider", &self.provider.name())
            .field("options", &self.options)
            .finish()
    }
}

impl PartialEq for ReferenceSchema {
    fn eq(&self, other: &Self) -> bool {
        self.provider.name() == other.provider.name() && self.options == other.options
    }
}

/// Providers indexed by name.
///
/// # Examples
///
/// ```
/// use jsonshape_core::{DefinitionError, ProviderOptions, ProviderRegistry};
///
/// let registry = ProviderRegistry::new();
/// assert!(registry.is_empty());
/// assert_eq!(
///     registry.reference("money", ProviderOptions::new()).unwrap_err(),
///     DefinitionError::UnknownProvider("money".into()),
/// );
/// ```
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn SchemaProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a provider under its own name, replacing any previous one.
    pub fn register(&mut self, provider: impl SchemaProvider + 'static) {
        self.register_shared(Arc::new(provider));
    }

    /// Registers an already shared provider.
    pub fn register_shared(&mut self, provider: Arc<dyn SchemaProvider>) {
        debug!(provider = provider.name(), "registering schema provider");
        self.providers.insert(provider.name().to_string(), provider);
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_provider(mut self, provider: impl SchemaProvider + 'static) -> Self {
        self.register(provider);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn SchemaProvider>> {
        self.providers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Returns an iterator over registered provider names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(|s| s.as_str())
    }

    /// Builds a reference to the provider registered as `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::UnknownProvider`] if nothing is registered
    /// under `name`, plus the errors of [`ReferenceSchema::new`].
    pub fn reference(
        &self,
        name: &str,
        options: ProviderOptions,
    ) -> Result<ReferenceSchema, DefinitionError> {
        let provider = self
            .providers
            .get(name)
            .cloned()
            .ok_or_else(|| DefinitionError::UnknownProvider(name.to_string()))?;
        ReferenceSchema::new(provider, options)
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("ProviderRegistry")
            .field("providers", &names)
            .finish()
    }
}
