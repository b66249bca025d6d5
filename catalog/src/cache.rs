//! Memoization of compiled documents.
//!
//! A compiled document is a pure function of its descriptor, so documents are
//! cached under the SHA-256 [`fingerprint`] of the descriptor's full
//! definition, options included.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use jsonshape_core::{DefinitionError, Descriptor, Document, compile};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Computes the SHA-256 hex digest of a descriptor's definition.
///
/// # Examples
///
/// ```
/// use jsonshape_catalog::fingerprint;
/// use jsonshape_core::{Descriptor, IntegerSchema};
///
/// let plain = fingerprint(&Descriptor::integer());
/// let bounded = fingerprint(&IntegerSchema::new().with_minimum(0).into());
/// assert_eq!(plain.len(), 64);
/// assert_ne!(plain, bounded);
/// assert_eq!(plain, fingerprint(&Descriptor::integer()));
/// ```
pub fn fingerprint(descriptor: &Descriptor) -> String {
    let definition = descriptor.to_definition().to_string();
    let hash = Sha256::digest(definition.as_bytes());
    format!("{:x}", hash)
}

/// Thread-safe cache of compiled documents keyed by descriptor fingerprint.
#[derive(Debug, Default)]
pub struct DocumentCache {
    documents: RwLock<HashMap<String, Arc<Document>>>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached document for `descriptor`, compiling it on a miss.
    ///
    /// # Errors
    ///
    /// Returns the [`DefinitionError`] raised by compilation; failures are
    /// not cached.
    pub fn get_or_compile(&self, descriptor: &Descriptor) -> Result<Arc<Document>, DefinitionError> {
        let key = fingerprint(descriptor);

        if let Some(document) = self
            .documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            debug!(fingerprint = %key, "compiled document cache hit");
            return Ok(Arc::clone(document));
        }

        debug!(fingerprint = %key, "compiled document cache miss");
        let document = Arc::new(compile(descriptor)?);
        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Arc::clone(&document));
        Ok(document)
    }

    /// Returns the number of cached documents.
    pub fn len(&self) -> usize {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every cached document.
    pub fn clear(&self) {
        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
