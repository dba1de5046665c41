//! Plugin-based backend registry
//!
//! The registry maps backend type names to factories so the binary can pick
//! a backend from configuration without hardcoded if-else chains.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use newsletter_core::registry::BackendRegistry;
//!
//! let registry = BackendRegistry::with_defaults();
//! newsletter_masterdata::register(&registry);
//!
//! let backends = registry.create(&config.backend)?;
//! ```

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::backend::{MemoryDocumentStore, MemoryNativeWriter};
use crate::config::BackendConfig;
use crate::error::{Error, Result};
use crate::traits::{DocumentStore, NativeWriter, SchemaRegistrar};

/// The remote collaborators produced by a backend factory
#[derive(Clone)]
pub struct Backends {
    /// Dedup query and legacy create-mutation
    pub documents: Arc<dyn DocumentStore>,
    /// Native write path
    pub native: Arc<dyn NativeWriter>,
    /// Schema registration, when the backend supports it
    pub schemas: Option<Arc<dyn SchemaRegistrar>>,
}

impl std::fmt::Debug for Backends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backends")
            .field("documents", &self.documents.backend_name())
            .field("native", &self.native.writer_name())
            .field("schemas", &self.schemas.is_some())
            .finish()
    }
}

/// Helper trait for constructing backends from configuration
pub trait BackendFactory: Send + Sync {
    /// Create the backends described by `config`
    fn create(&self, config: &BackendConfig) -> Result<Backends>;
}

/// Factory for the in-memory backend
pub struct MemoryBackendFactory;

impl BackendFactory for MemoryBackendFactory {
    fn create(&self, _config: &BackendConfig) -> Result<Backends> {
        let documents = MemoryDocumentStore::new();
        Ok(Backends {
            documents: Arc::new(documents.clone()),
            native: Arc::new(MemoryNativeWriter::new()),
            schemas: Some(Arc::new(documents)),
        })
    }
}

/// Backend registry
///
/// Uses interior mutability so factories can be registered through a
/// shared reference.
#[derive(Default)]
pub struct BackendRegistry {
    factories: RwLock<HashMap<String, Box<dyn BackendFactory>>>,
}

impl BackendRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the in-memory backend registered
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register("memory", Box::new(MemoryBackendFactory));
        registry
    }

    /// Register a backend factory under `name`
    pub fn register(&self, name: impl Into<String>, factory: Box<dyn BackendFactory>) {
        self.factories
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), factory);
    }

    /// Create backends from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Backends)`: Created backends
    /// - `Err(Error)`: If the backend type is not registered or creation fails
    pub fn create(&self, config: &BackendConfig) -> Result<Backends> {
        config.validate()?;

        let backend_type = config.type_name();
        let factories = self.factories.read().unwrap_or_else(PoisonError::into_inner);

        let factory = factories
            .get(backend_type)
            .ok_or_else(|| Error::config(format!("Unknown backend type: {}", backend_type)))?;

        factory.create(config)
    }

    /// Check if a backend type is registered
    pub fn has_backend(&self, name: &str) -> bool {
        self.factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// List all registered backend types
    pub fn list_backends(&self) -> Vec<String> {
        self.factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}
