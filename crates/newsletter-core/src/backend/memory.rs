// # Memory Backends
//
// In-memory implementations of `DocumentStore`, `NativeWriter` and
// `SchemaRegistrar`.
//
// ## Purpose
//
// Provides a simple, fast backend that doesn't persist across restarts.
// Useful for tests, demos and local development of storefront themes.
//
// ## Query Support
//
// Only `email=<value>` filters are understood, which is all the dedup
// guard issues. Any other filter matches nothing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::{
    CreateDocumentRequest, CreatedDocument, DocumentField, DocumentList, DocumentQuery,
    DocumentStore, NativeSubscription, NativeWriteReceipt, NativeWriter, SchemaDefinition,
    SchemaRegistrar, SubscriberDocument,
};

/// A document kept by [`MemoryDocumentStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub id: String,
    pub schema: String,
    pub fields: Vec<DocumentField>,
}

impl StoredDocument {
    fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.key == key)
            .map(|field| field.value.as_str())
    }
}

#[derive(Debug, Default)]
struct Entities {
    documents: HashMap<String, Vec<StoredDocument>>,
    schemas: HashMap<(String, String), serde_json::Value>,
    next_id: u64,
}

/// In-memory document store
///
/// # Example
///
/// ```rust,no_run
/// use newsletter_core::backend::MemoryDocumentStore;
/// use newsletter_core::traits::{DocumentQuery, DocumentStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryDocumentStore::new();
///     store.insert("NL", "v1", "ada@example.com").await;
///
///     let query = DocumentQuery::by_email("NL", "v1", "ada@example.com");
///     assert_eq!(store.search_documents(&query).await?.len(), 1);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    inner: Arc<RwLock<Entities>>,
}

impl MemoryDocumentStore {
    /// Create a new empty memory document store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a subscriber document
    pub async fn insert(&self, acronym: &str, schema: &str, email: &str) -> String {
        let mut guard = self.inner.write().await;
        Self::store(
            &mut guard,
            acronym,
            schema,
            vec![DocumentField::new("email", email)],
        )
    }

    /// All documents stored under `acronym`
    pub async fn documents(&self, acronym: &str) -> Vec<StoredDocument> {
        let guard = self.inner.read().await;
        guard.documents.get(acronym).cloned().unwrap_or_default()
    }

    /// Number of documents stored under `acronym`
    pub async fn len(&self, acronym: &str) -> usize {
        let guard = self.inner.read().await;
        guard.documents.get(acronym).map_or(0, Vec::len)
    }

    /// Schema body registered for `acronym`/`schema`
    pub async fn schema(&self, acronym: &str, schema: &str) -> Option<serde_json::Value> {
        let guard = self.inner.read().await;
        guard
            .schemas
            .get(&(acronym.to_string(), schema.to_string()))
            .cloned()
    }

    fn store(
        entities: &mut Entities,
        acronym: &str,
        schema: &str,
        fields: Vec<DocumentField>,
    ) -> String {
        entities.next_id += 1;
        let id = format!("{}-{}", acronym.to_lowercase(), entities.next_id);
        entities
            .documents
            .entry(acronym.to_string())
            .or_default()
            .push(StoredDocument {
                id: id.clone(),
                schema: schema.to_string(),
                fields,
            });
        id
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn search_documents(&self, query: &DocumentQuery) -> Result<DocumentList, Error> {
        let Some(email) = query.filtered_email() else {
            return Ok(DocumentList::default());
        };

        let guard = self.inner.read().await;
        let documents = guard
            .documents
            .get(&query.acronym)
            .into_iter()
            .flatten()
            .filter(|document| document.schema == query.schema)
            .filter_map(|document| document.field("email"))
            .filter(|stored| *stored == email)
            .map(|stored| SubscriberDocument {
                email: stored.to_string(),
            })
            .collect();

        Ok(DocumentList::new(documents))
    }

    async fn create_document(
        &self,
        request: &CreateDocumentRequest,
    ) -> Result<CreatedDocument, Error> {
        if request.field("email").is_none_or(str::is_empty) {
            return Err(Error::remote_mutation("document has no email field"));
        }

        let mut guard = self.inner.write().await;
        let id = Self::store(
            &mut guard,
            &request.acronym,
            &request.schema,
            request.document.fields.clone(),
        );
        Ok(CreatedDocument::new(id))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[async_trait]
impl SchemaRegistrar for MemoryDocumentStore {
    async fn register_schema(&self, definition: &SchemaDefinition) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.schemas.insert(
            (definition.acronym.clone(), definition.schema.clone()),
            definition.body.clone(),
        );
        Ok(())
    }
}

/// In-memory native writer that records every subscription
#[derive(Debug, Clone, Default)]
pub struct MemoryNativeWriter {
    subscriptions: Arc<RwLock<Vec<NativeSubscription>>>,
}

impl MemoryNativeWriter {
    /// Create a new empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscriptions written so far, in order
    pub async fn subscriptions(&self) -> Vec<NativeSubscription> {
        self.subscriptions.read().await.clone()
    }
}

#[async_trait]
impl NativeWriter for MemoryNativeWriter {
    async fn subscribe(
        &self,
        subscription: &NativeSubscription,
    ) -> Result<NativeWriteReceipt, Error> {
        self.subscriptions.write().await.push(subscription.clone());
        Ok(NativeWriteReceipt { success: true })
    }

    fn writer_name(&self) -> &'static str {
        "memory"
    }
}
