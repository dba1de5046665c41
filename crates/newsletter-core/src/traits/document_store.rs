// # Document Store Trait
//
// Defines the interface to the hosted document store that backs the
// legacy subscription path.
//
// ## Implementations
//
// - Master data GraphQL: `newsletter-masterdata` crate
// - In-memory: `newsletter_core::backend::MemoryDocumentStore`
//
// ## Usage
//
// ```rust,ignore
// use newsletter_core::traits::{DocumentQuery, DocumentStore};
//
// let query = DocumentQuery::by_email("NL", "newsletter-subscribers-v1", "a@b.com");
// let existing = store.search_documents(&query).await?;
// if existing.is_empty() {
//     store.create_document(&request).await?;
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Identifier used when the dedup guard finds an existing subscriber
///
/// The legacy path treats "already subscribed" as a successful submission.
pub const ALREADY_SUBSCRIBED_ID: &str = "already-subscribed";

/// A single `{key, value}` pair of a stored document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentField {
    pub key: String,
    pub value: String,
}

impl DocumentField {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A document returned by the dedup query, projected to the email field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberDocument {
    pub email: String,
}

/// Result of the dedup query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentList {
    pub documents: Vec<SubscriberDocument>,
}

impl DocumentList {
    pub fn new(documents: Vec<SubscriberDocument>) -> Self {
        Self { documents }
    }

    /// No matching subscriber exists yet
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }
}

/// "Find documents where email = `<value>`", projected to `fields`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentQuery {
    pub acronym: String,
    pub schema: String,
    pub fields: Vec<String>,
    pub filter: String,
}

impl DocumentQuery {
    /// Build the dedup query for a submitted email
    pub fn by_email(
        acronym: impl Into<String>,
        schema: impl Into<String>,
        email: &str,
    ) -> Self {
        Self {
            acronym: acronym.into(),
            schema: schema.into(),
            fields: vec!["email".to_string()],
            filter: format!("email={email}"),
        }
    }

    /// The email value this query filters on, if it is an email filter
    pub fn filtered_email(&self) -> Option<&str> {
        self.filter.strip_prefix("email=")
    }
}

/// Payload of the legacy create-mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDocumentRequest {
    pub acronym: String,
    pub schema: String,
    pub document: DocumentInput,
}

/// Ordered fields of the document to create
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInput {
    pub fields: Vec<DocumentField>,
}

impl CreateDocumentRequest {
    /// Value of the first field named `key`
    pub fn field(&self, key: &str) -> Option<&str> {
        self.document
            .fields
            .iter()
            .find(|field| field.key == key)
            .map(|field| field.value.as_str())
    }
}

/// Reference to a document created by the legacy mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedDocument {
    pub document_id: String,
}

impl CreatedDocument {
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
        }
    }

    /// Placeholder reference for a subscriber that already existed
    pub fn already_subscribed() -> Self {
        Self::new(ALREADY_SUBSCRIBED_ID)
    }
}

/// Trait for document store implementations
///
/// # Contract
///
/// - Each method issues exactly one remote call
/// - No retry logic (a failed submission is resubmitted by the user)
/// - No caching between calls
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Find documents matching the query
    ///
    /// # Returns
    ///
    /// - `Ok(DocumentList)`: Matching documents (empty when none exist)
    /// - `Err(Error)`: If the query failed
    async fn search_documents(&self, query: &DocumentQuery) -> Result<DocumentList, crate::Error>;

    /// Create a document
    ///
    /// # Returns
    ///
    /// - `Ok(CreatedDocument)`: The created document's id
    /// - `Err(Error)`: If the mutation failed
    async fn create_document(
        &self,
        request: &CreateDocumentRequest,
    ) -> Result<CreatedDocument, crate::Error>;

    /// Get the backend name (for logging/debugging)
    fn backend_name(&self) -> &'static str;
}
