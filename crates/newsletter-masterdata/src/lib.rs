// # Master Data Backend
//
// Hosted document store and native subscription endpoint for the
// newsletter form.
//
// ## Behavior
//
// - One HTTP request per trait call
// - HTTP timeout of 30 seconds
// - Status codes mapped to specific errors (401/403, 404, 429, 5xx)
// - GraphQL `errors` arrays are reported as errors even on a 200 response
// - No retries, no caching, no background tasks
//
// ## Security
//
// - The app token never appears in logs or `Debug` output
// - Credentials are optional; storefront-scoped endpoints accept
//   anonymous writes on public schemas
//
// ## API Reference
//
// - GraphQL: POST `{graphql_url}` with `{query, variables}`
//   - `documents` (dedup query)
//   - `createDocument` (legacy create-mutation)
//   - `subscribeNewsletter` (native write)
// - Schema registration: PUT `{base_url}/api/dataentities/{acronym}/schemas/{schema}`

pub mod graphql;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use newsletter_core::config::BackendConfig;
use newsletter_core::registry::{BackendFactory, Backends};
use newsletter_core::traits::{
    CreateDocumentRequest, CreatedDocument, DocumentList, DocumentQuery, DocumentStore,
    NativeSubscription, NativeWriteReceipt, NativeWriter, SchemaDefinition, SchemaRegistrar,
};
use newsletter_core::{BackendRegistry, Error, Result};
use reqwest::StatusCode;
use serde_json::Value;

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Header carrying the app key
const APP_KEY_HEADER: &str = "X-VTEX-API-AppKey";

/// Header carrying the app token
const AUTH_COOKIE_HEADER: &str = "VtexIdclientAutCookie";

/// Optional app credentials
#[derive(Clone)]
pub struct Credentials {
    pub app_key: String,
    /// ⚠️ NEVER log this value
    pub app_token: String,
}

/// Master data client
///
/// Implements [`DocumentStore`], [`NativeWriter`] and [`SchemaRegistrar`]
/// against one account.
pub struct MasterDataClient {
    /// Account base URL (no trailing slash)
    base_url: String,

    /// GraphQL endpoint
    graphql_url: String,

    credentials: Option<Credentials>,

    client: reqwest::Client,
}

// Custom Debug implementation that hides the credentials
impl std::fmt::Debug for MasterDataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterDataClient")
            .field("base_url", &self.base_url)
            .field("graphql_url", &self.graphql_url)
            .field("credentials", &self.credentials.as_ref().map(|_| "<REDACTED>"))
            .finish()
    }
}

impl MasterDataClient {
    /// Create a new client
    ///
    /// # Parameters
    ///
    /// - `base_url`: Account base URL, used for schema registration
    /// - `graphql_url`: GraphQL endpoint for queries and mutations
    /// - `credentials`: Optional app key and token
    pub fn new(
        base_url: impl Into<String>,
        graphql_url: impl Into<String>,
        credentials: Option<Credentials>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        if credentials
            .as_ref()
            .is_some_and(|c| c.app_key.is_empty() || c.app_token.is_empty())
        {
            return Err(Error::config("Master data app key and token cannot be empty"));
        }

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            graphql_url: graphql_url.into(),
            credentials,
            client,
        })
    }

    /// URL of the schema registration endpoint
    pub fn schema_url(&self, acronym: &str, schema: &str) -> String {
        format!(
            "{}/api/dataentities/{}/schemas/{}",
            self.base_url, acronym, schema
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credentials {
            Some(credentials) => request
                .header(APP_KEY_HEADER, &credentials.app_key)
                .header(AUTH_COOKIE_HEADER, &credentials.app_token),
            None => request,
        }
    }

    /// POST a GraphQL body and return the parsed JSON response
    ///
    /// GraphQL-level errors are left for the caller's decoder.
    async fn execute(&self, operation: &str, body: &Value) -> Result<Value> {
        tracing::debug!("Executing GraphQL operation: {}", operation);

        let response = self
            .authorize(self.client.post(&self.graphql_url))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| Error::http(format!("{} request failed: {}", operation, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(status_error(operation, status, &error_text));
        }

        response
            .json()
            .await
            .map_err(|e| Error::http(format!("Failed to parse {} response: {}", operation, e)))
    }
}

/// Map a non-success HTTP status to an error
fn status_error(operation: &str, status: StatusCode, body: &str) -> Error {
    match status.as_u16() {
        401 | 403 => Error::http(format!(
            "{}: authentication failed, check the app key and token. Status: {}",
            operation, status
        )),
        404 => Error::http(format!(
            "{}: endpoint or data entity not found. Status: {}",
            operation, status
        )),
        429 => Error::http(format!(
            "{}: rate limit exceeded. Status: {}",
            operation, status
        )),
        500..=599 => Error::http(format!(
            "{}: server error (transient): {} - {}",
            operation, status, body
        )),
        _ => Error::http(format!("{} failed: {} - {}", operation, status, body)),
    }
}

#[async_trait]
impl DocumentStore for MasterDataClient {
    async fn search_documents(&self, query: &DocumentQuery) -> Result<DocumentList> {
        let body = self
            .execute("documents", &graphql::documents_request(query))
            .await?;
        let documents = graphql::decode_documents(body)?;

        tracing::debug!(
            "Found {} document(s) in {} matching {}",
            documents.len(),
            query.acronym,
            query.filter
        );
        Ok(documents)
    }

    async fn create_document(&self, request: &CreateDocumentRequest) -> Result<CreatedDocument> {
        let body = self
            .execute("createDocument", &graphql::create_document_request(request))
            .await?;
        let created = graphql::decode_created_document(body)?;

        tracing::info!("Created document {} in {}", created.document_id, request.acronym);
        Ok(created)
    }

    fn backend_name(&self) -> &'static str {
        "master_data"
    }
}

#[async_trait]
impl NativeWriter for MasterDataClient {
    async fn subscribe(&self, subscription: &NativeSubscription) -> Result<NativeWriteReceipt> {
        let body = self
            .execute(
                "subscribeNewsletter",
                &graphql::subscribe_newsletter_request(subscription),
            )
            .await?;
        let success = graphql::decode_subscribe_newsletter(body)?;

        Ok(NativeWriteReceipt { success })
    }

    fn writer_name(&self) -> &'static str {
        "master_data"
    }
}

#[async_trait]
impl SchemaRegistrar for MasterDataClient {
    /// Register (or replace) a data entity schema
    ///
    /// ```http
    /// PUT /api/dataentities/:acronym/schemas/:schema
    /// { "properties": { ... }, "v-indexed": [...], "v-security": { ... } }
    /// ```
    async fn register_schema(&self, definition: &SchemaDefinition) -> Result<()> {
        let url = self.schema_url(&definition.acronym, &definition.schema);
        tracing::info!(
            "Registering schema {} for data entity {}",
            definition.schema,
            definition.acronym
        );

        let response = self
            .authorize(self.client.put(&url))
            .header("Content-Type", "application/json")
            .json(&definition.body)
            .send()
            .await
            .map_err(|e| Error::http(format!("Schema registration request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(status_error("schema registration", status, &error_text));
        }

        tracing::info!("Schema {} registered", definition.schema);
        Ok(())
    }
}

/// Factory for master data backends
pub struct MasterDataFactory;

impl BackendFactory for MasterDataFactory {
    fn create(&self, config: &BackendConfig) -> Result<Backends> {
        match config {
            BackendConfig::MasterData {
                base_url,
                graphql_url,
                app_key,
                app_token,
            } => {
                let credentials = match (app_key, app_token) {
                    (Some(app_key), Some(app_token)) => Some(Credentials {
                        app_key: app_key.clone(),
                        app_token: app_token.clone(),
                    }),
                    (None, None) => None,
                    _ => {
                        return Err(Error::config(
                            "App key and app token must be configured together",
                        ));
                    }
                };

                let client = Arc::new(MasterDataClient::new(
                    base_url.clone(),
                    graphql_url.clone(),
                    credentials,
                )?);

                Ok(Backends {
                    documents: client.clone(),
                    native: client.clone(),
                    schemas: Some(client),
                })
            }
            _ => Err(Error::config("Invalid config for master data backend")),
        }
    }
}

/// Register the master data backend with a registry
///
/// # Example
///
/// ```rust
/// use newsletter_core::BackendRegistry;
///
/// let registry = BackendRegistry::with_defaults();
/// newsletter_masterdata::register(&registry);
/// assert!(registry.has_backend("master_data"));
/// ```
pub fn register(registry: &BackendRegistry) {
    registry.register("master_data", Box::new(MasterDataFactory));
}
