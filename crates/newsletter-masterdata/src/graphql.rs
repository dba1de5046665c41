//! GraphQL documents and response codecs
//!
//! Everything here is pure: request bodies are built as JSON values and
//! responses are decoded from JSON values, so the wire contract can be
//! tested without a server.

use newsletter_core::traits::{
    CreateDocumentRequest, CreatedDocument, DocumentField, DocumentList, DocumentQuery,
    NativeSubscription, SubscriberDocument,
};
use newsletter_core::{Error, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

/// Dedup query
pub const DOCUMENTS_QUERY: &str = "\
query documents($acronym: String, $schema: String, $fields: [String], $where: String) {
  documents(acronym: $acronym, schema: $schema, fields: $fields, where: $where) {
    fields { key value }
  }
}";

/// Legacy create-mutation
pub const CREATE_DOCUMENT_MUTATION: &str = "\
mutation createDocument($acronym: String, $schema: String, $document: DocumentInput) {
  createDocument(acronym: $acronym, schema: $schema, document: $document) {
    cacheId
    documentId
  }
}";

/// Native write
pub const SUBSCRIBE_NEWSLETTER_MUTATION: &str = "\
mutation subscribeNewsletter($email: String!, $fields: NewsletterFieldsInput) {
  subscribeNewsletter(email: $email, fields: $fields)
}";

/// Standard GraphQL response envelope
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct DocumentsData {
    documents: Vec<RawDocument>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    fields: Vec<DocumentField>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateDocumentData {
    create_document: Option<RawCreatedDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCreatedDocument {
    cache_id: Option<String>,
    document_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscribeNewsletterData {
    subscribe_newsletter: Option<bool>,
}

/// `{query, variables}` body for the dedup query
pub fn documents_request(query: &DocumentQuery) -> Value {
    json!({
        "query": DOCUMENTS_QUERY,
        "variables": {
            "acronym": query.acronym,
            "schema": query.schema,
            "fields": query.fields,
            "where": query.filter,
        }
    })
}

/// `{query, variables}` body for the legacy create-mutation
pub fn create_document_request(request: &CreateDocumentRequest) -> Value {
    json!({
        "query": CREATE_DOCUMENT_MUTATION,
        "variables": {
            "acronym": request.acronym,
            "schema": request.schema,
            "document": { "fields": request.document.fields },
        }
    })
}

/// `{query, variables}` body for the native write
pub fn subscribe_newsletter_request(subscription: &NativeSubscription) -> Value {
    json!({
        "query": SUBSCRIBE_NEWSLETTER_MUTATION,
        "variables": {
            "email": subscription.email,
            "fields": subscription.fields,
        }
    })
}

/// Unwrap the envelope, turning a non-empty `errors` array into an error
fn decode<T: DeserializeOwned>(body: Value, operation: &str) -> Result<T> {
    let envelope: Envelope<T> = serde_json::from_value(body)?;

    if !envelope.errors.is_empty() {
        let messages: Vec<&str> = envelope
            .errors
            .iter()
            .map(|error| error.message.as_str())
            .collect();
        return Err(Error::graphql(format!("{}: {}", operation, messages.join("; "))));
    }

    envelope
        .data
        .ok_or_else(|| Error::graphql(format!("{}: response has no data", operation)))
}

/// Decode the dedup query response, projecting each document to its email
pub fn decode_documents(body: Value) -> Result<DocumentList> {
    let data: DocumentsData = decode(body, "documents")?;

    let documents = data
        .documents
        .into_iter()
        .map(|document| SubscriberDocument {
            email: document
                .fields
                .into_iter()
                .find(|field| field.key == "email")
                .map(|field| field.value)
                .unwrap_or_default(),
        })
        .collect();

    Ok(DocumentList::new(documents))
}

/// Decode the create-mutation response
///
/// The document id is preferred; the cache id is used when the backend
/// only returns that.
pub fn decode_created_document(body: Value) -> Result<CreatedDocument> {
    let data: CreateDocumentData = decode(body, "createDocument")?;

    data.create_document
        .and_then(|created| created.document_id.or(created.cache_id))
        .filter(|id| !id.is_empty())
        .map(CreatedDocument::new)
        .ok_or_else(|| Error::graphql("createDocument: response has no document id"))
}

/// Decode the native write response; `false` is a failure
pub fn decode_subscribe_newsletter(body: Value) -> Result<bool> {
    let data: SubscribeNewsletterData = decode(body, "subscribeNewsletter")?;

    match data.subscribe_newsletter {
        Some(true) => Ok(true),
        Some(false) => Err(Error::remote_write("platform rejected the subscription")),
        None => Err(Error::graphql("subscribeNewsletter: response has no result")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsletter_core::traits::DocumentInput;
    use serde_json::Map;

    #[test]
    fn documents_request_carries_filter() {
        let query = DocumentQuery::by_email("NL", "newsletter-subscribers-v1", "a@b.com");
        let body = documents_request(&query);

        assert_eq!(body["variables"]["acronym"], "NL");
        assert_eq!(body["variables"]["schema"], "newsletter-subscribers-v1");
        assert_eq!(body["variables"]["fields"], json!(["email"]));
        assert_eq!(body["variables"]["where"], "email=a@b.com");
        assert!(body["query"].as_str().unwrap().starts_with("query documents"));
    }

    #[test]
    fn create_request_keeps_field_order() {
        let request = CreateDocumentRequest {
            acronym: "NL".to_string(),
            schema: "v1".to_string(),
            document: DocumentInput {
                fields: vec![
                    DocumentField::new("email", "a@b.com"),
                    DocumentField::new("name", "Ada"),
                ],
            },
        };
        let body = create_document_request(&request);

        assert_eq!(
            body["variables"]["document"]["fields"],
            json!([
                { "key": "email", "value": "a@b.com" },
                { "key": "name", "value": "Ada" }
            ])
        );
    }

    #[test]
    fn subscribe_request_spreads_fields() {
        let mut fields = Map::new();
        fields.insert("city".to_string(), json!("Lisbon"));
        let body = subscribe_newsletter_request(&NativeSubscription {
            email: "a@b.com".to_string(),
            fields,
        });

        assert_eq!(body["variables"]["email"], "a@b.com");
        assert_eq!(body["variables"]["fields"]["city"], "Lisbon");
    }

    #[test]
    fn decodes_existing_subscriber() {
        let body = json!({
            "data": {
                "documents": [
                    { "fields": [{ "key": "email", "value": "a@b.com" }] }
                ]
            }
        });

        let list = decode_documents(body).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list.documents[0].email, "a@b.com");
    }

    #[test]
    fn decodes_empty_document_list() {
        let list = decode_documents(json!({ "data": { "documents": [] } })).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn graphql_errors_fail_the_operation() {
        let body = json!({
            "data": null,
            "errors": [{ "message": "schema not found" }, { "message": "bad acronym" }]
        });

        let err = decode_documents(body).unwrap_err();
        assert!(matches!(err, Error::GraphQl(ref msg) if msg.contains("schema not found; bad acronym")));
    }

    #[test]
    fn created_document_prefers_document_id() {
        let body = json!({
            "data": { "createDocument": { "cacheId": "cache-1", "documentId": "doc-1" } }
        });
        assert_eq!(decode_created_document(body).unwrap(), CreatedDocument::new("doc-1"));

        let body = json!({
            "data": { "createDocument": { "cacheId": "cache-1", "documentId": null } }
        });
        assert_eq!(decode_created_document(body).unwrap(), CreatedDocument::new("cache-1"));
    }

    #[test]
    fn created_document_without_id_is_an_error() {
        let body = json!({ "data": { "createDocument": null } });
        assert!(decode_created_document(body).is_err());
    }

    #[test]
    fn subscribe_false_is_a_failure() {
        let ok = json!({ "data": { "subscribeNewsletter": true } });
        assert!(decode_subscribe_newsletter(ok).unwrap());

        let rejected = json!({ "data": { "subscribeNewsletter": false } });
        assert!(matches!(
            decode_subscribe_newsletter(rejected),
            Err(Error::RemoteWrite(_))
        ));
    }
}
