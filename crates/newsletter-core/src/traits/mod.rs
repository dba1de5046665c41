//! Core traits for the newsletter client
//!
//! This module defines the abstract interfaces to the remote collaborators.
//!
//! - [`DocumentStore`]: Dedup query and legacy create-mutation
//! - [`NativeWriter`]: Platform-integrated subscription write
//! - [`AnalyticsSink`]: Fire-and-forget tracking events
//! - [`SchemaRegistrar`]: One-time schema registration

pub mod analytics_sink;
pub mod document_store;
pub mod native_writer;
pub mod schema_registrar;

pub use analytics_sink::{AnalyticsEvent, AnalyticsSink, SubscriptionData};
pub use document_store::{
    ALREADY_SUBSCRIBED_ID, CreateDocumentRequest, CreatedDocument, DocumentField, DocumentInput,
    DocumentList, DocumentQuery, DocumentStore, SubscriberDocument,
};
pub use native_writer::{NativeSubscription, NativeWriteReceipt, NativeWriter};
pub use schema_registrar::{SchemaDefinition, SchemaRegistrar};
