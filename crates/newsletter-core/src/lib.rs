// # newsletter-core
//
// Core library for the newsletter subscription form.
//
// ## Architecture Overview
//
// This library provides the client-side control flow of a newsletter form:
// - **Validators**: Pure syntactic checks for email, name and phone
// - **FormStore**: Per-form state record, mutated only through dispatched actions
// - **SubmissionOrchestrator**: Validation → analytics → native write + dedup-gated legacy write
// - **render**: Selects the Loading / Error / Success / Form view from the current state
// - **Backends**: Traits for the remote document store, the native writer and the analytics sink
//
// ## Design Principles
//
// 1. **Explicit injection**: Every form owns one `FormStore`, handed to children by reference
// 2. **Closed actions**: All state changes flow through `FormAction` and a single reducer
// 3. **Best-effort is a type**: Fire-and-forget failures are observable but never propagate
// 4. **Lifetime-guarded dispatch**: Results arriving after unmount are dropped

pub mod backend;
pub mod best_effort;
pub mod config;
pub mod error;
pub mod form;
pub mod registry;
pub mod render;
pub mod submission;
pub mod traits;
pub mod validation;

// Re-export core types for convenience
pub use backend::{MemoryDocumentStore, MemoryNativeWriter, TracingAnalyticsSink};
pub use best_effort::BestEffortOutcome;
pub use config::{BackendConfig, FormConfig, NewsletterConfig, StorageConfig};
pub use error::{Error, Result};
pub use form::{AsyncResult, FormAction, FormState, FormStore};
pub use registry::{Backends, BackendRegistry};
pub use render::{Locale, View, ViewOverrides};
pub use submission::{SubmissionEvent, SubmissionOrchestrator, SubmitOutcome};
pub use traits::{AnalyticsSink, DocumentStore, NativeWriter, SchemaRegistrar};
pub use validation::{validate_email, validate_phone_number, validate_user_name};
