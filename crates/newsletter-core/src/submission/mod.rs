//! Submission orchestrator
//!
//! The SubmissionOrchestrator is responsible for:
//! - Validating the form's fields and flagging invalid ones
//! - Emitting the `newsletterSubscription` analytics event
//! - Issuing the native write as a best-effort operation
//! - Guarding the legacy create-mutation with a dedup query
//! - Reducing remote results into the form's store
//!
//! ## Architecture
//!
//! ```text
//!                       ┌──────────────┐
//!       submit ────────▶│ Orchestrator │
//!                       └──────────────┘
//!                              │ valid?
//!        ┌─────────────────────┼──────────────────────┐
//!        │                     │                      │
//!        ▼                     ▼                      ▼
//! ┌─────────────┐      ┌──────────────┐       ┌───────────────┐
//! │ Analytics   │      │ NativeWriter │       │ DocumentStore │
//! │ (emit)      │      │ (best-effort)│       │ query → create│
//! └─────────────┘      └──────────────┘       └───────────────┘
//!                                                     │
//!                                                     ▼
//!                                              ┌─────────────┐
//!                                              │  FormStore  │
//!                                              └─────────────┘
//! ```
//!
//! ## Flow
//!
//! 1. Validate email/name/phone, dispatch all three invalid flags
//! 2. Abort if any field is invalid (no analytics, no network)
//! 3. Emit analytics
//! 4. Native write and the dedup → legacy path run concurrently
//! 5. Dedup finds a subscriber → legacy succeeds with a placeholder id;
//!    otherwise the create-mutation's result becomes the legacy status
//!
//! Nothing is retried. The native outcome never touches the form state.
//!
//! Every submit opens a new attempt on the form. Remote results are
//! dispatched only while their attempt is still the latest and the form is
//! still mounted; anything else is dropped with `StaleResultDropped`.

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::best_effort::{BestEffortOutcome, best_effort};
use crate::config::{NewsletterConfig, StorageConfig};
use crate::error::{Error, Field, Result};
use crate::form::{AsyncResult, FormAction, FormState, FormStore, RemoteFailure};
use crate::registry::Backends;
use crate::traits::{
    AnalyticsEvent, AnalyticsSink, CreateDocumentRequest, CreatedDocument, DocumentField,
    DocumentInput, DocumentQuery, DocumentStore, NativeSubscription, NativeWriteReceipt,
    NativeWriter, SubscriptionData,
};
use crate::validation::{validate_email, validate_phone_number, validate_user_name};

/// Events emitted by the SubmissionOrchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionEvent {
    /// A valid submission started
    Started { email: String },

    /// The submission was rejected by validation
    Rejected { fields: Vec<Field> },

    /// The native write completed
    NativeWriteCompleted { email: String },

    /// The native write failed and was discarded
    NativeWriteDiscarded { email: String, error: String },

    /// The dedup query found an existing subscriber
    AlreadySubscribed { email: String },

    /// The legacy create-mutation created a document
    DocumentCreated { email: String, document_id: String },

    /// The dedup query or the create-mutation failed
    LegacyFailed { email: String, error: String },

    /// A remote result arrived after the form unmounted or was resubmitted
    StaleResultDropped { email: String, action: &'static str },
}

/// Final state of the legacy path for one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegacyOutcome {
    /// No subscriber existed; a document was created
    Created(CreatedDocument),
    /// A subscriber with this email already existed
    AlreadySubscribed,
    /// The dedup query or the create-mutation failed
    Failed(RemoteFailure),
    /// The form unmounted before the path finished
    Abandoned,
    /// A newer submit on the same form started before the path finished
    Superseded,
}

/// Result of a submit gesture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was sent
    Rejected { fields: Vec<Field> },
    /// Both write paths ran
    Submitted {
        legacy: LegacyOutcome,
        native: BestEffortOutcome<NativeWriteReceipt>,
    },
}

impl SubmitOutcome {
    /// Turn a rejection into `Error::Validation`
    ///
    /// Returns the legacy outcome for submissions that reached the network.
    pub fn into_result(self) -> Result<LegacyOutcome> {
        match self {
            SubmitOutcome::Rejected { fields } => Err(Error::Validation { fields }),
            SubmitOutcome::Submitted { legacy, .. } => Ok(legacy),
        }
    }
}

/// Coordinates validation, analytics and the two write paths
///
/// One orchestrator can serve any number of forms; all per-form state lives
/// in the [`FormStore`] passed to [`submit`](Self::submit).
pub struct SubmissionOrchestrator {
    /// Dedup query and legacy create-mutation
    documents: Arc<dyn DocumentStore>,

    /// Native write path
    native: Arc<dyn NativeWriter>,

    /// Tracking events
    analytics: Arc<dyn AnalyticsSink>,

    /// Data entity and schema for legacy documents
    storage: StorageConfig,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<SubmissionEvent>,
}

impl SubmissionOrchestrator {
    /// Create a new orchestrator
    ///
    /// # Returns
    ///
    /// A tuple of (orchestrator, event_receiver) where event_receiver yields
    /// submission events
    pub fn new(
        backends: Backends,
        analytics: Arc<dyn AnalyticsSink>,
        config: &NewsletterConfig,
    ) -> Result<(Self, mpsc::Receiver<SubmissionEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.engine.event_channel_capacity);

        let orchestrator = Self {
            documents: backends.documents,
            native: backends.native,
            analytics,
            storage: config.storage.clone(),
            event_tx: tx,
        };

        Ok((orchestrator, rx))
    }

    /// Handle a submit gesture for `form`
    ///
    /// # Returns
    ///
    /// - `Ok(SubmitOutcome)`: What happened on each path
    /// - `Err(Error::MissingFormProvider)`: The form was not mounted
    pub async fn submit(&self, form: &FormStore) -> Result<SubmitOutcome> {
        let state = form.snapshot();

        let invalid = invalid_fields(&state);
        form.dispatch(FormAction::SetInvalidEmail(invalid.contains(&Field::Email)))?;
        form.dispatch(FormAction::SetInvalidName(invalid.contains(&Field::Name)))?;
        form.dispatch(FormAction::SetInvalidPhone(invalid.contains(&Field::Phone)))?;

        if !invalid.is_empty() {
            debug!("Submission rejected, invalid fields: {:?}", invalid);
            self.emit_event(SubmissionEvent::Rejected {
                fields: invalid.clone(),
            });
            return Ok(SubmitOutcome::Rejected { fields: invalid });
        }

        info!("Submitting newsletter subscription for {}", state.email);
        self.emit_event(SubmissionEvent::Started {
            email: state.email.clone(),
        });

        self.analytics.emit(AnalyticsEvent::newsletter_subscription(
            form.config().event_id.clone(),
            SubscriptionData {
                name: state.name.clone(),
                email: state.email.clone(),
                phone: state.phone.clone(),
            },
        ));

        let attempt = Attempt {
            number: form.begin_attempt()?,
            lifetime: form.lifetime(),
        };
        let subscription = native_subscription(&state, form);

        let (native, legacy) = tokio::join!(
            self.native_write(&subscription),
            self.legacy_write(&state, form, &attempt),
        );

        Ok(SubmitOutcome::Submitted { legacy, native })
    }

    /// Issue the native write; failures are logged and discarded
    async fn native_write(
        &self,
        subscription: &NativeSubscription,
    ) -> BestEffortOutcome<NativeWriteReceipt> {
        let label = format!("native write ({})", self.native.writer_name());
        let outcome = best_effort(&label, self.native.subscribe(subscription)).await;

        match &outcome {
            BestEffortOutcome::Completed(_) => {
                self.emit_event(SubmissionEvent::NativeWriteCompleted {
                    email: subscription.email.clone(),
                });
            }
            BestEffortOutcome::Discarded { error } => {
                self.emit_event(SubmissionEvent::NativeWriteDiscarded {
                    email: subscription.email.clone(),
                    error: error.clone(),
                });
            }
        }

        outcome
    }

    /// Dedup query, then the create-mutation if no subscriber exists
    async fn legacy_write(
        &self,
        state: &FormState,
        form: &FormStore,
        attempt: &Attempt,
    ) -> LegacyOutcome {
        let email = state.email.as_str();
        let query = DocumentQuery::by_email(&self.storage.acronym, &self.storage.schema, email);

        let documents = match self.documents.search_documents(&query).await {
            Ok(documents) => documents,
            Err(e) => {
                let error = Error::remote_query(e.to_string());
                let failure = RemoteFailure::from(&error);
                if let Some(dropped) = self.deliver(
                    form,
                    attempt,
                    email,
                    FormAction::SetDedupQuery(AsyncResult::Failed(failure.clone())),
                ) {
                    return dropped;
                }
                return self.fail_legacy(form, attempt, email, failure);
            }
        };

        let already_subscribed = !documents.is_empty();
        if let Some(dropped) = self.deliver(
            form,
            attempt,
            email,
            FormAction::SetDedupQuery(AsyncResult::Succeeded(documents)),
        ) {
            return dropped;
        }

        if already_subscribed {
            debug!("{} is already subscribed, skipping document creation", email);
            if let Some(dropped) = self.deliver(
                form,
                attempt,
                email,
                FormAction::SetLegacySubmission(AsyncResult::Succeeded(
                    CreatedDocument::already_subscribed(),
                )),
            ) {
                return dropped;
            }
            self.emit_event(SubmissionEvent::AlreadySubscribed {
                email: email.to_string(),
            });
            return LegacyOutcome::AlreadySubscribed;
        }

        let request = self.create_request(state);
        match self.documents.create_document(&request).await {
            Ok(created) => {
                if let Some(dropped) = self.deliver(
                    form,
                    attempt,
                    email,
                    FormAction::SetLegacySubmission(AsyncResult::Succeeded(created.clone())),
                ) {
                    return dropped;
                }
                info!("Created subscriber document {} for {}", created.document_id, email);
                self.emit_event(SubmissionEvent::DocumentCreated {
                    email: email.to_string(),
                    document_id: created.document_id.clone(),
                });
                LegacyOutcome::Created(created)
            }
            Err(e) => {
                let error = Error::remote_mutation(e.to_string());
                self.fail_legacy(form, attempt, email, RemoteFailure::from(&error))
            }
        }
    }

    fn fail_legacy(
        &self,
        form: &FormStore,
        attempt: &Attempt,
        email: &str,
        failure: RemoteFailure,
    ) -> LegacyOutcome {
        if let Some(dropped) = self.deliver(
            form,
            attempt,
            email,
            FormAction::SetLegacySubmission(AsyncResult::Failed(failure.clone())),
        ) {
            return dropped;
        }
        warn!("Legacy submission failed for {}: {}", email, failure.message);
        self.emit_event(SubmissionEvent::LegacyFailed {
            email: email.to_string(),
            error: failure.message.clone(),
        });
        LegacyOutcome::Failed(failure)
    }

    /// Build the legacy create-mutation payload
    fn create_request(&self, state: &FormState) -> CreateDocumentRequest {
        let mut fields = vec![DocumentField::new("email", state.email.as_str())];
        if let Some(name) = &state.name {
            fields.push(DocumentField::new("name", name.as_str()));
        }
        if let Some(phone) = &state.phone {
            fields.push(DocumentField::new("phone", phone.as_str()));
        }
        if let Some(custom_fields) = state.custom_fields_json() {
            fields.push(DocumentField::new("customFields", custom_fields));
        }

        CreateDocumentRequest {
            acronym: self.storage.acronym.clone(),
            schema: self.storage.schema.clone(),
            document: DocumentInput { fields },
        }
    }

    /// Dispatch a remote result for `attempt`
    ///
    /// Returns the outcome to report when the result was dropped because
    /// the form unmounted or a newer attempt started.
    fn deliver(
        &self,
        form: &FormStore,
        attempt: &Attempt,
        email: &str,
        action: FormAction,
    ) -> Option<LegacyOutcome> {
        let kind = action.kind();
        let dropped = if attempt.lifetime.is_cancelled() {
            LegacyOutcome::Abandoned
        } else {
            match form.dispatch_for_attempt(attempt.number, action) {
                Ok(true) => return None,
                Ok(false) => LegacyOutcome::Superseded,
                Err(_) => LegacyOutcome::Abandoned,
            }
        };

        match dropped {
            LegacyOutcome::Superseded => debug!(
                "Attempt {} superseded, dropping {} for {}",
                attempt.number, kind, email
            ),
            _ => debug!("Form unmounted, dropping {} for {}", kind, email),
        }
        self.emit_event(SubmissionEvent::StaleResultDropped {
            email: email.to_string(),
            action: kind,
        });
        Some(dropped)
    }

    /// Emit a submission event
    fn emit_event(&self, event: SubmissionEvent) {
        if self.event_tx.try_send(event).is_err() {
            warn!("Submission event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}

/// One submit's claim on a form
struct Attempt {
    number: u64,
    lifetime: CancellationToken,
}

/// Fields that fail validation; absent name/phone fields are valid
fn invalid_fields(state: &FormState) -> Vec<Field> {
    let mut invalid = Vec::new();
    if !validate_email(&state.email) {
        invalid.push(Field::Email);
    }
    if !state.name.as_deref().is_none_or(validate_user_name) {
        invalid.push(Field::Name);
    }
    if !state.phone.as_deref().is_none_or(validate_phone_number) {
        invalid.push(Field::Phone);
    }
    invalid
}

/// Build the native write payload
fn native_subscription(state: &FormState, form: &FormStore) -> NativeSubscription {
    let config = form.config();
    let mut fields = Map::new();

    let optional = [
        ("name", state.name.as_ref()),
        ("phone", state.phone.as_ref()),
        ("bindingUrl", config.binding_url.as_ref()),
        ("bindingId", config.binding_id.as_ref()),
    ];
    for (key, value) in optional
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| (key, value)))
    {
        fields.insert(key.to_string(), Value::from(value.as_str()));
    }

    for field in state.custom_fields.iter().flatten() {
        fields.insert(field.name.clone(), Value::from(field.value.as_str()));
    }

    NativeSubscription {
        email: state.email.clone(),
        fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormConfig;
    use crate::form::CustomField;

    #[test]
    fn absent_fields_are_valid() {
        let state = FormState {
            email: "ada@example.com".to_string(),
            ..FormState::default()
        };
        assert!(invalid_fields(&state).is_empty());
    }

    #[test]
    fn present_blank_fields_are_invalid() {
        let state = FormState {
            email: "nope".to_string(),
            name: Some(" ".to_string()),
            phone: Some(String::new()),
            ..FormState::default()
        };
        assert_eq!(
            invalid_fields(&state),
            vec![Field::Email, Field::Name, Field::Phone]
        );
    }

    #[test]
    fn rejection_becomes_validation_error() {
        let rejected = SubmitOutcome::Rejected {
            fields: vec![Field::Email],
        };
        assert!(matches!(
            rejected.into_result(),
            Err(Error::Validation { fields }) if fields == vec![Field::Email]
        ));

        let submitted = SubmitOutcome::Submitted {
            legacy: LegacyOutcome::AlreadySubscribed,
            native: BestEffortOutcome::Discarded {
                error: "down".to_string(),
            },
        };
        assert_eq!(submitted.into_result().unwrap(), LegacyOutcome::AlreadySubscribed);
    }

    #[test]
    fn native_payload_spreads_custom_fields() {
        let form = FormStore::mount(
            FormConfig::new()
                .with_name_field(true)
                .with_binding("https://shop.example.com", "binding-1"),
        );
        let state = FormState {
            email: "ada@example.com".to_string(),
            name: Some("Ada".to_string()),
            custom_fields: Some(vec![CustomField::new("city", "Lisbon")]),
            ..FormState::default()
        };

        let subscription = native_subscription(&state, &form);

        assert_eq!(subscription.email, "ada@example.com");
        assert_eq!(subscription.field("name"), Some("Ada"));
        assert_eq!(subscription.field("phone"), None);
        assert_eq!(subscription.field("bindingUrl"), Some("https://shop.example.com"));
        assert_eq!(subscription.field("bindingId"), Some("binding-1"));
        assert_eq!(subscription.field("city"), Some("Lisbon"));
    }
}
