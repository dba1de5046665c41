//! Test doubles and common utilities for submission contract tests
//!
//! These doubles count calls and record payloads so tests can assert on
//! exactly which remote operations a submission issued.

#![allow(dead_code)]

use newsletter_core::error::Result;
use newsletter_core::traits::{
    AnalyticsEvent, AnalyticsSink, CreateDocumentRequest, CreatedDocument, DocumentList,
    DocumentQuery, DocumentStore, NativeSubscription, NativeWriteReceipt, NativeWriter,
    SubscriberDocument,
};
use newsletter_core::{Backends, Error, FormConfig, FormStore, NewsletterConfig};
use newsletter_core::{SubmissionEvent, SubmissionOrchestrator};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, mpsc};

/// How a scripted operation should resolve
#[derive(Debug, Clone)]
pub enum Script<T> {
    Succeed(T),
    Fail(String),
}

/// A DocumentStore with scripted responses that records every call
pub struct ScriptedDocumentStore {
    search_call_count: Arc<AtomicUsize>,
    create_call_count: Arc<AtomicUsize>,
    queries: Arc<Mutex<Vec<DocumentQuery>>>,
    creates: Arc<Mutex<Vec<CreateDocumentRequest>>>,
    search_script: Arc<Mutex<Script<DocumentList>>>,
    create_script: Arc<Mutex<Script<CreatedDocument>>>,
    /// When set, `search_documents` waits for this before answering
    search_gate: Option<Arc<Notify>>,
    /// Only the first `search_documents` call waits on the gate
    gate_first_only: bool,
}

impl ScriptedDocumentStore {
    /// No existing subscribers; creation succeeds with `doc-1`
    pub fn new() -> Self {
        Self {
            search_call_count: Arc::new(AtomicUsize::new(0)),
            create_call_count: Arc::new(AtomicUsize::new(0)),
            queries: Arc::new(Mutex::new(Vec::new())),
            creates: Arc::new(Mutex::new(Vec::new())),
            search_script: Arc::new(Mutex::new(Script::Succeed(DocumentList::default()))),
            create_script: Arc::new(Mutex::new(Script::Succeed(CreatedDocument::new("doc-1")))),
            search_gate: None,
            gate_first_only: false,
        }
    }

    /// The dedup query finds `emails`
    pub fn with_existing(self, emails: &[&str]) -> Self {
        let documents = emails
            .iter()
            .map(|email| SubscriberDocument {
                email: email.to_string(),
            })
            .collect();
        *self.search_script.lock().unwrap() = Script::Succeed(DocumentList::new(documents));
        self
    }

    /// The dedup query fails
    pub fn with_failing_search(self, message: &str) -> Self {
        *self.search_script.lock().unwrap() = Script::Fail(message.to_string());
        self
    }

    /// The create-mutation fails
    pub fn with_failing_create(self, message: &str) -> Self {
        *self.create_script.lock().unwrap() = Script::Fail(message.to_string());
        self
    }

    /// The dedup query blocks until `gate` is notified
    pub fn with_search_gate(mut self, gate: Arc<Notify>) -> Self {
        self.search_gate = Some(gate);
        self
    }

    /// Only the first dedup query blocks until `gate` is notified
    pub fn with_first_search_gate(mut self, gate: Arc<Notify>) -> Self {
        self.search_gate = Some(gate);
        self.gate_first_only = true;
        self
    }

    /// Make every dedup query answered from now on fail
    pub fn fail_searches(&self, message: &str) {
        *self.search_script.lock().unwrap() = Script::Fail(message.to_string());
    }

    pub fn search_call_count(&self) -> usize {
        self.search_call_count.load(Ordering::SeqCst)
    }

    pub fn create_call_count(&self) -> usize {
        self.create_call_count.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<DocumentQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn creates(&self) -> Vec<CreateDocumentRequest> {
        self.creates.lock().unwrap().clone()
    }

    /// Create a store that shares counters and scripts with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            search_call_count: Arc::clone(&other.search_call_count),
            create_call_count: Arc::clone(&other.create_call_count),
            queries: Arc::clone(&other.queries),
            creates: Arc::clone(&other.creates),
            search_script: Arc::clone(&other.search_script),
            create_script: Arc::clone(&other.create_script),
            search_gate: other.search_gate.clone(),
            gate_first_only: other.gate_first_only,
        }
    }
}

#[async_trait::async_trait]
impl DocumentStore for ScriptedDocumentStore {
    async fn search_documents(&self, query: &DocumentQuery) -> Result<DocumentList> {
        let call = self.search_call_count.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.clone());

        if let Some(gate) = &self.search_gate {
            if !self.gate_first_only || call == 0 {
                gate.notified().await;
            }
        }

        let script = self.search_script.lock().unwrap().clone();
        match script {
            Script::Succeed(list) => Ok(list),
            Script::Fail(message) => Err(Error::http(message)),
        }
    }

    async fn create_document(&self, request: &CreateDocumentRequest) -> Result<CreatedDocument> {
        self.create_call_count.fetch_add(1, Ordering::SeqCst);
        self.creates.lock().unwrap().push(request.clone());

        let script = self.create_script.lock().unwrap().clone();
        match script {
            Script::Succeed(created) => Ok(created),
            Script::Fail(message) => Err(Error::graphql(message)),
        }
    }

    fn backend_name(&self) -> &'static str {
        "scripted"
    }
}

/// A NativeWriter that records subscriptions and can be told to fail
pub struct MockNativeWriter {
    call_count: Arc<AtomicUsize>,
    subscriptions: Arc<Mutex<Vec<NativeSubscription>>>,
    fail_with: Option<String>,
}

impl MockNativeWriter {
    pub fn new() -> Self {
        Self {
            call_count: Arc::new(AtomicUsize::new(0)),
            subscriptions: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::new()
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn subscriptions(&self) -> Vec<NativeSubscription> {
        self.subscriptions.lock().unwrap().clone()
    }

    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            call_count: Arc::clone(&other.call_count),
            subscriptions: Arc::clone(&other.subscriptions),
            fail_with: other.fail_with.clone(),
        }
    }
}

#[async_trait::async_trait]
impl NativeWriter for MockNativeWriter {
    async fn subscribe(&self, subscription: &NativeSubscription) -> Result<NativeWriteReceipt> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.subscriptions.lock().unwrap().push(subscription.clone());

        match &self.fail_with {
            Some(message) => Err(Error::remote_write(message.clone())),
            None => Ok(NativeWriteReceipt { success: true }),
        }
    }

    fn writer_name(&self) -> &'static str {
        "mock"
    }
}

/// An AnalyticsSink that records events
#[derive(Default)]
pub struct RecordingAnalyticsSink {
    events: Mutex<Vec<AnalyticsEvent>>,
}

impl RecordingAnalyticsSink {
    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl AnalyticsSink for RecordingAnalyticsSink {
    fn emit(&self, event: AnalyticsEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Everything a contract test needs to drive and observe a submission
pub struct Harness {
    pub orchestrator: SubmissionOrchestrator,
    pub events: mpsc::Receiver<SubmissionEvent>,
    pub documents: Arc<ScriptedDocumentStore>,
    pub native: Arc<MockNativeWriter>,
    pub analytics: Arc<RecordingAnalyticsSink>,
}

impl Harness {
    pub fn new(documents: ScriptedDocumentStore, native: MockNativeWriter) -> Self {
        let documents = Arc::new(documents);
        let native = Arc::new(native);
        let analytics = Arc::new(RecordingAnalyticsSink::default());

        let backends = Backends {
            documents: Arc::new(ScriptedDocumentStore::sharing_counters_with(&documents)),
            native: Arc::new(MockNativeWriter::sharing_counters_with(&native)),
            schemas: None,
        };

        let (orchestrator, events) =
            SubmissionOrchestrator::new(backends, analytics.clone(), &NewsletterConfig::new())
                .expect("orchestrator construction succeeds");

        Self {
            orchestrator,
            events,
            documents,
            native,
            analytics,
        }
    }

    /// Total remote calls issued so far
    pub fn network_calls(&self) -> usize {
        self.documents.search_call_count()
            + self.documents.create_call_count()
            + self.native.call_count()
    }

    /// Drain all events emitted so far
    pub fn drain_events(&mut self) -> Vec<SubmissionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

/// Mount a form with only the email field and fill it in
pub fn email_form(email: &str) -> FormStore {
    let form = FormStore::mount(FormConfig::new());
    form.dispatch(newsletter_core::FormAction::UpdateEmail(email.to_string()))
        .expect("form is mounted");
    form
}
