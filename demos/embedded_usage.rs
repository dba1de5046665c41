//! Minimal embedding example for newsletter-core
//!
//! Mounts two independent forms against the in-memory backends, with a
//! native writer that always fails, and shows that:
//! - each form has its own state
//! - a repeat subscriber skips document creation
//! - native failures never reach the rendered view

use std::sync::Arc;

use newsletter_core::backend::ChannelAnalyticsSink;
use newsletter_core::render::render;
use newsletter_core::traits::{NativeSubscription, NativeWriteReceipt, NativeWriter};
use newsletter_core::{
    Backends, Error, FormAction, FormConfig, FormStore, Locale, MemoryDocumentStore,
    NewsletterConfig, Result, SubmissionOrchestrator, ViewOverrides,
};

/// Native writer for a platform that is down
struct UnavailableNativeWriter;

#[async_trait::async_trait]
impl NativeWriter for UnavailableNativeWriter {
    async fn subscribe(&self, subscription: &NativeSubscription) -> Result<NativeWriteReceipt> {
        Err(Error::remote_write(format!(
            "platform unavailable for {}",
            subscription.email
        )))
    }

    fn writer_name(&self) -> &'static str {
        "unavailable"
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let config = NewsletterConfig::new();
    let documents = MemoryDocumentStore::new();
    documents
        .insert(&config.storage.acronym, &config.storage.schema, "grace@example.com")
        .await;

    let backends = Backends {
        documents: Arc::new(documents.clone()),
        native: Arc::new(UnavailableNativeWriter),
        schemas: Some(Arc::new(documents.clone())),
    };
    let (analytics, mut analytics_rx) = ChannelAnalyticsSink::new(16);
    let (orchestrator, mut events) =
        SubmissionOrchestrator::new(backends, Arc::new(analytics), &config)?;

    // Header form: email only
    let header = FormStore::mount(FormConfig::new().with_event_id("header"));
    header.dispatch(FormAction::UpdateEmail("grace@example.com".to_string()))?;

    // Footer form: email and name, Portuguese messages
    let footer = FormStore::mount(
        FormConfig::new()
            .with_name_field(true)
            .with_event_id("footer")
            .with_locale(Locale::Pt),
    );
    footer.dispatch(FormAction::UpdateEmail("ada@example.com".to_string()))?;
    footer.dispatch(FormAction::UpdateName("Ada".to_string()))?;

    let overrides = ViewOverrides {
        success: Some("Welcome aboard, {email}!".to_string()),
        ..ViewOverrides::default()
    };

    for form in [&header, &footer] {
        let outcome = orchestrator.submit(form).await?;
        tracing::info!("Outcome: {:?}", outcome);

        let view = render(&form.snapshot(), &overrides, form.config().locale);
        println!("{:?}", view);
    }

    println!(
        "Stored documents: {}",
        documents.len(&config.storage.acronym).await
    );

    while let Ok(event) = analytics_rx.try_recv() {
        println!("analytics: {}", serde_json::to_string(&event)?);
    }
    while let Ok(event) = events.try_recv() {
        println!("event: {:?}", event);
    }

    header.unmount();
    footer.unmount();

    Ok(())
}
