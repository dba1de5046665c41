//! Contract Test: Native and legacy writes are independent
//!
//! Constraints verified:
//! - Native write failures are discarded and never reach the form state
//! - Dedup/legacy failures surface as the error view, whatever the native
//!   write did
//! - The analytics event carries name/email/phone only, stamped with the
//!   form's event id
//! - Nothing is retried

mod common;

use common::*;
use newsletter_core::best_effort::BestEffortOutcome;
use newsletter_core::form::{AsyncResult, FailureKind};
use newsletter_core::render::{View, ViewOverrides, render};
use newsletter_core::submission::LegacyOutcome;
use newsletter_core::{FormAction, FormConfig, FormStore, Locale, SubmissionEvent, SubmitOutcome};

#[tokio::test]
async fn native_failure_does_not_affect_legacy_success() {
    let mut harness = Harness::new(
        ScriptedDocumentStore::new(),
        MockNativeWriter::failing("platform unavailable"),
    );
    let form = email_form("a@b.com");

    let outcome = harness.orchestrator.submit(&form).await.unwrap();

    let SubmitOutcome::Submitted { legacy, native } = outcome else {
        panic!("expected submission");
    };
    assert!(matches!(legacy, LegacyOutcome::Created(_)));
    assert!(matches!(native, BestEffortOutcome::Discarded { ref error } if error.contains("platform unavailable")));

    let view = render(&form.snapshot(), &ViewOverrides::default(), Locale::En);
    assert_eq!(view.kind(), "success");

    let events = harness.drain_events();
    assert!(events.iter().any(|event| matches!(
        event,
        SubmissionEvent::NativeWriteDiscarded { email, .. } if email == "a@b.com"
    )));
    assert_eq!(harness.native.call_count(), 1);
}

#[tokio::test]
async fn legacy_create_failure_renders_error_view() {
    for native in [MockNativeWriter::new(), MockNativeWriter::failing("down")] {
        let harness = Harness::new(
            ScriptedDocumentStore::new().with_failing_create("duplicate key"),
            native,
        );
        let form = email_form("a@b.com");

        let outcome = harness.orchestrator.submit(&form).await.unwrap();

        assert!(matches!(
            outcome,
            SubmitOutcome::Submitted {
                legacy: LegacyOutcome::Failed(ref failure),
                ..
            } if failure.kind == FailureKind::Mutation
        ));
        assert_eq!(harness.documents.create_call_count(), 1);

        let state = form.snapshot();
        assert!(state.legacy_submission.is_failed());

        let view = render(&state, &ViewOverrides::default(), Locale::En);
        assert_eq!(view, View::Error {
            message: "Something went wrong. Please try again.".to_string()
        });

        let overrides = ViewOverrides {
            error: Some("We could not subscribe you".to_string()),
            ..ViewOverrides::default()
        };
        assert_eq!(render(&state, &overrides, Locale::En), View::Error {
            message: "We could not subscribe you".to_string()
        });
    }
}

#[tokio::test]
async fn dedup_query_failure_skips_creation_and_fails() {
    let mut harness = Harness::new(
        ScriptedDocumentStore::new().with_failing_search("502 bad gateway"),
        MockNativeWriter::new(),
    );
    let form = email_form("a@b.com");

    harness.orchestrator.submit(&form).await.unwrap();

    assert_eq!(harness.documents.search_call_count(), 1);
    assert_eq!(harness.documents.create_call_count(), 0);

    let state = form.snapshot();
    assert_eq!(
        state.dedup_query.failure().map(|failure| failure.kind),
        Some(FailureKind::Query)
    );
    assert_eq!(
        state.legacy_submission.failure().map(|failure| failure.kind),
        Some(FailureKind::Query)
    );
    assert_eq!(
        render(&state, &ViewOverrides::default(), Locale::En).kind(),
        "error"
    );

    assert!(harness.drain_events().iter().any(|event| matches!(
        event,
        SubmissionEvent::LegacyFailed { error, .. } if error.contains("502")
    )));
}

#[tokio::test]
async fn failures_are_not_retried() {
    let harness = Harness::new(
        ScriptedDocumentStore::new().with_failing_create("timeout"),
        MockNativeWriter::failing("timeout"),
    );
    let form = email_form("a@b.com");

    harness.orchestrator.submit(&form).await.unwrap();

    assert_eq!(harness.native.call_count(), 1);
    assert_eq!(harness.documents.search_call_count(), 1);
    assert_eq!(harness.documents.create_call_count(), 1);
}

#[tokio::test]
async fn analytics_event_excludes_custom_fields() {
    let harness = Harness::new(ScriptedDocumentStore::new(), MockNativeWriter::new());
    let form = FormStore::mount(
        FormConfig::new()
            .with_name_field(true)
            .with_event_id("footer-newsletter"),
    );
    form.dispatch(FormAction::UpdateEmail("ada@example.com".to_string()))
        .unwrap();
    form.dispatch(FormAction::UpdateName("Ada".to_string()))
        .unwrap();
    form.dispatch(FormAction::UpsertCustomField(
        newsletter_core::form::CustomField::new("city", "Lisbon"),
    ))
    .unwrap();

    harness.orchestrator.submit(&form).await.unwrap();

    let events = harness.analytics.events();
    assert_eq!(events.len(), 1);
    let json = serde_json::to_value(&events[0]).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "event": "newsletterSubscription",
            "id": "footer-newsletter",
            "data": { "name": "Ada", "email": "ada@example.com", "phone": null }
        })
    );

    let subscription = &harness.native.subscriptions()[0];
    assert_eq!(subscription.field("city"), Some("Lisbon"));
    assert_eq!(subscription.field("name"), Some("Ada"));
}

#[tokio::test]
async fn statuses_are_pending_while_the_query_is_in_flight() {
    let gate = std::sync::Arc::new(tokio::sync::Notify::new());
    let harness = std::sync::Arc::new(Harness::new(
        ScriptedDocumentStore::new().with_search_gate(gate.clone()),
        MockNativeWriter::new(),
    ));
    let form = email_form("a@b.com");

    let task = {
        let harness = harness.clone();
        let form = form.clone();
        tokio::spawn(async move { harness.orchestrator.submit(&form).await })
    };

    while harness.documents.search_call_count() == 0 {
        tokio::task::yield_now().await;
    }

    let state = form.snapshot();
    assert_eq!(state.dedup_query, AsyncResult::Pending);
    assert_eq!(state.legacy_submission, AsyncResult::Pending);

    let loading = ViewOverrides {
        loading: Some("Subscribing…".to_string()),
        ..ViewOverrides::default()
    };
    assert_eq!(render(&state, &loading, Locale::En).kind(), "loading");
    assert_eq!(
        render(&state, &ViewOverrides::default(), Locale::En).kind(),
        "form"
    );

    gate.notify_one();
    task.await.unwrap().unwrap();

    assert_eq!(
        render(&form.snapshot(), &loading, Locale::En).kind(),
        "success"
    );
}
