// # Master Data Backend Real Environment Validation Tool
//
// Exercises the master data backend against a real account: registers the
// subscriber schema (optional), runs the dedup query for an email, and
// submits a form through the full orchestrator.
//
// ## Usage
//
// ```bash
// MASTERDATA_BASE_URL=https://shop.example.com \
// MASTERDATA_GRAPHQL_URL=https://shop.example.com/_v/private/graphql/v1 \
// MASTERDATA_TEST_EMAIL=newsletter-test@example.com \
// cargo run --bin masterdata_validation
// ```
//
// ## Environment Variables
//
// Required:
// - `MASTERDATA_BASE_URL`: Account base URL
// - `MASTERDATA_GRAPHQL_URL`: GraphQL endpoint
// - `MASTERDATA_TEST_EMAIL`: Email to subscribe
//
// Optional:
// - `MASTERDATA_APP_KEY` / `MASTERDATA_APP_TOKEN`: Credentials
// - `MASTERDATA_REGISTER_SCHEMA`: "true" to register the schema first

use std::env;
use std::sync::Arc;

use newsletter_core::render::render;
use newsletter_core::traits::{DocumentQuery, DocumentStore, SchemaDefinition, SchemaRegistrar};
use newsletter_core::{
    FormAction, FormConfig, FormStore, NewsletterConfig, SubmissionOrchestrator,
    TracingAnalyticsSink, ViewOverrides,
};
use newsletter_masterdata::{Credentials, MasterDataClient};

fn required(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| {
        tracing::error!("{} environment variable is required", name);
        std::process::exit(1);
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    tracing::info!("=== Master data backend validation ===");

    let base_url = required("MASTERDATA_BASE_URL");
    let graphql_url = required("MASTERDATA_GRAPHQL_URL");
    let email = required("MASTERDATA_TEST_EMAIL");

    let credentials = match (env::var("MASTERDATA_APP_KEY"), env::var("MASTERDATA_APP_TOKEN")) {
        (Ok(app_key), Ok(app_token)) => Some(Credentials { app_key, app_token }),
        _ => None,
    };

    let config = NewsletterConfig::new();
    let client = Arc::new(MasterDataClient::new(base_url, graphql_url, credentials)?);
    tracing::info!("Client: {:?}", client);

    if env::var("MASTERDATA_REGISTER_SCHEMA").is_ok_and(|v| v == "true") {
        let definition =
            SchemaDefinition::subscribers(&config.storage.acronym, &config.storage.schema);
        client.register_schema(&definition).await?;
    }

    let query = DocumentQuery::by_email(&config.storage.acronym, &config.storage.schema, &email);
    let existing = client.search_documents(&query).await?;
    tracing::info!("Dedup query found {} document(s) for {}", existing.len(), email);

    let backends = newsletter_core::Backends {
        documents: client.clone(),
        native: client.clone(),
        schemas: Some(client),
    };
    let (orchestrator, _events) =
        SubmissionOrchestrator::new(backends, Arc::new(TracingAnalyticsSink), &config)?;

    let form = FormStore::mount(FormConfig::new());
    form.dispatch(FormAction::UpdateEmail(email))?;

    let outcome = orchestrator.submit(&form).await?;
    tracing::info!("Outcome: {:?}", outcome);

    let view = render(&form.snapshot(), &ViewOverrides::default(), form.config().locale);
    println!("{:?}", view);

    Ok(())
}
