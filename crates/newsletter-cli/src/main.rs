// # newsletter - Newsletter form CLI
//
// A thin driver around newsletter-core. It fills a form from command-line
// arguments, submits it, and prints the view the storefront would show.
// All subscription logic lives in newsletter-core.
//
// ## Configuration
//
// Backend and storage settings come from environment variables:
//
// ### Backend
// - `NEWSLETTER_BACKEND_TYPE`: Backend type (memory, master_data)
// - `NEWSLETTER_BASE_URL`: Account base URL (for master_data)
// - `NEWSLETTER_GRAPHQL_URL`: GraphQL endpoint (for master_data)
// - `NEWSLETTER_APP_KEY` / `NEWSLETTER_APP_TOKEN`: Optional credentials
//
// ### Storage
// - `NEWSLETTER_ACRONYM`: Data entity acronym (default NL)
// - `NEWSLETTER_SCHEMA`: Schema name (default newsletter-subscribers-v1)
//
// ### Form
// - `NEWSLETTER_LOCALE`: Locale for default messages (en, es, pt)
// - `NEWSLETTER_EVENT_ID`: Id stamped on the analytics event
// - `NEWSLETTER_BINDING_URL` / `NEWSLETTER_BINDING_ID`: Storefront binding
//
// ### Logging
// - `NEWSLETTER_LOG_LEVEL`: trace, debug, info, warn, error
//
// ## Example
//
// ```bash
// export NEWSLETTER_BACKEND_TYPE=master_data
// export NEWSLETTER_BASE_URL=https://shop.example.com
// export NEWSLETTER_GRAPHQL_URL=https://shop.example.com/_v/private/graphql/v1
//
// newsletter register-schema
// newsletter submit --email ada@example.com --name Ada --field city=London
// ```

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use newsletter_core::form::CustomField;
use newsletter_core::render::{View, render};
use newsletter_core::traits::SchemaDefinition;
use newsletter_core::{
    BackendConfig, BackendRegistry, Error, FormAction, FormConfig, FormStore, Locale,
    NewsletterConfig, StorageConfig, SubmissionOrchestrator, TracingAnalyticsSink, ViewOverrides,
};
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different outcomes
///
/// - 0: Subscribed (or schema registered)
/// - 1: Configuration or startup error
/// - 2: Runtime error (the backend failed)
/// - 3: The form was rejected by validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NewsletterExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
    Rejected = 3,
}

impl From<NewsletterExitCode> for ExitCode {
    fn from(code: NewsletterExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Parser, Debug)]
#[command(name = "newsletter", version, about = "Newsletter subscription form driver")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill the form and submit it
    Submit {
        #[arg(long, default_value = "")]
        email: String,
        /// Render a name field with this value
        #[arg(long)]
        name: Option<String>,
        /// Render a phone field with this value
        #[arg(long)]
        phone: Option<String>,
        /// Custom field as key=value (repeatable)
        #[arg(long = "field", value_parser = parse_custom_field)]
        fields: Vec<CustomField>,
        /// Replace the default success message; supports {email}, {name}, {phone}
        #[arg(long)]
        success_message: Option<String>,
        /// Replace the default error message
        #[arg(long)]
        error_message: Option<String>,
    },
    /// Register the subscriber schema with the backend
    RegisterSchema,
}

fn parse_custom_field(raw: &str) -> std::result::Result<CustomField, String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok(CustomField::new(name.trim(), value))
        }
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}

/// Application configuration
struct Config {
    backend_type: String,
    base_url: Option<String>,
    graphql_url: Option<String>,
    app_key: Option<String>,
    app_token: Option<String>,
    acronym: Option<String>,
    schema: Option<String>,
    locale: Locale,
    event_id: Option<String>,
    binding_url: Option<String>,
    binding_id: Option<String>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        Self {
            backend_type: env::var("NEWSLETTER_BACKEND_TYPE")
                .unwrap_or_else(|_| "memory".to_string()),
            base_url: env::var("NEWSLETTER_BASE_URL").ok(),
            graphql_url: env::var("NEWSLETTER_GRAPHQL_URL").ok(),
            app_key: env::var("NEWSLETTER_APP_KEY").ok().filter(|s| !s.is_empty()),
            app_token: env::var("NEWSLETTER_APP_TOKEN").ok().filter(|s| !s.is_empty()),
            acronym: env::var("NEWSLETTER_ACRONYM").ok(),
            schema: env::var("NEWSLETTER_SCHEMA").ok(),
            locale: env::var("NEWSLETTER_LOCALE")
                .map(|tag| Locale::from_tag(&tag))
                .unwrap_or_default(),
            event_id: env::var("NEWSLETTER_EVENT_ID").ok(),
            binding_url: env::var("NEWSLETTER_BINDING_URL").ok(),
            binding_id: env::var("NEWSLETTER_BINDING_ID").ok(),
            log_level: env::var("NEWSLETTER_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        match self.backend_type.as_str() {
            "memory" => {}
            "master_data" => {
                if self.base_url.as_ref().is_none_or(|u| u.is_empty()) {
                    anyhow::bail!(
                        "NEWSLETTER_BASE_URL is required when NEWSLETTER_BACKEND_TYPE=master_data. \
                        Set it via: export NEWSLETTER_BASE_URL=https://shop.example.com"
                    );
                }
                if self.graphql_url.as_ref().is_none_or(|u| u.is_empty()) {
                    anyhow::bail!(
                        "NEWSLETTER_GRAPHQL_URL is required when NEWSLETTER_BACKEND_TYPE=master_data"
                    );
                }
                if self.app_key.is_some() != self.app_token.is_some() {
                    anyhow::bail!(
                        "NEWSLETTER_APP_KEY and NEWSLETTER_APP_TOKEN must be set together"
                    );
                }
            }
            _ => anyhow::bail!(
                "NEWSLETTER_BACKEND_TYPE '{}' is not supported. \
                Supported types: memory, master_data",
                self.backend_type
            ),
        }

        if self.acronym.as_ref().is_some_and(|a| a.is_empty()) {
            anyhow::bail!("NEWSLETTER_ACRONYM cannot be empty when set");
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "NEWSLETTER_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    /// Build the library configuration
    fn newsletter_config(&self) -> NewsletterConfig {
        let defaults = StorageConfig::default();
        let storage = StorageConfig::new(
            self.acronym.clone().unwrap_or(defaults.acronym),
            self.schema.clone().unwrap_or(defaults.schema),
        );

        let backend = match self.backend_type.as_str() {
            "master_data" => BackendConfig::MasterData {
                base_url: self.base_url.clone().unwrap_or_default(),
                graphql_url: self.graphql_url.clone().unwrap_or_default(),
                app_key: self.app_key.clone(),
                app_token: self.app_token.clone(),
            },
            _ => BackendConfig::Memory,
        };

        NewsletterConfig {
            storage,
            backend,
            ..NewsletterConfig::default()
        }
    }

    /// Form configuration for a submission that renders the given fields
    fn form_config(&self, name_field: bool, phone_field: bool) -> FormConfig {
        let mut form = FormConfig::new()
            .with_name_field(name_field)
            .with_phone_field(phone_field)
            .with_locale(self.locale);
        if let Some(event_id) = &self.event_id {
            form = form.with_event_id(event_id.clone());
        }
        if let (Some(url), Some(id)) = (&self.binding_url, &self.binding_id) {
            form = form.with_binding(url.clone(), id.clone());
        }
        form
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = Config::from_env();

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return NewsletterExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return NewsletterExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return NewsletterExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        match run(cli.command, config).await {
            Ok(code) => code,
            Err(e) => {
                error!("{:#}", e);
                NewsletterExitCode::RuntimeError
            }
        }
    });

    code.into()
}

async fn run(command: Command, config: Config) -> Result<NewsletterExitCode> {
    let newsletter_config = config.newsletter_config();

    let registry = BackendRegistry::with_defaults();
    #[cfg(feature = "master-data")]
    newsletter_masterdata::register(&registry);

    info!("Using {} backend", newsletter_config.backend.type_name());
    let backends = registry
        .create(&newsletter_config.backend)
        .context("Failed to create backend")?;

    match command {
        Command::Submit {
            email,
            name,
            phone,
            fields,
            success_message,
            error_message,
        } => {
            let form = FormStore::mount(config.form_config(name.is_some(), phone.is_some()));
            form.dispatch(FormAction::UpdateEmail(email))?;
            if let Some(name) = name {
                form.dispatch(FormAction::UpdateName(name))?;
            }
            if let Some(phone) = phone {
                form.dispatch(FormAction::UpdatePhone(phone))?;
            }
            for field in fields {
                form.dispatch(FormAction::UpsertCustomField(field))?;
            }

            let (orchestrator, mut events) = SubmissionOrchestrator::new(
                backends,
                Arc::new(TracingAnalyticsSink),
                &newsletter_config,
            )?;

            let outcome = orchestrator.submit(&form).await?;
            while let Ok(event) = events.try_recv() {
                debug!("Submission event: {:?}", event);
            }

            let overrides = ViewOverrides {
                loading: None,
                error: error_message,
                success: success_message,
            };
            let view = render(&form.snapshot(), &overrides, config.locale);
            print_view(&view);

            match outcome.into_result() {
                Err(e @ Error::Validation { .. }) => {
                    error!("{}", e);
                    Ok(NewsletterExitCode::Rejected)
                }
                Err(e) => Err(e.into()),
                Ok(_) if matches!(view, View::Error { .. }) => {
                    Ok(NewsletterExitCode::RuntimeError)
                }
                Ok(_) => Ok(NewsletterExitCode::Success),
            }
        }
        Command::RegisterSchema => {
            let Some(registrar) = backends.schemas else {
                anyhow::bail!(
                    "The {} backend does not support schema registration",
                    newsletter_config.backend.type_name()
                );
            };
            let definition = SchemaDefinition::subscribers(
                newsletter_config.storage.acronym.clone(),
                newsletter_config.storage.schema.clone(),
            );
            registrar
                .register_schema(&definition)
                .await
                .context("Schema registration failed")?;
            println!(
                "registered schema {} for {}",
                definition.schema, definition.acronym
            );
            Ok(NewsletterExitCode::Success)
        }
    }
}

fn print_view(view: &View) {
    match view {
        View::Loading { content } => println!("{}", content),
        View::Error { message } => println!("error: {}", message),
        View::Success { message, .. } => println!("{}", message),
        View::Form(form) => {
            let fields = [
                ("email", Some(&form.email)),
                ("name", form.name.as_ref()),
                ("phone", form.phone.as_ref()),
            ];
            for (label, field) in fields {
                if let Some(field) = field {
                    match field.hint {
                        Some(hint) => println!("{}: {} ({})", label, field.value, hint),
                        None => println!("{}: {}", label, field.value),
                    }
                }
            }
        }
    }
}
