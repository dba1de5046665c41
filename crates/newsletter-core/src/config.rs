//! Configuration types for the newsletter client
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};

use crate::render::Locale;

/// Default data entity acronym for subscriber documents
pub const DEFAULT_ACRONYM: &str = "NL";

/// Default schema name for subscriber documents
pub const DEFAULT_SCHEMA: &str = "newsletter-subscribers-v1";

/// Main newsletter configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsletterConfig {
    /// Where legacy documents live
    #[serde(default)]
    pub storage: StorageConfig,

    /// Which fields the form renders, and binding metadata
    #[serde(default)]
    pub form: FormConfig,

    /// Remote backend configuration
    #[serde(default)]
    pub backend: BackendConfig,

    /// Optional orchestrator settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl NewsletterConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.storage.validate()?;
        self.backend.validate()?;

        if self.engine.event_channel_capacity == 0 {
            return Err(crate::Error::config(
                "Event channel capacity must be > 0",
            ));
        }

        Ok(())
    }
}

/// Data entity and schema used by the dedup query and the legacy mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data entity acronym
    #[serde(default = "default_acronym")]
    pub acronym: String,

    /// Schema name registered on the data entity
    #[serde(default = "default_schema")]
    pub schema: String,
}

impl StorageConfig {
    /// Create a storage configuration
    pub fn new(acronym: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            acronym: acronym.into(),
            schema: schema.into(),
        }
    }

    /// Validate the storage configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.acronym.trim().is_empty() {
            return Err(crate::Error::config("Data entity acronym cannot be empty"));
        }
        if self.schema.trim().is_empty() {
            return Err(crate::Error::config("Schema name cannot be empty"));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ACRONYM, DEFAULT_SCHEMA)
    }
}

fn default_acronym() -> String {
    DEFAULT_ACRONYM.to_string()
}

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}

/// Per-form configuration
///
/// `name_field` and `phone_field` decide whether those fields exist on the
/// form at all. Absent fields are never validated and never sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormConfig {
    /// Whether the form renders a name input
    #[serde(default)]
    pub name_field: bool,

    /// Whether the form renders a phone input
    #[serde(default)]
    pub phone_field: bool,

    /// Whether the form renders a confirmation checkbox
    #[serde(default)]
    pub confirmation_field: bool,

    /// Storefront binding URL forwarded with the native write
    #[serde(default)]
    pub binding_url: Option<String>,

    /// Storefront binding id forwarded with the native write
    #[serde(default)]
    pub binding_id: Option<String>,

    /// Identifier stamped on the analytics event
    #[serde(default)]
    pub event_id: Option<String>,

    /// Locale used for default messages
    #[serde(default)]
    pub locale: Locale,
}

impl FormConfig {
    /// Create a form configuration with only the email field
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a name input
    pub fn with_name_field(mut self, enabled: bool) -> Self {
        self.name_field = enabled;
        self
    }

    /// Render a phone input
    pub fn with_phone_field(mut self, enabled: bool) -> Self {
        self.phone_field = enabled;
        self
    }

    /// Render a confirmation checkbox
    pub fn with_confirmation_field(mut self, enabled: bool) -> Self {
        self.confirmation_field = enabled;
        self
    }

    /// Set the storefront binding
    pub fn with_binding(mut self, url: impl Into<String>, id: impl Into<String>) -> Self {
        self.binding_url = Some(url.into());
        self.binding_id = Some(id.into());
        self
    }

    /// Set the analytics event identifier
    pub fn with_event_id(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = Some(event_id.into());
        self
    }

    /// Set the locale
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }
}

/// Remote backend configuration
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackendConfig {
    /// Hosted master data backend
    MasterData {
        /// Account base URL, used for schema registration
        base_url: String,
        /// GraphQL endpoint used for queries and mutations
        graphql_url: String,
        /// App key (optional)
        app_key: Option<String>,
        /// App token (optional)
        app_token: Option<String>,
    },

    /// In-memory backend (tests and demos)
    #[default]
    Memory,

    /// Custom backend
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

// Credentials never reach the logs
impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendConfig::MasterData {
                base_url,
                graphql_url,
                app_key,
                app_token,
            } => f
                .debug_struct("MasterData")
                .field("base_url", base_url)
                .field("graphql_url", graphql_url)
                .field("app_key", &app_key.as_ref().map(|_| "<REDACTED>"))
                .field("app_token", &app_token.as_ref().map(|_| "<REDACTED>"))
                .finish(),
            BackendConfig::Memory => f.write_str("Memory"),
            BackendConfig::Custom { factory, config } => f
                .debug_struct("Custom")
                .field("factory", factory)
                .field("config", config)
                .finish(),
        }
    }
}

impl BackendConfig {
    /// Validate the backend configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            BackendConfig::MasterData {
                base_url,
                graphql_url,
                app_key,
                app_token,
            } => {
                for (label, url) in [("base URL", base_url), ("GraphQL URL", graphql_url)] {
                    if url.is_empty() {
                        return Err(crate::Error::config(format!(
                            "Master data {label} cannot be empty"
                        )));
                    }
                    if !url.starts_with("https://") && !url.starts_with("http://") {
                        return Err(crate::Error::config(format!(
                            "Master data {label} must use HTTP or HTTPS scheme. Got: {url}"
                        )));
                    }
                }
                if app_key.is_some() != app_token.is_some() {
                    return Err(crate::Error::config(
                        "App key and app token must be configured together",
                    ));
                }
                Ok(())
            }
            BackendConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config("Custom backend factory cannot be empty"));
                }
                if config.is_null() {
                    return Err(crate::Error::config("Custom backend config cannot be null"));
                }
                Ok(())
            }
            BackendConfig::Memory => Ok(()),
        }
    }

    /// Get the backend type name
    pub fn type_name(&self) -> &str {
        match self {
            BackendConfig::MasterData { .. } => "master_data",
            BackendConfig::Memory => "memory",
            BackendConfig::Custom { factory, .. } => factory,
        }
    }
}

/// Orchestrator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Capacity of the submission event channel
    ///
    /// When full, new events are dropped with a warning log.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_event_channel_capacity() -> usize {
    256
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(NewsletterConfig::new().validate().is_ok());
    }

    #[test]
    fn empty_acronym_is_rejected() {
        let mut config = NewsletterConfig::new();
        config.storage.acronym = " ".to_string();
        assert!(matches!(config.validate(), Err(crate::Error::Config(_))));
    }

    #[test]
    fn master_data_requires_http_urls() {
        let backend = BackendConfig::MasterData {
            base_url: "ftp://store.example.com".to_string(),
            graphql_url: "https://store.example.com/_v/graphql".to_string(),
            app_key: None,
            app_token: None,
        };
        assert!(backend.validate().is_err());
    }

    #[test]
    fn master_data_credentials_come_in_pairs() {
        let backend = BackendConfig::MasterData {
            base_url: "https://store.example.com".to_string(),
            graphql_url: "https://store.example.com/_v/graphql".to_string(),
            app_key: Some("key".to_string()),
            app_token: None,
        };
        assert!(backend.validate().is_err());
    }

    #[test]
    fn debug_redacts_credentials() {
        let backend = BackendConfig::MasterData {
            base_url: "https://store.example.com".to_string(),
            graphql_url: "https://store.example.com/_v/graphql".to_string(),
            app_key: Some("vtexappkey-secret".to_string()),
            app_token: Some("super-secret-token".to_string()),
        };
        let rendered = format!("{backend:?}");
        assert!(!rendered.contains("super-secret-token"));
        assert!(!rendered.contains("vtexappkey-secret"));
        assert!(rendered.contains("<REDACTED>"));
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: NewsletterConfig = serde_json::from_value(serde_json::json!({
            "form": { "name_field": true, "locale": "pt" },
            "backend": { "type": "memory" }
        }))
        .unwrap();

        assert_eq!(config.storage, StorageConfig::default());
        assert!(config.form.name_field);
        assert!(!config.form.phone_field);
        assert_eq!(config.form.locale, Locale::Pt);
        assert_eq!(config.engine.event_channel_capacity, 256);
    }
}
