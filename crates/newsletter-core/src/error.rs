//! Error types for the newsletter client
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for newsletter operations
pub type Result<T> = std::result::Result<T, Error>;

/// A form field that can fail validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Email,
    Name,
    Phone,
}

impl Field {
    /// Field key as it appears in stored documents
    pub fn key(&self) -> &'static str {
        match self {
            Field::Email => "email",
            Field::Name => "name",
            Field::Phone => "phone",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Core error type for the newsletter client
#[derive(Error, Debug)]
pub enum Error {
    /// One or more fields failed client-side validation
    #[error("Invalid fields: {}", display_fields(.fields))]
    Validation {
        /// The fields that failed
        fields: Vec<Field>,
    },

    /// Native write failed
    #[error("Native write failed: {0}")]
    RemoteWrite(String),

    /// Dedup query failed
    #[error("Document query failed: {0}")]
    RemoteQuery(String),

    /// Legacy create-mutation failed
    #[error("Document creation failed: {0}")]
    RemoteMutation(String),

    /// An action was dispatched outside of an active form lifecycle
    #[error("{provider} is not mounted; actions must be dispatched inside an active form")]
    MissingFormProvider {
        /// Name of the missing provider
        provider: &'static str,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// GraphQL-level errors returned with a 200 response
    #[error("GraphQL error: {0}")]
    GraphQl(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

fn display_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(Field::key)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Error {
    /// Create a native write error
    pub fn remote_write(msg: impl Into<String>) -> Self {
        Self::RemoteWrite(msg.into())
    }

    /// Create a dedup query error
    pub fn remote_query(msg: impl Into<String>) -> Self {
        Self::RemoteQuery(msg.into())
    }

    /// Create a legacy mutation error
    pub fn remote_mutation(msg: impl Into<String>) -> Self {
        Self::RemoteMutation(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a GraphQL error
    pub fn graphql(msg: impl Into<String>) -> Self {
        Self::GraphQl(msg.into())
    }

    /// The form store is not mounted
    pub fn missing_form_provider() -> Self {
        Self::MissingFormProvider {
            provider: "FormStore",
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
