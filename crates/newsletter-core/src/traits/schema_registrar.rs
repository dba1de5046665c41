// # Schema Registrar Trait
//
// One-time setup of the data entity schema the legacy path writes into.
// Not used by the submission flow.

use async_trait::async_trait;
use serde_json::{Value, json};

/// Schema registered for subscriber documents
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDefinition {
    pub acronym: String,
    pub schema: String,
    pub body: Value,
}

impl SchemaDefinition {
    /// The subscriber schema: `email` (required, email-formatted) plus an
    /// opaque `fields` string, with public read-all and public write on both
    pub fn subscribers(acronym: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            acronym: acronym.into(),
            schema: schema.into(),
            body: json!({
                "properties": {
                    "email": { "type": "string", "format": "email" },
                    "fields": { "type": "string" }
                },
                "required": ["email"],
                "v-indexed": ["email"],
                "v-security": {
                    "allowGetAll": true,
                    "publicRead": ["email", "fields"],
                    "publicWrite": ["email", "fields"],
                    "publicFilter": ["email"]
                }
            }),
        }
    }
}

/// Trait for backends able to register a schema
#[async_trait]
pub trait SchemaRegistrar: Send + Sync {
    async fn register_schema(&self, definition: &SchemaDefinition) -> Result<(), crate::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscriber_schema_requires_email() {
        let definition = SchemaDefinition::subscribers("NL", "v1");
        assert_eq!(definition.body["required"], json!(["email"]));
        assert_eq!(definition.body["properties"]["email"]["format"], "email");
        assert_eq!(definition.body["v-security"]["allowGetAll"], true);
    }
}
