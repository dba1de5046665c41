// # Native Writer Trait
//
// Defines the platform-integrated subscription write.
//
// The native write runs alongside the dedup-gated legacy write. Its outcome
// is observed (logged, reported as a submission event) but never drives the
// form's visible state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Payload of the native write
///
/// Serializes as `{email, fields: {name?, phone?, bindingUrl?, bindingId?, ...custom}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeSubscription {
    pub email: String,
    pub fields: Map<String, Value>,
}

impl NativeSubscription {
    /// Value of an entry in `fields`, if it is a string
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

/// Acknowledgement of a native write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeWriteReceipt {
    /// Whether the platform reported success
    pub success: bool,
}

/// Trait for native writer implementations
///
/// Implementations return `Err` on transport or backend failure. A platform
/// response of `false` is also reported as `Err` so callers see one failure
/// shape.
#[async_trait]
pub trait NativeWriter: Send + Sync {
    /// Persist a subscriber through the native path
    async fn subscribe(
        &self,
        subscription: &NativeSubscription,
    ) -> Result<NativeWriteReceipt, crate::Error>;

    /// Get the writer name (for logging/debugging)
    fn writer_name(&self) -> &'static str;
}
