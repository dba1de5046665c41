//! The per-form state record

use serde::{Deserialize, Serialize};

use crate::config::FormConfig;
use crate::traits::{CreatedDocument, DocumentList};

/// Tri-state (plus idle) result of an in-flight remote operation
///
/// `Idle` means the operation has not been issued for this form yet. Per
/// submission attempt the only transitions are `Pending → Succeeded` and
/// `Pending → Failed`; a new attempt resets to `Pending`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum AsyncResult<T> {
    #[default]
    Idle,
    Pending,
    Succeeded(T),
    Failed(RemoteFailure),
}

impl<T> AsyncResult<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, AsyncResult::Pending)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, AsyncResult::Failed(_))
    }

    /// The success value, if any
    pub fn value(&self) -> Option<&T> {
        match self {
            AsyncResult::Succeeded(value) => Some(value),
            _ => None,
        }
    }

    /// The failure, if any
    pub fn failure(&self) -> Option<&RemoteFailure> {
        match self {
            AsyncResult::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

impl<T> From<Result<T, crate::Error>> for AsyncResult<T> {
    fn from(result: Result<T, crate::Error>) -> Self {
        match result {
            Ok(value) => AsyncResult::Succeeded(value),
            Err(err) => AsyncResult::Failed(RemoteFailure::from(&err)),
        }
    }
}

/// Which remote operation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The dedup query
    Query,
    /// The legacy create-mutation
    Mutation,
    /// Anything else (transport, decoding)
    Other,
}

/// Cloneable summary of a remote error kept in the state record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&crate::Error> for RemoteFailure {
    fn from(err: &crate::Error) -> Self {
        let kind = match err {
            crate::Error::RemoteQuery(_) => FailureKind::Query,
            crate::Error::RemoteMutation(_) => FailureKind::Mutation,
            _ => FailureKind::Other,
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

/// An extra `(name, value)` pair collected by an auxiliary input block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    pub name: String,
    pub value: String,
}

impl CustomField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Field values, validity flags and remote statuses of one mounted form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    pub email: String,
    /// `None` when the form has no name field
    pub name: Option<String>,
    /// `None` when the form has no phone field
    pub phone: Option<String>,
    pub custom_fields: Option<Vec<CustomField>>,
    pub confirmation: Option<bool>,
    pub invalid_email: bool,
    pub invalid_name: bool,
    pub invalid_phone: bool,
    pub dedup_query: AsyncResult<DocumentList>,
    pub legacy_submission: AsyncResult<CreatedDocument>,
}

impl FormState {
    /// Initial state for a form rendered with `config`
    pub fn for_form(config: &FormConfig) -> Self {
        Self {
            name: config.name_field.then(String::new),
            phone: config.phone_field.then(String::new),
            confirmation: config.confirmation_field.then_some(false),
            ..Self::default()
        }
    }

    /// Whether any field is flagged invalid
    pub fn has_invalid_fields(&self) -> bool {
        self.invalid_email || self.invalid_name || self.invalid_phone
    }

    /// Custom fields as a JSON array of `{name, value}`, in form order
    pub fn custom_fields_json(&self) -> Option<String> {
        let fields = self.custom_fields.as_ref().filter(|fields| !fields.is_empty())?;
        serde_json::to_string(fields).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_follow_form_config() {
        let state = FormState::for_form(&FormConfig::new().with_name_field(true));
        assert_eq!(state.name.as_deref(), Some(""));
        assert_eq!(state.phone, None);
        assert_eq!(state.confirmation, None);
        assert_eq!(state.legacy_submission, AsyncResult::Idle);
        assert!(!state.has_invalid_fields());
    }

    #[test]
    fn custom_fields_json_skips_empty_lists() {
        let mut state = FormState::default();
        assert_eq!(state.custom_fields_json(), None);

        state.custom_fields = Some(Vec::new());
        assert_eq!(state.custom_fields_json(), None);

        state.custom_fields = Some(vec![CustomField::new("favoriteColor", "green")]);
        assert_eq!(
            state.custom_fields_json().as_deref(),
            Some(r#"[{"name":"favoriteColor","value":"green"}]"#)
        );
    }

    #[test]
    fn failures_keep_their_kind() {
        let result: AsyncResult<()> = Err(crate::Error::remote_query("timeout")).into();
        let failure = result.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::Query);
        assert!(failure.message.contains("timeout"));
    }
}
