// # Presentation
//
// Chooses what the form block shows for a given state. Rules, first match wins:
//
// 1. Legacy submission pending and a loading override supplied → Loading
// 2. Legacy submission failed → Error
// 3. Legacy submission succeeded with a non-empty id → Success
// 4. Otherwise → the form itself
//
// `render` is a pure function of its inputs; there are no timers and no
// view-local state.

pub mod messages;

use serde::{Deserialize, Serialize};

use crate::form::{CustomField, FormState};
pub use messages::{Locale, Message, message};

/// Custom views supplied by the storefront
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewOverrides {
    /// Shown while the legacy submission is pending
    #[serde(default)]
    pub loading: Option<String>,

    /// Replaces the default error message
    #[serde(default)]
    pub error: Option<String>,

    /// Replaces the default success message
    ///
    /// `{email}`, `{name}` and `{phone}` are replaced with submitted values.
    #[serde(default)]
    pub success: Option<String>,
}

/// A rendered input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub value: String,
    pub invalid: bool,
    /// Inline hint shown when the field is invalid
    pub hint: Option<&'static str>,
}

impl FieldView {
    fn new(value: &str, invalid: bool, locale: Locale, hint: Message) -> Self {
        Self {
            value: value.to_string(),
            invalid,
            hint: invalid.then(|| message(locale, hint)),
        }
    }
}

/// The form shell with its child inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub email: FieldView,
    pub name: Option<FieldView>,
    pub phone: Option<FieldView>,
    pub confirmation: Option<bool>,
    pub custom_fields: Vec<CustomField>,
    /// False while a confirmation checkbox is present and unchecked
    pub submit_enabled: bool,
}

/// What the newsletter block shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Loading {
        content: String,
    },
    Error {
        message: String,
    },
    Success {
        message: String,
        email: String,
        name: Option<String>,
        phone: Option<String>,
    },
    Form(FormView),
}

impl View {
    /// Short name for logging and assertions
    pub fn kind(&self) -> &'static str {
        match self {
            View::Loading { .. } => "loading",
            View::Error { .. } => "error",
            View::Success { .. } => "success",
            View::Form(_) => "form",
        }
    }
}

/// Select the view for `state`
///
/// A legacy submission that is still `Idle` falls through to the Form view.
pub fn render(state: &FormState, overrides: &ViewOverrides, locale: Locale) -> View {
    let legacy = &state.legacy_submission;

    if legacy.is_pending()
        && let Some(content) = &overrides.loading
    {
        return View::Loading {
            content: content.clone(),
        };
    }

    if legacy.is_failed() {
        let message = overrides
            .error
            .clone()
            .unwrap_or_else(|| message(locale, Message::Error).to_string());
        return View::Error { message };
    }

    if let Some(created) = legacy.value().filter(|created| !created.document_id.is_empty()) {
        tracing::trace!("Rendering success for document {}", created.document_id);
        let message = match &overrides.success {
            Some(template) => fill_template(template, state),
            None => message(locale, Message::Success).to_string(),
        };
        return View::Success {
            message,
            email: state.email.clone(),
            name: state.name.clone(),
            phone: state.phone.clone(),
        };
    }

    View::Form(FormView {
        email: FieldView::new(&state.email, state.invalid_email, locale, Message::InvalidEmail),
        name: state
            .name
            .as_deref()
            .map(|name| FieldView::new(name, state.invalid_name, locale, Message::InvalidName)),
        phone: state
            .phone
            .as_deref()
            .map(|phone| FieldView::new(phone, state.invalid_phone, locale, Message::InvalidPhone)),
        confirmation: state.confirmation,
        custom_fields: state.custom_fields.clone().unwrap_or_default(),
        submit_enabled: state.confirmation != Some(false),
    })
}

fn fill_template(template: &str, state: &FormState) -> String {
    template
        .replace("{email}", &state.email)
        .replace("{name}", state.name.as_deref().unwrap_or_default())
        .replace("{phone}", state.phone.as_deref().unwrap_or_default())
}
