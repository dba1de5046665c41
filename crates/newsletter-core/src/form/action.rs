//! Form actions and the reducer
//!
//! Every change to a [`FormState`] is expressed as a [`FormAction`] and
//! applied by [`reduce`]. Each action replaces exactly the field(s) it
//! names; everything else is carried over unchanged.

use super::state::{AsyncResult, CustomField, FormState};
use crate::traits::{CreatedDocument, DocumentList};

/// Closed set of state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    UpdateEmail(String),
    UpdateName(String),
    UpdatePhone(String),
    UpdateConfirmation(bool),
    UpdateCustomFields(Vec<CustomField>),
    /// Replace the value of a custom field by name, or append it
    UpsertCustomField(CustomField),
    SetInvalidEmail(bool),
    SetInvalidName(bool),
    SetInvalidPhone(bool),
    SetDedupQuery(AsyncResult<DocumentList>),
    SetLegacySubmission(AsyncResult<CreatedDocument>),
}

impl FormAction {
    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            FormAction::UpdateEmail(_) => "update_email",
            FormAction::UpdateName(_) => "update_name",
            FormAction::UpdatePhone(_) => "update_phone",
            FormAction::UpdateConfirmation(_) => "update_confirmation",
            FormAction::UpdateCustomFields(_) => "update_custom_fields",
            FormAction::UpsertCustomField(_) => "upsert_custom_field",
            FormAction::SetInvalidEmail(_) => "set_invalid_email",
            FormAction::SetInvalidName(_) => "set_invalid_name",
            FormAction::SetInvalidPhone(_) => "set_invalid_phone",
            FormAction::SetDedupQuery(_) => "set_dedup_query",
            FormAction::SetLegacySubmission(_) => "set_legacy_submission",
        }
    }
}

/// Apply `action` to `state`, returning the next state
pub fn reduce(state: FormState, action: FormAction) -> FormState {
    match action {
        FormAction::UpdateEmail(email) => FormState { email, ..state },
        FormAction::UpdateName(name) => FormState {
            name: Some(name),
            ..state
        },
        FormAction::UpdatePhone(phone) => FormState {
            phone: Some(phone),
            ..state
        },
        FormAction::UpdateConfirmation(confirmation) => FormState {
            confirmation: Some(confirmation),
            ..state
        },
        FormAction::UpdateCustomFields(fields) => FormState {
            custom_fields: Some(fields),
            ..state
        },
        FormAction::UpsertCustomField(field) => {
            let mut fields = state.custom_fields.clone().unwrap_or_default();
            match fields.iter_mut().find(|existing| existing.name == field.name) {
                Some(existing) => existing.value = field.value,
                None => fields.push(field),
            }
            FormState {
                custom_fields: Some(fields),
                ..state
            }
        }
        FormAction::SetInvalidEmail(invalid_email) => FormState {
            invalid_email,
            ..state
        },
        FormAction::SetInvalidName(invalid_name) => FormState {
            invalid_name,
            ..state
        },
        FormAction::SetInvalidPhone(invalid_phone) => FormState {
            invalid_phone,
            ..state
        },
        FormAction::SetDedupQuery(dedup_query) => FormState {
            dedup_query,
            ..state
        },
        FormAction::SetLegacySubmission(legacy_submission) => FormState {
            legacy_submission,
            ..state
        },
    }
}
