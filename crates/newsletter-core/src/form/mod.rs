// # Form State
//
// The per-form state record, its closed action set and the store that owns it.

pub mod action;
pub mod state;
pub mod store;

pub use action::{FormAction, reduce};
pub use state::{AsyncResult, CustomField, FailureKind, FormState, RemoteFailure};
pub use store::FormStore;
