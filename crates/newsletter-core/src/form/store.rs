// # Form Store
//
// Holds the `FormState` of one mounted form.
//
// ## Lifecycle
//
// 1. `FormStore::mount(config)` when the form is rendered
// 2. Child blocks read `snapshot()` and call `dispatch(action)`
// 3. `unmount()` when the form goes away
//
// After `unmount()` every dispatch fails with `Error::MissingFormProvider`.
// Asynchronous work holds a `lifetime()` token and checks it before
// dispatching, so late results from a defunct form are dropped instead.
//
// Each submit opens a new attempt with `begin_attempt()`. Results tagged
// with an older attempt are refused by `dispatch_for_attempt`, so a slow
// earlier submission can never overwrite a newer one.
//
// Clones share the same record, the same attempt counter and the same
// lifetime.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::action::{FormAction, reduce};
use super::state::{AsyncResult, FormState};
use crate::config::FormConfig;
use crate::error::{Error, Result};

/// Shared, action-driven state store for one form instance
#[derive(Debug, Clone)]
pub struct FormStore {
    state: Arc<RwLock<FormState>>,
    config: Arc<FormConfig>,
    attempt: Arc<AtomicU64>,
    lifetime: CancellationToken,
}

impl FormStore {
    /// Mount a store for a form rendered with `config`
    pub fn mount(config: FormConfig) -> Self {
        Self {
            state: Arc::new(RwLock::new(FormState::for_form(&config))),
            config: Arc::new(config),
            attempt: Arc::new(AtomicU64::new(0)),
            lifetime: CancellationToken::new(),
        }
    }

    /// The form's configuration
    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    /// A copy of the current state
    pub fn snapshot(&self) -> FormState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Apply an action to the state
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The action was applied
    /// - `Err(Error::MissingFormProvider)`: The store has been unmounted
    pub fn dispatch(&self, action: FormAction) -> Result<()> {
        if !self.is_mounted() {
            return Err(Error::missing_form_provider());
        }

        let mut guard = self.write();
        apply(&mut guard, action);
        Ok(())
    }

    /// Start a new submission attempt
    ///
    /// Resets both remote statuses to pending and returns the attempt's
    /// number. Results from every earlier attempt are refused from now on.
    pub fn begin_attempt(&self) -> Result<u64> {
        if !self.is_mounted() {
            return Err(Error::missing_form_provider());
        }

        let mut guard = self.write();
        let attempt = self.attempt.fetch_add(1, Ordering::SeqCst) + 1;
        apply(&mut guard, FormAction::SetDedupQuery(AsyncResult::Pending));
        apply(&mut guard, FormAction::SetLegacySubmission(AsyncResult::Pending));
        trace!("Started attempt {}", attempt);
        Ok(attempt)
    }

    /// Apply an action on behalf of `attempt`
    ///
    /// # Returns
    ///
    /// - `Ok(true)`: The action was applied
    /// - `Ok(false)`: A newer attempt has started; the action was dropped
    /// - `Err(Error::MissingFormProvider)`: The store has been unmounted
    pub fn dispatch_for_attempt(&self, attempt: u64, action: FormAction) -> Result<bool> {
        if !self.is_mounted() {
            return Err(Error::missing_form_provider());
        }

        let mut guard = self.write();
        if self.attempt.load(Ordering::SeqCst) != attempt {
            return Ok(false);
        }
        apply(&mut guard, action);
        Ok(true)
    }

    /// Number of the most recent attempt, 0 before the first submit
    pub fn current_attempt(&self) -> u64 {
        self.attempt.load(Ordering::SeqCst)
    }

    /// Token cancelled when the form unmounts
    pub fn lifetime(&self) -> CancellationToken {
        self.lifetime.child_token()
    }

    /// Whether the form is still mounted
    pub fn is_mounted(&self) -> bool {
        !self.lifetime.is_cancelled()
    }

    /// End the form's lifecycle
    pub fn unmount(&self) {
        self.lifetime.cancel();
    }

    fn write(&self) -> RwLockWriteGuard<'_, FormState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn apply(state: &mut FormState, action: FormAction) {
    trace!("Dispatching {}", action.kind());
    let current = std::mem::take(state);
    *state = reduce(current, action);
}
