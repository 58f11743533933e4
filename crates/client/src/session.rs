//! A user session: one workflow controller driving the mounted forms.
//!
//! The controller decides the drill-down state; the session turns each state
//! change into a remount. Forms of the previous state are cancelled before the
//! new ones load, so a late response can never land in a view that is gone.

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use procure_core::{DomainError, EntityKind, RecordKey, StateMachine};
use procure_workflow::{DeletePolicy, WorkflowCommand, WorkflowController, WorkflowState};

use crate::confirm::Confirm;
use crate::form::{
    Deletion, EntityForm, FormError, FormSnapshot, Submitted, delete_prompt, guarded,
};
use crate::stores::{Mountable, Stores};
use crate::views::MountedForms;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Form(#[from] FormError),

    /// The controller rejected a transition.
    #[error(transparent)]
    Workflow(#[from] DomainError),

    #[error("no {0} form is mounted in the current state")]
    NotMounted(EntityKind),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Serializable picture of everything the user currently sees.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    #[serde(flatten)]
    pub state: WorkflowState,
    pub version: u64,
    pub forms: Vec<FormSnapshot>,
    /// Failure of an action on a selected scope record itself.
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct Session {
    controller: WorkflowController,
    stores: Stores,
    forms: MountedForms,
    root: CancellationToken,
    error: Option<String>,
}

impl Session {
    /// A session at `NoVendor` with the vendor form mounted but not loaded.
    pub fn new(stores: Stores, policy: DeletePolicy) -> Self {
        let controller = WorkflowController::new(policy);
        let root = CancellationToken::new();
        let forms = MountedForms::mount(&controller.state(), &stores, &root);
        Self {
            controller,
            stores,
            forms,
            root,
            error: None,
        }
    }

    /// [`Session::new`] followed by the initial vendor listing.
    ///
    /// A failed listing is recorded on the vendor form, not returned.
    pub async fn start(stores: Stores, policy: DeletePolicy) -> Self {
        let mut session = Self::new(stores, policy);
        let _ = session.refresh().await;
        session
    }

    /// Re-list every mounted form.
    pub async fn refresh(&mut self) -> SessionResult<()> {
        self.forms.refresh_all().await?;
        Ok(())
    }

    pub fn state(&self) -> WorkflowState {
        self.controller.state()
    }

    pub fn version(&self) -> u64 {
        self.controller.version()
    }

    pub fn policy(&self) -> DeletePolicy {
        self.controller.policy()
    }

    /// Message of the last failed delete of a selected scope record.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn forms(&self) -> &MountedForms {
        &self.forms
    }

    /// The mounted form for `E`, if its view is visible in the current state.
    pub fn form<E: Mountable>(&self) -> Option<&EntityForm<E>> {
        E::form(&self.forms)
    }

    pub fn form_mut<E: Mountable>(&mut self) -> SessionResult<&mut EntityForm<E>> {
        E::form_mut(&mut self.forms).ok_or(SessionError::NotMounted(E::KIND))
    }

    /// Submit the `E` form. A newly created vendor, product or purchase order
    /// becomes the active scope one level deeper.
    #[instrument(skip_all, fields(kind = %E::KIND))]
    pub async fn submit<E: Mountable>(&mut self) -> SessionResult<Submitted<E>> {
        let submitted = self.form_mut::<E>()?.submit().await?;

        if let Submitted::Created(record) = &submitted {
            if let Some(command) = WorkflowCommand::select(E::KIND, record.id().raw()) {
                self.dispatch(command).await?;
            }
        }
        Ok(submitted)
    }

    /// Make a listed vendor, product or purchase order the active scope.
    #[instrument(skip_all, fields(kind = %E::KIND, id = %id))]
    pub async fn select<E: Mountable>(&mut self, id: E::Id) -> SessionResult<()> {
        let form = self.form::<E>().ok_or(SessionError::NotMounted(E::KIND))?;
        if form.record(id).is_none() {
            return Err(FormError::UnknownRecord(id.raw()).into());
        }
        let command = WorkflowCommand::select(E::KIND, id.raw()).ok_or_else(|| {
            DomainError::invariant(format!("{} records do not open a scope", E::KIND))
        })?;
        self.dispatch(command).await
    }

    /// Delete a record of `E`. Under [`DeletePolicy::Reconcile`] deleting an
    /// active scope record also leaves that scope.
    ///
    /// Goes through the mounted `E` form when there is one. The selected
    /// vendor, product or order has no mounted form once its children are
    /// shown; it is deleted in the store directly after the same confirmation.
    /// Any other record without a mounted form is refused.
    #[instrument(skip_all, fields(kind = %E::KIND, id = %id))]
    pub async fn delete<E: Mountable>(
        &mut self,
        id: E::Id,
        confirm: &dyn Confirm,
    ) -> SessionResult<Deletion> {
        let outcome = match E::form_mut(&mut self.forms) {
            Some(form) => form.delete(id, confirm).await?,
            None if self.controller.state().holds(E::KIND, id.raw()) => {
                self.delete_scope_record::<E>(id, confirm).await?
            }
            None => return Err(SessionError::NotMounted(E::KIND)),
        };
        if outcome == Deletion::Deleted {
            self.dispatch(WorkflowCommand::RecordDeleted {
                kind: E::KIND,
                id: id.raw(),
            })
            .await?;
        }
        Ok(outcome)
    }

    async fn delete_scope_record<E: Mountable>(
        &mut self,
        id: E::Id,
        confirm: &dyn Confirm,
    ) -> Result<Deletion, FormError> {
        self.error = None;
        if !confirm.confirm(&delete_prompt(E::KIND)) {
            return Ok(Deletion::Declined);
        }
        let store = self.stores.get::<E>();
        if let Err(err) = guarded(&self.root, store.delete(id)).await {
            if !matches!(err, FormError::Cancelled) {
                let message = format!("Failed to delete {}", E::KIND.label());
                warn!(error = %err, "{message}");
                self.error = Some(message);
            }
            return Err(err);
        }
        info!("{} deleted", E::KIND);
        Ok(Deletion::Deleted)
    }

    /// Leave the innermost scope.
    pub async fn back(&mut self) -> SessionResult<()> {
        self.dispatch(WorkflowCommand::Back).await
    }

    /// Run a command through the controller and remount if the state moved.
    ///
    /// A rejected command leaves the state and the mounted forms untouched.
    async fn dispatch(&mut self, command: WorkflowCommand) -> SessionResult<()> {
        let from = self.controller.state();
        let events = self.controller.execute(&command).map_err(|err| {
            warn!(?command, ?from, error = %err, "workflow command rejected");
            err
        })?;
        if events.is_empty() {
            return Ok(());
        }

        let to = self.controller.state();
        info!(?from, ?to, version = self.controller.version(), "workflow state changed");

        self.forms.cancel();
        self.error = None;
        self.forms = MountedForms::mount(&to, &self.stores, &self.root);
        // A failed listing stays on the form; the transition itself succeeded.
        let _ = self.forms.refresh_all().await;
        Ok(())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.controller.state(),
            version: self.controller.version(),
            forms: self.forms.snapshots(),
            error: self.error.clone(),
        }
    }

    /// Cancel every in-flight call; the session should be dropped afterwards.
    pub fn shutdown(&self) {
        self.root.cancel();
        info!("session closed");
    }
}
