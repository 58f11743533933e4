//! Generic scoped create/edit/delete/list controller for one entity type.
//!
//! A form owns the listing for its parent scope, the draft being edited and
//! a single user-facing error/notice line. Store failures never escape as
//! panics or leave partial state: the draft and editing selection survive a
//! failed call unchanged.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use procure_core::{DomainError, Entity, EntityKind, ParentScope, RecordKey};
use procure_infra::{EntityStore, StoreError};

use crate::confirm::Confirm;

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// Presence check failed; nothing was sent to the store.
    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no record is being edited")]
    NotEditing,

    /// The id is not part of the current listing.
    #[error("record {0} is not listed in this view")]
    UnknownRecord(i64),

    /// The view was torn down while the call was in flight.
    #[error("view was closed before the operation finished")]
    Cancelled,
}

/// Outcome of [`EntityForm::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum Submitted<E> {
    Created(E),
    Updated(E),
}

impl<E> Submitted<E> {
    pub fn record(&self) -> &E {
        match self {
            Submitted::Created(r) | Submitted::Updated(r) => r,
        }
    }
}

/// Outcome of [`EntityForm::delete`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Deletion {
    Deleted,
    /// The user said no; nothing happened.
    Declined,
}

/// Serializable view of one mounted form.
#[derive(Debug, Clone, Serialize)]
pub struct FormSnapshot {
    pub kind: EntityKind,
    pub view_id: Uuid,
    pub scope: ParentScope,
    pub records: Vec<serde_json::Value>,
    pub is_empty: bool,
    pub draft: serde_json::Value,
    pub editing: Option<i64>,
    pub loading: bool,
    pub error: Option<String>,
    pub notice: Option<String>,
}

pub struct EntityForm<E: Entity> {
    store: Arc<dyn EntityStore<E>>,
    scope: ParentScope,
    records: Vec<E>,
    draft: E::Draft,
    editing: Option<E::Id>,
    loading: bool,
    error: Option<String>,
    notice: Option<String>,
    token: CancellationToken,
    view_id: Uuid,
}

impl<E: Entity> std::fmt::Debug for EntityForm<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityForm")
            .field("kind", &E::KIND)
            .field("view_id", &self.view_id)
            .field("scope", &self.scope)
            .field("records", &self.records.len())
            .field("editing", &self.editing)
            .field("error", &self.error)
            .finish()
    }
}

/// Race a store call against the view's cancellation token.
pub(crate) async fn guarded<T>(
    token: &CancellationToken,
    call: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, FormError> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(FormError::Cancelled),
        result = call => result.map_err(FormError::Store),
    }
}

/// Confirmation text shown before deleting a record of `kind`.
pub fn delete_prompt(kind: EntityKind) -> String {
    format!("Are you sure you want to delete this {}?", kind.label())
}

fn capitalized(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl<E: Entity> EntityForm<E> {
    /// A form for `scope`. Nothing is loaded until [`EntityForm::refresh`].
    pub fn new(store: Arc<dyn EntityStore<E>>, scope: ParentScope, token: CancellationToken) -> Self {
        let draft = Self::blank_for(&scope);
        Self {
            store,
            scope,
            records: Vec::new(),
            draft,
            editing: None,
            loading: false,
            error: None,
            notice: None,
            token,
            view_id: Uuid::now_v7(),
        }
    }

    fn blank_for(scope: &ParentScope) -> E::Draft {
        let mut draft = E::blank_draft();
        E::attach_scope(&mut draft, scope);
        draft
    }

    pub fn kind(&self) -> EntityKind {
        E::KIND
    }

    pub fn view_id(&self) -> Uuid {
        self.view_id
    }

    pub fn scope(&self) -> &ParentScope {
        &self.scope
    }

    pub fn records(&self) -> &[E] {
        &self.records
    }

    pub fn record(&self, id: E::Id) -> Option<&E> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn draft(&self) -> &E::Draft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut E::Draft {
        &mut self.draft
    }

    pub fn set_draft(&mut self, draft: E::Draft) {
        self.draft = draft;
    }

    pub fn editing(&self) -> Option<E::Id> {
        self.editing
    }

    /// True while a store call started by this form is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.token
    }

    /// Tear the view down; in-flight calls resolve as [`FormError::Cancelled`].
    pub fn cancel(&self) {
        self.token.cancel();
    }

    fn fail(&mut self, verb: &str, err: &FormError) {
        if matches!(err, FormError::Cancelled) {
            return;
        }
        let message = format!("Failed to {verb} {}", E::KIND.label());
        warn!(kind = %E::KIND, view_id = %self.view_id, error = %err, "{message}");
        self.error = Some(message);
    }

    /// Re-list records for the current scope.
    #[instrument(skip_all, fields(kind = %E::KIND, view_id = %self.view_id))]
    pub async fn refresh(&mut self) -> Result<(), FormError> {
        self.loading = true;
        self.error = None;
        let result = guarded(&self.token, self.store.list_scoped(&self.scope)).await;
        self.loading = false;

        match result {
            Ok(records) => {
                self.records = records;
                Ok(())
            }
            Err(err) => {
                if !matches!(err, FormError::Cancelled) {
                    let message = format!("Failed to load {}", E::KIND.plural_label());
                    warn!(error = %err, "{message}");
                    self.error = Some(message);
                }
                Err(err)
            }
        }
    }

    /// Point the form at another parent scope and re-list.
    pub async fn rescope(&mut self, scope: ParentScope) -> Result<(), FormError> {
        if scope != self.scope {
            self.scope = scope;
            self.records.clear();
            self.editing = None;
            self.draft = Self::blank_for(&self.scope);
        }
        self.refresh().await
    }

    /// Create, or update when a record is being edited.
    pub async fn submit(&mut self) -> Result<Submitted<E>, FormError> {
        match self.editing {
            Some(_) => self.update().await.map(Submitted::Updated),
            None => self.create().await.map(Submitted::Created),
        }
    }

    /// Validate the draft, attach the parent keys and create the record.
    ///
    /// A failed re-list after a successful insert is reported on the form but
    /// does not fail the create: the returned record exists in the store.
    #[instrument(skip_all, fields(kind = %E::KIND, view_id = %self.view_id))]
    pub async fn create(&mut self) -> Result<E, FormError> {
        self.notice = None;
        if let Err(err) = E::validate(&self.draft) {
            self.error = Some(err.to_string());
            return Err(err.into());
        }

        let mut payload = self.draft.clone();
        E::attach_scope(&mut payload, &self.scope);

        self.loading = true;
        self.error = None;
        let result = guarded(&self.token, self.store.create(&payload)).await;
        self.loading = false;

        let created = match result {
            Ok(record) => record,
            Err(err) => {
                self.fail("add", &err);
                return Err(err);
            }
        };

        info!(id = %created.id(), "{} added", E::KIND);
        self.draft = Self::blank_for(&self.scope);
        let _ = self.refresh().await;
        self.notice = Some(format!("{} added", capitalized(E::KIND.label())));
        Ok(created)
    }

    /// Load a listed record into the draft for editing.
    pub fn begin_edit(&mut self, id: E::Id) -> Result<(), FormError> {
        let record = self
            .record(id)
            .ok_or(FormError::UnknownRecord(id.raw()))?;
        self.draft = record.to_draft();
        self.editing = Some(id);
        self.error = None;
        self.notice = None;
        Ok(())
    }

    /// Drop the editing selection and reset the draft.
    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.draft = Self::blank_for(&self.scope);
    }

    /// Send the full draft for the record being edited.
    #[instrument(skip_all, fields(kind = %E::KIND, view_id = %self.view_id))]
    pub async fn update(&mut self) -> Result<E, FormError> {
        let id = self.editing.ok_or(FormError::NotEditing)?;
        self.notice = None;
        if let Err(err) = E::validate(&self.draft) {
            self.error = Some(err.to_string());
            return Err(err.into());
        }

        let mut payload = self.draft.clone();
        E::attach_scope(&mut payload, &self.scope);

        self.loading = true;
        self.error = None;
        let result = guarded(&self.token, self.store.update(id, &payload)).await;
        self.loading = false;

        let updated = match result {
            Ok(record) => record,
            Err(err) => {
                self.fail("update", &err);
                return Err(err);
            }
        };

        info!(id = %id, "{} updated", E::KIND);
        self.cancel_edit();
        let _ = self.refresh().await;
        self.notice = Some(format!("{} updated", capitalized(E::KIND.label())));
        Ok(updated)
    }

    /// Ask for confirmation, then delete by id and re-list.
    #[instrument(skip_all, fields(kind = %E::KIND, view_id = %self.view_id, id = %id))]
    pub async fn delete(&mut self, id: E::Id, confirm: &dyn Confirm) -> Result<Deletion, FormError> {
        self.notice = None;
        if !confirm.confirm(&delete_prompt(E::KIND)) {
            return Ok(Deletion::Declined);
        }

        self.loading = true;
        self.error = None;
        let result = guarded(&self.token, self.store.delete(id)).await;
        self.loading = false;

        if let Err(err) = result {
            self.fail("delete", &err);
            return Err(err);
        }

        info!("{} deleted", E::KIND);
        if self.editing == Some(id) {
            self.cancel_edit();
        }
        let _ = self.refresh().await;
        self.notice = Some(format!("{} deleted", capitalized(E::KIND.label())));
        Ok(Deletion::Deleted)
    }

    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            kind: E::KIND,
            view_id: self.view_id,
            scope: self.scope.clone(),
            records: self
                .records
                .iter()
                .map(|r| serde_json::to_value(r).unwrap_or(serde_json::Value::Null))
                .collect(),
            is_empty: self.records.is_empty(),
            draft: serde_json::to_value(&self.draft).unwrap_or(serde_json::Value::Null),
            editing: self.editing.map(RecordKey::raw),
            loading: self.loading,
            error: self.error.clone(),
            notice: self.notice.clone(),
        }
    }
}
