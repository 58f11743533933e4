use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use procure_core::{Entity, ParentScope, RecordKey};

/// Entity store operation error.
///
/// These are **infrastructure errors** (transport, auth, constraints) as
/// opposed to domain errors (presence checks, workflow transitions).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport failure (connect, timeout, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// The store rejected the credential.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Unique, foreign-key, not-null or check constraint violated.
    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("{table} record {id} not found")]
    NotFound { table: &'static str, id: i64 },

    /// Any other non-success response.
    #[error("store returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("failed to decode {table} response: {message}")]
    Decode { table: &'static str, message: String },

    #[error("database error: {0}")]
    Database(String),

    /// The backend cannot serve requests (closed pool, poisoned lock, bad client setup).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn not_found<E: Entity>(id: E::Id) -> Self {
        StoreError::NotFound {
            table: E::KIND.table(),
            id: id.raw(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// CRUD surface over one remote table.
///
/// No transactions, batching or pagination: every listing is a snapshot at
/// call time with no consistency guarantee against concurrent writers.
#[async_trait]
pub trait EntityStore<E: Entity>: Send + Sync {
    /// Every record in the table.
    async fn list_all(&self) -> Result<Vec<E>, StoreError>;

    /// Records whose foreign keys equal every key of `scope`.
    ///
    /// The default filters `list_all` locally; backends override it to filter
    /// on the store side.
    async fn list_scoped(&self, scope: &ParentScope) -> Result<Vec<E>, StoreError> {
        let all = self.list_all().await?;
        Ok(all
            .into_iter()
            .filter(|record| record.parent_scope().satisfies(scope))
            .collect())
    }

    async fn get(&self, id: E::Id) -> Result<Option<E>, StoreError>;

    /// Insert `draft`; returns the stored record with its generated id.
    async fn create(&self, draft: &E::Draft) -> Result<E, StoreError>;

    /// Overwrite every column of `id` with `draft`.
    ///
    /// Fails with [`StoreError::NotFound`] if `id` does not exist.
    async fn update(&self, id: E::Id, draft: &E::Draft) -> Result<E, StoreError>;

    /// Fails with [`StoreError::NotFound`] if `id` does not exist.
    async fn delete(&self, id: E::Id) -> Result<(), StoreError>;
}

#[async_trait]
impl<E, S> EntityStore<E> for Arc<S>
where
    E: Entity,
    S: EntityStore<E> + ?Sized,
{
    async fn list_all(&self) -> Result<Vec<E>, StoreError> {
        (**self).list_all().await
    }

    async fn list_scoped(&self, scope: &ParentScope) -> Result<Vec<E>, StoreError> {
        (**self).list_scoped(scope).await
    }

    async fn get(&self, id: E::Id) -> Result<Option<E>, StoreError> {
        (**self).get(id).await
    }

    async fn create(&self, draft: &E::Draft) -> Result<E, StoreError> {
        (**self).create(draft).await
    }

    async fn update(&self, id: E::Id, draft: &E::Draft) -> Result<E, StoreError> {
        (**self).update(id, draft).await
    }

    async fn delete(&self, id: E::Id) -> Result<(), StoreError> {
        (**self).delete(id).await
    }
}
