use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use procure_core::{Entity, ParentScope, RecordKey};

use super::r#trait::{EntityStore, StoreError};

#[derive(Debug)]
struct Table<E: Entity> {
    rows: BTreeMap<E::Id, E>,
    next_id: i64,
}

/// In-memory table with generated integer keys.
///
/// Intended for tests/dev. Ids start at 1 and are never reused, like a
/// Postgres identity column.
#[derive(Debug)]
pub struct InMemoryEntityStore<E: Entity> {
    table: RwLock<Table<E>>,
}

impl<E: Entity> Default for InMemoryEntityStore<E> {
    fn default() -> Self {
        Self {
            table: RwLock::new(Table {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl<E: Entity> InMemoryEntityStore<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with records that already carry their ids.
    pub fn with_records(records: impl IntoIterator<Item = E>) -> Self {
        let store = Self::new();
        if let Ok(mut table) = store.table.write() {
            for record in records {
                let raw = record.id().raw();
                table.next_id = table.next_id.max(raw + 1);
                table.rows.insert(record.id(), record);
            }
        }
        store
    }

    pub fn len(&self) -> usize {
        self.table.read().map(|t| t.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Table<E>>, StoreError> {
        self.table
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Table<E>>, StoreError> {
        self.table
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }
}

#[async_trait]
impl<E: Entity> EntityStore<E> for InMemoryEntityStore<E> {
    async fn list_all(&self) -> Result<Vec<E>, StoreError> {
        Ok(self.read()?.rows.values().cloned().collect())
    }

    async fn list_scoped(&self, scope: &ParentScope) -> Result<Vec<E>, StoreError> {
        let table = self.read()?;
        let rows: Vec<E> = table
            .rows
            .values()
            .filter(|record| record.parent_scope().satisfies(scope))
            .cloned()
            .collect();
        debug!(table = E::KIND.table(), rows = rows.len(), "in-memory listing");
        Ok(rows)
    }

    async fn get(&self, id: E::Id) -> Result<Option<E>, StoreError> {
        Ok(self.read()?.rows.get(&id).cloned())
    }

    async fn create(&self, draft: &E::Draft) -> Result<E, StoreError> {
        let mut table = self.write()?;
        let id = E::Id::from_raw(table.next_id);
        table.next_id += 1;

        let record = E::assemble(id, draft.clone());
        table.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn update(&self, id: E::Id, draft: &E::Draft) -> Result<E, StoreError> {
        let mut table = self.write()?;
        match table.rows.get_mut(&id) {
            Some(existing) => {
                *existing = E::assemble(id, draft.clone());
                Ok(existing.clone())
            }
            None => Err(StoreError::not_found::<E>(id)),
        }
    }

    async fn delete(&self, id: E::Id) -> Result<(), StoreError> {
        let mut table = self.write()?;
        match table.rows.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::not_found::<E>(id)),
        }
    }
}
