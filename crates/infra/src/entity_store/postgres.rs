//! Postgres-backed entity store.
//!
//! Talks to the same tables as the REST backend, over a direct sqlx pool.
//! Rows travel as `jsonb` in both directions (`to_jsonb(t)` out,
//! `jsonb_populate_record` in) so one set of queries serves all seven tables
//! and the serde field names stay the single source of column names.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database | `23xxx` (integrity constraint) | `Constraint` |
//! | Database | Any other | `Database` |
//! | PoolClosed / PoolTimedOut | N/A | `Unavailable` |
//! | Io / Tls | N/A | `Network` |
//! | Other | N/A | `Database` |

use std::marker::PhantomData;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{debug, instrument};

use procure_core::{Entity, EntityKind, ParentScope, RecordKey};

use super::r#trait::{EntityStore, StoreError};
use crate::config::StoreConfig;

/// Open a small pool against `config.database_url`.
pub async fn connect(config: &StoreConfig) -> Result<PgPool, StoreError> {
    let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| StoreError::Unavailable("DATABASE_URL is not configured".to_string()))?;

    PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(config.timeout())
        .connect(url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))
}

/// [`EntityStore`] over one Postgres table.
#[derive(Debug)]
pub struct PgEntityStore<E> {
    pool: PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for PgEntityStore<E> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> PgEntityStore<E> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    async fn fetch(&self, operation: &str, sql: &str, keys: &[i64]) -> Result<Vec<E>, StoreError> {
        let mut query = sqlx::query_scalar::<_, JsonValue>(sql);
        for key in keys {
            query = query.bind(*key);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        rows.into_iter().map(decode::<E>).collect()
    }

    async fn write(
        &self,
        operation: &str,
        sql: &str,
        payload: JsonValue,
        id: Option<i64>,
    ) -> Result<Option<E>, StoreError> {
        let mut query = sqlx::query_scalar::<_, JsonValue>(sql).bind(Json(payload));
        if let Some(id) = id {
            query = query.bind(id);
        }
        query
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?
            .map(decode::<E>)
            .transpose()
    }
}

fn decode<E: Entity>(row: JsonValue) -> Result<E, StoreError> {
    serde_json::from_value(row).map_err(|e| StoreError::Decode {
        table: E::KIND.table(),
        message: e.to_string(),
    })
}

/// Serialize a draft and return it with its column names.
fn draft_columns<E: Entity>(draft: &E::Draft) -> Result<(JsonValue, Vec<String>), StoreError> {
    let payload = serde_json::to_value(draft).map_err(|e| StoreError::Decode {
        table: E::KIND.table(),
        message: format!("draft serialization failed: {e}"),
    })?;
    let columns = match &payload {
        JsonValue::Object(map) if !map.is_empty() => map.keys().cloned().collect(),
        _ => {
            return Err(StoreError::Decode {
                table: E::KIND.table(),
                message: "draft must serialize to a non-empty object".to_string(),
            });
        }
    };
    Ok((payload, columns))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn column_list(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `SELECT` with one `$n` placeholder per scope key, bound in key order.
pub(crate) fn select_sql(kind: EntityKind, filter_columns: &[&str]) -> String {
    let mut sql = format!("SELECT to_jsonb(t) FROM {} AS t", quote_ident(kind.table()));
    for (idx, column) in filter_columns.iter().enumerate() {
        sql.push_str(if idx == 0 { " WHERE " } else { " AND " });
        sql.push_str(&format!("t.{} = ${}", quote_ident(column), idx + 1));
    }
    sql.push_str(&format!(" ORDER BY t.{}", quote_ident(kind.id_column())));
    sql
}

pub(crate) fn insert_sql(kind: EntityKind, columns: &[String]) -> String {
    let table = quote_ident(kind.table());
    let cols = column_list(columns);
    format!(
        "INSERT INTO {table} AS t ({cols}) \
         SELECT {cols} FROM jsonb_populate_record(NULL::{table}, $1) \
         RETURNING to_jsonb(t)"
    )
}

pub(crate) fn update_sql(kind: EntityKind, columns: &[String]) -> String {
    let table = quote_ident(kind.table());
    let cols = column_list(columns);
    let id = quote_ident(kind.id_column());
    format!(
        "UPDATE {table} AS t SET ({cols}) = \
         (SELECT {cols} FROM jsonb_populate_record(NULL::{table}, $1)) \
         WHERE t.{id} = $2 RETURNING to_jsonb(t)"
    )
}

pub(crate) fn delete_sql(kind: EntityKind) -> String {
    let id = quote_ident(kind.id_column());
    format!(
        "DELETE FROM {} AS t WHERE t.{id} = $1 RETURNING true",
        quote_ident(kind.table())
    )
}

#[async_trait]
impl<E: Entity> EntityStore<E> for PgEntityStore<E> {
    #[instrument(skip(self), fields(table = E::KIND.table()), err)]
    async fn list_all(&self) -> Result<Vec<E>, StoreError> {
        self.fetch("list_all", &select_sql(E::KIND, &[]), &[]).await
    }

    #[instrument(skip(self), fields(table = E::KIND.table()), err)]
    async fn list_scoped(&self, scope: &ParentScope) -> Result<Vec<E>, StoreError> {
        let columns: Vec<&str> = scope.keys().iter().map(|k| k.key.column()).collect();
        let keys: Vec<i64> = scope.keys().iter().map(|k| k.id).collect();
        let rows = self
            .fetch("list_scoped", &select_sql(E::KIND, &columns), &keys)
            .await?;
        debug!(rows = rows.len(), "listing fetched");
        Ok(rows)
    }

    #[instrument(skip(self), fields(table = E::KIND.table(), id = %id), err)]
    async fn get(&self, id: E::Id) -> Result<Option<E>, StoreError> {
        let sql = select_sql(E::KIND, &[E::KIND.id_column()]);
        Ok(self.fetch("get", &sql, &[id.raw()]).await?.into_iter().next())
    }

    #[instrument(skip(self, draft), fields(table = E::KIND.table()), err)]
    async fn create(&self, draft: &E::Draft) -> Result<E, StoreError> {
        let (payload, columns) = draft_columns::<E>(draft)?;
        self.write("create", &insert_sql(E::KIND, &columns), payload, None)
            .await?
            .ok_or_else(|| StoreError::Database("insert returned no row".to_string()))
    }

    #[instrument(skip(self, draft), fields(table = E::KIND.table(), id = %id), err)]
    async fn update(&self, id: E::Id, draft: &E::Draft) -> Result<E, StoreError> {
        let (payload, columns) = draft_columns::<E>(draft)?;
        self.write("update", &update_sql(E::KIND, &columns), payload, Some(id.raw()))
            .await?
            .ok_or_else(|| StoreError::not_found::<E>(id))
    }

    #[instrument(skip(self), fields(table = E::KIND.table(), id = %id), err)]
    async fn delete(&self, id: E::Id) -> Result<(), StoreError> {
        let deleted = sqlx::query_scalar::<_, bool>(&delete_sql(E::KIND))
            .bind(id.raw())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;
        match deleted {
            Some(_) => Ok(()),
            None => Err(StoreError::not_found::<E>(id)),
        }
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("{} failed: {}", operation, db_err.message());
            match db_err.code() {
                Some(code) if code.starts_with("23") => StoreError::Constraint(msg),
                _ => StoreError::Database(msg),
            }
        }
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => {
            StoreError::Unavailable(format!("connection pool unavailable in {}", operation))
        }
        sqlx::Error::Io(e) => StoreError::Network(format!("{} failed: {}", operation, e)),
        sqlx::Error::Tls(e) => StoreError::Network(format!("{} failed: {}", operation, e)),
        other => StoreError::Database(format!("sqlx error in {}: {}", operation, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procure_entities::{Product, ProductDraft};

    #[test]
    fn select_filters_by_each_scope_column_in_order() {
        let sql = select_sql(EntityKind::PurchaseOrder, &["vendorid", "productid"]);
        assert_eq!(
            sql,
            "SELECT to_jsonb(t) FROM \"PurchaseOrders\" AS t \
             WHERE t.\"vendorid\" = $1 AND t.\"productid\" = $2 ORDER BY t.\"ponumber\""
        );
    }

    #[test]
    fn unscoped_select_has_no_where_clause() {
        let sql = select_sql(EntityKind::Vendor, &[]);
        assert!(!sql.contains("WHERE"));
        assert!(sql.ends_with("ORDER BY t.\"vendorid\""));
    }

    #[test]
    fn insert_and_update_use_draft_columns() {
        let (payload, columns) = draft_columns::<Product>(&ProductDraft::named("Widget")).unwrap();
        assert_eq!(payload["productname"], "Widget");
        assert!(columns.contains(&"vendorid".to_string()));
        assert!(!columns.contains(&"productid".to_string()));

        let insert = insert_sql(EntityKind::Product, &columns);
        assert!(insert.starts_with("INSERT INTO \"Products\" AS t ("));
        assert!(insert.contains("jsonb_populate_record(NULL::\"Products\", $1)"));

        let update = update_sql(EntityKind::Product, &columns);
        assert!(update.contains("WHERE t.\"productid\" = $2"));
        assert!(update.ends_with("RETURNING to_jsonb(t)"));
    }

    #[test]
    fn delete_reports_whether_a_row_matched() {
        assert_eq!(
            delete_sql(EntityKind::PurchaseOrder),
            "DELETE FROM \"PurchaseOrders\" AS t WHERE t.\"ponumber\" = $1 RETURNING true"
        );
    }

    #[test]
    fn quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}
