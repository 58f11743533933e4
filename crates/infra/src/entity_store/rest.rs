//! PostgREST backend (`{project}/rest/v1/{table}`).
//!
//! | Operation | Request |
//! |-----------|---------|
//! | list      | `GET    ?select=*&{fk}=eq.{id}&order={pk}.asc` |
//! | get       | `GET    ?select=*&{pk}=eq.{id}` |
//! | create    | `POST   ` body = draft, `Prefer: return=representation` |
//! | update    | `PATCH  ?{pk}=eq.{id}` body = draft, `Prefer: return=representation` |
//! | delete    | `DELETE ?{pk}=eq.{id}`, `Prefer: return=representation` |
//!
//! Mutations ask for the affected rows back; an empty array means no row
//! matched the primary key and is reported as [`StoreError::NotFound`].

use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use procure_core::{Entity, ParentScope, RecordKey};

use super::r#trait::{EntityStore, StoreError};
use crate::config::StoreConfig;

const PREFER: &str = "Prefer";
const RETURN_REPRESENTATION: &str = "return=representation";

/// Shared HTTP client for every table of one project.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RestClient {
    /// Build a client with the API key installed as default headers.
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| StoreError::Unavailable("API key is not a valid header value".into()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| StoreError::Unavailable("API key is not a valid header value".into()))?;

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("apikey"), key);
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| StoreError::Unavailable(format!("client init failed: {e}")))?;

        Ok(Self {
            http,
            base_url: config.rest_url.clone(),
        })
    }

    /// Typed handle for the table of `E`.
    pub fn table<E: Entity>(&self) -> Result<RestTable<E>, StoreError> {
        let mut endpoint = self.base_url.clone();
        endpoint
            .path_segments_mut()
            .map_err(|_| StoreError::Unavailable(format!("{} is not a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(["rest", "v1", E::KIND.table()]);

        Ok(RestTable {
            http: self.http.clone(),
            endpoint,
            _entity: PhantomData,
        })
    }
}

/// [`EntityStore`] over one PostgREST table.
#[derive(Debug)]
pub struct RestTable<E> {
    http: reqwest::Client,
    endpoint: Url,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for RestTable<E> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            endpoint: self.endpoint.clone(),
            _entity: PhantomData,
        }
    }
}

/// PostgREST error body.
#[derive(Debug, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl<E: Entity> RestTable<E> {
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn eq_filter(column: &str, id: i64) -> (String, String) {
        (column.to_string(), format!("eq.{id}"))
    }

    fn scope_filters(scope: &ParentScope) -> Vec<(String, String)> {
        scope
            .keys()
            .iter()
            .map(|k| Self::eq_filter(k.key.column(), k.id))
            .collect()
    }

    async fn fetch_rows(&self, filters: Vec<(String, String)>) -> Result<Vec<E>, StoreError> {
        let mut query = vec![("select".to_string(), "*".to_string())];
        query.extend(filters);
        query.push((
            "order".to_string(),
            format!("{}.asc", E::KIND.id_column()),
        ));

        let resp = self
            .http
            .get(self.endpoint.clone())
            .query(&query)
            .send()
            .await
            .map_err(network)?;

        decode_rows(check(resp).await?).await
    }

    fn only_row(rows: Vec<E>, id: E::Id) -> Result<E, StoreError> {
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::not_found::<E>(id))
    }
}

fn network(err: reqwest::Error) -> StoreError {
    StoreError::Network(err.to_string())
}

/// Map a non-success response onto the store error taxonomy.
async fn check(resp: Response) -> Result<Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let parsed: Option<PostgrestError> = serde_json::from_str(&body).ok();
    let message = parsed
        .as_ref()
        .and_then(|p| p.message.clone())
        .unwrap_or_else(|| body.clone());

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Unauthorized(message),
        StatusCode::CONFLICT => StoreError::Constraint(message),
        // Postgres integrity_constraint_violation class (23xxx).
        _ if parsed
            .as_ref()
            .and_then(|p| p.code.as_deref())
            .is_some_and(|code| code.starts_with("23")) =>
        {
            StoreError::Constraint(message)
        }
        _ => StoreError::Api {
            status: status.as_u16(),
            body,
        },
    })
}

async fn decode_rows<E: Entity>(resp: Response) -> Result<Vec<E>, StoreError> {
    resp.json::<Vec<E>>().await.map_err(|e| StoreError::Decode {
        table: E::KIND.table(),
        message: e.to_string(),
    })
}

#[async_trait]
impl<E: Entity> EntityStore<E> for RestTable<E> {
    #[instrument(skip(self), fields(table = E::KIND.table()), err)]
    async fn list_all(&self) -> Result<Vec<E>, StoreError> {
        self.fetch_rows(Vec::new()).await
    }

    #[instrument(skip(self), fields(table = E::KIND.table()), err)]
    async fn list_scoped(&self, scope: &ParentScope) -> Result<Vec<E>, StoreError> {
        let rows = self.fetch_rows(Self::scope_filters(scope)).await?;
        debug!(rows = rows.len(), "listing fetched");
        Ok(rows)
    }

    #[instrument(skip(self), fields(table = E::KIND.table(), id = %id), err)]
    async fn get(&self, id: E::Id) -> Result<Option<E>, StoreError> {
        let rows = self
            .fetch_rows(vec![Self::eq_filter(E::KIND.id_column(), id.raw())])
            .await?;
        Ok(rows.into_iter().next())
    }

    #[instrument(skip(self, draft), fields(table = E::KIND.table()), err)]
    async fn create(&self, draft: &E::Draft) -> Result<E, StoreError> {
        let resp = self
            .http
            .post(self.endpoint.clone())
            .header(PREFER, RETURN_REPRESENTATION)
            .json(draft)
            .send()
            .await
            .map_err(network)?;

        let rows: Vec<E> = decode_rows(check(resp).await?).await?;
        rows.into_iter().next().ok_or_else(|| StoreError::Decode {
            table: E::KIND.table(),
            message: "insert returned no representation".to_string(),
        })
    }

    #[instrument(skip(self, draft), fields(table = E::KIND.table(), id = %id), err)]
    async fn update(&self, id: E::Id, draft: &E::Draft) -> Result<E, StoreError> {
        let resp = self
            .http
            .patch(self.endpoint.clone())
            .query(&[Self::eq_filter(E::KIND.id_column(), id.raw())])
            .header(PREFER, RETURN_REPRESENTATION)
            .json(draft)
            .send()
            .await
            .map_err(network)?;

        let rows = decode_rows(check(resp).await?).await?;
        Self::only_row(rows, id)
    }

    #[instrument(skip(self), fields(table = E::KIND.table(), id = %id), err)]
    async fn delete(&self, id: E::Id) -> Result<(), StoreError> {
        let resp = self
            .http
            .delete(self.endpoint.clone())
            .query(&[Self::eq_filter(E::KIND.id_column(), id.raw())])
            .header(PREFER, RETURN_REPRESENTATION)
            .send()
            .await
            .map_err(network)?;

        let rows: Vec<E> = decode_rows(check(resp).await?).await?;
        Self::only_row(rows, id).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procure_core::{ForeignKey, ProductId, VendorId};
    use procure_entities::{PurchaseOrder, Vendor};

    #[test]
    fn table_endpoint_keeps_project_path() {
        let cfg = StoreConfig::local("https://example.com/project", "k").unwrap();
        let client = RestClient::new(&cfg).unwrap();
        let orders = client.table::<PurchaseOrder>().unwrap();
        assert_eq!(
            orders.endpoint().as_str(),
            "https://example.com/project/rest/v1/PurchaseOrders"
        );

        let cfg = StoreConfig::local("http://127.0.0.1:9000", "k").unwrap();
        let client = RestClient::new(&cfg).unwrap();
        let vendors = client.table::<Vendor>().unwrap();
        assert_eq!(vendors.endpoint().as_str(), "http://127.0.0.1:9000/rest/v1/Vendors");
    }

    #[test]
    fn api_key_with_newline_is_rejected() {
        let cfg = StoreConfig::local("http://127.0.0.1:9000", "bad\nkey").unwrap();
        assert!(matches!(RestClient::new(&cfg), Err(StoreError::Unavailable(_))));
    }

    #[test]
    fn scope_becomes_eq_filters() {
        let scope = ParentScope::unscoped()
            .with(ForeignKey::Vendor, VendorId::new(1))
            .with(ForeignKey::Product, ProductId::new(7));
        assert_eq!(
            RestTable::<PurchaseOrder>::scope_filters(&scope),
            vec![
                ("vendorid".to_string(), "eq.1".to_string()),
                ("productid".to_string(), "eq.7".to_string())
            ]
        );
    }
}
