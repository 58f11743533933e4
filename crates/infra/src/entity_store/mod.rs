//! Per-entity CRUD boundary.
//!
//! One store instance serves one table. Backends:
//!
//! - [`InMemoryEntityStore`]: tests/dev, generated ids start at 1.
//! - [`RestTable`]: PostgREST-style HTTP API (hosted Supabase project).
//! - [`PgEntityStore`]: direct Postgres connection via sqlx.
//!
//! All backends filter listings by parent keys on the store side.

pub mod in_memory;
pub mod postgres;
pub mod rest;
pub mod r#trait;

pub use in_memory::InMemoryEntityStore;
pub use postgres::PgEntityStore;
pub use rest::{RestClient, RestTable};
pub use r#trait::{EntityStore, StoreError};
