//! Infrastructure layer: entity store backends and their configuration.

pub mod config;
pub mod entity_store;

pub use config::{ConfigError, StoreConfig};
pub use entity_store::{
    EntityStore, InMemoryEntityStore, PgEntityStore, RestClient, RestTable, StoreError,
};
