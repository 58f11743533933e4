//! `procure-core`: domain foundation building blocks.
//!
//! Record identifiers, the entity descriptor trait, parent scopes and the
//! state-machine trait. No IO lives here.

pub mod entity;
pub mod error;
pub mod id;
pub mod machine;
pub mod required;

pub use entity::{Entity, EntityKind, ForeignKey, ParentKey, ParentScope};
pub use error::{DomainError, DomainResult};
pub use id::{
    ComplianceId, InventoryId, LogisticsId, PoNumber, ProductId, QcId, RecordKey, VendorId,
};
pub use machine::StateMachine;
pub use required::Required;
