//! `procure-client`
//!
//! **Responsibility:** the procurement drill-down as a headless client.
//!
//! This crate provides:
//! - [`EntityForm`]: list/create/edit/delete for one table, scoped by parent keys
//! - [`MountedForms`]: the forms visible in each workflow state
//! - [`Session`]: the workflow controller wired to the forms and the stores
//!
//! Rendering is left to the caller; everything a view needs is available
//! through the form accessors or as a serializable [`SessionSnapshot`].

pub mod confirm;
pub mod form;
pub mod session;
pub mod stores;
pub mod views;

pub use confirm::{AlwaysAnswer, Confirm};
pub use form::{Deletion, EntityForm, FormError, FormSnapshot, Submitted};
pub use session::{Session, SessionError, SessionResult, SessionSnapshot};
pub use stores::{Mountable, Stores};
pub use views::MountedForms;
