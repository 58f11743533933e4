//! `procure-workflow`: the vendor → product → order drill-down.
//!
//! The controller is a pure state machine: it decides which scope levels are
//! entered or left, and the current [`WorkflowState`] decides which forms are
//! mounted with which parent keys. Store access and cancellation live in the
//! client crate.

pub mod controller;
pub mod state;

pub use controller::{DeletePolicy, ScopeLevel, WorkflowCommand, WorkflowController, WorkflowEvent};
pub use state::{MountedView, WorkflowState};
