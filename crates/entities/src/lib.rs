//! `procure-entities`: the seven procurement records.
//!
//! Each record is split into its generated identifier and an editable
//! `*Draft` payload (flattened on the wire), so the same payload type is used
//! for form state, create and update calls.

pub mod compliance;
pub mod inventory;
pub mod logistics;
pub mod product;
pub mod purchase_order;
pub mod quality_control;
pub mod vendor;

pub use compliance::{VendorCompliance, VendorComplianceDraft};
pub use inventory::{Inventory, InventoryDraft};
pub use logistics::{Logistics, LogisticsDraft};
pub use product::{Product, ProductDraft};
pub use purchase_order::{PurchaseOrder, PurchaseOrderDraft};
pub use quality_control::{QualityControl, QualityControlDraft};
pub use vendor::{Vendor, VendorDraft};

use chrono::{NaiveDate, Utc};

/// Date used to pre-fill date inputs on a blank form (UTC calendar day).
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
