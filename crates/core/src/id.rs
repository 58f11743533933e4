//! Strongly-typed record identifiers.
//!
//! Every remote table uses an auto-generated integer primary key. The newtypes
//! below keep a vendor id from being passed where a purchase-order number is
//! expected.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Common behaviour of all record identifiers.
pub trait RecordKey:
    Copy + Eq + Ord + core::hash::Hash + core::fmt::Debug + core::fmt::Display + Send + Sync + 'static
{
    /// Wrap a raw primary-key value as returned by the store.
    fn from_raw(raw: i64) -> Self;

    /// Raw primary-key value as stored remotely.
    fn raw(self) -> i64;
}

/// Identifier of a vendor (`Vendors.vendorid`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VendorId(i64);

/// Identifier of a product (`Products.productid`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i64);

/// Purchase-order number (`PurchaseOrders.ponumber`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoNumber(i64);

/// Identifier of an inventory record (`Inventory.inventoryid`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventoryId(i64);

/// Identifier of a logistics record (`Logistics.logisticsid`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogisticsId(i64);

/// Identifier of a quality-control record (`QualityControl.qcid`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QcId(i64);

/// Identifier of a vendor compliance record (`VendorCompliance.complianceid`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComplianceId(i64);

macro_rules! impl_record_key {
    ($t:ty, $name:literal) => {
        impl $t {
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl RecordKey for $t {
            fn from_raw(raw: i64) -> Self {
                Self(raw)
            }

            fn raw(self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(raw))
            }
        }
    };
}

impl_record_key!(VendorId, "VendorId");
impl_record_key!(ProductId, "ProductId");
impl_record_key!(PoNumber, "PoNumber");
impl_record_key!(InventoryId, "InventoryId");
impl_record_key!(LogisticsId, "LogisticsId");
impl_record_key!(QcId, "QcId");
impl_record_key!(ComplianceId, "ComplianceId");
