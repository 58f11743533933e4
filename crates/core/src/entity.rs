//! Entity descriptors: identity, table mapping and parent scoping.
//!
//! The workflow core only ever needs three things from a business record: its
//! own identifier, the foreign keys that tie it to a parent, and the table it
//! lives in. Everything else is an opaque payload (`Entity::Draft`).

use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::DomainResult;
use crate::id::RecordKey;

/// The seven record types of the procurement flow.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Vendor,
    Product,
    Inventory,
    PurchaseOrder,
    Logistics,
    QualityControl,
    VendorCompliance,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Vendor,
        EntityKind::Product,
        EntityKind::Inventory,
        EntityKind::PurchaseOrder,
        EntityKind::Logistics,
        EntityKind::QualityControl,
        EntityKind::VendorCompliance,
    ];

    /// Remote table name.
    pub fn table(self) -> &'static str {
        match self {
            EntityKind::Vendor => "Vendors",
            EntityKind::Product => "Products",
            EntityKind::Inventory => "Inventory",
            EntityKind::PurchaseOrder => "PurchaseOrders",
            EntityKind::Logistics => "Logistics",
            EntityKind::QualityControl => "QualityControl",
            EntityKind::VendorCompliance => "VendorCompliance",
        }
    }

    /// Primary-key column.
    pub fn id_column(self) -> &'static str {
        match self {
            EntityKind::Vendor => "vendorid",
            EntityKind::Product => "productid",
            EntityKind::Inventory => "inventoryid",
            EntityKind::PurchaseOrder => "ponumber",
            EntityKind::Logistics => "logisticsid",
            EntityKind::QualityControl => "qcid",
            EntityKind::VendorCompliance => "complianceid",
        }
    }

    /// Foreign keys that scope this record to its parent(s).
    pub fn parent_keys(self) -> &'static [ForeignKey] {
        match self {
            EntityKind::Vendor => &[],
            EntityKind::Product => &[ForeignKey::Vendor],
            EntityKind::Inventory => &[ForeignKey::Product],
            EntityKind::PurchaseOrder => &[ForeignKey::Vendor, ForeignKey::Product],
            EntityKind::Logistics => &[ForeignKey::PurchaseOrder],
            EntityKind::QualityControl => &[ForeignKey::PurchaseOrder],
            EntityKind::VendorCompliance => &[ForeignKey::Vendor],
        }
    }

    /// The scope level this kind opens when one of its records is created or
    /// chosen. Only vendors, products and purchase orders drive the drill-down.
    pub fn scope_key(self) -> Option<ForeignKey> {
        match self {
            EntityKind::Vendor => Some(ForeignKey::Vendor),
            EntityKind::Product => Some(ForeignKey::Product),
            EntityKind::PurchaseOrder => Some(ForeignKey::PurchaseOrder),
            _ => None,
        }
    }

    pub fn advances_scope(self) -> bool {
        self.scope_key().is_some()
    }

    /// Human label used in prompts and messages ("vendor", "purchase order").
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Vendor => "vendor",
            EntityKind::Product => "product",
            EntityKind::Inventory => "inventory record",
            EntityKind::PurchaseOrder => "purchase order",
            EntityKind::Logistics => "logistics record",
            EntityKind::QualityControl => "quality control record",
            EntityKind::VendorCompliance => "compliance record",
        }
    }

    pub fn plural_label(self) -> &'static str {
        match self {
            EntityKind::Vendor => "vendors",
            EntityKind::Product => "products",
            EntityKind::Inventory => "inventory records",
            EntityKind::PurchaseOrder => "purchase orders",
            EntityKind::Logistics => "logistics records",
            EntityKind::QualityControl => "quality control records",
            EntityKind::VendorCompliance => "compliance records",
        }
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// A foreign-key column referencing one of the scope-advancing tables.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForeignKey {
    Vendor,
    Product,
    PurchaseOrder,
}

impl ForeignKey {
    pub fn column(self) -> &'static str {
        match self {
            ForeignKey::Vendor => "vendorid",
            ForeignKey::Product => "productid",
            ForeignKey::PurchaseOrder => "ponumber",
        }
    }

    /// The table this key points at.
    pub fn target(self) -> EntityKind {
        match self {
            ForeignKey::Vendor => EntityKind::Vendor,
            ForeignKey::Product => EntityKind::Product,
            ForeignKey::PurchaseOrder => EntityKind::PurchaseOrder,
        }
    }
}

/// One `column = id` pair of a parent scope.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ParentKey {
    pub key: ForeignKey,
    pub id: i64,
}

/// A set of foreign-key values.
///
/// Used in two directions: as the filter a mounted form lists with, and as the
/// foreign keys a stored record actually carries. A record belongs to a scope
/// when every key of the scope is present on the record with the same value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ParentScope {
    keys: Vec<ParentKey>,
}

impl ParentScope {
    /// The empty scope (matches every record).
    pub fn unscoped() -> Self {
        Self::default()
    }

    /// Add or replace a key.
    pub fn with(mut self, key: ForeignKey, id: impl RecordKey) -> Self {
        self.set(key, id.raw());
        self
    }

    /// Add or replace a key from a raw value, skipping `None`.
    pub fn with_raw(mut self, key: ForeignKey, id: Option<i64>) -> Self {
        if let Some(id) = id {
            self.set(key, id);
        }
        self
    }

    fn set(&mut self, key: ForeignKey, id: i64) {
        match self.keys.iter_mut().find(|k| k.key == key) {
            Some(existing) => existing.id = id,
            None => {
                self.keys.push(ParentKey { key, id });
                self.keys.sort_by_key(|k| k.key);
            }
        }
    }

    pub fn get(&self, key: ForeignKey) -> Option<i64> {
        self.keys.iter().find(|k| k.key == key).map(|k| k.id)
    }

    /// Typed accessor (`scope.id::<VendorId>(ForeignKey::Vendor)`).
    pub fn id<K: RecordKey>(&self, key: ForeignKey) -> Option<K> {
        self.get(key).map(K::from_raw)
    }

    pub fn keys(&self) -> &[ParentKey] {
        &self.keys
    }

    pub fn is_unscoped(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether a record carrying `self` as its foreign keys belongs to `filter`.
    pub fn satisfies(&self, filter: &ParentScope) -> bool {
        filter
            .keys
            .iter()
            .all(|wanted| self.get(wanted.key) == Some(wanted.id))
    }

    /// Keep only the given keys (e.g. narrow the drill-down scope to the
    /// columns one entity kind actually has).
    pub fn restrict_to(&self, keys: &[ForeignKey]) -> ParentScope {
        ParentScope {
            keys: self
                .keys
                .iter()
                .copied()
                .filter(|k| keys.contains(&k.key))
                .collect(),
        }
    }
}

impl Serialize for ParentScope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.keys.len()))?;
        for k in &self.keys {
            map.serialize_entry(k.key.column(), &k.id)?;
        }
        map.end()
    }
}

/// A business record stored in one remote table.
///
/// `Draft` is the record without its generated identifier: the payload a
/// form edits and the store creates/updates from.
pub trait Entity:
    Clone + core::fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Strongly-typed record identifier.
    type Id: RecordKey;

    /// Editable payload (all columns except the primary key).
    type Draft: Clone
        + core::fmt::Debug
        + Default
        + PartialEq
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;

    const KIND: EntityKind;

    /// Returns the record identifier.
    fn id(&self) -> Self::Id;

    /// Foreign keys this record carries.
    fn parent_scope(&self) -> ParentScope;

    /// Editable copy of the record's payload.
    fn to_draft(&self) -> Self::Draft;

    /// Combine a generated identifier with a payload.
    fn assemble(id: Self::Id, draft: Self::Draft) -> Self;

    /// Initial form contents.
    fn blank_draft() -> Self::Draft {
        Self::Draft::default()
    }

    /// Write the scope's foreign keys into the payload.
    fn attach_scope(draft: &mut Self::Draft, scope: &ParentScope);

    /// Presence checks run before any store call.
    fn validate(draft: &Self::Draft) -> DomainResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{ProductId, VendorId};

    #[test]
    fn record_scope_satisfies_subset_filter() {
        let record = ParentScope::unscoped()
            .with(ForeignKey::Vendor, VendorId::new(1))
            .with(ForeignKey::Product, ProductId::new(7));

        let vendor_only = ParentScope::unscoped().with(ForeignKey::Vendor, VendorId::new(1));
        let other_product = ParentScope::unscoped()
            .with(ForeignKey::Vendor, VendorId::new(1))
            .with(ForeignKey::Product, ProductId::new(8));

        assert!(record.satisfies(&vendor_only));
        assert!(record.satisfies(&ParentScope::unscoped()));
        assert!(!record.satisfies(&other_product));
        assert!(!vendor_only.satisfies(&record));
    }

    #[test]
    fn with_replaces_existing_key() {
        let scope = ParentScope::unscoped()
            .with(ForeignKey::Vendor, VendorId::new(1))
            .with(ForeignKey::Vendor, VendorId::new(2));
        assert_eq!(scope.keys().len(), 1);
        assert_eq!(scope.id::<VendorId>(ForeignKey::Vendor), Some(VendorId::new(2)));
    }

    #[test]
    fn restrict_to_drops_unrelated_keys() {
        let scope = ParentScope::unscoped()
            .with(ForeignKey::Vendor, VendorId::new(1))
            .with(ForeignKey::Product, ProductId::new(7));
        let narrowed = scope.restrict_to(EntityKind::Inventory.parent_keys());
        assert_eq!(narrowed.get(ForeignKey::Vendor), None);
        assert_eq!(narrowed.get(ForeignKey::Product), Some(7));
    }

    #[test]
    fn scope_serializes_as_column_map() {
        let scope = ParentScope::unscoped()
            .with(ForeignKey::Product, ProductId::new(7))
            .with(ForeignKey::Vendor, VendorId::new(1));
        let json = serde_json::to_value(&scope).unwrap();
        assert_eq!(json, serde_json::json!({ "vendorid": 1, "productid": 7 }));
    }

    #[test]
    fn only_drilldown_kinds_advance_scope() {
        let advancing: Vec<_> = EntityKind::ALL
            .iter()
            .copied()
            .filter(|k| k.advances_scope())
            .collect();
        assert_eq!(
            advancing,
            vec![EntityKind::Vendor, EntityKind::Product, EntityKind::PurchaseOrder]
        );
    }
}
