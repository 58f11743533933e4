use serde::Serialize;

use procure_core::{
    EntityKind, ForeignKey, ParentScope, PoNumber, ProductId, RecordKey, VendorId,
};

use crate::controller::ScopeLevel;

/// Drill-down depth and the identifiers selected so far.
///
/// The variants encode the scope hierarchy directly: an order can only be
/// held together with its product and vendor.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WorkflowState {
    #[default]
    NoVendor,
    VendorOnly {
        vendor: VendorId,
    },
    VendorAndProduct {
        vendor: VendorId,
        product: ProductId,
    },
    FullScope {
        vendor: VendorId,
        product: ProductId,
        order: PoNumber,
    },
}

/// A form that is visible in a given state, with the keys it lists by and
/// injects into new records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MountedView {
    pub kind: EntityKind,
    pub scope: ParentScope,
}

impl WorkflowState {
    pub fn vendor(&self) -> Option<VendorId> {
        match *self {
            WorkflowState::NoVendor => None,
            WorkflowState::VendorOnly { vendor }
            | WorkflowState::VendorAndProduct { vendor, .. }
            | WorkflowState::FullScope { vendor, .. } => Some(vendor),
        }
    }

    pub fn product(&self) -> Option<ProductId> {
        match *self {
            WorkflowState::VendorAndProduct { product, .. }
            | WorkflowState::FullScope { product, .. } => Some(product),
            _ => None,
        }
    }

    pub fn order(&self) -> Option<PoNumber> {
        match *self {
            WorkflowState::FullScope { order, .. } => Some(order),
            _ => None,
        }
    }

    /// Number of selected levels (0..=3).
    pub fn depth(&self) -> usize {
        match self {
            WorkflowState::NoVendor => 0,
            WorkflowState::VendorOnly { .. } => 1,
            WorkflowState::VendorAndProduct { .. } => 2,
            WorkflowState::FullScope { .. } => 3,
        }
    }

    /// The deepest selected level, if any.
    pub fn innermost(&self) -> Option<ScopeLevel> {
        match *self {
            WorkflowState::NoVendor => None,
            WorkflowState::VendorOnly { vendor } => Some(ScopeLevel::Vendor(vendor)),
            WorkflowState::VendorAndProduct { product, .. } => Some(ScopeLevel::Product(product)),
            WorkflowState::FullScope { order, .. } => Some(ScopeLevel::Order(order)),
        }
    }

    /// Whether record `id` of `kind` is one of the selected scope levels.
    pub fn holds(&self, kind: EntityKind, id: i64) -> bool {
        match kind {
            EntityKind::Vendor => self.vendor().map(RecordKey::raw) == Some(id),
            EntityKind::Product => self.product().map(RecordKey::raw) == Some(id),
            EntityKind::PurchaseOrder => self.order().map(RecordKey::raw) == Some(id),
            _ => false,
        }
    }

    /// Every selected key, outermost first.
    pub fn scope(&self) -> ParentScope {
        let mut scope = ParentScope::unscoped();
        if let Some(vendor) = self.vendor() {
            scope = scope.with(ForeignKey::Vendor, vendor);
        }
        if let Some(product) = self.product() {
            scope = scope.with(ForeignKey::Product, product);
        }
        if let Some(order) = self.order() {
            scope = scope.with(ForeignKey::PurchaseOrder, order);
        }
        scope
    }

    /// Entity kinds whose forms are mounted in this state.
    pub fn mounted_kinds(&self) -> &'static [EntityKind] {
        match self {
            WorkflowState::NoVendor => &[EntityKind::Vendor],
            WorkflowState::VendorOnly { .. } => &[EntityKind::Product, EntityKind::VendorCompliance],
            WorkflowState::VendorAndProduct { .. } => {
                &[EntityKind::PurchaseOrder, EntityKind::Inventory]
            }
            WorkflowState::FullScope { .. } => {
                &[EntityKind::Logistics, EntityKind::QualityControl]
            }
        }
    }

    /// Mounted forms with the parent keys each one is restricted to.
    pub fn views(&self) -> Vec<MountedView> {
        let scope = self.scope();
        self.mounted_kinds()
            .iter()
            .map(|&kind| MountedView {
                kind,
                scope: scope.restrict_to(kind.parent_keys()),
            })
            .collect()
    }

    /// Parent keys for one kind, if its form is mounted in this state.
    pub fn view_scope(&self, kind: EntityKind) -> Option<ParentScope> {
        self.mounted_kinds()
            .contains(&kind)
            .then(|| self.scope().restrict_to(kind.parent_keys()))
    }

    /// State after selecting `level` one step deeper, if that is a legal move.
    pub(crate) fn enter(self, level: ScopeLevel) -> Option<WorkflowState> {
        match (self, level) {
            (WorkflowState::NoVendor, ScopeLevel::Vendor(vendor)) => {
                Some(WorkflowState::VendorOnly { vendor })
            }
            (WorkflowState::VendorOnly { vendor }, ScopeLevel::Product(product)) => {
                Some(WorkflowState::VendorAndProduct { vendor, product })
            }
            (WorkflowState::VendorAndProduct { vendor, product }, ScopeLevel::Order(order)) => {
                Some(WorkflowState::FullScope {
                    vendor,
                    product,
                    order,
                })
            }
            _ => None,
        }
    }

    /// State after discarding the innermost level.
    pub(crate) fn leave(self) -> Option<WorkflowState> {
        match self {
            WorkflowState::NoVendor => None,
            WorkflowState::VendorOnly { .. } => Some(WorkflowState::NoVendor),
            WorkflowState::VendorAndProduct { vendor, .. } => {
                Some(WorkflowState::VendorOnly { vendor })
            }
            WorkflowState::FullScope {
                vendor, product, ..
            } => Some(WorkflowState::VendorAndProduct { vendor, product }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> WorkflowState {
        WorkflowState::FullScope {
            vendor: VendorId::new(1),
            product: ProductId::new(7),
            order: PoNumber::new(100),
        }
    }

    #[test]
    fn holds_only_the_selected_levels() {
        let state = full();
        assert!(state.holds(EntityKind::Vendor, 1));
        assert!(state.holds(EntityKind::Product, 7));
        assert!(state.holds(EntityKind::PurchaseOrder, 100));
        assert!(!state.holds(EntityKind::Vendor, 2));
        assert!(!state.holds(EntityKind::Logistics, 1));
        assert!(!WorkflowState::NoVendor.holds(EntityKind::Vendor, 1));
    }

    #[test]
    fn no_vendor_mounts_the_unscoped_vendor_form() {
        let views = WorkflowState::NoVendor.views();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].kind, EntityKind::Vendor);
        assert!(views[0].scope.is_unscoped());
    }

    #[test]
    fn vendor_and_product_scopes_orders_by_both_keys_and_inventory_by_product() {
        let state = WorkflowState::VendorAndProduct {
            vendor: VendorId::new(1),
            product: ProductId::new(7),
        };
        let orders = state.view_scope(EntityKind::PurchaseOrder).unwrap();
        assert_eq!(orders.get(ForeignKey::Vendor), Some(1));
        assert_eq!(orders.get(ForeignKey::Product), Some(7));

        let inventory = state.view_scope(EntityKind::Inventory).unwrap();
        assert_eq!(inventory.get(ForeignKey::Vendor), None);
        assert_eq!(inventory.get(ForeignKey::Product), Some(7));

        assert!(state.view_scope(EntityKind::Vendor).is_none());
    }

    #[test]
    fn full_scope_mounts_order_children_only() {
        let views = full().views();
        let kinds: Vec<_> = views.iter().map(|v| v.kind).collect();
        assert_eq!(kinds, vec![EntityKind::Logistics, EntityKind::QualityControl]);
        for view in views {
            assert_eq!(view.scope.keys().len(), 1);
            assert_eq!(view.scope.get(ForeignKey::PurchaseOrder), Some(100));
        }
    }

    #[test]
    fn leave_walks_back_one_level_at_a_time() {
        let product = full().leave().unwrap();
        assert_eq!(
            product,
            WorkflowState::VendorAndProduct {
                vendor: VendorId::new(1),
                product: ProductId::new(7)
            }
        );
        let vendor = product.leave().unwrap();
        assert_eq!(vendor, WorkflowState::VendorOnly { vendor: VendorId::new(1) });
        assert_eq!(vendor.leave(), Some(WorkflowState::NoVendor));
        assert_eq!(WorkflowState::NoVendor.leave(), None);
    }

    #[test]
    fn serializes_with_state_tag() {
        let json = serde_json::to_value(full()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "state": "full_scope", "vendor": 1, "product": 7, "order": 100 })
        );
    }
}
