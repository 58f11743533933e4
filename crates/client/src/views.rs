//! The set of forms mounted for one workflow state.

use tokio_util::sync::CancellationToken;
use tracing::debug;

use procure_entities::{
    Inventory, Logistics, Product, PurchaseOrder, QualityControl, Vendor, VendorCompliance,
};
use procure_workflow::WorkflowState;

use crate::form::{EntityForm, FormError, FormSnapshot};
use crate::stores::{Mountable, Stores};

/// Forms visible in each drill-down state. Child views receive their parent
/// keys at mount time and keep them until the state changes.
#[derive(Debug)]
pub enum MountedForms {
    Root {
        vendors: EntityForm<Vendor>,
    },
    Vendor {
        products: EntityForm<Product>,
        compliance: EntityForm<VendorCompliance>,
    },
    Product {
        orders: EntityForm<PurchaseOrder>,
        inventory: EntityForm<Inventory>,
    },
    Order {
        logistics: EntityForm<Logistics>,
        quality: EntityForm<QualityControl>,
    },
}

fn mount_one<E: Mountable>(
    state: &WorkflowState,
    stores: &Stores,
    root: &CancellationToken,
) -> EntityForm<E> {
    let scope = state.view_scope(E::KIND).unwrap_or_default();
    EntityForm::new(stores.get::<E>(), scope, root.child_token())
}

impl MountedForms {
    /// Fresh, unloaded forms for `state`. Each form gets a child of `root`,
    /// so cancelling `root` tears down every view at once.
    pub fn mount(state: &WorkflowState, stores: &Stores, root: &CancellationToken) -> Self {
        let forms = match state {
            WorkflowState::NoVendor => MountedForms::Root {
                vendors: mount_one(state, stores, root),
            },
            WorkflowState::VendorOnly { .. } => MountedForms::Vendor {
                products: mount_one(state, stores, root),
                compliance: mount_one(state, stores, root),
            },
            WorkflowState::VendorAndProduct { .. } => MountedForms::Product {
                orders: mount_one(state, stores, root),
                inventory: mount_one(state, stores, root),
            },
            WorkflowState::FullScope { .. } => MountedForms::Order {
                logistics: mount_one(state, stores, root),
                quality: mount_one(state, stores, root),
            },
        };
        debug!(?state, "mounted forms");
        forms
    }

    /// Load every mounted form concurrently. Each form records its own
    /// failure; the first error is returned.
    pub async fn refresh_all(&mut self) -> Result<(), FormError> {
        match self {
            MountedForms::Root { vendors } => vendors.refresh().await,
            MountedForms::Vendor {
                products,
                compliance,
            } => {
                let (a, b) = tokio::join!(products.refresh(), compliance.refresh());
                a.and(b)
            }
            MountedForms::Product { orders, inventory } => {
                let (a, b) = tokio::join!(orders.refresh(), inventory.refresh());
                a.and(b)
            }
            MountedForms::Order { logistics, quality } => {
                let (a, b) = tokio::join!(logistics.refresh(), quality.refresh());
                a.and(b)
            }
        }
    }

    /// Cancel every in-flight call of the mounted forms.
    pub fn cancel(&self) {
        match self {
            MountedForms::Root { vendors } => vendors.cancel(),
            MountedForms::Vendor {
                products,
                compliance,
            } => {
                products.cancel();
                compliance.cancel();
            }
            MountedForms::Product { orders, inventory } => {
                orders.cancel();
                inventory.cancel();
            }
            MountedForms::Order { logistics, quality } => {
                logistics.cancel();
                quality.cancel();
            }
        }
    }

    pub fn snapshots(&self) -> Vec<FormSnapshot> {
        match self {
            MountedForms::Root { vendors } => vec![vendors.snapshot()],
            MountedForms::Vendor {
                products,
                compliance,
            } => vec![products.snapshot(), compliance.snapshot()],
            MountedForms::Product { orders, inventory } => {
                vec![orders.snapshot(), inventory.snapshot()]
            }
            MountedForms::Order { logistics, quality } => {
                vec![logistics.snapshot(), quality.snapshot()]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procure_core::{EntityKind, ForeignKey, PoNumber, ProductId, VendorId};

    #[test]
    fn mounted_kinds_follow_state() {
        let stores = Stores::in_memory();
        let root = CancellationToken::new();
        let state = WorkflowState::FullScope {
            vendor: VendorId::new(1),
            product: ProductId::new(2),
            order: PoNumber::new(3),
        };

        let forms = MountedForms::mount(&state, &stores, &root);
        let kinds: Vec<_> = forms.snapshots().iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![EntityKind::Logistics, EntityKind::QualityControl]);

        let quality = QualityControl::form(&forms).unwrap();
        assert_eq!(quality.scope().get(ForeignKey::PurchaseOrder), Some(3));
        assert_eq!(quality.scope().get(ForeignKey::Vendor), None);
        assert_eq!(quality.draft().po_number, Some(PoNumber::new(3)));
        assert!(Vendor::form(&forms).is_none());
    }

    #[test]
    fn purchase_orders_are_scoped_by_vendor_and_product() {
        let stores = Stores::in_memory();
        let state = WorkflowState::VendorAndProduct {
            vendor: VendorId::new(4),
            product: ProductId::new(9),
        };
        let forms = MountedForms::mount(&state, &stores, &CancellationToken::new());

        let orders = PurchaseOrder::form(&forms).unwrap();
        assert_eq!(orders.scope().get(ForeignKey::Vendor), Some(4));
        assert_eq!(orders.scope().get(ForeignKey::Product), Some(9));
        let inventory = Inventory::form(&forms).unwrap();
        assert_eq!(inventory.scope().get(ForeignKey::Vendor), None);
    }

    #[test]
    fn cancelling_root_cancels_every_form() {
        let stores = Stores::in_memory();
        let root = CancellationToken::new();
        let state = WorkflowState::VendorOnly {
            vendor: VendorId::new(1),
        };
        let forms = MountedForms::mount(&state, &stores, &root);

        root.cancel();
        assert!(Product::form(&forms).unwrap().cancellation().is_cancelled());
        assert!(
            VendorCompliance::form(&forms)
                .unwrap()
                .cancellation()
                .is_cancelled()
        );
    }
}
