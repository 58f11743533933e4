//! One store per entity table, chosen from configuration.

use std::sync::Arc;

use tracing::info;

use procure_core::Entity;
use procure_entities::{
    Inventory, Logistics, Product, PurchaseOrder, QualityControl, Vendor, VendorCompliance,
};
use procure_infra::entity_store::postgres;
use procure_infra::{
    EntityStore, InMemoryEntityStore, PgEntityStore, RestClient, StoreConfig, StoreError,
};

use crate::form::EntityForm;
use crate::views::MountedForms;

/// The seven table stores a session works against.
#[derive(Clone)]
pub struct Stores {
    pub vendors: Arc<dyn EntityStore<Vendor>>,
    pub products: Arc<dyn EntityStore<Product>>,
    pub inventory: Arc<dyn EntityStore<Inventory>>,
    pub purchase_orders: Arc<dyn EntityStore<PurchaseOrder>>,
    pub logistics: Arc<dyn EntityStore<Logistics>>,
    pub quality_control: Arc<dyn EntityStore<QualityControl>>,
    pub compliance: Arc<dyn EntityStore<VendorCompliance>>,
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}

impl Stores {
    /// Empty in-process tables.
    pub fn in_memory() -> Self {
        Self {
            vendors: Arc::new(InMemoryEntityStore::<Vendor>::new()),
            products: Arc::new(InMemoryEntityStore::<Product>::new()),
            inventory: Arc::new(InMemoryEntityStore::<Inventory>::new()),
            purchase_orders: Arc::new(InMemoryEntityStore::<PurchaseOrder>::new()),
            logistics: Arc::new(InMemoryEntityStore::<Logistics>::new()),
            quality_control: Arc::new(InMemoryEntityStore::<QualityControl>::new()),
            compliance: Arc::new(InMemoryEntityStore::<VendorCompliance>::new()),
        }
    }

    /// PostgREST tables sharing one HTTP client.
    pub fn rest(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = RestClient::new(config)?;
        Ok(Self {
            vendors: Arc::new(client.table::<Vendor>()?),
            products: Arc::new(client.table::<Product>()?),
            inventory: Arc::new(client.table::<Inventory>()?),
            purchase_orders: Arc::new(client.table::<PurchaseOrder>()?),
            logistics: Arc::new(client.table::<Logistics>()?),
            quality_control: Arc::new(client.table::<QualityControl>()?),
            compliance: Arc::new(client.table::<VendorCompliance>()?),
        })
    }

    /// Direct Postgres tables sharing one pool.
    pub async fn postgres(config: &StoreConfig) -> Result<Self, StoreError> {
        let pool = postgres::connect(config).await?;
        Ok(Self {
            vendors: Arc::new(PgEntityStore::<Vendor>::new(pool.clone())),
            products: Arc::new(PgEntityStore::<Product>::new(pool.clone())),
            inventory: Arc::new(PgEntityStore::<Inventory>::new(pool.clone())),
            purchase_orders: Arc::new(PgEntityStore::<PurchaseOrder>::new(pool.clone())),
            logistics: Arc::new(PgEntityStore::<Logistics>::new(pool.clone())),
            quality_control: Arc::new(PgEntityStore::<QualityControl>::new(pool.clone())),
            compliance: Arc::new(PgEntityStore::<VendorCompliance>::new(pool)),
        })
    }

    /// Postgres when `DATABASE_URL` is set, the REST API otherwise.
    pub async fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        if config.database_url.is_some() {
            info!(backend = "postgres", "opening entity stores");
            Self::postgres(config).await
        } else {
            info!(backend = "rest", url = %config.rest_url, "opening entity stores");
            Self::rest(config)
        }
    }

    pub fn get<E: Mountable>(&self) -> Arc<dyn EntityStore<E>> {
        E::store(self)
    }
}

/// Ties an entity type to its store and to the slot its form occupies in the
/// mounted view set.
pub trait Mountable: Entity {
    fn store(stores: &Stores) -> Arc<dyn EntityStore<Self>>;

    fn form(forms: &MountedForms) -> Option<&EntityForm<Self>>;

    fn form_mut(forms: &mut MountedForms) -> Option<&mut EntityForm<Self>>;
}

macro_rules! mountable {
    ($entity:ty, $store:ident, $variant:ident . $slot:ident) => {
        impl Mountable for $entity {
            fn store(stores: &Stores) -> Arc<dyn EntityStore<Self>> {
                stores.$store.clone()
            }

            fn form(forms: &MountedForms) -> Option<&EntityForm<Self>> {
                match forms {
                    MountedForms::$variant { $slot, .. } => Some($slot),
                    _ => None,
                }
            }

            fn form_mut(forms: &mut MountedForms) -> Option<&mut EntityForm<Self>> {
                match forms {
                    MountedForms::$variant { $slot, .. } => Some($slot),
                    _ => None,
                }
            }
        }
    };
}

mountable!(Vendor, vendors, Root.vendors);
mountable!(Product, products, Vendor.products);
mountable!(VendorCompliance, compliance, Vendor.compliance);
mountable!(PurchaseOrder, purchase_orders, Product.orders);
mountable!(Inventory, inventory, Product.inventory);
mountable!(Logistics, logistics, Order.logistics);
mountable!(QualityControl, quality_control, Order.quality);
