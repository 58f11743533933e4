use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use procure_core::{
    DomainResult, Entity, EntityKind, ForeignKey, InventoryId, ParentScope, ProductId, Required,
};

use crate::today;

/// Editable stock record for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryDraft {
    #[serde(rename = "productid")]
    pub product_id: Option<ProductId>,
    #[serde(rename = "currentstock")]
    pub current_stock: Option<i64>,
    #[serde(rename = "reorderlevel")]
    pub reorder_level: Option<i64>,
    #[serde(rename = "safetystock")]
    pub safety_stock: Option<i64>,
    #[serde(rename = "preferredwarehouse")]
    pub preferred_warehouse: Option<String>,
    #[serde(rename = "batchnumber")]
    pub batch_number: Option<String>,
    #[serde(rename = "storageconditions")]
    pub storage_conditions: Option<String>,
    #[serde(rename = "grnreference")]
    pub grn_reference: Option<String>,
    #[serde(rename = "lastupdated")]
    pub last_updated: Option<NaiveDate>,
}

impl Default for InventoryDraft {
    fn default() -> Self {
        Self {
            product_id: None,
            current_stock: Some(0),
            reorder_level: Some(0),
            safety_stock: Some(0),
            preferred_warehouse: None,
            batch_number: None,
            storage_conditions: None,
            grn_reference: None,
            last_updated: Some(today()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(rename = "inventoryid")]
    pub id: InventoryId,
    #[serde(flatten)]
    pub details: InventoryDraft,
}

impl Entity for Inventory {
    type Id = InventoryId;
    type Draft = InventoryDraft;

    const KIND: EntityKind = EntityKind::Inventory;

    fn id(&self) -> InventoryId {
        self.id
    }

    fn parent_scope(&self) -> ParentScope {
        ParentScope::unscoped()
            .with_raw(ForeignKey::Product, self.details.product_id.map(ProductId::get))
    }

    fn to_draft(&self) -> InventoryDraft {
        self.details.clone()
    }

    fn assemble(id: InventoryId, draft: InventoryDraft) -> Self {
        Self { id, details: draft }
    }

    fn attach_scope(draft: &mut InventoryDraft, scope: &ParentScope) {
        if let Some(product) = scope.id(ForeignKey::Product) {
            draft.product_id = Some(product);
        }
    }

    fn validate(draft: &InventoryDraft) -> DomainResult<()> {
        Required::new()
            .value("currentstock", &draft.current_stock)
            .value("reorderlevel", &draft.reorder_level)
            .value("safetystock", &draft.safety_stock)
            .value("lastupdated", &draft.last_updated)
            .finish()
    }
}
