use serde::{Deserialize, Serialize};

use procure_core::{
    DomainResult, Entity, EntityKind, ForeignKey, ParentScope, ProductId, Required, VendorId,
};

/// Editable product payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    #[serde(rename = "vendorid")]
    pub vendor_id: Option<VendorId>,
    #[serde(rename = "productname")]
    pub name: String,
    #[serde(rename = "productcategory")]
    pub category: Option<String>,
    #[serde(rename = "unitofmeasurement")]
    pub unit_of_measurement: Option<String>,
    #[serde(rename = "productspecifications")]
    pub specifications: Option<String>,
    pub quantity: Option<i64>,
}

impl Default for ProductDraft {
    fn default() -> Self {
        Self {
            vendor_id: None,
            name: String::new(),
            category: None,
            unit_of_measurement: None,
            specifications: None,
            quantity: Some(0),
        }
    }
}

impl ProductDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A product supplied by one vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "productid")]
    pub id: ProductId,
    #[serde(flatten)]
    pub details: ProductDraft,
}

impl Entity for Product {
    type Id = ProductId;
    type Draft = ProductDraft;

    const KIND: EntityKind = EntityKind::Product;

    fn id(&self) -> ProductId {
        self.id
    }

    fn parent_scope(&self) -> ParentScope {
        ParentScope::unscoped()
            .with_raw(ForeignKey::Vendor, self.details.vendor_id.map(VendorId::get))
    }

    fn to_draft(&self) -> ProductDraft {
        self.details.clone()
    }

    fn assemble(id: ProductId, draft: ProductDraft) -> Self {
        Self { id, details: draft }
    }

    fn attach_scope(draft: &mut ProductDraft, scope: &ParentScope) {
        if let Some(vendor) = scope.id(ForeignKey::Vendor) {
            draft.vendor_id = Some(vendor);
        }
    }

    fn validate(draft: &ProductDraft) -> DomainResult<()> {
        Required::new().text("productname", &draft.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_scope_sets_vendor_key() {
        let mut draft = ProductDraft::named("Widget");
        let scope = ParentScope::unscoped().with(ForeignKey::Vendor, VendorId::new(1));
        Product::attach_scope(&mut draft, &scope);
        assert_eq!(draft.vendor_id, Some(VendorId::new(1)));

        let product = Product::assemble(ProductId::new(7), draft);
        assert!(product.parent_scope().satisfies(&scope));
    }

    #[test]
    fn quantity_defaults_to_zero() {
        assert_eq!(Product::blank_draft().quantity, Some(0));
    }
}
