use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use procure_core::{
    DomainResult, Entity, EntityKind, ForeignKey, ParentScope, PoNumber, ProductId, Required,
    VendorId,
};

use crate::today;

/// Editable purchase order payload. Scoped to a vendor *and* a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrderDraft {
    #[serde(rename = "vendorid")]
    pub vendor_id: Option<VendorId>,
    #[serde(rename = "productid")]
    pub product_id: Option<ProductId>,
    #[serde(rename = "requestdate")]
    pub request_date: Option<NaiveDate>,
    #[serde(rename = "expecteddeliverydate")]
    pub expected_delivery_date: Option<NaiveDate>,
    #[serde(rename = "quantityordered")]
    pub quantity_ordered: Option<i64>,
    #[serde(rename = "unitprice")]
    pub unit_price: Option<f64>,
    #[serde(rename = "deliveryterms")]
    pub delivery_terms: Option<String>,
    #[serde(rename = "paymentterms")]
    pub payment_terms: Option<String>,
    pub currency: Option<String>,
    #[serde(rename = "postatus")]
    pub status: Option<String>,
}

impl Default for PurchaseOrderDraft {
    fn default() -> Self {
        Self {
            vendor_id: None,
            product_id: None,
            request_date: Some(today()),
            expected_delivery_date: Some(today()),
            quantity_ordered: Some(0),
            unit_price: Some(0.0),
            delivery_terms: None,
            payment_terms: None,
            currency: None,
            status: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    #[serde(rename = "ponumber")]
    pub number: PoNumber,
    #[serde(flatten)]
    pub details: PurchaseOrderDraft,
}

impl Entity for PurchaseOrder {
    type Id = PoNumber;
    type Draft = PurchaseOrderDraft;

    const KIND: EntityKind = EntityKind::PurchaseOrder;

    fn id(&self) -> PoNumber {
        self.number
    }

    fn parent_scope(&self) -> ParentScope {
        ParentScope::unscoped()
            .with_raw(ForeignKey::Vendor, self.details.vendor_id.map(VendorId::get))
            .with_raw(ForeignKey::Product, self.details.product_id.map(ProductId::get))
    }

    fn to_draft(&self) -> PurchaseOrderDraft {
        self.details.clone()
    }

    fn assemble(number: PoNumber, draft: PurchaseOrderDraft) -> Self {
        Self {
            number,
            details: draft,
        }
    }

    fn attach_scope(draft: &mut PurchaseOrderDraft, scope: &ParentScope) {
        if let Some(vendor) = scope.id(ForeignKey::Vendor) {
            draft.vendor_id = Some(vendor);
        }
        if let Some(product) = scope.id(ForeignKey::Product) {
            draft.product_id = Some(product);
        }
    }

    fn validate(draft: &PurchaseOrderDraft) -> DomainResult<()> {
        Required::new()
            .value("requestdate", &draft.request_date)
            .value("expecteddeliverydate", &draft.expected_delivery_date)
            .value("quantityordered", &draft.quantity_ordered)
            .value("unitprice", &draft.unit_price)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_belongs_to_vendor_and_product() {
        let scope = ParentScope::unscoped()
            .with(ForeignKey::Vendor, VendorId::new(1))
            .with(ForeignKey::Product, ProductId::new(7));
        let mut draft = PurchaseOrder::blank_draft();
        PurchaseOrder::attach_scope(&mut draft, &scope);

        let order = PurchaseOrder::assemble(PoNumber::new(100), draft);
        assert!(order.parent_scope().satisfies(&scope));

        let other_product = ParentScope::unscoped()
            .with(ForeignKey::Vendor, VendorId::new(1))
            .with(ForeignKey::Product, ProductId::new(8));
        assert!(!order.parent_scope().satisfies(&other_product));
    }

    #[test]
    fn integral_unit_price_decodes() {
        let row = serde_json::json!({
            "ponumber": 100,
            "vendorid": 1,
            "productid": 7,
            "requestdate": "2024-05-01",
            "expecteddeliverydate": "2024-05-10",
            "quantityordered": 12,
            "unitprice": 3,
            "postatus": "Open"
        });
        let order: PurchaseOrder = serde_json::from_value(row).unwrap();
        assert_eq!(order.number, PoNumber::new(100));
        assert_eq!(order.details.unit_price, Some(3.0));
        assert_eq!(order.details.status.as_deref(), Some("Open"));
    }
}
