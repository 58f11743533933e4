use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use procure_core::{
    DomainResult, Entity, EntityKind, ForeignKey, LogisticsId, ParentScope, PoNumber, Required,
};

use crate::today;

/// Editable shipment details for one purchase order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogisticsDraft {
    #[serde(rename = "ponumber")]
    pub po_number: Option<PoNumber>,
    #[serde(rename = "deliveryschedule")]
    pub delivery_schedule: Option<NaiveDate>,
    #[serde(rename = "transportmode")]
    pub transport_mode: Option<String>,
    #[serde(rename = "freightresponsibility")]
    pub freight_responsibility: Option<String>,
    #[serde(rename = "carrierinformation")]
    pub carrier_information: Option<String>,
    #[serde(rename = "trackingnumber")]
    pub tracking_number: Option<String>,
    #[serde(rename = "deliveryconfirmation")]
    pub delivery_confirmed: Option<bool>,
}

impl Default for LogisticsDraft {
    fn default() -> Self {
        Self {
            po_number: None,
            delivery_schedule: Some(today()),
            transport_mode: None,
            freight_responsibility: None,
            carrier_information: None,
            tracking_number: None,
            delivery_confirmed: Some(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Logistics {
    #[serde(rename = "logisticsid")]
    pub id: LogisticsId,
    #[serde(flatten)]
    pub details: LogisticsDraft,
}

impl Entity for Logistics {
    type Id = LogisticsId;
    type Draft = LogisticsDraft;

    const KIND: EntityKind = EntityKind::Logistics;

    fn id(&self) -> LogisticsId {
        self.id
    }

    fn parent_scope(&self) -> ParentScope {
        ParentScope::unscoped()
            .with_raw(ForeignKey::PurchaseOrder, self.details.po_number.map(PoNumber::get))
    }

    fn to_draft(&self) -> LogisticsDraft {
        self.details.clone()
    }

    fn assemble(id: LogisticsId, draft: LogisticsDraft) -> Self {
        Self { id, details: draft }
    }

    fn attach_scope(draft: &mut LogisticsDraft, scope: &ParentScope) {
        if let Some(order) = scope.id(ForeignKey::PurchaseOrder) {
            draft.po_number = Some(order);
        }
    }

    fn validate(draft: &LogisticsDraft) -> DomainResult<()> {
        Required::new()
            .value("deliveryschedule", &draft.delivery_schedule)
            .finish()
    }
}
