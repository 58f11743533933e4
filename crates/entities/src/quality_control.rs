use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use procure_core::{
    DomainResult, Entity, EntityKind, ForeignKey, ParentScope, PoNumber, QcId, Required,
};

use crate::today;

/// Editable inspection record for one purchase order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityControlDraft {
    #[serde(rename = "ponumber")]
    pub po_number: Option<PoNumber>,
    #[serde(rename = "qcchecklist")]
    pub checklist: String,
    #[serde(rename = "qcstatus")]
    pub status: String,
    #[serde(rename = "inspectiondate")]
    pub inspection_date: Option<NaiveDate>,
    #[serde(rename = "inspectorname")]
    pub inspector_name: Option<String>,
    #[serde(rename = "testcertificates")]
    pub test_certificates: Option<String>,
}

impl Default for QualityControlDraft {
    fn default() -> Self {
        Self {
            po_number: None,
            checklist: String::new(),
            status: String::new(),
            inspection_date: Some(today()),
            inspector_name: None,
            test_certificates: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityControl {
    #[serde(rename = "qcid")]
    pub id: QcId,
    #[serde(flatten)]
    pub details: QualityControlDraft,
}

impl Entity for QualityControl {
    type Id = QcId;
    type Draft = QualityControlDraft;

    const KIND: EntityKind = EntityKind::QualityControl;

    fn id(&self) -> QcId {
        self.id
    }

    fn parent_scope(&self) -> ParentScope {
        ParentScope::unscoped()
            .with_raw(ForeignKey::PurchaseOrder, self.details.po_number.map(PoNumber::get))
    }

    fn to_draft(&self) -> QualityControlDraft {
        self.details.clone()
    }

    fn assemble(id: QcId, draft: QualityControlDraft) -> Self {
        Self { id, details: draft }
    }

    fn attach_scope(draft: &mut QualityControlDraft, scope: &ParentScope) {
        if let Some(order) = scope.id(ForeignKey::PurchaseOrder) {
            draft.po_number = Some(order);
        }
    }

    fn validate(draft: &QualityControlDraft) -> DomainResult<()> {
        Required::new()
            .text("qcchecklist", &draft.checklist)
            .text("qcstatus", &draft.status)
            .value("inspectiondate", &draft.inspection_date)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procure_core::DomainError;

    #[test]
    fn checklist_and_status_are_required() {
        match QualityControl::validate(&QualityControl::blank_draft()) {
            Err(DomainError::MissingFields(fields)) => {
                assert_eq!(fields, vec!["qcchecklist", "qcstatus"])
            }
            other => panic!("Expected MissingFields, got {other:?}"),
        }
    }
}
