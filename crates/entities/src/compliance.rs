use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use procure_core::{
    ComplianceId, DomainResult, Entity, EntityKind, ForeignKey, ParentScope, Required, VendorId,
};

use crate::today;

/// Editable compliance document (licence, certificate) held by a vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorComplianceDraft {
    #[serde(rename = "vendorid")]
    pub vendor_id: Option<VendorId>,
    #[serde(rename = "compliancetype")]
    pub compliance_type: String,
    #[serde(rename = "compliancenumber")]
    pub compliance_number: String,
    #[serde(rename = "issuedate")]
    pub issue_date: Option<NaiveDate>,
    #[serde(rename = "expirydate")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(rename = "documentlink")]
    pub document_link: Option<String>,
}

impl Default for VendorComplianceDraft {
    fn default() -> Self {
        Self {
            vendor_id: None,
            compliance_type: String::new(),
            compliance_number: String::new(),
            issue_date: Some(today()),
            expiry_date: Some(today()),
            document_link: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorCompliance {
    #[serde(rename = "complianceid")]
    pub id: ComplianceId,
    #[serde(flatten)]
    pub details: VendorComplianceDraft,
}

impl VendorCompliance {
    /// Whether the document has lapsed as of `on`.
    pub fn is_expired(&self, on: NaiveDate) -> bool {
        self.details.expiry_date.is_some_and(|expiry| expiry < on)
    }
}

impl Entity for VendorCompliance {
    type Id = ComplianceId;
    type Draft = VendorComplianceDraft;

    const KIND: EntityKind = EntityKind::VendorCompliance;

    fn id(&self) -> ComplianceId {
        self.id
    }

    fn parent_scope(&self) -> ParentScope {
        ParentScope::unscoped()
            .with_raw(ForeignKey::Vendor, self.details.vendor_id.map(VendorId::get))
    }

    fn to_draft(&self) -> VendorComplianceDraft {
        self.details.clone()
    }

    fn assemble(id: ComplianceId, draft: VendorComplianceDraft) -> Self {
        Self { id, details: draft }
    }

    fn attach_scope(draft: &mut VendorComplianceDraft, scope: &ParentScope) {
        if let Some(vendor) = scope.id(ForeignKey::Vendor) {
            draft.vendor_id = Some(vendor);
        }
    }

    fn validate(draft: &VendorComplianceDraft) -> DomainResult<()> {
        Required::new()
            .text("compliancetype", &draft.compliance_type)
            .text("compliancenumber", &draft.compliance_number)
            .value("issuedate", &draft.issue_date)
            .value("expirydate", &draft.expiry_date)
            .finish()
    }
}
