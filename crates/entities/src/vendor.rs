use serde::{Deserialize, Serialize};

use procure_core::{DomainResult, Entity, EntityKind, ParentScope, Required, VendorId};

/// Editable vendor payload (`Vendors` minus `vendorid`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorDraft {
    #[serde(rename = "vendorname")]
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(rename = "bankdetails")]
    pub bank_details: Option<String>,
    #[serde(rename = "gstnumber")]
    pub gst_number: Option<String>,
}

impl VendorDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A supplier. Top of the drill-down; carries no parent keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vendor {
    #[serde(rename = "vendorid")]
    pub id: VendorId,
    #[serde(flatten)]
    pub details: VendorDraft,
}

impl Entity for Vendor {
    type Id = VendorId;
    type Draft = VendorDraft;

    const KIND: EntityKind = EntityKind::Vendor;

    fn id(&self) -> VendorId {
        self.id
    }

    fn parent_scope(&self) -> ParentScope {
        ParentScope::unscoped()
    }

    fn to_draft(&self) -> VendorDraft {
        self.details.clone()
    }

    fn assemble(id: VendorId, draft: VendorDraft) -> Self {
        Self { id, details: draft }
    }

    fn attach_scope(_draft: &mut VendorDraft, _scope: &ParentScope) {}

    fn validate(draft: &VendorDraft) -> DomainResult<()> {
        Required::new().text("vendorname", &draft.name).finish()
    }
}
