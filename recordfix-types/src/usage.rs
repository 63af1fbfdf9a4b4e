use crate::ids::{ElementId, RefId};
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// One reference fragment found by the reference finder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSite {
    pub ref_id: RefId,

    /// The element the fragment resolves to.
    pub element: ElementId,

    /// Declaration containing the fragment.
    pub declaration: ElementId,

    pub file: Utf8PathBuf,

    /// Set when the reference would resolve to something else after the rename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collision: Option<String>,
}

/// Everything the conversion affects, as discovered by the collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AffectedUsage {
    /// A non-private field whose outside references must keep working after the swap.
    DirectFieldReference { field: ElementId },

    /// An accessor rename. Without a site this marks the rename itself; with a site it is one
    /// reference that the rename rewrites.
    AccessorRenameReference {
        element: ElementId,
        new_name: String,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        site: Option<ReferenceSite>,
    },

    /// A member whose visibility the conversion forces upward.
    EncapsulationRisk { element: ElementId, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageKind {
    DirectFieldReference,
    AccessorRenameReference,
    EncapsulationRisk,
}

impl UsageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            UsageKind::DirectFieldReference => "direct_field_reference",
            UsageKind::AccessorRenameReference => "accessor_rename_reference",
            UsageKind::EncapsulationRisk => "encapsulation_risk",
        }
    }
}

impl AffectedUsage {
    /// The originating element.
    pub fn element(&self) -> ElementId {
        match self {
            AffectedUsage::DirectFieldReference { field } => *field,
            AffectedUsage::AccessorRenameReference { element, .. } => *element,
            AffectedUsage::EncapsulationRisk { element, .. } => *element,
        }
    }

    pub fn kind(&self) -> UsageKind {
        match self {
            AffectedUsage::DirectFieldReference { .. } => UsageKind::DirectFieldReference,
            AffectedUsage::AccessorRenameReference { .. } => UsageKind::AccessorRenameReference,
            AffectedUsage::EncapsulationRisk { .. } => UsageKind::EncapsulationRisk,
        }
    }

    /// Structural usages describe the conversion itself and are never handed to the rename engine.
    pub fn is_structural(&self) -> bool {
        match self {
            AffectedUsage::DirectFieldReference { .. } | AffectedUsage::EncapsulationRisk { .. } => {
                true
            }
            AffectedUsage::AccessorRenameReference { .. } => false,
        }
    }

    pub fn site(&self) -> Option<&ReferenceSite> {
        match self {
            AffectedUsage::AccessorRenameReference { site, .. } => site.as_ref(),
            _ => None,
        }
    }
}
