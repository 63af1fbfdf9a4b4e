use crate::conflict::ConflictReport;
use crate::ids::ElementId;
use crate::usage::{AffectedUsage, UsageKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Record of one conversion run, handed back to the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    pub schema: String,
    pub declaration: ElementId,
    pub status: ConversionStatus,
    pub run: RunInfo,

    #[serde(default)]
    pub renames: Vec<RenameRecord>,

    #[serde(default)]
    pub usage_counts: UsageCounts,

    #[serde(default, skip_serializing_if = "ConflictReport::is_empty")]
    pub conflicts: ConflictReport,
}

impl ConversionReport {
    pub fn new(declaration: ElementId, started_at: DateTime<Utc>) -> Self {
        Self {
            schema: crate::schema::RECORDFIX_REPORT_V1.to_string(),
            declaration,
            status: ConversionStatus::Pending,
            run: RunInfo {
                started_at,
                ended_at: None,
            },
            renames: vec![],
            usage_counts: UsageCounts::default(),
            conflicts: ConflictReport::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionStatus {
    Pending,
    Applied,
    Aborted,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunInfo {
    pub started_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameRecord {
    pub element: ElementId,

    /// Name before the run.
    pub old_name: String,
    pub new_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCounts {
    pub direct_field_references: u64,
    pub accessor_renames: u64,
    pub reference_sites: u64,
    pub encapsulation_risks: u64,
}

impl UsageCounts {
    pub fn from_usages(usages: &[AffectedUsage]) -> Self {
        let mut counts = Self::default();
        for usage in usages {
            match usage.kind() {
                UsageKind::DirectFieldReference => counts.direct_field_references += 1,
                UsageKind::AccessorRenameReference if usage.site().is_some() => {
                    counts.reference_sites += 1
                }
                UsageKind::AccessorRenameReference => counts.accessor_renames += 1,
                UsageKind::EncapsulationRisk => counts.encapsulation_risks += 1,
            }
        }
        counts
    }
}
