//! Applications with staged approval, and work assignments.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Approval stage of an application.
///
/// Applications move `PendingL0 → PendingL1 → PendingL2 → Approved`, and may be
/// rejected at any pending stage. The transitions themselves are decided by the
/// server; the client only labels them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    #[serde(rename = "PENDING_L0")]
    PendingL0,
    #[serde(rename = "PENDING_L1")]
    PendingL1,
    #[serde(rename = "PENDING_L2")]
    PendingL2,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::PendingL0 => "Pending (Level 0)",
            Self::PendingL1 => "Pending (Level 1)",
            Self::PendingL2 => "Pending (Level 2)",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }

    pub fn is_pending(self) -> bool {
        matches!(self, Self::PendingL0 | Self::PendingL1 | Self::PendingL2)
    }

    /// Stage reached after an approval at the current stage.
    pub fn next_on_approval(self) -> Option<Self> {
        match self {
            Self::PendingL0 => Some(Self::PendingL1),
            Self::PendingL1 => Some(Self::PendingL2),
            Self::PendingL2 => Some(Self::Approved),
            Self::Approved | Self::Rejected => None,
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub kind: String,
    pub subject: String,
    pub body: String,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub applicant_name: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitApplicationRequest {
    pub kind: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Approve,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveStageRequest {
    pub id: String,
    pub decision: Decision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ApplicationStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkStatus {
    Assigned,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkAssignment {
    pub id: String,
    pub title: String,
    pub assignee_id: String,
    pub status: WorkStatus,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignWorkRequest {
    pub title: String,
    pub assignee_id: String,
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub due_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateWorkStatusRequest {
    pub id: String,
    pub status: WorkStatus,
}
