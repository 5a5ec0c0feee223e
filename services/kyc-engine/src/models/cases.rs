use super::{not_nil, Resource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseType {
    Onboarding,
    PeriodicReview,
    AmlAlert,
    EventDriven,
    Investigation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
    Open,
    InProgress,
    PendingInformation,
    Escalated,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CasePriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceCase {
    pub id: Uuid,
    pub party_id: Uuid,
    pub case_type: CaseType,
    pub status: CaseStatus,
    pub priority: CasePriority,
    pub assigned_to: Option<String>,
    pub summary: Option<String>,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ComplianceCaseRequest {
    #[validate(custom = "not_nil")]
    pub party_id: Uuid,
    pub case_type: CaseType,
    #[serde(default)]
    pub priority: CasePriority,
    #[validate(length(min = 1, max = 255))]
    pub assigned_to: Option<String>,
    #[validate(length(max = 4000))]
    pub summary: Option<String>,
}

impl_entity!(ComplianceCase, table = "compliance_cases", kind = "compliance case", owner = party_id);

impl ComplianceCase {
    /// Sets the status directly. Closing stamps `closed_at`; any other status
    /// clears it.
    pub fn apply_status(&mut self, status: CaseStatus, now: DateTime<Utc>) {
        match status {
            CaseStatus::Closed => {
                if self.status != CaseStatus::Closed {
                    self.closed_at = Some(now);
                }
            }
            _ => self.closed_at = None,
        }
        self.status = status;
    }
}

impl Resource for ComplianceCase {
    type Request = ComplianceCaseRequest;

    fn from_request(id: Uuid, request: ComplianceCaseRequest, now: DateTime<Utc>) -> Self {
        ComplianceCase {
            id,
            party_id: request.party_id,
            case_type: request.case_type,
            status: CaseStatus::Open,
            priority: request.priority,
            assigned_to: request.assigned_to,
            summary: request.summary,
            opened_at: now,
            closed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn carry_over(&mut self, existing: &Self) {
        self.created_at = existing.created_at;
        self.status = existing.status;
        self.opened_at = existing.opened_at;
        self.closed_at = existing.closed_at;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseStatusRequest {
    pub status: CaseStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    Note,
    RequestInformation,
    Assign,
    Escalate,
    Approve,
    Reject,
    Close,
    Reopen,
}

/// Entry in the audit trail of a compliance case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceAction {
    pub id: Uuid,
    pub case_id: Uuid,
    pub action_type: ActionType,
    pub performed_by: String,
    pub notes: Option<String>,
    pub performed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ComplianceActionRequest {
    /// Taken from the path when added through a case
    #[serde(default)]
    #[validate(custom = "not_nil")]
    pub case_id: Uuid,
    pub action_type: ActionType,
    #[validate(length(min = 1, max = 255))]
    pub performed_by: String,
    #[validate(length(max = 4000))]
    pub notes: Option<String>,
}

impl_entity!(
    ComplianceAction,
    table = "compliance_actions",
    kind = "compliance action",
    owner = case_id
);

impl Resource for ComplianceAction {
    type Request = ComplianceActionRequest;

    fn from_request(id: Uuid, request: ComplianceActionRequest, now: DateTime<Utc>) -> Self {
        ComplianceAction {
            id,
            case_id: request.case_id,
            action_type: request.action_type,
            performed_by: request.performed_by,
            notes: request.notes,
            performed_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    fn carry_over(&mut self, existing: &Self) {
        self.case_id = existing.case_id;
        self.created_at = existing.created_at;
        self.performed_at = existing.performed_at;
    }
}
