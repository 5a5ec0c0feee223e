use super::{not_nil, percentage, Resource};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RiskFactor {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub score: Decimal,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

/// Risk rating recorded for a party by an analyst or an upstream model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub id: Uuid,
    pub party_id: Uuid,
    pub risk_score: Decimal, // 0-100
    pub risk_level: RiskLevel,
    pub methodology: String,
    pub factors: Vec<RiskFactor>,
    pub assessed_by: String,
    pub assessed_at: DateTime<Utc>,
    pub next_review_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RiskAssessmentRequest {
    #[validate(custom = "not_nil")]
    pub party_id: Uuid,
    #[validate(custom = "percentage")]
    pub risk_score: Decimal,
    pub risk_level: RiskLevel,
    #[validate(length(min = 1, max = 100))]
    pub methodology: String,
    #[serde(default)]
    #[validate]
    pub factors: Vec<RiskFactor>,
    #[validate(length(min = 1, max = 255))]
    pub assessed_by: String,
    pub assessed_at: Option<DateTime<Utc>>,
    pub next_review_date: Option<NaiveDate>,
}

impl_entity!(RiskAssessment, table = "risk_assessments", kind = "risk assessment", owner = party_id);

impl Resource for RiskAssessment {
    type Request = RiskAssessmentRequest;

    fn from_request(id: Uuid, request: RiskAssessmentRequest, now: DateTime<Utc>) -> Self {
        RiskAssessment {
            id,
            party_id: request.party_id,
            risk_score: request.risk_score,
            risk_level: request.risk_level,
            methodology: request.methodology,
            factors: request.factors,
            assessed_by: request.assessed_by,
            assessed_at: request.assessed_at.unwrap_or(now),
            next_review_date: request.next_review_date,
            created_at: now,
            updated_at: now,
        }
    }

    fn carry_over(&mut self, existing: &Self) {
        self.created_at = existing.created_at;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DueDiligenceStatus {
    Requested,
    InProgress,
    Completed,
    Rejected,
}

impl DueDiligenceStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, DueDiligenceStatus::Completed | DueDiligenceStatus::Rejected)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancedDueDiligence {
    pub id: Uuid,
    pub party_id: Uuid,
    pub trigger_reason: String,
    pub status: DueDiligenceStatus,
    pub source_of_funds: Option<String>,
    pub source_of_wealth: Option<String>,
    pub findings: Option<String>,
    pub reviewer: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EnhancedDueDiligenceRequest {
    #[validate(custom = "not_nil")]
    pub party_id: Uuid,
    #[validate(length(min = 1, max = 1000))]
    pub trigger_reason: String,
    pub status: Option<DueDiligenceStatus>,
    #[validate(length(max = 4000))]
    pub source_of_funds: Option<String>,
    #[validate(length(max = 4000))]
    pub source_of_wealth: Option<String>,
    #[validate(length(max = 8000))]
    pub findings: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub reviewer: Option<String>,
}

impl_entity!(
    EnhancedDueDiligence,
    table = "enhanced_due_diligence",
    kind = "enhanced due diligence",
    owner = party_id
);

impl Resource for EnhancedDueDiligence {
    type Request = EnhancedDueDiligenceRequest;

    fn from_request(id: Uuid, request: EnhancedDueDiligenceRequest, now: DateTime<Utc>) -> Self {
        let status = request.status.unwrap_or(DueDiligenceStatus::Requested);
        EnhancedDueDiligence {
            id,
            party_id: request.party_id,
            trigger_reason: request.trigger_reason,
            status,
            source_of_funds: request.source_of_funds,
            source_of_wealth: request.source_of_wealth,
            findings: request.findings,
            reviewer: request.reviewer,
            completed_at: status.is_terminal().then_some(now),
            created_at: now,
            updated_at: now,
        }
    }

    fn carry_over(&mut self, existing: &Self) {
        self.created_at = existing.created_at;
        // Keep the first completion time while the review stays finished
        if self.status.is_terminal() && existing.status.is_terminal() {
            self.completed_at = existing.completed_at;
        }
    }
}
