use super::risk::RiskLevel;
use super::{not_nil, percentage, Resource};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScreeningType {
    Sanctions,
    Pep,
    AdverseMedia,
    Comprehensive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScreeningStatus {
    Pending,
    Clear,
    PotentialMatch,
    ConfirmedMatch,
    Failed,
}

/// AML screening run against a party
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmlScreening {
    pub id: Uuid,
    pub party_id: Uuid,
    pub screening_type: ScreeningType,
    pub provider: String,
    pub status: ScreeningStatus,
    pub risk_level: Option<RiskLevel>,
    pub notes: Option<String>,
    pub screened_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AmlScreeningRequest {
    #[validate(custom = "not_nil")]
    pub party_id: Uuid,
    pub screening_type: ScreeningType,
    #[validate(length(min = 1, max = 100))]
    pub provider: String,
    pub status: Option<ScreeningStatus>,
    pub risk_level: Option<RiskLevel>,
    #[validate(length(max = 4000))]
    pub notes: Option<String>,
}

impl_entity!(AmlScreening, table = "aml_screenings", kind = "AML screening", owner = party_id);

impl Resource for AmlScreening {
    type Request = AmlScreeningRequest;

    fn from_request(id: Uuid, request: AmlScreeningRequest, now: DateTime<Utc>) -> Self {
        AmlScreening {
            id,
            party_id: request.party_id,
            screening_type: request.screening_type,
            provider: request.provider,
            status: request.status.unwrap_or(ScreeningStatus::Pending),
            risk_level: request.risk_level,
            notes: request.notes,
            screened_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    fn carry_over(&mut self, existing: &Self) {
        self.created_at = existing.created_at;
        self.screened_at = existing.screened_at;
    }

    fn from_update(existing: &Self, request: AmlScreeningRequest, now: DateTime<Utc>) -> Self {
        // An update without a status keeps the one derived from the matches
        let status = request.status.unwrap_or(existing.status);
        let mut screening = Self::from_request(existing.id, request, now);
        screening.status = status;
        screening.carry_over(existing);
        screening
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListType {
    Sanctions,
    Pep,
    AdverseMedia,
    Watchlist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchDisposition {
    Unreviewed,
    FalsePositive,
    TruePositive,
}

/// Potential hit produced by a screening
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmlMatch {
    pub id: Uuid,
    pub screening_id: Uuid,
    pub matched_name: String,
    pub list_name: String,
    pub list_type: ListType,
    pub match_score: Decimal, // 0-100
    pub disposition: MatchDisposition,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AmlMatchRequest {
    /// Taken from the path when recorded through a screening
    #[serde(default)]
    #[validate(custom = "not_nil")]
    pub screening_id: Uuid,
    #[validate(length(min = 1, max = 255))]
    pub matched_name: String,
    #[validate(length(min = 1, max = 100))]
    pub list_name: String,
    pub list_type: ListType,
    #[validate(custom = "percentage")]
    pub match_score: Decimal,
}

impl_entity!(AmlMatch, table = "aml_matches", kind = "AML match", owner = screening_id);

impl Resource for AmlMatch {
    type Request = AmlMatchRequest;

    fn from_request(id: Uuid, request: AmlMatchRequest, now: DateTime<Utc>) -> Self {
        AmlMatch {
            id,
            screening_id: request.screening_id,
            matched_name: request.matched_name,
            list_name: request.list_name,
            list_type: request.list_type,
            match_score: request.match_score,
            disposition: MatchDisposition::Unreviewed,
            reviewed_by: None,
            reviewed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn carry_over(&mut self, existing: &Self) {
        self.screening_id = existing.screening_id;
        self.created_at = existing.created_at;
        self.disposition = existing.disposition;
        self.reviewed_by = existing.reviewed_by.clone();
        self.reviewed_at = existing.reviewed_at;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResolveMatchRequest {
    pub disposition: MatchDisposition,
    #[validate(length(min = 1, max = 255))]
    pub reviewed_by: String,
}
