use super::{not_nil, upper_alpha, Resource};
use crate::errors::{KycEngineError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportType {
    Sar, // Suspicious Activity Report
    Ctr, // Currency Transaction Report
    Str, // Suspicious Transaction Report
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    Draft,
    Submitted,
    Acknowledged,
    Rejected,
}

impl ReportStatus {
    /// Draft and regulator-rejected reports can still be edited and submitted
    pub fn is_editable(self) -> bool {
        matches!(self, ReportStatus::Draft | ReportStatus::Rejected)
    }
}

/// Filing made to a regulator about a party
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegulatoryReport {
    pub id: Uuid,
    pub party_id: Uuid,
    pub report_type: ReportType,
    pub jurisdiction: String,
    pub regulator: String,
    pub status: ReportStatus,
    pub reference_number: Option<String>,
    pub narrative: Option<String>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_report"))]
pub struct RegulatoryReportRequest {
    #[validate(custom = "not_nil")]
    pub party_id: Uuid,
    pub report_type: ReportType,
    #[validate(length(equal = 2), custom = "upper_alpha")]
    pub jurisdiction: String,
    #[validate(length(min = 1, max = 100))]
    pub regulator: String,
    #[validate(length(max = 20000))]
    pub narrative: Option<String>,
    pub amount: Option<Decimal>,
    #[validate(length(equal = 3), custom = "upper_alpha")]
    pub currency: Option<String>,
}

fn validate_report(request: &RegulatoryReportRequest) -> std::result::Result<(), ValidationError> {
    if let Some(amount) = request.amount {
        if amount.is_sign_negative() {
            return Err(ValidationError::new("negative_amount"));
        }
        if request.currency.is_none() {
            return Err(ValidationError::new("amount_without_currency"));
        }
    }
    Ok(())
}

impl_entity!(RegulatoryReport, table = "regulatory_reports", kind = "regulatory report", owner = party_id);

impl Resource for RegulatoryReport {
    type Request = RegulatoryReportRequest;

    fn from_request(id: Uuid, request: RegulatoryReportRequest, now: DateTime<Utc>) -> Self {
        RegulatoryReport {
            id,
            party_id: request.party_id,
            report_type: request.report_type,
            jurisdiction: request.jurisdiction,
            regulator: request.regulator,
            status: ReportStatus::Draft,
            reference_number: None,
            narrative: request.narrative,
            amount: request.amount,
            currency: request.currency,
            submitted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn carry_over(&mut self, existing: &Self) {
        self.created_at = existing.created_at;
        self.status = existing.status;
        self.reference_number = existing.reference_number.clone();
        self.submitted_at = existing.submitted_at;
    }

    fn ensure_mutable(&self) -> Result<()> {
        if self.status.is_editable() {
            Ok(())
        } else {
            Err(KycEngineError::Conflict(format!(
                "regulatory report {} is {:?} and can no longer be changed",
                self.id, self.status
            )))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitReportRequest {
    #[validate(length(min = 1, max = 100))]
    pub reference_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOutcomeRequest {
    pub outcome: ReportStatus,
}
