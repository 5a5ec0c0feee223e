use super::crud::CrudService;
use crate::errors::{KycEngineError, Result};
use crate::models::{RegulatoryReport, ReportOutcomeRequest, ReportStatus, SubmitReportRequest};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Filing lifecycle: DRAFT/REJECTED -> SUBMITTED -> ACKNOWLEDGED | REJECTED
pub struct ReportingService {
    reports: Arc<CrudService<RegulatoryReport>>,
}

impl ReportingService {
    pub fn new(reports: Arc<CrudService<RegulatoryReport>>) -> Self {
        ReportingService { reports }
    }

    pub async fn submit(&self, report_id: Uuid, request: SubmitReportRequest) -> Result<RegulatoryReport> {
        request.validate()?;

        let mut report = self.reports.get(report_id).await?;
        if !report.status.is_editable() {
            return Err(KycEngineError::InvalidStatus(format!(
                "report {} is {:?}; only DRAFT or REJECTED reports can be submitted",
                report_id, report.status
            )));
        }

        report.status = ReportStatus::Submitted;
        report.reference_number = Some(request.reference_number);
        report.submitted_at = Some(Utc::now());
        let report = self.reports.save(report).await?;

        info!(
            "Report {} submitted to {} (ref {:?})",
            report_id, report.regulator, report.reference_number
        );
        Ok(report)
    }

    pub async fn record_outcome(
        &self,
        report_id: Uuid,
        request: ReportOutcomeRequest,
    ) -> Result<RegulatoryReport> {
        if !matches!(
            request.outcome,
            ReportStatus::Acknowledged | ReportStatus::Rejected
        ) {
            return Err(KycEngineError::Validation(
                "outcome must be ACKNOWLEDGED or REJECTED".to_string(),
            ));
        }

        let mut report = self.reports.get(report_id).await?;
        if report.status != ReportStatus::Submitted {
            return Err(KycEngineError::InvalidStatus(format!(
                "report {} is {:?}; an outcome needs a SUBMITTED report",
                report_id, report.status
            )));
        }

        report.status = request.outcome;
        let report = self.reports.save(report).await?;

        info!("Report {} outcome {:?}", report_id, report.status);
        Ok(report)
    }
}
