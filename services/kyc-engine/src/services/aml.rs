use super::crud::CrudService;
use crate::errors::{KycEngineError, Result};
use crate::models::{
    AmlMatch, AmlMatchRequest, AmlScreening, MatchDisposition, ResolveMatchRequest,
    ScreeningStatus,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

pub struct AmlService {
    screenings: Arc<CrudService<AmlScreening>>,
    matches: Arc<CrudService<AmlMatch>>,
}

impl AmlService {
    pub fn new(
        screenings: Arc<CrudService<AmlScreening>>,
        matches: Arc<CrudService<AmlMatch>>,
    ) -> Self {
        AmlService {
            screenings,
            matches,
        }
    }

    /// Record a hit against an existing screening. A screening that was
    /// pending or clear becomes a potential match.
    pub async fn record_match(
        &self,
        screening_id: Uuid,
        mut request: AmlMatchRequest,
    ) -> Result<AmlMatch> {
        let mut screening = self.screenings.get(screening_id).await?;

        request.screening_id = screening_id;
        let aml_match = self.matches.create(request).await?;

        if matches!(
            screening.status,
            ScreeningStatus::Pending | ScreeningStatus::Clear
        ) {
            screening.status = ScreeningStatus::PotentialMatch;
            self.screenings.save(screening).await?;
            info!("Screening {} flagged as potential match", screening_id);
        }

        Ok(aml_match)
    }

    pub async fn matches_for(&self, screening_id: Uuid) -> Result<Vec<AmlMatch>> {
        self.screenings.get(screening_id).await?;
        self.matches.list_all_for(screening_id).await
    }

    /// Record an analyst's decision on a match and re-derive the screening
    /// status from all of its matches.
    pub async fn resolve_match(
        &self,
        match_id: Uuid,
        request: ResolveMatchRequest,
    ) -> Result<AmlMatch> {
        request.validate()?;
        if request.disposition == MatchDisposition::Unreviewed {
            return Err(KycEngineError::Validation(
                "disposition must be FALSE_POSITIVE or TRUE_POSITIVE".to_string(),
            ));
        }

        let mut aml_match = self.matches.get(match_id).await?;
        aml_match.disposition = request.disposition;
        aml_match.reviewed_by = Some(request.reviewed_by);
        aml_match.reviewed_at = Some(Utc::now());
        let aml_match = self.matches.save(aml_match).await?;

        info!(
            "AML match {} resolved as {:?}",
            match_id, aml_match.disposition
        );

        self.refresh_screening_status(aml_match.screening_id).await?;
        Ok(aml_match)
    }

    /// Remove a match and re-derive the status of its screening.
    pub async fn delete_match(&self, match_id: Uuid) -> Result<()> {
        let aml_match = self.matches.get(match_id).await?;
        self.matches.delete(match_id).await?;

        self.refresh_screening_status(aml_match.screening_id).await
    }

    /// Delete a screening together with its matches.
    pub async fn delete_screening(&self, screening_id: Uuid) -> Result<()> {
        self.screenings.get(screening_id).await?;

        for aml_match in self.matches.list_all_for(screening_id).await? {
            self.matches.delete(aml_match.id).await?;
        }
        self.screenings.delete(screening_id).await
    }

    async fn refresh_screening_status(&self, screening_id: Uuid) -> Result<()> {
        let mut screening = match self.screenings.get(screening_id).await {
            Ok(screening) => screening,
            Err(KycEngineError::NotFound { .. }) => {
                warn!("Match references missing screening {}", screening_id);
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let matches = self.matches.list_all_for(screening_id).await?;
        let status = screening_status_for(&matches);

        if screening.status != status {
            info!(
                "Screening {} status {:?} -> {:?}",
                screening_id, screening.status, status
            );
            screening.status = status;
            self.screenings.save(screening).await?;
        }
        Ok(())
    }
}

fn screening_status_for(matches: &[AmlMatch]) -> ScreeningStatus {
    if matches
        .iter()
        .any(|m| m.disposition == MatchDisposition::TruePositive)
    {
        ScreeningStatus::ConfirmedMatch
    } else if matches
        .iter()
        .any(|m| m.disposition == MatchDisposition::Unreviewed)
    {
        ScreeningStatus::PotentialMatch
    } else {
        ScreeningStatus::Clear
    }
}
