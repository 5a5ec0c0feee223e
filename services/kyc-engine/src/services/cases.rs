use super::crud::CrudService;
use crate::errors::Result;
use crate::models::{
    CaseStatus, CaseStatusRequest, ComplianceAction, ComplianceActionRequest, ComplianceCase,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub struct CaseService {
    cases: Arc<CrudService<ComplianceCase>>,
    actions: Arc<CrudService<ComplianceAction>>,
}

impl CaseService {
    pub fn new(
        cases: Arc<CrudService<ComplianceCase>>,
        actions: Arc<CrudService<ComplianceAction>>,
    ) -> Self {
        CaseService { cases, actions }
    }

    pub async fn set_status(&self, case_id: Uuid, request: CaseStatusRequest) -> Result<ComplianceCase> {
        let mut case = self.cases.get(case_id).await?;
        let previous = case.status;

        case.apply_status(request.status, Utc::now());
        let case = self.cases.save(case).await?;

        info!("Case {} status {:?} -> {:?}", case_id, previous, case.status);
        Ok(case)
    }

    pub async fn add_action(
        &self,
        case_id: Uuid,
        mut request: ComplianceActionRequest,
    ) -> Result<ComplianceAction> {
        self.cases.get(case_id).await?;

        request.case_id = case_id;
        self.actions.create(request).await
    }

    /// Audit trail of a case, oldest first.
    pub async fn actions_for(&self, case_id: Uuid) -> Result<Vec<ComplianceAction>> {
        self.cases.get(case_id).await?;
        self.actions.list_all_for(case_id).await
    }

    pub async fn open_cases_for(&self, party_id: Uuid) -> Result<Vec<ComplianceCase>> {
        let cases = self.cases.list_all_for(party_id).await?;
        Ok(cases
            .into_iter()
            .filter(|c| c.status != CaseStatus::Closed)
            .collect())
    }

    /// Delete a case together with its actions.
    pub async fn delete_case(&self, case_id: Uuid) -> Result<()> {
        self.cases.get(case_id).await?;

        for action in self.actions.list_all_for(case_id).await? {
            self.actions.delete(action.id).await?;
        }
        self.cases.delete(case_id).await
    }
}
