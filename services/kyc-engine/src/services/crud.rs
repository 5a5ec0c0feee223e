use crate::errors::{KycEngineError, Result};
use crate::metrics;
use crate::models::{Entity, Resource, Verifiable};
use crate::repository::{Page, Repository};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy)]
pub struct PageLimits {
    pub default_size: i64,
    pub max_size: i64,
}

impl PageLimits {
    pub fn page(&self, limit: Option<i64>, offset: Option<i64>) -> Page {
        let limit = limit.unwrap_or(self.default_size).clamp(1, self.max_size);
        Page::new(limit, offset.unwrap_or(0))
    }
}

/// Request → entity → repository → entity, for any [`Resource`].
pub struct CrudService<E: Resource> {
    repo: Arc<dyn Repository<E>>,
    limits: PageLimits,
}

impl<E: Resource> CrudService<E> {
    pub fn new(repo: Arc<dyn Repository<E>>, limits: PageLimits) -> Self {
        CrudService { repo, limits }
    }

    pub fn limits(&self) -> PageLimits {
        self.limits
    }

    pub async fn create(&self, request: E::Request) -> Result<E> {
        let result = self.create_inner(request).await;
        metrics::record_operation(E::KIND, "create", &result);
        result
    }

    async fn create_inner(&self, request: E::Request) -> Result<E> {
        request.validate()?;

        let entity = E::from_request(Uuid::new_v4(), request, Utc::now());
        let entity = self.persist(entity).await?;

        info!("Created {} {} for {}", E::KIND, entity.id(), entity.owner_id());
        Ok(entity)
    }

    pub async fn get(&self, id: Uuid) -> Result<E> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(KycEngineError::NotFound { kind: E::KIND, id })
    }

    pub async fn list(&self, owner_id: Option<Uuid>, page: Page) -> Result<Vec<E>> {
        match owner_id {
            Some(owner_id) => self.repo.find_by_owner(owner_id, page).await,
            None => self.repo.find_all(page).await,
        }
    }

    /// Every record of one owner, unpaged.
    pub async fn list_all_for(&self, owner_id: Uuid) -> Result<Vec<E>> {
        self.repo.find_by_owner(owner_id, Page::all()).await
    }

    pub async fn count_for(&self, owner_id: Uuid) -> Result<i64> {
        self.repo.count_by_owner(owner_id).await
    }

    pub async fn update(&self, id: Uuid, request: E::Request) -> Result<E> {
        let result = self.update_inner(id, request).await;
        metrics::record_operation(E::KIND, "update", &result);
        result
    }

    async fn update_inner(&self, id: Uuid, request: E::Request) -> Result<E> {
        request.validate()?;

        let existing = self.get(id).await?;
        existing.ensure_mutable()?;

        let entity = E::from_update(&existing, request, Utc::now());
        let entity = self.persist(entity).await?;

        info!("Updated {} {}", E::KIND, id);
        Ok(entity)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = self.delete_inner(id).await;
        metrics::record_operation(E::KIND, "delete", &result);
        result
    }

    async fn delete_inner(&self, id: Uuid) -> Result<()> {
        let existing = self.get(id).await?;
        existing.ensure_mutable()?;

        if !self.repo.delete_by_id(id).await? {
            return Err(KycEngineError::NotFound { kind: E::KIND, id });
        }

        info!("Deleted {} {}", E::KIND, id);
        Ok(())
    }

    /// Persist a record changed by a domain operation (status change,
    /// review outcome) rather than by a request payload.
    pub async fn save(&self, mut entity: E) -> Result<E> {
        entity.touch(Utc::now());
        self.persist(entity).await
    }

    pub async fn primary(&self, owner_id: Uuid) -> Result<E> {
        self.repo
            .find_primary(owner_id)
            .await?
            .ok_or(KycEngineError::NoPrimary {
                kind: E::KIND,
                owner_id,
            })
    }

    async fn persist(&self, entity: E) -> Result<E> {
        if !entity.is_primary() {
            self.repo.save(&entity).await?;
            return Ok(entity);
        }

        let demoted = self.repo.save_primary(&entity).await?;
        if !demoted.is_empty() {
            info!(
                "{} {} is now primary for {}; demoted {:?}",
                E::KIND,
                entity.id(),
                entity.owner_id(),
                demoted
            );
        }
        metrics::record_demotions(E::KIND, demoted.len());
        Ok(entity)
    }
}

impl<E: Verifiable> CrudService<E> {
    pub async fn verify(&self, id: Uuid, verifier: &str) -> Result<E> {
        let result = self.verify_inner(id, verifier).await;
        metrics::record_operation(E::KIND, "verify", &result);
        result
    }

    async fn verify_inner(&self, id: Uuid, verifier: &str) -> Result<E> {
        let verifier = verifier.trim();
        if verifier.is_empty() {
            return Err(KycEngineError::Validation(
                "verified_by must not be empty".to_string(),
            ));
        }

        let mut entity = self.get(id).await?;
        if entity.is_verified() {
            debug!("{} {} already verified", E::KIND, id);
            return Ok(entity);
        }

        if let Some(reason) = entity.verification_blocker(Utc::now().date_naive()) {
            return Err(KycEngineError::InvalidStatus(reason));
        }

        entity.mark_verified(verifier, Utc::now());
        let entity = self.save(entity).await?;

        info!("{} {} verified by {}", E::KIND, id, verifier);
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Address, BusinessLocation, BusinessLocationRequest, DocumentType, KycDocument,
        KycDocumentRequest, LocationType, RegulatoryReport, RegulatoryReportRequest,
        ReportStatus, ReportType,
    };
    use crate::repository::InMemoryRepository;
    use chrono::NaiveDate;

    const LIMITS: PageLimits = PageLimits {
        default_size: 50,
        max_size: 100,
    };

    fn service<E: Resource>() -> CrudService<E> {
        CrudService::new(Arc::new(InMemoryRepository::<E>::new()), LIMITS)
    }

    fn location_request(party_id: Uuid, city: &str, is_primary: bool) -> BusinessLocationRequest {
        BusinessLocationRequest {
            party_id,
            location_type: LocationType::Branch,
            address: Address {
                line1: "Main Street 1".to_string(),
                line2: None,
                city: city.to_string(),
                region: None,
                postal_code: None,
                country: "CH".to_string(),
            },
            is_primary,
        }
    }

    #[test]
    fn test_page_limits_clamp() {
        assert_eq!(LIMITS.page(None, None), Page::new(50, 0));
        assert_eq!(LIMITS.page(Some(1000), Some(10)), Page::new(100, 10));
        assert_eq!(LIMITS.page(Some(0), Some(-5)), Page::new(1, 0));
    }

    #[tokio::test]
    async fn test_update_preserves_creation_and_verification() {
        let svc = service::<BusinessLocation>();
        let party = Uuid::new_v4();

        let created = svc.create(location_request(party, "Zurich", false)).await.unwrap();
        svc.verify(created.id, "kyb-ops").await.unwrap();

        let updated = svc
            .update(created.id, location_request(party, "Zurich", false))
            .await
            .unwrap();
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.verified);
        assert_eq!(updated.verified_by.as_deref(), Some("kyb-ops"));
    }

    #[tokio::test]
    async fn test_single_primary_per_party() {
        let svc = service::<BusinessLocation>();
        let party = Uuid::new_v4();

        let geneva = svc.create(location_request(party, "Geneva", true)).await.unwrap();
        let basel = svc.create(location_request(party, "Basel", true)).await.unwrap();

        assert_eq!(svc.primary(party).await.unwrap().id, basel.id);
        assert!(!svc.get(geneva.id).await.unwrap().is_primary);

        // promoting geneva again via update flips it back
        svc.update(geneva.id, location_request(party, "Geneva", true))
            .await
            .unwrap();
        assert_eq!(svc.primary(party).await.unwrap().id, geneva.id);
        let primaries = svc
            .list_all_for(party)
            .await
            .unwrap()
            .into_iter()
            .filter(|l| l.is_primary)
            .count();
        assert_eq!(primaries, 1);
    }

    #[tokio::test]
    async fn test_missing_records() {
        let svc = service::<BusinessLocation>();
        let id = Uuid::new_v4();

        assert!(matches!(
            svc.get(id).await,
            Err(KycEngineError::NotFound { .. })
        ));
        assert!(matches!(
            svc.update(id, location_request(Uuid::new_v4(), "Bern", false)).await,
            Err(KycEngineError::NotFound { .. })
        ));
        assert!(matches!(
            svc.delete(id).await,
            Err(KycEngineError::NotFound { .. })
        ));
        assert!(matches!(
            svc.primary(Uuid::new_v4()).await,
            Err(KycEngineError::NoPrimary { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_request_is_not_persisted() {
        let svc = service::<BusinessLocation>();
        let party = Uuid::new_v4();
        let mut request = location_request(party, "Lugano", false);
        request.address.city.clear();

        assert!(matches!(
            svc.create(request).await,
            Err(KycEngineError::Validation(_))
        ));
        assert_eq!(svc.count_for(party).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_frozen_records_reject_update_and_delete() {
        let svc = service::<RegulatoryReport>();
        let request = RegulatoryReportRequest {
            party_id: Uuid::new_v4(),
            report_type: ReportType::Sar,
            jurisdiction: "GB".to_string(),
            regulator: "NCA".to_string(),
            narrative: Some("Structured cash deposits".to_string()),
            amount: None,
            currency: None,
        };

        let mut report = svc.create(request.clone()).await.unwrap();
        report.status = ReportStatus::Submitted;
        let report = svc.save(report).await.unwrap();

        assert!(matches!(
            svc.update(report.id, request).await,
            Err(KycEngineError::Conflict(_))
        ));
        assert!(matches!(
            svc.delete(report.id).await,
            Err(KycEngineError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_expired_document_verification_is_refused() {
        let svc = service::<KycDocument>();
        let doc = svc
            .create(KycDocumentRequest {
                party_id: Uuid::new_v4(),
                document_type: DocumentType::NationalId,
                file_name: "id.png".to_string(),
                storage_uri: "s3://kyc-docs/id.png".to_string(),
                content_type: Some("image/png".to_string()),
                issuing_country: Some("FR".to_string()),
                issued_on: NaiveDate::from_ymd_opt(2010, 1, 1),
                expires_on: NaiveDate::from_ymd_opt(2020, 1, 1),
            })
            .await
            .unwrap();

        assert!(matches!(
            svc.verify(doc.id, "ops").await,
            Err(KycEngineError::InvalidStatus(_))
        ));
        assert!(matches!(
            svc.verify(doc.id, "  ").await,
            Err(KycEngineError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_reverify_after_expiry_is_a_no_op() {
        let svc = service::<KycDocument>();
        let doc = svc
            .create(KycDocumentRequest {
                party_id: Uuid::new_v4(),
                document_type: DocumentType::Passport,
                file_name: "passport.pdf".to_string(),
                storage_uri: "s3://kyc-docs/passport.pdf".to_string(),
                content_type: Some("application/pdf".to_string()),
                issuing_country: Some("IT".to_string()),
                issued_on: NaiveDate::from_ymd_opt(2012, 3, 1),
                expires_on: NaiveDate::from_ymd_opt(2022, 3, 1),
            })
            .await
            .unwrap();

        // verified while still valid, then the document lapsed
        let mut verified = doc.clone();
        verified.mark_verified("ops", Utc::now());
        svc.save(verified).await.unwrap();

        let again = svc.verify(doc.id, "ops-2").await.unwrap();
        assert!(again.verified);
        assert_eq!(again.verified_by.as_deref(), Some("ops"));
    }
}
