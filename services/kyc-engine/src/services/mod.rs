//! Business logic layer.
//!
//! Every entity gets a [`CrudService`]; the workflows that touch more than one
//! record (match review, case handling, report filing, UBO derivation) live in
//! their own services on top of those.

pub mod aml;
pub mod cases;
pub mod crud;
pub mod ownership;
pub mod reporting;

pub use aml::AmlService;
pub use cases::CaseService;
pub use crud::{CrudService, PageLimits};
pub use ownership::{BeneficialOwners, OwnershipService};
pub use reporting::ReportingService;

use crate::config::ComplianceConfig;
use crate::database;
use crate::errors::Result;
use crate::models::{
    AmlMatch, AmlScreening, BusinessLocation, BusinessProfile, ComplianceAction, ComplianceCase,
    CorporateStructure, EconomicActivity, EnhancedDueDiligence, KycDocument, Ownership,
    RegulatoryReport, Resource, RiskAssessment,
};
use crate::repository::{InMemoryProvider, RepositoryProvider};
use sqlx::PgPool;
use std::sync::Arc;

/// Backing store, kept for health reporting.
#[derive(Clone)]
pub enum Storage {
    Postgres(PgPool),
    Memory,
}

impl Storage {
    pub fn name(&self) -> &'static str {
        match self {
            Storage::Postgres(_) => "postgres",
            Storage::Memory => "memory",
        }
    }

    pub async fn health_check(&self) -> Result<()> {
        match self {
            Storage::Postgres(pool) => database::health_check(pool).await,
            Storage::Memory => Ok(()),
        }
    }
}

#[derive(Clone)]
pub struct KycServices {
    pub screenings: Arc<CrudService<AmlScreening>>,
    pub matches: Arc<CrudService<AmlMatch>>,
    pub profiles: Arc<CrudService<BusinessProfile>>,
    pub locations: Arc<CrudService<BusinessLocation>>,
    pub activities: Arc<CrudService<EconomicActivity>>,
    pub cases: Arc<CrudService<ComplianceCase>>,
    pub actions: Arc<CrudService<ComplianceAction>>,
    pub structures: Arc<CrudService<CorporateStructure>>,
    pub ownerships: Arc<CrudService<Ownership>>,
    pub risk_assessments: Arc<CrudService<RiskAssessment>>,
    pub due_diligence: Arc<CrudService<EnhancedDueDiligence>>,
    pub reports: Arc<CrudService<RegulatoryReport>>,
    pub documents: Arc<CrudService<KycDocument>>,

    pub aml: Arc<AmlService>,
    pub case_workflow: Arc<CaseService>,
    pub ownership: Arc<OwnershipService>,
    pub reporting: Arc<ReportingService>,

    pub storage: Storage,
}

impl KycServices {
    pub fn build<P: RepositoryProvider>(
        provider: &P,
        config: &ComplianceConfig,
        storage: Storage,
    ) -> Result<Self> {
        let limits = PageLimits {
            default_size: config.default_page_size,
            max_size: config.max_page_size,
        };

        fn crud<E: Resource, P: RepositoryProvider>(
            provider: &P,
            limits: PageLimits,
        ) -> Arc<CrudService<E>> {
            Arc::new(CrudService::new(provider.repository::<E>(), limits))
        }

        let screenings = crud(provider, limits);
        let matches = crud(provider, limits);
        let cases = crud(provider, limits);
        let actions = crud(provider, limits);
        let ownerships = crud(provider, limits);
        let reports = crud(provider, limits);

        Ok(KycServices {
            aml: Arc::new(AmlService::new(Arc::clone(&screenings), Arc::clone(&matches))),
            case_workflow: Arc::new(CaseService::new(Arc::clone(&cases), Arc::clone(&actions))),
            ownership: Arc::new(OwnershipService::new(
                Arc::clone(&ownerships),
                config.ubo_threshold_percent,
            )?),
            reporting: Arc::new(ReportingService::new(Arc::clone(&reports))),

            screenings,
            matches,
            profiles: crud(provider, limits),
            locations: crud(provider, limits),
            activities: crud(provider, limits),
            cases,
            actions,
            structures: crud(provider, limits),
            ownerships,
            risk_assessments: crud(provider, limits),
            due_diligence: crud(provider, limits),
            reports,
            documents: crud(provider, limits),
            storage,
        })
    }

    pub fn in_memory(config: &ComplianceConfig) -> Result<Self> {
        Self::build(&InMemoryProvider::new(), config, Storage::Memory)
    }
}
