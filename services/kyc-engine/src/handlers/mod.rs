pub mod crud;
pub mod workflow;

use crate::errors::KycEngineError;
use crate::metrics;
use crate::models::{
    AmlMatch, AmlScreening, BusinessLocation, BusinessProfile, ComplianceAction, ComplianceCase,
    CorporateStructure, EconomicActivity, EnhancedDueDiligence, KycDocument, Ownership,
    RegulatoryReport, RiskAssessment,
};
use crate::services::KycServices;
use actix_web::{web, HttpResponse};
use serde_json::json;

/// Health check endpoint
pub async fn health_check(services: web::Data<KycServices>) -> HttpResponse {
    let storage = services.storage.name();

    match services.storage.health_check().await {
        Ok(()) => HttpResponse::Ok().json(json!({
            "status": "healthy",
            "service": "kyc-engine",
            "version": env!("CARGO_PKG_VERSION"),
            "storage": storage
        })),
        Err(e) => {
            tracing::error!("Storage health check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "unhealthy",
                "service": "kyc-engine",
                "storage": storage,
                "error": e.to_string()
            }))
        }
    }
}

/// Prometheus metrics endpoint
pub async fn metrics_endpoint() -> HttpResponse {
    match metrics::metrics_handler() {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(body),
        Err(e) => HttpResponse::InternalServerError().json(json!({
            "error": "Failed to gather metrics",
            "details": e.to_string()
        })),
    }
}

/// Register shared state, extractor error handling and every route.
pub fn configure_app(cfg: &mut web::ServiceConfig, services: &KycServices) {
    cfg.app_data(web::Data::new(services.clone()))
        .app_data(web::Data::new(services.screenings.clone()))
        .app_data(web::Data::new(services.matches.clone()))
        .app_data(web::Data::new(services.profiles.clone()))
        .app_data(web::Data::new(services.locations.clone()))
        .app_data(web::Data::new(services.activities.clone()))
        .app_data(web::Data::new(services.cases.clone()))
        .app_data(web::Data::new(services.actions.clone()))
        .app_data(web::Data::new(services.structures.clone()))
        .app_data(web::Data::new(services.ownerships.clone()))
        .app_data(web::Data::new(services.risk_assessments.clone()))
        .app_data(web::Data::new(services.due_diligence.clone()))
        .app_data(web::Data::new(services.reports.clone()))
        .app_data(web::Data::new(services.documents.clone()))
        .app_data(web::Data::new(services.aml.clone()))
        .app_data(web::Data::new(services.case_workflow.clone()))
        .app_data(web::Data::new(services.ownership.clone()))
        .app_data(web::Data::new(services.reporting.clone()))
        .app_data(web::JsonConfig::default().error_handler(|err, _req| {
            KycEngineError::Validation(err.to_string()).into()
        }))
        .app_data(web::QueryConfig::default().error_handler(|err, _req| {
            KycEngineError::Validation(err.to_string()).into()
        }))
        .app_data(web::PathConfig::default().error_handler(|err, _req| {
            KycEngineError::Validation(err.to_string()).into()
        }));

    configure_routes(cfg);
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(
                crud::collection::<AmlScreening>("/aml-screenings")
                    .route("/{id}", web::delete().to(workflow::delete_screening))
                    .route("/{id}/matches", web::post().to(workflow::record_match))
                    .route("/{id}/matches", web::get().to(workflow::screening_matches)),
            )
            .service(
                crud::child_collection::<AmlMatch>("/aml-matches")
                    .route("", web::post().to(workflow::create_match))
                    .route("/{id}", web::delete().to(workflow::delete_match))
                    .route("/{id}/resolve", web::post().to(workflow::resolve_match)),
            )
            .service(
                crud::resource_scope::<BusinessProfile>("/business-profiles")
                    .route("/{id}/verify", web::post().to(crud::verify::<BusinessProfile>)),
            )
            .service(
                crud::resource_scope::<BusinessLocation>("/business-locations")
                    .route(
                        "/primary/{party_id}",
                        web::get().to(crud::primary::<BusinessLocation>),
                    )
                    .route("/{id}/verify", web::post().to(crud::verify::<BusinessLocation>)),
            )
            .service(
                crud::resource_scope::<EconomicActivity>("/economic-activities").route(
                    "/primary/{party_id}",
                    web::get().to(crud::primary::<EconomicActivity>),
                ),
            )
            .service(
                crud::collection::<ComplianceCase>("/compliance-cases")
                    .route("/open/{party_id}", web::get().to(workflow::open_cases))
                    .route("/{id}", web::delete().to(workflow::delete_case))
                    .route("/{id}/status", web::put().to(workflow::set_case_status))
                    .route("/{id}/actions", web::post().to(workflow::add_case_action))
                    .route("/{id}/actions", web::get().to(workflow::case_actions)),
            )
            .service(
                crud::child_collection::<ComplianceAction>("/compliance-actions")
                    .route("", web::post().to(workflow::create_case_action))
                    .route("/{id}", web::delete().to(crud::delete::<ComplianceAction>)),
            )
            .service(crud::resource_scope::<CorporateStructure>("/corporate-structures"))
            .service(
                crud::resource_scope::<Ownership>("/ownerships")
                    .route(
                        "/beneficial-owners/{party_id}",
                        web::get().to(workflow::beneficial_owners),
                    )
                    .route("/{id}/verify", web::post().to(crud::verify::<Ownership>)),
            )
            .service(crud::resource_scope::<RiskAssessment>("/risk-assessments"))
            .service(crud::resource_scope::<EnhancedDueDiligence>("/due-diligence"))
            .service(
                crud::resource_scope::<RegulatoryReport>("/regulatory-reports")
                    .route("/{id}/submit", web::post().to(workflow::submit_report))
                    .route("/{id}/outcome", web::post().to(workflow::report_outcome)),
            )
            .service(
                crud::resource_scope::<KycDocument>("/documents")
                    .route("/{id}/verify", web::post().to(crud::verify::<KycDocument>)),
            ),
    )
    .route("/metrics", web::get().to(metrics_endpoint))
    .route("/health", web::get().to(health_check));
}
