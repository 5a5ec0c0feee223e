use crate::errors::KycEngineError;
use crate::models::{
    AmlMatchRequest, CaseStatusRequest, ComplianceActionRequest, ReportOutcomeRequest,
    ResolveMatchRequest, SubmitReportRequest,
};
use crate::services::{AmlService, CaseService, OwnershipService, ReportingService};
use actix_web::{web, HttpResponse};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Record a list hit on a screening
pub async fn record_match(
    service: web::Data<Arc<AmlService>>,
    screening_id: web::Path<Uuid>,
    request: web::Json<AmlMatchRequest>,
) -> Result<HttpResponse, KycEngineError> {
    let aml_match = service
        .record_match(*screening_id, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(aml_match))
}

/// Record a hit on the screening named in the body
pub async fn create_match(
    service: web::Data<Arc<AmlService>>,
    request: web::Json<AmlMatchRequest>,
) -> Result<HttpResponse, KycEngineError> {
    let request = request.into_inner();
    request.validate()?;

    let aml_match = service.record_match(request.screening_id, request).await?;
    Ok(HttpResponse::Created().json(aml_match))
}

pub async fn delete_match(
    service: web::Data<Arc<AmlService>>,
    match_id: web::Path<Uuid>,
) -> Result<HttpResponse, KycEngineError> {
    service.delete_match(*match_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn screening_matches(
    service: web::Data<Arc<AmlService>>,
    screening_id: web::Path<Uuid>,
) -> Result<HttpResponse, KycEngineError> {
    let matches = service.matches_for(*screening_id).await?;
    Ok(HttpResponse::Ok().json(matches))
}

pub async fn resolve_match(
    service: web::Data<Arc<AmlService>>,
    match_id: web::Path<Uuid>,
    request: web::Json<ResolveMatchRequest>,
) -> Result<HttpResponse, KycEngineError> {
    let aml_match = service
        .resolve_match(*match_id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(aml_match))
}

pub async fn delete_screening(
    service: web::Data<Arc<AmlService>>,
    screening_id: web::Path<Uuid>,
) -> Result<HttpResponse, KycEngineError> {
    service.delete_screening(*screening_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn set_case_status(
    service: web::Data<Arc<CaseService>>,
    case_id: web::Path<Uuid>,
    request: web::Json<CaseStatusRequest>,
) -> Result<HttpResponse, KycEngineError> {
    let case = service.set_status(*case_id, request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(case))
}

pub async fn add_case_action(
    service: web::Data<Arc<CaseService>>,
    case_id: web::Path<Uuid>,
    request: web::Json<ComplianceActionRequest>,
) -> Result<HttpResponse, KycEngineError> {
    let action = service.add_action(*case_id, request.into_inner()).await?;
    Ok(HttpResponse::Created().json(action))
}

/// Append an action to the case named in the body
pub async fn create_case_action(
    service: web::Data<Arc<CaseService>>,
    request: web::Json<ComplianceActionRequest>,
) -> Result<HttpResponse, KycEngineError> {
    let request = request.into_inner();
    request.validate()?;

    let action = service.add_action(request.case_id, request).await?;
    Ok(HttpResponse::Created().json(action))
}

pub async fn case_actions(
    service: web::Data<Arc<CaseService>>,
    case_id: web::Path<Uuid>,
) -> Result<HttpResponse, KycEngineError> {
    let actions = service.actions_for(*case_id).await?;
    Ok(HttpResponse::Ok().json(actions))
}

pub async fn open_cases(
    service: web::Data<Arc<CaseService>>,
    party_id: web::Path<Uuid>,
) -> Result<HttpResponse, KycEngineError> {
    let cases = service.open_cases_for(*party_id).await?;
    Ok(HttpResponse::Ok().json(cases))
}

pub async fn delete_case(
    service: web::Data<Arc<CaseService>>,
    case_id: web::Path<Uuid>,
) -> Result<HttpResponse, KycEngineError> {
    service.delete_case(*case_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn beneficial_owners(
    service: web::Data<Arc<OwnershipService>>,
    party_id: web::Path<Uuid>,
) -> Result<HttpResponse, KycEngineError> {
    let owners = service.beneficial_owners(*party_id).await?;
    Ok(HttpResponse::Ok().json(owners))
}

pub async fn submit_report(
    service: web::Data<Arc<ReportingService>>,
    report_id: web::Path<Uuid>,
    request: web::Json<SubmitReportRequest>,
) -> Result<HttpResponse, KycEngineError> {
    let report = service.submit(*report_id, request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(report))
}

pub async fn report_outcome(
    service: web::Data<Arc<ReportingService>>,
    report_id: web::Path<Uuid>,
    request: web::Json<ReportOutcomeRequest>,
) -> Result<HttpResponse, KycEngineError> {
    let report = service
        .record_outcome(*report_id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(report))
}
